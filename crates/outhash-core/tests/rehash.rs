//! End-to-end tests for the rehash pass: two-phase renaming, reference
//! propagation, and output validation driven through the staged pipeline.

use std::collections::BTreeSet;
use std::fs;

use outhash_core::{
    rehash_artifacts, Artifact, ArtifactRepository, DigestEncoding, HashAlgorithm, HashConfig,
    Hasher, OutputRehash, Phase, Pipeline, PipelineContext, RehashConfig,
};

fn hasher() -> Hasher {
    Hasher::new(HashConfig::new(
        HashAlgorithm::Sha256,
        DigestEncoding::Hex,
        8,
    ))
    .unwrap()
}

fn index(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Two ordinary artifacts plus one index artifact referencing both: after the
/// pass, the ordinary names embed the digests of their content, the index
/// content carries the new fragments, and the index name embeds the digest of
/// its post-rewrite content.
#[test]
fn vendor_scenario() {
    let hasher = hasher();
    let mut repo = ArtifactRepository::new();
    repo.insert(Artifact::text("a.ABCDEFAB.js", "a.js", "ABCDEFAB", "X"))
        .unwrap();
    repo.insert(Artifact::text("b.12345678.js", "b.js", "12345678", "Y"))
        .unwrap();
    repo.insert(Artifact::text(
        "vendor.99999999.js",
        "vendor.js",
        "99999999",
        "import(\"a.ABCDEFAB.js\");import(\"b.12345678.js\");",
    ))
    .unwrap();

    let map = rehash_artifacts(&mut repo, &index(&["vendor.js"]), &hasher).unwrap();

    let a_short = hasher.hash(b"X").short;
    let b_short = hasher.hash(b"Y").short;
    assert!(repo.contains(&format!("a.{a_short}.js")));
    assert!(repo.contains(&format!("b.{b_short}.js")));
    assert_eq!(map.new_fragment("ABCDEFAB"), Some(a_short.as_str()));
    assert_eq!(map.new_fragment("12345678"), Some(b_short.as_str()));

    // The index artifact's content references the new names
    let rewritten = format!("import(\"a.{a_short}.js\");import(\"b.{b_short}.js\");");
    let vendor_short = hasher.hash(rewritten.as_bytes()).short;
    let vendor_name = format!("vendor.{vendor_short}.js");
    let vendor = repo.get(&vendor_name).expect("vendor renamed on post-rewrite content");
    assert_eq!(vendor.content.as_text(), Some(rewritten.as_str()));

    // Completeness of propagation: no old fragment survives anywhere
    for (_, artifact) in repo.iter() {
        if let Some(text) = artifact.content.as_text() {
            assert!(!text.contains("ABCDEFAB"));
            assert!(!text.contains("12345678"));
        }
    }
}

/// Same inputs, same config, same outputs.
#[test]
fn rehash_is_deterministic() {
    let run = || {
        let mut repo = ArtifactRepository::new();
        repo.insert(Artifact::text("a.00000000.js", "a.js", "00000000", "X"))
            .unwrap();
        repo.insert(Artifact::text(
            "m.11111111.js",
            "m.js",
            "11111111",
            "ref 00000000",
        ))
        .unwrap();
        rehash_artifacts(&mut repo, &index(&["m.js"]), &hasher()).unwrap();
        repo.file_names()
    };

    assert_eq!(run(), run());
}

/// Only the hash substring of a name changes; the surrounding template is
/// preserved verbatim.
#[test]
fn rename_preserves_name_template() {
    let hasher = hasher();
    let mut repo = ArtifactRepository::new();
    let old_name = "assets/js/app.chunk.00000000.min.js";
    repo.insert(Artifact::text(old_name, "app", "00000000", "X"))
        .unwrap();

    rehash_artifacts(&mut repo, &BTreeSet::new(), &hasher).unwrap();

    let short = hasher.hash(b"X").short;
    let new_name = repo.file_names().pop().unwrap();
    assert_eq!(new_name, format!("assets/js/app.chunk.{short}.min.js"));
    assert_eq!(
        new_name.replace(&short, ""),
        old_name.replace("00000000", "")
    );
}

/// Every processed artifact's final name embeds the short digest of its final
/// content.
#[test]
fn final_names_are_self_consistent() {
    let hasher = hasher();
    let mut repo = ArtifactRepository::new();
    repo.insert(Artifact::text("a.00000000.js", "a.js", "00000000", "X"))
        .unwrap();
    repo.insert(Artifact::binary("img.11111111.png", "img.png", "11111111", vec![1u8, 2, 3]))
        .unwrap();
    repo.insert(Artifact::text(
        "m.22222222.js",
        "m.js",
        "22222222",
        "refs: 00000000 11111111",
    ))
    .unwrap();

    rehash_artifacts(&mut repo, &index(&["m.js"]), &hasher).unwrap();

    for (name, artifact) in repo.iter() {
        let short = hasher.hash(&artifact.content_bytes()).short;
        assert!(
            name.contains(&short),
            "{name} does not embed {short}"
        );
        assert_eq!(artifact.hash_fragment, short);
    }
}

/// An index artifact with deferred content is forced exactly once during the
/// rewrite and hashed on the rewritten value.
#[test]
fn deferred_index_content_is_forced_once() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let hasher = hasher();
    let mut repo = ArtifactRepository::new();
    repo.insert(Artifact::text("a.00000000.js", "a.js", "00000000", "X"))
        .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    repo.insert(Artifact::deferred(
        "m.11111111.js",
        "m.js",
        "11111111",
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "load(a.00000000.js)".to_string()
        },
    ))
    .unwrap();

    rehash_artifacts(&mut repo, &index(&["m.js"]), &hasher).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let a_short = hasher.hash(b"X").short;
    let rewritten = format!("load(a.{a_short}.js)");
    let m_name = format!("m.{}.js", hasher.hash(rewritten.as_bytes()).short);
    assert_eq!(
        repo.get(&m_name).unwrap().content.as_text(),
        Some(rewritten.as_str())
    );
}

/// Full pipeline: host collect and emit stages around the registered pass,
/// with validation over the emitted directory.
#[test]
fn pipeline_end_to_end_with_validation() {
    let dir = tempfile::tempdir().unwrap();
    let hash_config = HashConfig::new(HashAlgorithm::Sha256, DigestEncoding::Hex, 8);
    let hasher = Hasher::new(hash_config.clone()).unwrap();

    let mut pipeline = Pipeline::new();
    pipeline.register_fn("collect-artifacts", Phase::Collect, |ctx| {
        ctx.repository
            .insert(Artifact::text("a.00000000.js", "a.js", "00000000", "X"))?;
        ctx.repository.insert(Artifact::text(
            "vendor.11111111.js",
            "vendor.js",
            "11111111",
            "load(a.00000000.js)",
        ))?;
        Ok(())
    });

    let pass = OutputRehash::new(
        RehashConfig::new(["vendor.js".to_string()]).with_validation("*.js"),
        hash_config,
    )
    .unwrap();
    pass.register(&mut pipeline);

    pipeline.register_fn("emit-artifacts", Phase::Emit, |ctx| {
        let dir = ctx.output_dir.clone().expect("output dir set");
        for (name, artifact) in ctx.repository.iter() {
            fs::write(dir.join(name), artifact.content_bytes())?;
        }
        Ok(())
    });

    let mut ctx = PipelineContext::new().with_output_dir(dir.path());
    pipeline.run(&mut ctx).unwrap();

    let a_short = hasher.hash(b"X").short;
    assert!(dir.path().join(format!("a.{a_short}.js")).exists());
    assert_eq!(ctx.rename_map.as_ref().map(|m| m.len()), Some(1));
}

/// Mutating an emitted file between emission and validation fails the run and
/// names exactly the offending file.
#[test]
fn pipeline_validation_catches_post_emit_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let hash_config = HashConfig::new(HashAlgorithm::Sha256, DigestEncoding::Hex, 8);
    let hasher = Hasher::new(hash_config.clone()).unwrap();

    let mut pipeline = Pipeline::new();
    pipeline.register_fn("collect-artifacts", Phase::Collect, |ctx| {
        ctx.repository
            .insert(Artifact::text("a.00000000.js", "a.js", "00000000", "X"))?;
        ctx.repository
            .insert(Artifact::text("b.11111111.js", "b.js", "11111111", "Y"))?;
        Ok(())
    });

    let pass = OutputRehash::new(
        RehashConfig::default().with_validation("*.js"),
        hash_config,
    )
    .unwrap();
    pass.register(&mut pipeline);

    let emit_hasher = hasher.clone();
    pipeline.register_fn("emit-artifacts", Phase::Emit, move |ctx| {
        let dir = ctx.output_dir.clone().expect("output dir set");
        for (name, artifact) in ctx.repository.iter() {
            fs::write(dir.join(name), artifact.content_bytes())?;
        }
        // A downstream step edits one emitted file after it was hashed
        let b_name = format!("b.{}.js", emit_hasher.hash(b"Y").short);
        fs::write(dir.join(b_name), "edited downstream")?;
        Ok(())
    });

    let mut ctx = PipelineContext::new().with_output_dir(dir.path());
    let err = pipeline.run(&mut ctx).unwrap_err();

    let b_short = hasher.hash(b"Y").short;
    let message = err.to_string();
    assert!(message.contains(&format!("b.{b_short}.js")));
    assert!(!message.contains(&format!("a.{}.js", hasher.hash(b"X").short)));
}
