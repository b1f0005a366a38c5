//! Command implementations.

pub mod doctor;
pub mod run;
pub mod verify;
