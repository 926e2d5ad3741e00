//! Small utilities shared across the scanner workspace.

pub mod env;
