//! Test modules for roomcrate-io
//!
//! End-to-end checks for the conversion pipeline and project persistence.

pub mod conversion_tests;
