//! Command implementations for r2-tools

pub mod convert;
pub mod manifest;
pub mod rab;
pub mod rmb;
