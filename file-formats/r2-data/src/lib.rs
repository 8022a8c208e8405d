//! Shared low-level support for the R2 Online asset format crates.
//!
//! The RMB and RAB containers are purely sequential: there is no
//! length-prefixed random access, so every decoder walks one logical
//! cursor over the stream in wire order. [`io_ext::ReadExt`] provides
//! that cursor as an extension trait over any [`std::io::Read`], and
//! [`error::DecodeError`] is the error taxonomy shared by all decoders.

pub mod error;
pub mod io_ext;

pub use error::{DecodeError, Result};
pub use io_ext::ReadExt;
