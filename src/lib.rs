//! bcryptx: bcrypt hashing with quick and strong costs tuned to the host
//!
//! Re-exports [`bcryptx_core`]. The command-line tool lives in the
//! `bcryptx-cli` crate.

pub use bcryptx_core::*;
