//! # strprim-core
//!
//! Safe Rust implementations of the C `<string.h>` primitive set.
//!
//! Every function operates on caller-owned byte slices. A NUL byte (`0x00`)
//! marks the logical end of a string; the end of a slice acts as the
//! terminator when no NUL is present, so no primitive can read past the
//! region it was given. No `unsafe` code is permitted at the crate level.

#![deny(unsafe_code)]

pub mod errno;
pub mod error;
pub mod string;

pub use error::{Result, StringError};
