//! String and memory operations.
//!
//! Implements `<string.h>` functions as safe Rust operating on slices.

pub mod collate;
pub mod guarded;
pub mod mem;
pub mod str;
pub mod strerror;
pub mod strtok;

// Re-export commonly used functions.
pub use collate::{
    AsciiCaseFold, ByteOrder, CollationPolicy, DefaultCollation, strcoll, strcoll_with, strxfrm,
    strxfrm_with,
};
pub use guarded::Guarded;
pub use mem::{memcmp, memcpy, memmove, memset};
pub use str::{
    CharRangePolicy, strcat, strchr, strchr_code, strcmp, strcpy, strcspn, strdup, strlen,
    strncat, strncmp, strncpy, strpbrk, strrchr, strrchr_code, strspn, strstr,
};
pub use strerror::{UNKNOWN_ERROR, is_known_errno, known_errnos, strerror};
pub use strtok::{Token, TokenCursor, Tokenizer, Tokens, strtok_r, tokens};
