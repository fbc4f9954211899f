//! Contract-violation errors for the string primitives.

use thiserror::Error;

use crate::errno;

/// A caller contract violation detected before any byte was written.
///
/// In C these are undefined behavior; here they are values the caller must
/// handle. "Not found" and end-of-tokens are not errors and never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StringError {
    /// The destination region cannot hold the bytes the operation must write.
    #[error("destination too small: need {needed} bytes, have {available}")]
    DestinationTooSmall { needed: usize, available: usize },

    /// A source region is shorter than the byte count requested.
    #[error("source too small: need {needed} bytes, have {available}")]
    SourceTooSmall { needed: usize, available: usize },

    /// A destination string that must be appended to holds no NUL terminator.
    #[error("string is not NUL-terminated within its {len}-byte region")]
    Unterminated { len: usize },

    /// A move range `[offset, offset + len)` does not fit the buffer.
    #[error("range {offset}..{offset}+{len} exceeds {buffer_len}-byte buffer")]
    RangeOutOfBounds {
        offset: usize,
        len: usize,
        buffer_len: usize,
    },

    /// The allocator could not satisfy a `strdup` request.
    #[error("allocation of {requested} bytes failed")]
    AllocationFailure { requested: usize },
}

impl StringError {
    /// The errno code a C caller would observe for this violation.
    #[must_use]
    pub const fn errno(&self) -> i32 {
        match self {
            Self::DestinationTooSmall { .. } | Self::SourceTooSmall { .. } => errno::ERANGE,
            Self::Unterminated { .. } => errno::EINVAL,
            Self::RangeOutOfBounds { .. } => errno::EFAULT,
            Self::AllocationFailure { .. } => errno::ENOMEM,
        }
    }
}

/// Result type alias for fallible primitives.
pub type Result<T> = std::result::Result<T, StringError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_mapping_matches_c_conventions() {
        let short = StringError::DestinationTooSmall {
            needed: 4,
            available: 2,
        };
        assert_eq!(short.errno(), errno::ERANGE);
        assert_eq!(StringError::Unterminated { len: 3 }.errno(), errno::EINVAL);
        assert_eq!(
            StringError::AllocationFailure { requested: 9 }.errno(),
            errno::ENOMEM
        );
    }

    #[test]
    fn display_names_the_sizes() {
        let err = StringError::SourceTooSmall {
            needed: 8,
            available: 5,
        };
        assert_eq!(err.to_string(), "source too small: need 8 bytes, have 5");
        let err = StringError::RangeOutOfBounds {
            offset: 6,
            len: 4,
            buffer_len: 8,
        };
        assert_eq!(err.to_string(), "range 6..6+4 exceeds 8-byte buffer");
    }
}
