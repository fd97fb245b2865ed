/// Errors used throughout this crate.
///
/// Every variant is a precondition violation by the caller. Implicit rejection during
/// decapsulation is not an error and never surfaces here.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A byte buffer does not have the fixed length required for its role.
    #[error("Invalid {what} length: expected {expected}, got {got}")]
    InvalidLength {
        /// The role of the buffer (`"ciphertext"`, `"encapsulation key"`, ...).
        what: &'static str,
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        got: usize,
    },
    /// An integer input lies outside the domain of the operation.
    #[error("{what} out of range: {value} is not below {bound}")]
    OutOfRange {
        /// The name of the offending input.
        what: &'static str,
        /// The value that was supplied.
        value: u64,
        /// The exclusive upper bound of the domain.
        bound: u64,
    },
    /// A bit width that the codec does not support.
    #[error("Unsupported bit width d={d}")]
    UnsupportedWidth {
        /// The requested width in bits.
        d: usize,
    },
    /// An encapsulation key contains a 12-bit field that does not encode a value below q.
    #[error("Encapsulation key is not canonically encoded")]
    NonCanonicalKey,
    /// A fixed-output hash mode was asked for a different output length.
    #[error("Invalid output length for {mode}: expected {expected}, got {got}")]
    InvalidOutputLength {
        /// The hash mode.
        mode: &'static str,
        /// The digest size of the mode.
        expected: usize,
        /// The requested output length.
        got: usize,
    },
}

/// Result type used by this crate.
pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub(crate) fn check_length(what: &'static str, expected: usize, got: usize) -> Result<()> {
        if expected == got {
            Ok(())
        } else {
            tracing::debug!(what, expected, got, "rejecting buffer of wrong length");
            Err(Error::InvalidLength {
                what,
                expected,
                got,
            })
        }
    }

    pub(crate) fn check_range(what: &'static str, value: impl Into<u64>, bound: u64) -> Result<()> {
        let value = value.into();
        if value < bound {
            Ok(())
        } else {
            tracing::debug!(what, value, bound, "rejecting out-of-range input");
            Err(Error::OutOfRange { what, value, bound })
        }
    }
}
