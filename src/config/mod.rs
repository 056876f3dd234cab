//! Decoding resource bounds.
//!
//! Codecs are constructed from a [`CodecLimits`] value and copy the bounds
//! they need, so limits are fixed for the lifetime of a codec. Two canonical
//! profiles are provided; integrators loading limits from their own
//! configuration files deserialize a [`CodecLimits`] and call
//! [`CodecLimits::validate`] before building codecs.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Upper bounds enforced while decoding untrusted input.
///
/// Both bounds are checked against the declared length prefix before any
/// storage is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecLimits {
    /// Largest element count accepted for a sequence.
    pub max_sequence_len: usize,
    /// Largest byte length accepted for a length-prefixed blob.
    pub max_blob_len: usize,
}

/// Default profile, sized for ordinary transactions relayed by full nodes.
pub const PROFILE_STANDARD_LIMITS: CodecLimits = CodecLimits {
    max_sequence_len: 1024,
    max_blob_len: u16::MAX as usize,
};

/// Tight profile for decoding data from peers that are not trusted at all.
pub const PROFILE_STRICT_LIMITS: CodecLimits = CodecLimits {
    max_sequence_len: 256,
    max_blob_len: 4096,
};

impl Default for CodecLimits {
    fn default() -> Self {
        PROFILE_STANDARD_LIMITS
    }
}

/// Reason a [`CodecLimits`] value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitsError {
    /// A bound was configured as zero, which would reject every payload.
    ZeroBound {
        /// Name of the offending field.
        field: &'static str,
    },
}

impl fmt::Display for LimitsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitsError::ZeroBound { field } => write!(f, "limit `{field}` must be non-zero"),
        }
    }
}

impl std::error::Error for LimitsError {}

impl CodecLimits {
    /// Rejects bounds that cannot decode any well-formed message.
    pub fn validate(&self) -> Result<(), LimitsError> {
        if self.max_sequence_len == 0 {
            return Err(LimitsError::ZeroBound {
                field: "max_sequence_len",
            });
        }
        if self.max_blob_len == 0 {
            return Err(LimitsError::ZeroBound {
                field: "max_blob_len",
            });
        }
        Ok(())
    }
}
