use core::fmt;
use serde::Serialize;

/// Failure kinds reported while decoding wire data.
///
/// Encoding never fails, so every kind describes malformed or truncated
/// input. The kind is what callers match on; the provenance trail carried by
/// [`CodecError`] is informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Input ended before a fixed-width or length-prefixed field was read.
    InsufficientBytes {
        /// Number of bytes the field required.
        expected: usize,
        /// Number of bytes that were left in the buffer.
        remaining: usize,
    },
    /// A boolean byte was neither `0x00` nor `0x01`.
    InvalidBoolByte {
        /// Offending byte.
        value: u8,
    },
    /// A compact integer used a wider encoding than its value requires.
    NonCanonicalInteger {
        /// Total number of bytes the rejected encoding occupied.
        encoded_len: usize,
    },
    /// A tagged union discriminant matched no registered variant.
    UnknownDiscriminant {
        /// Offending discriminant byte.
        value: u8,
    },
    /// A declared element or byte count exceeded the configured bound.
    ElementCountExceeded {
        /// Count announced by the length prefix.
        declared: usize,
        /// Configured upper bound.
        limit: usize,
    },
    /// A declared element count cannot fit into the bytes that remain.
    InsufficientElements {
        /// Count announced by the length prefix.
        declared: usize,
        /// Number of bytes that were left in the buffer.
        remaining: usize,
    },
    /// Variant-specific validation failed.
    MalformedPayload {
        /// Static description of the violated rule.
        reason: &'static str,
    },
    /// Bytes remained after decoding a standalone message.
    TrailingBytes {
        /// Number of bytes consumed by the decoded value.
        consumed: usize,
        /// Number of unconsumed bytes.
        remaining: usize,
    },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InsufficientBytes {
                expected,
                remaining,
            } => write!(
                f,
                "insufficient bytes: expected {expected}, remaining {remaining}"
            ),
            ErrorKind::InvalidBoolByte { value } => write!(f, "invalid bool byte 0x{value:02x}"),
            ErrorKind::NonCanonicalInteger { encoded_len } => {
                write!(f, "non-canonical compact integer ({encoded_len} bytes)")
            }
            ErrorKind::UnknownDiscriminant { value } => {
                write!(f, "unknown discriminant 0x{value:02x}")
            }
            ErrorKind::ElementCountExceeded { declared, limit } => {
                write!(f, "declared count {declared} exceeds limit {limit}")
            }
            ErrorKind::InsufficientElements {
                declared,
                remaining,
            } => write!(
                f,
                "declared count {declared} cannot fit in {remaining} remaining bytes"
            ),
            ErrorKind::MalformedPayload { reason } => write!(f, "malformed payload: {reason}"),
            ErrorKind::TrailingBytes {
                consumed,
                remaining,
            } => write!(
                f,
                "{remaining} trailing bytes after consuming {consumed} bytes"
            ),
        }
    }
}

/// One step of the path leading to a decoding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Location {
    /// Named field of a record.
    Field {
        /// Record being decoded.
        structure: &'static str,
        /// Field within the record.
        field: &'static str,
    },
    /// Position within a sequence.
    Element {
        /// Zero-based element index.
        index: usize,
    },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Field { structure, field } => write!(f, "{structure}.{field}"),
            Location::Element { index } => write!(f, "[{index}]"),
        }
    }
}

/// Decoding error: a [`ErrorKind`] plus the provenance trail, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodecError {
    kind: ErrorKind,
    trail: Vec<Location>,
}

impl CodecError {
    /// Creates an error without provenance.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            trail: Vec::new(),
        }
    }

    /// Creates an insufficient-bytes error helper.
    pub fn insufficient_bytes(expected: usize, remaining: usize) -> Self {
        Self::new(ErrorKind::InsufficientBytes {
            expected,
            remaining,
        })
    }

    /// Creates an invalid-bool error helper.
    pub fn invalid_bool(value: u8) -> Self {
        Self::new(ErrorKind::InvalidBoolByte { value })
    }

    /// Creates a non-canonical-integer error helper.
    pub fn non_canonical(encoded_len: usize) -> Self {
        Self::new(ErrorKind::NonCanonicalInteger { encoded_len })
    }

    /// Creates an unknown-discriminant error helper.
    pub fn unknown_discriminant(value: u8) -> Self {
        Self::new(ErrorKind::UnknownDiscriminant { value })
    }

    /// Creates a count-exceeded error helper.
    pub fn count_exceeded(declared: usize, limit: usize) -> Self {
        Self::new(ErrorKind::ElementCountExceeded { declared, limit })
    }

    /// Creates an insufficient-elements error helper.
    pub fn insufficient_elements(declared: usize, remaining: usize) -> Self {
        Self::new(ErrorKind::InsufficientElements {
            declared,
            remaining,
        })
    }

    /// Creates a malformed-payload error helper.
    pub fn malformed(reason: &'static str) -> Self {
        Self::new(ErrorKind::MalformedPayload { reason })
    }

    /// Creates a trailing-bytes error helper.
    pub fn trailing_bytes(consumed: usize, remaining: usize) -> Self {
        Self::new(ErrorKind::TrailingBytes {
            consumed,
            remaining,
        })
    }

    /// Returns the failure kind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the provenance trail, outermost location first.
    pub fn trail(&self) -> &[Location] {
        &self.trail
    }

    /// Returns `true` when the input simply ended too early.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InsufficientBytes { .. } | ErrorKind::InsufficientElements { .. }
        )
    }

    /// Records that the failure happened inside `structure.field`.
    pub fn within(self, structure: &'static str, field: &'static str) -> Self {
        self.at(Location::Field { structure, field })
    }

    /// Records that the failure happened inside the element at `index`.
    pub fn at_element(self, index: usize) -> Self {
        self.at(Location::Element { index })
    }

    fn at(mut self, location: Location) -> Self {
        self.trail.insert(0, location);
        self
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.trail.is_empty() {
            f.write_str(" at ")?;
            for (position, location) in self.trail.iter().enumerate() {
                if position > 0 && matches!(location, Location::Field { .. }) {
                    f.write_str(" > ")?;
                }
                write!(f, "{location}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for CodecError {}

impl From<ErrorKind> for CodecError {
    fn from(kind: ErrorKind) -> Self {
        CodecError::new(kind)
    }
}

/// Convenient alias for codec results.
pub type CodecResult<T> = core::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_renders_outermost_first() {
        let err = CodecError::insufficient_bytes(33, 2)
            .within("TxInput", "unlock_script")
            .at_element(1)
            .within("UnsignedTransaction", "inputs");
        assert_eq!(
            err.to_string(),
            "insufficient bytes: expected 33, remaining 2 at UnsignedTransaction.inputs[1] > TxInput.unlock_script"
        );
        assert!(err.is_truncation());
    }

    #[test]
    fn provenance_does_not_change_kind() {
        let err = CodecError::unknown_discriminant(7).within("TxInput", "unlock_script");
        assert_eq!(err.kind(), &ErrorKind::UnknownDiscriminant { value: 7 });
        assert_eq!(err.trail().len(), 1);
    }
}
