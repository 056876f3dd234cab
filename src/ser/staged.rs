use super::error::{CodecError, CodecResult};

/// A decoded value together with the bytes that follow it.
///
/// `rest` is always a suffix of the slice handed to the decoder, so the
/// number of consumed bytes is `input.len() - rest.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Staged<'a, T> {
    /// Decoded value.
    pub value: T,
    /// Unconsumed remainder of the input.
    pub rest: &'a [u8],
}

impl<'a, T> Staged<'a, T> {
    /// Pairs a value with the remaining input.
    pub fn new(value: T, rest: &'a [u8]) -> Self {
        Self { value, rest }
    }

    /// Transforms the value, keeping the remainder untouched.
    pub fn map<U, F>(self, f: F) -> Staged<'a, U>
    where
        F: FnOnce(T) -> U,
    {
        Staged {
            value: f(self.value),
            rest: self.rest,
        }
    }

    /// Splits the staged value into its parts.
    pub fn into_parts(self) -> (T, &'a [u8]) {
        (self.value, self.rest)
    }

    /// Number of bytes consumed from `input` to produce this value.
    pub fn consumed(&self, input: &[u8]) -> usize {
        input.len().saturating_sub(self.rest.len())
    }
}

/// Splits exactly `len` bytes off the front of `input`.
pub fn take(input: &[u8], len: usize) -> CodecResult<Staged<'_, &[u8]>> {
    if len > input.len() {
        return Err(CodecError::insufficient_bytes(len, input.len()));
    }
    let (head, rest) = input.split_at(len);
    Ok(Staged::new(head, rest))
}

/// Splits a fixed-size array off the front of `input`.
pub fn take_array<const N: usize>(input: &[u8]) -> CodecResult<Staged<'_, [u8; N]>> {
    let staged = take(input, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(staged.value);
    Ok(Staged::new(out, staged.rest))
}

/// Reads a single byte.
pub fn take_u8(input: &[u8]) -> CodecResult<Staged<'_, u8>> {
    match input.split_first() {
        Some((&byte, rest)) => Ok(Staged::new(byte, rest)),
        None => Err(CodecError::insufficient_bytes(1, 0)),
    }
}
