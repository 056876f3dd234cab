use super::codec::Codec;
use super::compact::{read_length, write_length};
use super::error::{CodecError, CodecResult};
use super::staged::{take, take_array, Staged};
use crate::config::CodecLimits;

/// Exactly `N` raw bytes with no length prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedBytes<const N: usize>;

impl<const N: usize> Codec for FixedBytes<N> {
    type Value = [u8; N];

    fn serialize_into(&self, value: &[u8; N], out: &mut Vec<u8>) {
        out.extend_from_slice(value);
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, [u8; N]>> {
        take_array::<N>(input)
    }

    fn min_encoded_len(&self) -> usize {
        N
    }
}

/// Length-prefixed opaque blob.
///
/// The prefix is a compact signed integer; the payload follows verbatim.
#[derive(Debug, Clone, Copy)]
pub struct ByteString {
    max_len: usize,
}

impl ByteString {
    /// Creates a blob codec bounded by `limits.max_blob_len`.
    pub fn new(limits: &CodecLimits) -> Self {
        Self {
            max_len: limits.max_blob_len,
        }
    }
}

impl Default for ByteString {
    fn default() -> Self {
        Self::new(&CodecLimits::default())
    }
}

impl Codec for ByteString {
    type Value = Vec<u8>;

    fn serialize_into(&self, value: &Vec<u8>, out: &mut Vec<u8>) {
        write_length(value.len(), out);
        out.extend_from_slice(value);
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, Vec<u8>>> {
        let len = read_length(input)?;
        if len.value > self.max_len {
            return Err(CodecError::count_exceeded(len.value, self.max_len));
        }
        Ok(take(len.rest, len.value)?.map(<[u8]>::to_vec))
    }

    fn min_encoded_len(&self) -> usize {
        1
    }
}
