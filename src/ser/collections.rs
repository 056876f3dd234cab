use tracing::{debug, warn};

use super::codec::Codec;
use super::compact::{read_length, write_length};
use super::error::{CodecError, CodecResult};
use super::ints::Bool;
use super::staged::Staged;
use crate::config::CodecLimits;

/// Count-prefixed homogeneous sequence.
///
/// Element order is preserved on the wire. The declared count is validated
/// against the configured bound and against the bytes actually available
/// before any element storage is allocated.
#[derive(Debug, Clone, Copy)]
pub struct Sequence<C> {
    element: C,
    max_len: usize,
}

impl<C: Codec> Sequence<C> {
    /// Creates a sequence codec bounded by `limits.max_sequence_len`.
    pub fn new(element: C, limits: &CodecLimits) -> Self {
        Self {
            element,
            max_len: limits.max_sequence_len,
        }
    }

    fn check_count(&self, declared: usize, remaining: usize) -> CodecResult<()> {
        if declared > self.max_len {
            warn!(declared, limit = self.max_len, "sequence count exceeds limit");
            return Err(CodecError::count_exceeded(declared, self.max_len));
        }
        let needed = declared.saturating_mul(self.element.min_encoded_len());
        if needed > remaining {
            warn!(declared, remaining, "sequence count cannot fit in input");
            return Err(CodecError::insufficient_elements(declared, remaining));
        }
        Ok(())
    }
}

impl<C: Codec> Codec for Sequence<C> {
    type Value = Vec<C::Value>;

    fn serialize_into(&self, value: &Vec<C::Value>, out: &mut Vec<u8>) {
        write_length(value.len(), out);
        for item in value {
            self.element.serialize_into(item, out);
        }
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, Vec<C::Value>>> {
        let Staged {
            value: count,
            mut rest,
        } = read_length(input)?;
        self.check_count(count, rest.len())?;
        let min_len = self.element.min_encoded_len();
        let mut out = Vec::with_capacity(count);
        for index in 0..count {
            if rest.len() < min_len {
                debug!(declared = count, decoded = index, "sequence input exhausted");
                return Err(CodecError::insufficient_elements(count, rest.len()));
            }
            let staged = self
                .element
                .deserialize(rest)
                .map_err(|err| err.at_element(index))?;
            out.push(staged.value);
            rest = staged.rest;
        }
        Ok(Staged::new(out, rest))
    }

    fn min_encoded_len(&self) -> usize {
        1
    }
}

/// Optional value behind a [`Bool`] presence flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionCodec<C> {
    inner: C,
}

impl<C: Codec> OptionCodec<C> {
    /// Wraps the payload codec.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: Codec> Codec for OptionCodec<C> {
    type Value = Option<C::Value>;

    fn serialize_into(&self, value: &Option<C::Value>, out: &mut Vec<u8>) {
        match value {
            Some(inner) => {
                Bool.serialize_into(&true, out);
                self.inner.serialize_into(inner, out);
            }
            None => Bool.serialize_into(&false, out),
        }
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, Option<C::Value>>> {
        let flag = Bool.deserialize(input)?;
        if flag.value {
            Ok(self.inner.deserialize(flag.rest)?.map(Some))
        } else {
            Ok(Staged::new(None, flag.rest))
        }
    }

    fn min_encoded_len(&self) -> usize {
        1
    }
}
