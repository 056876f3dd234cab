use std::fmt;
use std::sync::Arc;

use super::error::{CodecError, CodecResult};
use super::staged::Staged;

/// Paired serializer and deserializer for one value type.
///
/// Implementations are stateless: composite codecs only hold other codecs,
/// so a single instance can be shared across threads and reused freely.
/// Encoding is total. Decoding slices the value off the front of the input
/// and hands back the unconsumed remainder.
pub trait Codec {
    /// Value produced and consumed by this codec.
    type Value;

    /// Appends the wire representation of `value` to `out`.
    fn serialize_into(&self, value: &Self::Value, out: &mut Vec<u8>);

    /// Decodes one value from the front of `input`.
    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, Self::Value>>;

    /// Lower bound on the number of bytes any encoded value occupies.
    ///
    /// Sequences use it to reject impossible element counts before
    /// allocating.
    fn min_encoded_len(&self) -> usize {
        0
    }

    /// Returns the wire representation of `value` in a fresh buffer.
    fn serialize(&self, value: &Self::Value) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.min_encoded_len());
        self.serialize_into(value, &mut out);
        out
    }

    /// Decodes a standalone message, rejecting any leftover bytes.
    fn deserialize_exact(&self, input: &[u8]) -> CodecResult<Self::Value> {
        let staged = self.deserialize(input)?;
        if staged.rest.is_empty() {
            Ok(staged.value)
        } else {
            Err(CodecError::trailing_bytes(
                staged.consumed(input),
                staged.rest.len(),
            ))
        }
    }

    /// Tags every decoding error raised by this codec with `structure.field`.
    fn within(self, structure: &'static str, field: &'static str) -> Within<Self>
    where
        Self: Sized,
    {
        Within {
            inner: self,
            structure,
            field,
        }
    }
}

impl<C: Codec + ?Sized> Codec for &C {
    type Value = C::Value;

    fn serialize_into(&self, value: &Self::Value, out: &mut Vec<u8>) {
        (**self).serialize_into(value, out)
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, Self::Value>> {
        (**self).deserialize(input)
    }

    fn min_encoded_len(&self) -> usize {
        (**self).min_encoded_len()
    }
}

/// Attaches field provenance to errors of the wrapped codec.
#[derive(Debug, Clone, Copy)]
pub struct Within<C> {
    inner: C,
    structure: &'static str,
    field: &'static str,
}

impl<C: Codec> Codec for Within<C> {
    type Value = C::Value;

    fn serialize_into(&self, value: &Self::Value, out: &mut Vec<u8>) {
        self.inner.serialize_into(value, out)
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, Self::Value>> {
        self.inner
            .deserialize(input)
            .map_err(|err| err.within(self.structure, self.field))
    }

    fn min_encoded_len(&self) -> usize {
        self.inner.min_encoded_len()
    }
}

/// Type-erased codec handle.
///
/// Used where codecs of different concrete types but one value type must sit
/// in the same collection, such as the variant table of a tagged union.
pub struct AnyCodec<T> {
    inner: Arc<dyn Codec<Value = T> + Send + Sync>,
}

impl<T> AnyCodec<T> {
    /// Erases the concrete type of `codec`.
    pub fn new<C>(codec: C) -> Self
    where
        C: Codec<Value = T> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(codec),
        }
    }
}

impl<T> Clone for AnyCodec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for AnyCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyCodec")
            .field("min_encoded_len", &self.inner.min_encoded_len())
            .finish()
    }
}

impl<T> Codec for AnyCodec<T> {
    type Value = T;

    fn serialize_into(&self, value: &T, out: &mut Vec<u8>) {
        self.inner.serialize_into(value, out)
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, T>> {
        self.inner.deserialize(input)
    }

    fn min_encoded_len(&self) -> usize {
        self.inner.min_encoded_len()
    }
}

/// Zero-length codec for marker values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unit;

impl Codec for Unit {
    type Value = ();

    fn serialize_into(&self, _value: &(), _out: &mut Vec<u8>) {}

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, ()>> {
        Ok(Staged::new((), input))
    }
}
