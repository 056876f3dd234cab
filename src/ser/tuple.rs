use core::fmt;

use super::codec::Codec;
use super::error::CodecResult;
use super::staged::Staged;

macro_rules! impl_tuple_codec {
    ($($codec:ident . $idx:tt),+) => {
        impl<$($codec: Codec),+> Codec for ($($codec,)+) {
            type Value = ($($codec::Value,)+);

            fn serialize_into(&self, value: &Self::Value, out: &mut Vec<u8>) {
                $(self.$idx.serialize_into(&value.$idx, out);)+
            }

            #[allow(non_snake_case)]
            fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, Self::Value>> {
                let rest = input;
                $(
                    let Staged { value: $codec, rest } = self.$idx.deserialize(rest)?;
                )+
                Ok(Staged::new(($($codec,)+), rest))
            }

            fn min_encoded_len(&self) -> usize {
                0 $(+ self.$idx.min_encoded_len())+
            }
        }
    };
}

impl_tuple_codec!(A.0, B.1);
impl_tuple_codec!(A.0, B.1, C.2);
impl_tuple_codec!(A.0, B.1, C.2, D.3);
impl_tuple_codec!(A.0, B.1, C.2, D.3, E.4);
impl_tuple_codec!(A.0, B.1, C.2, D.3, E.4, F.5);

/// Maps a tuple-shaped wire layout onto a named record.
///
/// `pack` builds the record from decoded fields, `unpack` produces the field
/// tuple to encode. Unpacking clones owned fields, so products suit small
/// records; larger records implement [`Codec`] directly.
pub struct Product<C: Codec, T> {
    fields: C,
    pack: fn(C::Value) -> T,
    unpack: fn(&T) -> C::Value,
}

impl<C: Codec, T> Product<C, T> {
    /// Wraps the field codec with the two mapping functions.
    pub fn new(fields: C, pack: fn(C::Value) -> T, unpack: fn(&T) -> C::Value) -> Self {
        Self {
            fields,
            pack,
            unpack,
        }
    }
}

impl<C: Codec + Clone, T> Clone for Product<C, T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            pack: self.pack,
            unpack: self.unpack,
        }
    }
}

impl<C: Codec + fmt::Debug, T> fmt::Debug for Product<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Product")
            .field("fields", &self.fields)
            .field("record", &core::any::type_name::<T>())
            .finish()
    }
}

impl<C: Codec, T> Codec for Product<C, T> {
    type Value = T;

    fn serialize_into(&self, value: &T, out: &mut Vec<u8>) {
        self.fields.serialize_into(&(self.unpack)(value), out);
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, T>> {
        Ok(self.fields.deserialize(input)?.map(self.pack))
    }

    fn min_encoded_len(&self) -> usize {
        self.fields.min_encoded_len()
    }
}
