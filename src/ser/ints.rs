use core::fmt;
use core::marker::PhantomData;
use core::mem::size_of;

use super::codec::Codec;
use super::error::{CodecError, CodecResult};
use super::staged::{take, take_u8, Staged};

/// Boolean encoded as a single `0x00` / `0x01` byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bool;

impl Codec for Bool {
    type Value = bool;

    fn serialize_into(&self, value: &bool, out: &mut Vec<u8>) {
        out.push(*value as u8);
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, bool>> {
        let staged = take_u8(input)?;
        match staged.value {
            0 => Ok(staged.map(|_| false)),
            1 => Ok(staged.map(|_| true)),
            other => Err(CodecError::invalid_bool(other)),
        }
    }

    fn min_encoded_len(&self) -> usize {
        1
    }
}

/// Single raw byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct U8;

impl Codec for U8 {
    type Value = u8;

    fn serialize_into(&self, value: &u8, out: &mut Vec<u8>) {
        out.push(*value);
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, u8>> {
        take_u8(input)
    }

    fn min_encoded_len(&self) -> usize {
        1
    }
}

/// Integers with a constant-width wire representation.
pub trait FixedWidth: Copy {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Appends the big-endian representation.
    fn write_be(self, out: &mut Vec<u8>);

    /// Appends the little-endian representation.
    fn write_le(self, out: &mut Vec<u8>);

    /// Reads from exactly [`Self::WIDTH`] big-endian bytes.
    fn read_be(bytes: &[u8]) -> Self;

    /// Reads from exactly [`Self::WIDTH`] little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_fixed_width {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FixedWidth for $ty {
                const WIDTH: usize = size_of::<$ty>();

                fn write_be(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_be_bytes());
                }

                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn read_be(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; size_of::<$ty>()];
                    buf.copy_from_slice(bytes);
                    <$ty>::from_be_bytes(buf)
                }

                fn read_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; size_of::<$ty>()];
                    buf.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(buf)
                }
            }
        )*
    };
}

impl_fixed_width!(u16, u32, u64, i32, i64);

/// Fixed-width integer in network byte order.
pub struct BigEndian<T>(PhantomData<fn() -> T>);

/// Fixed-width integer in little-endian byte order.
pub struct LittleEndian<T>(PhantomData<fn() -> T>);

macro_rules! impl_endian_codec {
    ($name:ident, $write:ident, $read:ident) => {
        impl<T> $name<T> {
            /// Creates the codec.
            pub const fn new() -> Self {
                Self(PhantomData)
            }
        }

        impl<T> Default for $name<T> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $name<T> {}

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}<{}>", stringify!($name), core::any::type_name::<T>())
            }
        }

        impl<T: FixedWidth> Codec for $name<T> {
            type Value = T;

            fn serialize_into(&self, value: &T, out: &mut Vec<u8>) {
                value.$write(out);
            }

            fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, T>> {
                Ok(take(input, T::WIDTH)?.map(T::$read))
            }

            fn min_encoded_len(&self) -> usize {
                T::WIDTH
            }
        }
    };
}

impl_endian_codec!(BigEndian, write_be, read_be);
impl_endian_codec!(LittleEndian, write_le, read_le);
