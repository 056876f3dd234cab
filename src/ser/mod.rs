//! Composable binary codecs.
//!
//! Every codec implements [`Codec`]: encoding appends bytes to a buffer and
//! cannot fail, decoding slices one value off the front of the input and
//! returns it as a [`Staged`] value together with the unconsumed remainder.
//! Composite codecs thread that remainder from field to field in declared
//! order and stop at the first failure, returning it unchanged apart from
//! the provenance trail.
//!
//! * Primitives: [`Bool`], [`U8`], [`BigEndian`], [`LittleEndian`],
//!   [`FixedBytes`], [`ByteString`], [`CompactUnsigned`], [`CompactSigned`],
//!   [`U256Codec`], [`Unit`].
//! * Combinators: tuples of codecs, [`Product`], [`Sequence`],
//!   [`OptionCodec`], [`Within`], [`AnyCodec`].
//! * Sum types: [`Tagged`], [`TaggedUnion`], [`Variant`].

mod bytes;
mod codec;
mod collections;
mod compact;
mod error;
mod ints;
mod staged;
mod tuple;
mod union;

pub use bytes::{ByteString, FixedBytes};
pub use codec::{AnyCodec, Codec, Unit, Within};
pub use collections::{OptionCodec, Sequence};
pub use compact::{read_length, write_length, CompactSigned, CompactUnsigned, U256Codec};
pub use error::{CodecError, CodecResult, ErrorKind, Location};
pub use ints::{BigEndian, Bool, FixedWidth, LittleEndian, U8};
pub use primitive_types::U256;
pub use staged::{take, take_array, take_u8, Staged};
pub use tuple::Product;
pub use union::{Tagged, TaggedUnion, Variant};
