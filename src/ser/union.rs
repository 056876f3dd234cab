use core::fmt;

use super::codec::{AnyCodec, Codec};
use super::error::{CodecError, CodecResult};
use super::staged::{take_u8, Staged};

/// Closed sum type with a one-byte discriminant per variant.
///
/// Implementations write `discriminant` and `serialize_payload` as
/// exhaustive `match`es so that a new variant cannot compile without an
/// encode arm. The decode side is a [`TaggedUnion`] table which is checked
/// against [`Tagged::DISCRIMINANTS`] when constructed.
pub trait Tagged: Sized + 'static {
    /// Every discriminant [`Tagged::discriminant`] can return.
    const DISCRIMINANTS: &'static [u8];

    /// Discriminant byte of this variant.
    fn discriminant(&self) -> u8;

    /// Appends the variant payload (possibly nothing) to `out`.
    fn serialize_payload(&self, out: &mut Vec<u8>);
}

/// Decode arm for one variant: a payload codec plus the variant constructor.
///
/// Encoding goes through [`Tagged::serialize_payload`] so the arm never has
/// to project a value back onto its payload.
pub struct Variant<C: Codec, T> {
    payload: C,
    wrap: fn(C::Value) -> T,
}

impl<C, T> Variant<C, T>
where
    C: Codec + Send + Sync + 'static,
    T: Tagged,
{
    /// Builds a discriminant table entry.
    pub fn arm(discriminant: u8, payload: C, wrap: fn(C::Value) -> T) -> (u8, AnyCodec<T>) {
        (discriminant, AnyCodec::new(Variant { payload, wrap }))
    }
}

impl<C: Codec, T: Tagged> Codec for Variant<C, T> {
    type Value = T;

    fn serialize_into(&self, value: &T, out: &mut Vec<u8>) {
        value.serialize_payload(out);
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, T>> {
        Ok(self.payload.deserialize(input)?.map(self.wrap))
    }

    fn min_encoded_len(&self) -> usize {
        self.payload.min_encoded_len()
    }
}

/// Discriminant-prefixed codec for a [`Tagged`] sum type.
///
/// The table is sparse: discriminants need not be contiguous and gaps stay
/// unassigned. It is fixed at construction and never mutated afterwards.
pub struct TaggedUnion<T> {
    arms: Vec<(u8, AnyCodec<T>)>,
}

impl<T: Tagged> TaggedUnion<T> {
    /// Builds the decode table.
    ///
    /// # Panics
    ///
    /// Panics if a discriminant is registered twice, or if the registered
    /// set differs from [`Tagged::DISCRIMINANTS`]. Both are programming
    /// errors in the sum type's codec definition.
    pub fn new<I>(arms: I) -> Self
    where
        I: IntoIterator<Item = (u8, AnyCodec<T>)>,
    {
        let mut arms: Vec<(u8, AnyCodec<T>)> = arms.into_iter().collect();
        arms.sort_by_key(|(discriminant, _)| *discriminant);
        for pair in arms.windows(2) {
            assert!(
                pair[0].0 != pair[1].0,
                "discriminant 0x{:02x} registered twice for {}",
                pair[0].0,
                core::any::type_name::<T>()
            );
        }
        for discriminant in T::DISCRIMINANTS {
            assert!(
                arms.iter().any(|(registered, _)| registered == discriminant),
                "discriminant 0x{:02x} of {} has no decode arm",
                discriminant,
                core::any::type_name::<T>()
            );
        }
        assert_eq!(
            arms.len(),
            T::DISCRIMINANTS.len(),
            "{} registers discriminants it never encodes",
            core::any::type_name::<T>()
        );
        Self { arms }
    }

    fn arm(&self, discriminant: u8) -> Option<&AnyCodec<T>> {
        self.arms
            .binary_search_by_key(&discriminant, |(registered, _)| *registered)
            .ok()
            .map(|index| &self.arms[index].1)
    }

    /// Registered discriminants in ascending order.
    pub fn discriminants(&self) -> impl Iterator<Item = u8> + '_ {
        self.arms.iter().map(|(discriminant, _)| *discriminant)
    }
}

impl<T> Clone for TaggedUnion<T> {
    fn clone(&self) -> Self {
        Self {
            arms: self.arms.clone(),
        }
    }
}

impl<T> fmt::Debug for TaggedUnion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggedUnion")
            .field("type", &core::any::type_name::<T>())
            .field(
                "discriminants",
                &self.arms.iter().map(|(d, _)| *d).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<T: Tagged> Codec for TaggedUnion<T> {
    type Value = T;

    fn serialize_into(&self, value: &T, out: &mut Vec<u8>) {
        let discriminant = value.discriminant();
        debug_assert!(self.arm(discriminant).is_some());
        out.push(discriminant);
        value.serialize_payload(out);
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, T>> {
        let tag = take_u8(input)?;
        match self.arm(tag.value) {
            Some(arm) => arm.deserialize(tag.rest),
            None => Err(CodecError::unknown_discriminant(tag.value)),
        }
    }

    fn min_encoded_len(&self) -> usize {
        1
    }
}
