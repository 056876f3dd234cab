//! Variable-length ("compact") integer encodings.
//!
//! The two most significant bits of the header byte select the mode:
//!
//! | Mode bits | Layout | Unsigned range | Signed range |
//! |-----------|--------|----------------|--------------|
//! | `00` | header only, 6 value bits | `0..2^6` | `-2^5..2^5` |
//! | `01` | header + 1 byte, 14 value bits | `2^6..2^14` | `-2^13..2^13` |
//! | `10` | header + 3 bytes, 30 value bits | `2^14..2^30` | `-2^29..2^29` |
//! | `11` | header + `len` bytes big-endian, `len = (header & 0x3f) + 4` | `>= 2^30` | rest of `i32` |
//!
//! Every value has exactly one accepted encoding: decoders reject values that
//! would fit a narrower mode and multi-byte magnitudes with a leading zero.

use primitive_types::U256;

use super::codec::Codec;
use super::error::{CodecError, CodecResult};
use super::staged::{take, take_u8, Staged};

const MODE_MASK: u8 = 0xc0;
const VALUE_MASK: u8 = 0x3f;

const TWO_BYTE_PREFIX: u8 = 0x40;
const FOUR_BYTE_PREFIX: u8 = 0x80;
const MULTI_BYTE_PREFIX: u8 = 0xc0;

const UNSIGNED_ONE_BYTE_BOUND: u32 = 0x40;
const UNSIGNED_TWO_BYTE_BOUND: u32 = UNSIGNED_ONE_BYTE_BOUND << 8;
const UNSIGNED_FOUR_BYTE_BOUND: u32 = UNSIGNED_ONE_BYTE_BOUND << 24;

const SIGNED_ONE_BYTE_BOUND: i32 = 0x20;
const SIGNED_TWO_BYTE_BOUND: i32 = SIGNED_ONE_BYTE_BOUND << 8;
const SIGNED_FOUR_BYTE_BOUND: i32 = SIGNED_ONE_BYTE_BOUND << 24;

/// Widest magnitude accepted by [`U256Codec`].
const U256_MAX_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Single,
    Two,
    Four,
    Multi,
}

impl Mode {
    fn of(header: u8) -> Self {
        match header & MODE_MASK {
            0x00 => Mode::Single,
            TWO_BYTE_PREFIX => Mode::Two,
            FOUR_BYTE_PREFIX => Mode::Four,
            _ => Mode::Multi,
        }
    }
}

/// Raw mode payload before sign handling: 6, 14 or 30 value bits, or the
/// multi-byte magnitude.
enum Raw<'a> {
    Bits(u32, usize),
    Multi(&'a [u8]),
}

fn read_raw(input: &[u8]) -> CodecResult<Staged<'_, Raw<'_>>> {
    let Staged {
        value: header,
        rest,
    } = take_u8(input)?;
    let high = u32::from(header & VALUE_MASK);
    match Mode::of(header) {
        Mode::Single => Ok(Staged::new(Raw::Bits(high, 1), rest)),
        Mode::Two => {
            let tail = take_u8(rest)?;
            let bits = (high << 8) | u32::from(tail.value);
            Ok(Staged::new(Raw::Bits(bits, 2), tail.rest))
        }
        Mode::Four => {
            let tail = take(rest, 3)?;
            let bits = tail
                .value
                .iter()
                .fold(high, |acc, byte| (acc << 8) | u32::from(*byte));
            Ok(Staged::new(Raw::Bits(bits, 4), tail.rest))
        }
        Mode::Multi => {
            let len = usize::from(header & VALUE_MASK) + 4;
            if len > U256_MAX_BYTES {
                return Err(CodecError::malformed(
                    "compact integer magnitude exceeds 256 bits",
                ));
            }
            Ok(take(rest, len)?.map(Raw::Multi))
        }
    }
}

fn write_unsigned_u32(value: u32, out: &mut Vec<u8>) {
    if value < UNSIGNED_ONE_BYTE_BOUND {
        out.push(value as u8);
    } else if value < UNSIGNED_TWO_BYTE_BOUND {
        out.push((value >> 8) as u8 | TWO_BYTE_PREFIX);
        out.push(value as u8);
    } else if value < UNSIGNED_FOUR_BYTE_BOUND {
        out.push((value >> 24) as u8 | FOUR_BYTE_PREFIX);
        out.push((value >> 16) as u8);
        out.push((value >> 8) as u8);
        out.push(value as u8);
    } else {
        out.push(MULTI_BYTE_PREFIX);
        out.extend_from_slice(&value.to_be_bytes());
    }
}

/// Checks the narrow-mode bounds shared by the unsigned codecs.
fn canonical_unsigned_bits(bits: u32, encoded_len: usize) -> CodecResult<u32> {
    let floor = match encoded_len {
        1 => 0,
        2 => UNSIGNED_ONE_BYTE_BOUND,
        _ => UNSIGNED_TWO_BYTE_BOUND,
    };
    if bits < floor {
        Err(CodecError::non_canonical(encoded_len))
    } else {
        Ok(bits)
    }
}

/// Unsigned compact integer in the `u32` domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactUnsigned;

impl Codec for CompactUnsigned {
    type Value = u32;

    fn serialize_into(&self, value: &u32, out: &mut Vec<u8>) {
        write_unsigned_u32(*value, out);
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, u32>> {
        let Staged { value: raw, rest } = read_raw(input)?;
        let value = match raw {
            Raw::Bits(bits, encoded_len) => canonical_unsigned_bits(bits, encoded_len)?,
            Raw::Multi(bytes) => {
                if bytes.len() != 4 {
                    return Err(CodecError::malformed("compact u32 wider than 32 bits"));
                }
                let value = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                if value < UNSIGNED_FOUR_BYTE_BOUND {
                    return Err(CodecError::non_canonical(5));
                }
                value
            }
        };
        Ok(Staged::new(value, rest))
    }

    fn min_encoded_len(&self) -> usize {
        1
    }
}

/// Signed compact integer in the `i32` domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactSigned;

fn sign_extend(bits: u32, width: u32) -> i32 {
    let shift = 32 - width;
    ((bits << shift) as i32) >> shift
}

impl Codec for CompactSigned {
    type Value = i32;

    fn serialize_into(&self, value: &i32, out: &mut Vec<u8>) {
        let value = *value;
        if (-SIGNED_ONE_BYTE_BOUND..SIGNED_ONE_BYTE_BOUND).contains(&value) {
            out.push(value as u8 & VALUE_MASK);
        } else if (-SIGNED_TWO_BYTE_BOUND..SIGNED_TWO_BYTE_BOUND).contains(&value) {
            out.push((value >> 8) as u8 & VALUE_MASK | TWO_BYTE_PREFIX);
            out.push(value as u8);
        } else if (-SIGNED_FOUR_BYTE_BOUND..SIGNED_FOUR_BYTE_BOUND).contains(&value) {
            out.push((value >> 24) as u8 & VALUE_MASK | FOUR_BYTE_PREFIX);
            out.push((value >> 16) as u8);
            out.push((value >> 8) as u8);
            out.push(value as u8);
        } else {
            out.push(MULTI_BYTE_PREFIX);
            out.extend_from_slice(&value.to_be_bytes());
        }
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, i32>> {
        let Staged { value: raw, rest } = read_raw(input)?;
        let (value, narrower_bound, encoded_len) = match raw {
            Raw::Bits(bits, 1) => (sign_extend(bits, 6), 0, 1),
            Raw::Bits(bits, 2) => (sign_extend(bits, 14), SIGNED_ONE_BYTE_BOUND, 2),
            Raw::Bits(bits, encoded_len) => {
                (sign_extend(bits, 30), SIGNED_TWO_BYTE_BOUND, encoded_len)
            }
            Raw::Multi(bytes) => {
                if bytes.len() != 4 {
                    return Err(CodecError::malformed("compact i32 wider than 32 bits"));
                }
                let value = i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                (value, SIGNED_FOUR_BYTE_BOUND, 5)
            }
        };
        if (-narrower_bound..narrower_bound).contains(&value) {
            return Err(CodecError::non_canonical(encoded_len));
        }
        Ok(Staged::new(value, rest))
    }

    fn min_encoded_len(&self) -> usize {
        1
    }
}

/// Unsigned 256-bit integer, compact encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct U256Codec;

impl Codec for U256Codec {
    type Value = U256;

    fn serialize_into(&self, value: &U256, out: &mut Vec<u8>) {
        if *value < U256::from(UNSIGNED_FOUR_BYTE_BOUND) {
            write_unsigned_u32(value.low_u32(), out);
            return;
        }
        let mut be = [0u8; U256_MAX_BYTES];
        value.to_big_endian(&mut be);
        let start = be.iter().position(|byte| *byte != 0).unwrap_or(be.len());
        let magnitude = &be[start..];
        out.push(MULTI_BYTE_PREFIX | (magnitude.len() - 4) as u8);
        out.extend_from_slice(magnitude);
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, U256>> {
        let Staged { value: raw, rest } = read_raw(input)?;
        let value = match raw {
            Raw::Bits(bits, encoded_len) => {
                U256::from(canonical_unsigned_bits(bits, encoded_len)?)
            }
            Raw::Multi(bytes) => {
                let encoded_len = bytes.len() + 1;
                if bytes[0] == 0 {
                    return Err(CodecError::non_canonical(encoded_len));
                }
                let value = U256::from_big_endian(bytes);
                if value < U256::from(UNSIGNED_FOUR_BYTE_BOUND) {
                    return Err(CodecError::non_canonical(encoded_len));
                }
                value
            }
        };
        Ok(Staged::new(value, rest))
    }

    fn min_encoded_len(&self) -> usize {
        1
    }
}

/// Writes a non-negative length or element count as a [`CompactSigned`].
///
/// # Panics
///
/// Panics if `len` exceeds `i32::MAX`; such a count is not representable on
/// the wire.
pub fn write_length(len: usize, out: &mut Vec<u8>) {
    let len = match i32::try_from(len) {
        Ok(len) => len,
        Err(_) => panic!("length {len} is not representable as a compact i32"),
    };
    CompactSigned.serialize_into(&len, out);
}

/// Reads a length or element count written by [`write_length`].
pub fn read_length(input: &[u8]) -> CodecResult<Staged<'_, usize>> {
    let staged = CompactSigned.deserialize(input)?;
    match usize::try_from(staged.value) {
        Ok(len) => Ok(Staged::new(len, staged.rest)),
        Err(_) => Err(CodecError::malformed("negative length prefix")),
    }
}
