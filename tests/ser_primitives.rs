
use _fixtures::hex;
use chain_codec::config::CodecLimits;
use chain_codec::ser::{
    BigEndian, Bool, ByteString, Codec, CompactSigned, CompactUnsigned, ErrorKind, FixedBytes,
    LittleEndian, U256Codec, U256, U8,
};
use insta::assert_snapshot;
use proptest::prelude::*;

#[test]
fn roundtrip_fixed_width_integers() {
    let mut buffer = Vec::new();
    BigEndian::<u16>::new().serialize_into(&0x1234, &mut buffer);
    BigEndian::<u32>::new().serialize_into(&0xdead_beef, &mut buffer);
    LittleEndian::<u64>::new().serialize_into(&7, &mut buffer);

    let first = BigEndian::<u16>::new().deserialize(&buffer).unwrap();
    assert_eq!(first.value, 0x1234);
    let second = BigEndian::<u32>::new().deserialize(first.rest).unwrap();
    assert_eq!(second.value, 0xdead_beef);
    let third = LittleEndian::<u64>::new().deserialize(second.rest).unwrap();
    assert_eq!(third.value, 7);
    assert!(third.rest.is_empty());
}

#[test]
fn bool_roundtrip_and_invalid() {
    assert!(Bool.deserialize(&[0x01]).unwrap().value);
    assert!(!Bool.deserialize(&[0x00]).unwrap().value);

    let err = Bool.deserialize(&[0x02]).expect_err("invalid flag");
    assert!(matches!(err.kind(), ErrorKind::InvalidBoolByte { value: 2 }));
    assert!(!err.is_truncation());
}

#[test]
fn single_byte_leaves_rest_untouched() {
    let input = [0xaa, 0xbb, 0xcc];
    let staged = U8.deserialize(&input).unwrap();
    assert_eq!(staged.value, 0xaa);
    assert_eq!(staged.rest, &input[1..]);
    assert_eq!(staged.consumed(&input), 1);
}

#[test]
fn length_prefixed_bytes_roundtrip() {
    let payload = vec![1u8, 2, 3, 4, 5];
    let codec = ByteString::default();
    let bytes = codec.serialize(&payload);
    assert_eq!(bytes[0], 0x05);
    let staged = codec.deserialize(&bytes).unwrap();
    assert_eq!(staged.value, payload);
    assert!(staged.rest.is_empty());
}

#[test]
fn byte_string_short_buffer() {
    let err = ByteString::default()
        .deserialize(&[0x05, 1, 2, 3])
        .expect_err("short buffer");
    assert!(matches!(err.kind(), ErrorKind::InsufficientBytes { .. }));
    assert!(err.is_truncation());
}

#[test]
fn empty_input_is_truncation_for_every_primitive() {
    assert!(Bool.deserialize(&[]).unwrap_err().is_truncation());
    assert!(U8.deserialize(&[]).unwrap_err().is_truncation());
    assert!(BigEndian::<i32>::new().deserialize(&[]).unwrap_err().is_truncation());
    assert!(FixedBytes::<32>.deserialize(&[0; 31]).unwrap_err().is_truncation());
    assert!(CompactUnsigned.deserialize(&[]).unwrap_err().is_truncation());
    assert!(CompactSigned.deserialize(&[0x80, 0x00]).unwrap_err().is_truncation());
    assert!(U256Codec.deserialize(&[0xc1, 0x01]).unwrap_err().is_truncation());
}

#[test]
fn snapshot_compact_encodings() {
    let mut lines = Vec::new();
    for value in [0u32, 0x3f, 0x40, 0x3fff, 0x4000, 0x3fff_ffff, 0x4000_0000] {
        lines.push(format!("u {value:#x}: {}", hex(&CompactUnsigned.serialize(&value))));
    }
    for value in [-1i32, -0x20, 0x20, -0x21, i32::MAX] {
        lines.push(format!("i {value}: {}", hex(&CompactSigned.serialize(&value))));
    }
    lines.push(format!(
        "U256 2^40: {}",
        hex(&U256Codec.serialize(&U256::from(1u64 << 40)))
    ));
    assert_snapshot!(lines.join("\n"), @r###"
    u 0x0: 00
    u 0x3f: 3f
    u 0x40: 40 40
    u 0x3fff: 7f ff
    u 0x4000: 80 00 40 00
    u 0x3fffffff: bf ff ff ff
    u 0x40000000: c0 40 00 00 00
    i -1: 3f
    i -32: 20
    i 32: 40 20
    i -33: 7f df
    i 2147483647: c0 7f ff ff ff
    U256 2^40: c2 01 00 00 00 00 00
    "###);
}

#[test]
fn wider_modes_are_rejected() {
    let cases: [(&[u8], usize); 3] = [
        (&[0x40, 0x05], 2),
        (&[0x80, 0x00, 0x00, 0x05], 4),
        (&[0xc0, 0x00, 0x00, 0x00, 0x05], 5),
    ];
    for (bytes, encoded_len) in cases {
        let err = CompactUnsigned.deserialize(bytes).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NonCanonicalInteger { encoded_len });
        let err = U256Codec.deserialize(bytes).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NonCanonicalInteger { encoded_len });
    }

    let err = CompactSigned.deserialize(&[0x7f, 0xff]).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::NonCanonicalInteger { encoded_len: 2 });
}

#[test]
fn blob_bound_follows_limits() {
    let limits = CodecLimits {
        max_blob_len: 4,
        ..CodecLimits::default()
    };
    let codec = ByteString::new(&limits);
    assert!(codec.deserialize(&[0x04, 1, 2, 3, 4]).is_ok());
    let err = codec.deserialize(&[0x05, 1, 2, 3, 4, 5]).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::ElementCountExceeded {
            declared: 5,
            limit: 4
        }
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn compact_signed_roundtrip(value in any::<i32>(), tail in proptest::collection::vec(any::<u8>(), 0..8)) {
        let mut bytes = CompactSigned.serialize(&value);
        let encoded_len = bytes.len();
        bytes.extend_from_slice(&tail);
        let staged = CompactSigned.deserialize(&bytes).unwrap();
        prop_assert_eq!(staged.value, value);
        prop_assert_eq!(staged.rest, &bytes[encoded_len..]);
    }

    #[test]
    fn compact_unsigned_roundtrip(value in any::<u32>()) {
        let bytes = CompactUnsigned.serialize(&value);
        prop_assert_eq!(CompactUnsigned.deserialize_exact(&bytes).unwrap(), value);
    }

    #[test]
    fn u256_roundtrip(raw in any::<[u8; 32]>()) {
        let value = U256::from_big_endian(&raw);
        let bytes = U256Codec.serialize(&value);
        prop_assert!(bytes.len() <= 33);
        prop_assert_eq!(U256Codec.deserialize_exact(&bytes).unwrap(), value);
    }

    #[test]
    fn u256_truncated_prefixes_fail(raw in any::<[u8; 32]>()) {
        let bytes = U256Codec.serialize(&U256::from_big_endian(&raw));
        for cut in 0..bytes.len() {
            prop_assert!(U256Codec.deserialize(&bytes[..cut]).unwrap_err().is_truncation());
        }
    }
}
