
use _fixtures::{
    hash, hex, init_tracing, p2pkh_output, public_key, EMPTY_TRANSFER, TOKEN_TRANSFER,
};
use chain_codec::alph::{
    self, blake2b_256, default_codecs, AlphCodecs, AssetOutput, AssetOutputRef, GasBox, GasPrice,
    Hash, LockupScript, PublicKey, TimeStamp, TxInput, UnlockScript, UnsignedTransaction,
    MINIMAL_GAS, NETWORK_ID_TESTNET,
};
use chain_codec::config::{CodecLimits, PROFILE_STRICT_LIMITS};
use chain_codec::ser::{Codec, ErrorKind, Location, U256};
use insta::assert_snapshot;
use proptest::collection::vec;
use proptest::prelude::*;

#[test]
fn empty_transfer_wire_vector() {
    let bytes = alph::serialize_unsigned_transaction(&EMPTY_TRANSFER);
    assert_snapshot!(hex(&bytes), @"00 00 00 80 00 4e 20 c1 17 48 76 e8 00 00 00");
    assert_eq!(alph::decode_unsigned_transaction(&bytes).unwrap(), *EMPTY_TRANSFER);
}

#[test]
fn asset_output_layout() {
    let mut output = p2pkh_output(1_000_000_000_000_000_000, 0x11);
    output.lock_time = TimeStamp(0x0102_0304_0506_0708);
    output.tokens = vec![(hash(0xaa), U256::from(5u8))];
    output.additional_data = vec![0xca, 0xfe];

    let mut expected = vec![0xc4, 0x0d, 0xe0, 0xb6, 0xb3, 0xa7, 0x64, 0x00, 0x00];
    expected.push(0x00);
    expected.extend_from_slice(&[0x11; 32]);
    expected.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
    expected.push(0x01);
    expected.extend_from_slice(&[0xaa; 32]);
    expected.push(0x05);
    expected.extend_from_slice(&[0x02, 0xca, 0xfe]);

    let codec = &default_codecs().asset_output;
    assert_eq!(codec.serialize(&output), expected);
    assert_eq!(codec.deserialize_exact(&expected).unwrap(), output);
}

#[test]
fn multisig_lockup_layout() {
    let script = LockupScript::P2mpkh {
        keys: vec![hash(0x01), hash(0x02)],
        m: 2,
    };
    let bytes = default_codecs().lockup_script.serialize(&script);
    assert_eq!(bytes.len(), 1 + 1 + 64 + 1);
    assert_eq!(&bytes[..2], &[0x01, 0x02]);
    assert_eq!(bytes[66], 0x02);
    assert_eq!(
        default_codecs().lockup_script.deserialize_exact(&bytes).unwrap(),
        script
    );
}

#[test]
fn same_as_previous_input_layout() {
    let input = TxInput {
        output_ref: AssetOutputRef {
            hint: -2,
            key: hash(0x33),
        },
        unlock_script: UnlockScript::SameAsPrevious,
    };
    let bytes = default_codecs().tx_input.serialize(&input);
    assert_eq!(bytes.len(), 37);
    assert_eq!(&bytes[..4], &[0xff, 0xff, 0xff, 0xfe]);
    assert_eq!(bytes[36], 0x03);

    let p2pkh = TxInput {
        unlock_script: UnlockScript::P2pkh(public_key(0x44)),
        ..input
    };
    let bytes = default_codecs().tx_input.serialize(&p2pkh);
    assert_eq!(bytes.len(), 4 + 32 + 1 + 33);
    assert_eq!(bytes[36], 0x00);
    assert_eq!(bytes[37], 0x02);
}

#[test]
fn plain_output_roundtrip() {
    let output = AssetOutput {
        amount: U256::from(1_000_000u32),
        lockup_script: LockupScript::P2sh(hash(0x5c)),
        lock_time: TimeStamp(1_650_000_000_000),
        tokens: Vec::new(),
        additional_data: Vec::new(),
    };
    let codec = &default_codecs().asset_output;
    let bytes = codec.serialize(&output);
    assert_eq!(&bytes[..4], &[0x80, 0x0f, 0x42, 0x40]);
    let staged = codec.deserialize(&bytes).unwrap();
    assert_eq!(staged.value, output);
    assert!(staged.rest.is_empty());
}

#[test]
fn p2pkh_input_roundtrip() {
    let input = TxInput {
        output_ref: AssetOutputRef {
            hint: 0x0102_0304,
            key: hash(0x66),
        },
        unlock_script: UnlockScript::P2pkh(public_key(0x77)),
    };
    let codec = &default_codecs().tx_input;
    let bytes = codec.serialize(&input);
    // Unlock script starts after the 4-byte hint and 32-byte key.
    assert_eq!(bytes[36], 0x00);
    assert_eq!(&bytes[37..], &public_key(0x77).0[..]);
    assert_eq!(codec.deserialize_exact(&bytes).unwrap(), input);
}

#[test]
fn two_inputs_three_outputs_roundtrip() {
    let mut tx = (*TOKEN_TRANSFER).clone();
    tx.fixed_outputs.push(p2pkh_output(42, 0x99));
    let bytes = alph::serialize_unsigned_transaction(&tx);
    let decoded = alph::decode_unsigned_transaction(&bytes).unwrap();
    assert_eq!(decoded.inputs.len(), 2);
    assert_eq!(decoded.fixed_outputs.len(), 3);
    assert_eq!(decoded, tx);

    let err = alph::decode_unsigned_transaction(&bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InsufficientBytes { .. }));
    assert_eq!(
        err.trail().first(),
        Some(&Location::Field {
            structure: "UnsignedTransaction",
            field: "fixed_outputs"
        })
    );
}

#[test]
fn token_transfer_roundtrip() {
    let bytes = alph::serialize_unsigned_transaction(&TOKEN_TRANSFER);
    let decoded = alph::decode_unsigned_transaction(&bytes).unwrap();
    assert_eq!(decoded, *TOKEN_TRANSFER);
    assert_eq!(alph::serialize_unsigned_transaction(&decoded), bytes);
}

#[test]
fn every_prefix_is_a_truncation() {
    init_tracing();
    let bytes = alph::serialize_unsigned_transaction(&TOKEN_TRANSFER);
    for cut in 0..bytes.len() {
        let err = alph::deserialize_unsigned_transaction(&bytes[..cut]).unwrap_err();
        assert!(err.is_truncation(), "prefix {cut}: {err}");
    }
}

#[test]
fn trailing_bytes_are_kept_or_rejected() {
    let mut bytes = alph::serialize_unsigned_transaction(&TOKEN_TRANSFER);
    let encoded_len = bytes.len();
    bytes.extend_from_slice(&[0xab, 0xcd]);

    let staged = alph::deserialize_unsigned_transaction(&bytes).unwrap();
    assert_eq!(staged.value, *TOKEN_TRANSFER);
    assert_eq!(staged.rest, &[0xab, 0xcd]);

    let err = alph::decode_unsigned_transaction(&bytes).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::TrailingBytes {
            consumed: encoded_len,
            remaining: 2
        }
    );
}

#[test]
fn wide_gas_encoding_is_non_canonical() {
    let bytes = [0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x05, 0x05, 0x00, 0x00];
    let err = alph::decode_unsigned_transaction(&bytes).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::NonCanonicalInteger { encoded_len: 4 });
    assert_eq!(
        err.trail(),
        &[Location::Field {
            structure: "UnsignedTransaction",
            field: "gas_amount"
        }]
    );
}

#[test]
fn largest_gas_amount_roundtrips() {
    let mut tx = (*EMPTY_TRANSFER).clone();
    tx.gas_amount = GasBox::MAX;
    let bytes = alph::serialize_unsigned_transaction(&tx);
    assert_eq!(&bytes[3..8], &[0xc0, 0x7f, 0xff, 0xff, 0xff]);
    assert_eq!(alph::decode_unsigned_transaction(&bytes).unwrap(), tx);
}

#[test]
fn gas_amounts_beyond_the_wire_range_are_unrepresentable() {
    assert_eq!(GasBox::new(0x8000_0000), None);
    assert_eq!(GasBox::new(0x7fff_ffff), Some(GasBox::MAX));
    assert!(serde_json::from_str::<GasBox>("2147483648").is_err());
    assert_eq!(serde_json::from_str::<GasBox>("20000").unwrap(), MINIMAL_GAS);
}

#[test]
fn present_script_is_malformed() {
    let mut bytes = alph::serialize_unsigned_transaction(&EMPTY_TRANSFER);
    bytes[2] = 0x01;
    let err = alph::decode_unsigned_transaction(&bytes).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MalformedPayload { .. }));
    assert_eq!(
        err.to_string(),
        "malformed payload: transaction scripts are not supported at UnsignedTransaction.script"
    );
}

#[test]
fn unknown_unlock_discriminant_names_its_path() {
    let mut tx = (*EMPTY_TRANSFER).clone();
    tx.inputs.push(TxInput {
        output_ref: AssetOutputRef {
            hint: 1,
            key: hash(0x09),
        },
        unlock_script: UnlockScript::SameAsPrevious,
    });
    let mut bytes = alph::serialize_unsigned_transaction(&tx);
    let unlock_at = bytes.len() - 2;
    assert_eq!(bytes[unlock_at], 0x03);
    bytes[unlock_at] = 0x01;

    let err = alph::decode_unsigned_transaction(&bytes).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UnknownDiscriminant { value: 0x01 });
    assert_eq!(
        err.trail(),
        &[
            Location::Field {
                structure: "UnsignedTransaction",
                field: "inputs"
            },
            Location::Element { index: 0 },
            Location::Field {
                structure: "TxInput",
                field: "unlock_script"
            },
        ]
    );
}

#[test]
fn strict_limits_reject_long_input_lists() {
    init_tracing();
    let codecs = AlphCodecs::new(&CodecLimits {
        max_sequence_len: 1,
        ..PROFILE_STRICT_LIMITS
    });
    let bytes = codecs.unsigned_transaction.serialize(&TOKEN_TRANSFER);
    let err = codecs.unsigned_transaction.deserialize(&bytes).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::ElementCountExceeded {
            declared: 2,
            limit: 1
        }
    );
    assert_eq!(
        err.trail(),
        &[Location::Field {
            structure: "UnsignedTransaction",
            field: "inputs"
        }]
    );
}

#[test]
fn transaction_id_hashes_serialized_bytes() {
    let bytes = alph::serialize_unsigned_transaction(&TOKEN_TRANSFER);
    assert_eq!(TOKEN_TRANSFER.id(), blake2b_256(&bytes));
    assert_ne!(TOKEN_TRANSFER.id(), EMPTY_TRANSFER.id());
    assert_eq!(TOKEN_TRANSFER.id().to_string().len(), 64);
}

#[test]
fn models_roundtrip_through_json() {
    let json = serde_json::to_string(&*TOKEN_TRANSFER).unwrap();
    let restored: UnsignedTransaction = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, *TOKEN_TRANSFER);

    let key = serde_json::to_value(hash(0xab)).unwrap();
    assert_eq!(key, serde_json::Value::String("ab".repeat(32)));
}

fn arb_hash() -> impl Strategy<Value = Hash> {
    any::<[u8; 32]>().prop_map(Hash)
}

fn arb_u256() -> impl Strategy<Value = U256> {
    prop_oneof![
        any::<u32>().prop_map(U256::from),
        any::<[u8; 32]>().prop_map(|raw| U256::from_big_endian(&raw)),
    ]
}

fn arb_public_key() -> impl Strategy<Value = PublicKey> {
    (any::<u8>(), any::<[u8; 32]>()).prop_map(|(prefix, body)| {
        let mut key = [prefix; 33];
        key[1..].copy_from_slice(&body);
        PublicKey(key)
    })
}

fn arb_lockup_script() -> impl Strategy<Value = LockupScript> {
    prop_oneof![
        arb_hash().prop_map(LockupScript::P2pkh),
        (vec(arb_hash(), 0..4), any::<i32>()).prop_map(|(keys, m)| LockupScript::P2mpkh { keys, m }),
        arb_hash().prop_map(LockupScript::P2sh),
    ]
}

fn arb_input() -> impl Strategy<Value = TxInput> {
    let unlock = prop_oneof![
        arb_public_key().prop_map(UnlockScript::P2pkh),
        Just(UnlockScript::SameAsPrevious),
    ];
    (any::<i32>(), arb_hash(), unlock).prop_map(|(hint, key, unlock_script)| TxInput {
        output_ref: AssetOutputRef { hint, key },
        unlock_script,
    })
}

fn arb_output() -> impl Strategy<Value = AssetOutput> {
    (
        arb_u256(),
        arb_lockup_script(),
        any::<u64>(),
        vec((arb_hash(), arb_u256()), 0..3),
        vec(any::<u8>(), 0..80),
    )
        .prop_map(
            |(amount, lockup_script, lock_time, tokens, additional_data)| AssetOutput {
                amount,
                lockup_script,
                lock_time: TimeStamp(lock_time),
                tokens,
                additional_data,
            },
        )
}

prop_compose! {
    fn arb_transaction()(
        network_id in any::<u8>(),
        gas in 0..=i32::MAX as u32,
        gas_price in arb_u256(),
        inputs in vec(arb_input(), 0..4),
        fixed_outputs in vec(arb_output(), 0..4),
    ) -> UnsignedTransaction {
        UnsignedTransaction::transfer(
            network_id,
            GasBox::new(gas).unwrap(),
            GasPrice(gas_price),
            inputs,
            fixed_outputs,
        )
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn transactions_roundtrip_with_leftover(
        tx in arb_transaction(),
        tail in vec(any::<u8>(), 0..16),
    ) {
        let mut bytes = alph::serialize_unsigned_transaction(&tx);
        let encoded_len = bytes.len();
        bytes.extend_from_slice(&tail);
        let staged = alph::deserialize_unsigned_transaction(&bytes).unwrap();
        prop_assert_eq!(&staged.value, &tx);
        prop_assert_eq!(staged.rest, &bytes[encoded_len..]);
    }

    #[test]
    fn transaction_prefixes_fail_as_truncation(tx in arb_transaction()) {
        let bytes = alph::serialize_unsigned_transaction(&tx);
        for cut in 0..bytes.len() {
            let err = alph::deserialize_unsigned_transaction(&bytes[..cut]).unwrap_err();
            prop_assert!(err.is_truncation(), "prefix {}: {}", cut, err);
        }
    }

    #[test]
    fn testnet_id_survives_roundtrip(tx in arb_transaction()) {
        let tx = UnsignedTransaction { network_id: NETWORK_ID_TESTNET, ..tx };
        let bytes = alph::serialize_unsigned_transaction(&tx);
        prop_assert_eq!(bytes[1], NETWORK_ID_TESTNET);
        prop_assert_eq!(alph::decode_unsigned_transaction(&bytes).unwrap(), tx);
    }
}
