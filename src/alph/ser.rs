//! Wire codecs for Alephium transaction structures.
//!
//! Small records are [`Product`]s over tuples of primitive codecs. Asset
//! outputs and unsigned transactions implement [`Codec`] by hand so encoding
//! borrows their fields instead of cloning them. Every field codec is wrapped
//! in [`Within`] so decoding errors name the failing field.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

use super::types::{
    AssetOutput, AssetOutputRef, GasBox, GasPrice, Hash, LockupScript, PublicKey,
    TimeStamp, TxInput, TxScript, UnlockScript, UnsignedTransaction, HASH_LEN,
    PUBLIC_KEY_LEN,
};
use crate::config::CodecLimits;
use crate::ser::{
    BigEndian, ByteString, Codec, CodecError, CodecResult, CompactSigned, FixedBytes, OptionCodec,
    Product, Sequence, Staged, Tagged, TaggedUnion, U256Codec, Variant, Within, U8,
};

type Blake2b256 = Blake2b<U32>;

/// Codec for a 32-byte digest.
pub type HashCodec = Product<FixedBytes<HASH_LEN>, Hash>;

/// Codec for a 33-byte compressed public key.
pub type PublicKeyCodec = Product<FixedBytes<PUBLIC_KEY_LEN>, PublicKey>;

/// Codec for a millisecond timestamp, stored as a big-endian `u64`.
pub type TimeStampCodec = Product<BigEndian<u64>, TimeStamp>;

/// Codec for a gas price.
pub type GasPriceCodec = Product<U256Codec, GasPrice>;

/// Codec for an output reference: big-endian hint then key.
pub type AssetOutputRefCodec =
    Product<(Within<BigEndian<i32>>, Within<HashCodec>), AssetOutputRef>;

/// Codec for a transaction input: output reference then unlock script.
pub type TxInputCodec =
    Product<(Within<AssetOutputRefCodec>, Within<TaggedUnion<UnlockScript>>), TxInput>;

/// Codec for a `(token id, amount)` pair.
pub type TokenCodec = (HashCodec, U256Codec);

/// Raw 32 bytes, no length prefix.
pub fn hash_codec() -> HashCodec {
    Product::new(FixedBytes, Hash, |hash| hash.0)
}

/// Raw 33 bytes, no length prefix.
pub fn public_key_codec() -> PublicKeyCodec {
    Product::new(FixedBytes, PublicKey, |key| key.0)
}

/// Builds a [`TimeStampCodec`].
pub fn timestamp_codec() -> TimeStampCodec {
    Product::new(BigEndian::new(), TimeStamp, |ts| ts.0)
}

/// Gas price as a compact `U256`.
pub fn gas_price_codec() -> GasPriceCodec {
    Product::new(U256Codec, GasPrice, |price| price.0)
}

/// Builds an [`AssetOutputRefCodec`] with field provenance.
pub fn asset_output_ref_codec() -> AssetOutputRefCodec {
    Product::new(
        (
            BigEndian::new().within("AssetOutputRef", "hint"),
            hash_codec().within("AssetOutputRef", "key"),
        ),
        |(hint, key)| AssetOutputRef { hint, key },
        |output_ref| (output_ref.hint, output_ref.key),
    )
}

/// Token id followed by its compact amount.
pub fn token_codec() -> TokenCodec {
    (hash_codec(), U256Codec)
}

/// Gas amount as a compact signed integer. Negative amounts are malformed.
#[derive(Debug, Clone, Copy, Default)]
pub struct GasBoxCodec;

impl Codec for GasBoxCodec {
    type Value = GasBox;

    fn serialize_into(&self, value: &GasBox, out: &mut Vec<u8>) {
        // `GasBox` never exceeds `i32::MAX`.
        CompactSigned.serialize_into(&(value.get() as i32), out);
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, GasBox>> {
        let Staged { value, rest } = CompactSigned.deserialize(input)?;
        let gas = u32::try_from(value)
            .ok()
            .and_then(GasBox::new)
            .ok_or_else(|| CodecError::malformed("negative gas amount"))?;
        Ok(Staged::new(gas, rest))
    }

    fn min_encoded_len(&self) -> usize {
        1
    }
}

/// Placeholder for the transaction script slot. Nothing can be encoded, and
/// a present script fails to decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct TxScriptCodec;

impl Codec for TxScriptCodec {
    type Value = TxScript;

    fn serialize_into(&self, value: &TxScript, _out: &mut Vec<u8>) {
        match *value {}
    }

    fn deserialize<'a>(&self, _input: &'a [u8]) -> CodecResult<Staged<'a, TxScript>> {
        Err(CodecError::malformed("transaction scripts are not supported"))
    }
}

impl Tagged for UnlockScript {
    const DISCRIMINANTS: &'static [u8] = &[0x00, 0x03];

    fn discriminant(&self) -> u8 {
        match self {
            UnlockScript::P2pkh(_) => 0x00,
            UnlockScript::SameAsPrevious => 0x03,
        }
    }

    fn serialize_payload(&self, out: &mut Vec<u8>) {
        match self {
            UnlockScript::P2pkh(key) => public_key_codec().serialize_into(key, out),
            UnlockScript::SameAsPrevious => {}
        }
    }
}

impl Tagged for LockupScript {
    const DISCRIMINANTS: &'static [u8] = &[0x00, 0x01, 0x02];

    fn discriminant(&self) -> u8 {
        match self {
            LockupScript::P2pkh(_) => 0x00,
            LockupScript::P2mpkh { .. } => 0x01,
            LockupScript::P2sh(_) => 0x02,
        }
    }

    fn serialize_payload(&self, out: &mut Vec<u8>) {
        match self {
            LockupScript::P2pkh(hash) | LockupScript::P2sh(hash) => {
                hash_codec().serialize_into(hash, out)
            }
            LockupScript::P2mpkh { keys, m } => {
                // Limits only bound decoding, so the encoder can use any.
                multisig_keys_codec(&CodecLimits::default()).serialize_into(keys, out);
                multisig_threshold_codec().serialize_into(m, out);
            }
        }
    }
}

/// Keys of a multisig lockup, a bounded sequence of public key hashes.
fn multisig_keys_codec(limits: &CodecLimits) -> Within<Sequence<HashCodec>> {
    Sequence::new(hash_codec(), limits).within("P2mpkh", "keys")
}

fn multisig_threshold_codec() -> Within<CompactSigned> {
    CompactSigned.within("P2mpkh", "m")
}

/// Decode table for [`UnlockScript`]: `0x00` P2PKH and `0x03` same-as-previous.
pub fn unlock_script_codec() -> TaggedUnion<UnlockScript> {
    TaggedUnion::new([
        Variant::arm(0x00, public_key_codec(), UnlockScript::P2pkh),
        Variant::arm(0x03, crate::ser::Unit, |()| UnlockScript::SameAsPrevious),
    ])
}

/// Decode table for [`LockupScript`]. Multisig key lists are bounded by
/// `limits`.
pub fn lockup_script_codec(limits: &CodecLimits) -> TaggedUnion<LockupScript> {
    let multisig = (multisig_keys_codec(limits), multisig_threshold_codec());
    TaggedUnion::new([
        Variant::arm(0x00, hash_codec(), LockupScript::P2pkh),
        Variant::arm(0x01, multisig, |(keys, m)| LockupScript::P2mpkh { keys, m }),
        Variant::arm(0x02, hash_codec(), LockupScript::P2sh),
    ])
}

/// Builds a [`TxInputCodec`] with field provenance.
pub fn tx_input_codec() -> TxInputCodec {
    Product::new(
        (
            asset_output_ref_codec().within("TxInput", "output_ref"),
            unlock_script_codec().within("TxInput", "unlock_script"),
        ),
        |(output_ref, unlock_script)| TxInput {
            output_ref,
            unlock_script,
        },
        |input| (input.output_ref, input.unlock_script),
    )
}

/// Codec for [`AssetOutput`].
#[derive(Debug, Clone)]
pub struct AssetOutputCodec {
    amount: Within<U256Codec>,
    lockup_script: Within<TaggedUnion<LockupScript>>,
    lock_time: Within<TimeStampCodec>,
    tokens: Within<Sequence<TokenCodec>>,
    additional_data: Within<ByteString>,
}

impl AssetOutputCodec {
    /// Builds the codec; `limits` bound the token list, data blob and
    /// multisig keys.
    pub fn new(limits: &CodecLimits) -> Self {
        Self {
            amount: U256Codec.within("AssetOutput", "amount"),
            lockup_script: lockup_script_codec(limits).within("AssetOutput", "lockup_script"),
            lock_time: timestamp_codec().within("AssetOutput", "lock_time"),
            tokens: Sequence::new(token_codec(), limits).within("AssetOutput", "tokens"),
            additional_data: ByteString::new(limits).within("AssetOutput", "additional_data"),
        }
    }
}

impl Codec for AssetOutputCodec {
    type Value = AssetOutput;

    fn serialize_into(&self, value: &AssetOutput, out: &mut Vec<u8>) {
        self.amount.serialize_into(&value.amount, out);
        self.lockup_script.serialize_into(&value.lockup_script, out);
        self.lock_time.serialize_into(&value.lock_time, out);
        self.tokens.serialize_into(&value.tokens, out);
        self.additional_data
            .serialize_into(&value.additional_data, out);
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, AssetOutput>> {
        let amount = self.amount.deserialize(input)?;
        let lockup_script = self.lockup_script.deserialize(amount.rest)?;
        let lock_time = self.lock_time.deserialize(lockup_script.rest)?;
        let tokens = self.tokens.deserialize(lock_time.rest)?;
        let additional_data = self.additional_data.deserialize(tokens.rest)?;
        let output = AssetOutput {
            amount: amount.value,
            lockup_script: lockup_script.value,
            lock_time: lock_time.value,
            tokens: tokens.value,
            additional_data: additional_data.value,
        };
        Ok(Staged::new(output, additional_data.rest))
    }

    fn min_encoded_len(&self) -> usize {
        self.amount.min_encoded_len()
            + self.lockup_script.min_encoded_len()
            + self.lock_time.min_encoded_len()
            + self.tokens.min_encoded_len()
            + self.additional_data.min_encoded_len()
    }
}

/// Codec for [`UnsignedTransaction`].
#[derive(Debug, Clone)]
pub struct UnsignedTransactionCodec {
    version: Within<U8>,
    network_id: Within<U8>,
    script: Within<OptionCodec<TxScriptCodec>>,
    gas_amount: Within<GasBoxCodec>,
    gas_price: Within<GasPriceCodec>,
    inputs: Within<Sequence<TxInputCodec>>,
    fixed_outputs: Within<Sequence<AssetOutputCodec>>,
}

impl UnsignedTransactionCodec {
    /// Builds the codec; `limits` bound the input and output lists and every
    /// nested collection.
    pub fn new(limits: &CodecLimits) -> Self {
        const S: &str = "UnsignedTransaction";
        Self {
            version: U8.within(S, "version"),
            network_id: U8.within(S, "network_id"),
            script: OptionCodec::new(TxScriptCodec).within(S, "script"),
            gas_amount: GasBoxCodec.within(S, "gas_amount"),
            gas_price: gas_price_codec().within(S, "gas_price"),
            inputs: Sequence::new(tx_input_codec(), limits).within(S, "inputs"),
            fixed_outputs: Sequence::new(AssetOutputCodec::new(limits), limits)
                .within(S, "fixed_outputs"),
        }
    }
}

impl Codec for UnsignedTransactionCodec {
    type Value = UnsignedTransaction;

    fn serialize_into(&self, value: &UnsignedTransaction, out: &mut Vec<u8>) {
        self.version.serialize_into(&value.version, out);
        self.network_id.serialize_into(&value.network_id, out);
        self.script.serialize_into(&value.script, out);
        self.gas_amount.serialize_into(&value.gas_amount, out);
        self.gas_price.serialize_into(&value.gas_price, out);
        self.inputs.serialize_into(&value.inputs, out);
        self.fixed_outputs.serialize_into(&value.fixed_outputs, out);
    }

    fn deserialize<'a>(&self, input: &'a [u8]) -> CodecResult<Staged<'a, UnsignedTransaction>> {
        let version = self.version.deserialize(input)?;
        let network_id = self.network_id.deserialize(version.rest)?;
        let script = self.script.deserialize(network_id.rest)?;
        let gas_amount = self.gas_amount.deserialize(script.rest)?;
        let gas_price = self.gas_price.deserialize(gas_amount.rest)?;
        let inputs = self.inputs.deserialize(gas_price.rest)?;
        let fixed_outputs = self.fixed_outputs.deserialize(inputs.rest)?;
        let tx = UnsignedTransaction {
            version: version.value,
            network_id: network_id.value,
            script: script.value,
            gas_amount: gas_amount.value,
            gas_price: gas_price.value,
            inputs: inputs.value,
            fixed_outputs: fixed_outputs.value,
        };
        Ok(Staged::new(tx, fixed_outputs.rest))
    }

    fn min_encoded_len(&self) -> usize {
        self.version.min_encoded_len()
            + self.network_id.min_encoded_len()
            + self.script.min_encoded_len()
            + self.gas_amount.min_encoded_len()
            + self.gas_price.min_encoded_len()
            + self.inputs.min_encoded_len()
            + self.fixed_outputs.min_encoded_len()
    }
}

/// Every Alephium codec built against one set of limits.
#[derive(Debug, Clone)]
pub struct AlphCodecs {
    /// Bounds the bundle was built with.
    pub limits: CodecLimits,
    /// 32-byte digests.
    pub hash: HashCodec,
    /// `(token id, amount)` pairs.
    pub token: TokenCodec,
    /// Output references.
    pub asset_output_ref: AssetOutputRefCodec,
    /// Unlock scripts.
    pub unlock_script: TaggedUnion<UnlockScript>,
    /// Lockup scripts.
    pub lockup_script: TaggedUnion<LockupScript>,
    /// Transaction inputs.
    pub tx_input: TxInputCodec,
    /// Asset outputs.
    pub asset_output: AssetOutputCodec,
    /// Unsigned transactions.
    pub unsigned_transaction: UnsignedTransactionCodec,
}

impl AlphCodecs {
    /// Builds every codec under the same `limits`.
    pub fn new(limits: &CodecLimits) -> Self {
        Self {
            limits: *limits,
            hash: hash_codec(),
            token: token_codec(),
            asset_output_ref: asset_output_ref_codec(),
            unlock_script: unlock_script_codec(),
            lockup_script: lockup_script_codec(limits),
            tx_input: tx_input_codec(),
            asset_output: AssetOutputCodec::new(limits),
            unsigned_transaction: UnsignedTransactionCodec::new(limits),
        }
    }

    /// Blake2b-256 of the serialized transaction.
    pub fn transaction_id(&self, tx: &UnsignedTransaction) -> Hash {
        let bytes = self.unsigned_transaction.serialize(tx);
        blake2b_256(&bytes)
    }
}

/// Blake2b with a 32-byte output.
pub fn blake2b_256(data: &[u8]) -> Hash {
    Hash(Blake2b256::digest(data).into())
}
