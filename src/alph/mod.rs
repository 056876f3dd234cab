//! Alephium transaction structures and their wire codecs.
//!
//! The free functions in this module use a bundle of codecs built once
//! against [`CodecLimits::default`]. Callers that need other bounds build
//! their own [`AlphCodecs`].

pub mod select;
mod ser;
mod types;

use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::config::CodecLimits;
use crate::ser::{Codec, CodecResult, Staged};

pub use ser::{
    asset_output_ref_codec, blake2b_256, gas_price_codec, hash_codec, lockup_script_codec,
    public_key_codec, timestamp_codec, token_codec, tx_input_codec, unlock_script_codec,
    AlphCodecs, AssetOutputCodec, AssetOutputRefCodec, GasBoxCodec, GasPriceCodec, HashCodec,
    PublicKeyCodec, TimeStampCodec, TokenCodec, TxInputCodec, TxScriptCodec,
    UnsignedTransactionCodec,
};
pub use types::*;

static DEFAULT_CODECS: Lazy<AlphCodecs> = Lazy::new(|| AlphCodecs::new(&CodecLimits::default()));

/// Codec bundle built with the standard limits.
pub fn default_codecs() -> &'static AlphCodecs {
    &DEFAULT_CODECS
}

/// Encodes `tx` with the default codec bundle.
pub fn serialize_unsigned_transaction(tx: &UnsignedTransaction) -> Vec<u8> {
    let bytes = DEFAULT_CODECS.unsigned_transaction.serialize(tx);
    trace!(
        len = bytes.len(),
        inputs = tx.inputs.len(),
        outputs = tx.fixed_outputs.len(),
        "serialized unsigned transaction"
    );
    bytes
}

/// Decodes a transaction from the front of `input`, leaving any trailing
/// bytes in the returned remainder.
pub fn deserialize_unsigned_transaction(
    input: &[u8],
) -> CodecResult<Staged<'_, UnsignedTransaction>> {
    match DEFAULT_CODECS.unsigned_transaction.deserialize(input) {
        Ok(staged) => {
            trace!(
                consumed = staged.consumed(input),
                remaining = staged.rest.len(),
                "deserialized unsigned transaction"
            );
            Ok(staged)
        }
        Err(err) => {
            debug!(len = input.len(), %err, "unsigned transaction rejected");
            Err(err)
        }
    }
}

/// Decodes a standalone transaction message; trailing bytes are an error.
pub fn decode_unsigned_transaction(input: &[u8]) -> CodecResult<UnsignedTransaction> {
    DEFAULT_CODECS
        .unsigned_transaction
        .deserialize_exact(input)
        .map_err(|err| {
            debug!(len = input.len(), %err, "unsigned transaction rejected");
            err
        })
}

impl UnsignedTransaction {
    /// Transaction id: Blake2b-256 of the serialized transaction.
    pub fn id(&self) -> Hash {
        DEFAULT_CODECS.transaction_id(self)
    }
}
