use core::fmt;

use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Width of a Blake2b-256 digest.
pub const HASH_LEN: usize = 32;

/// Width of a compressed secp256k1 public key.
pub const PUBLIC_KEY_LEN: usize = 33;

/// Network identifier of the main network.
pub const NETWORK_ID_MAINNET: u8 = 0;

/// Network identifier of the public test network.
pub const NETWORK_ID_TESTNET: u8 = 1;

/// Network identifier used by local development nodes.
pub const NETWORK_ID_DEVNET: u8 = 4;

/// Transaction layout version written by this crate.
pub const DEFAULT_TX_VERSION: u8 = 0;

/// Gas granted to a simple transfer.
pub const MINIMAL_GAS: GasBox = GasBox(20_000);

/// 1 ALPH expressed in atto-ALPH.
pub const ONE_ALPH: u128 = 1_000_000_000_000_000_000;

/// Smallest gas price accepted by full nodes, in atto-ALPH (100 nanoALPH).
pub const DEFAULT_GAS_PRICE: u128 = 100_000_000_000;

/// Smallest change output worth creating, in atto-ALPH (0.001 ALPH).
pub const DUST_AMOUNT: u128 = 1_000_000_000_000_000;

mod hex_array {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(text).map_err(D::Error::custom)?;
        let len = bytes.len();
        bytes
            .try_into()
            .map_err(|_| D::Error::custom(format!("expected {} bytes, got {}", N, len)))
    }
}

mod hex_vec {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        hex::decode(text).map_err(D::Error::custom)
    }
}

/// Blake2b-256 digest, used for output keys, token ids, script hashes and
/// transaction ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash(#[serde(with = "hex_array")] pub [u8; HASH_LEN]);

/// Identifier of a fungible token.
pub type TokenId = Hash;

impl Hash {
    /// All-zero digest.
    pub const fn zero() -> Self {
        Self([0u8; HASH_LEN])
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Compressed secp256k1 public key. The bytes are carried opaquely.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(#[serde(with = "hex_array")] pub [u8; PUBLIC_KEY_LEN]);

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeStamp(pub u64);

impl TimeStamp {
    /// The epoch, used for outputs without a lock.
    pub const fn zero() -> Self {
        Self(0)
    }
}

/// Amount of gas reserved by a transaction.
///
/// The wire carries gas as a signed 32-bit integer, so the amount is kept in
/// `0..=i32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct GasBox(u32);

impl GasBox {
    /// Largest amount the wire format can carry.
    pub const MAX: GasBox = GasBox(i32::MAX as u32);

    /// Returns `None` for amounts above [`GasBox::MAX`].
    pub const fn new(units: u32) -> Option<Self> {
        if units > i32::MAX as u32 {
            None
        } else {
            Some(GasBox(units))
        }
    }

    /// Gas units.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for GasBox {
    type Error = GasOutOfRange;

    fn try_from(units: u32) -> Result<Self, Self::Error> {
        GasBox::new(units).ok_or(GasOutOfRange(units))
    }
}

impl From<GasBox> for u32 {
    fn from(gas: GasBox) -> u32 {
        gas.0
    }
}

/// Gas amount that does not fit the signed 32-bit wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasOutOfRange(pub u32);

impl fmt::Display for GasOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gas amount {} exceeds {}", self.0, i32::MAX)
    }
}

impl std::error::Error for GasOutOfRange {}

/// Price paid per unit of gas, in atto-ALPH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GasPrice(pub U256);

impl GasPrice {
    /// Fee charged for `gas` at this price, saturating at `U256::MAX`.
    pub fn fee(&self, gas: GasBox) -> U256 {
        self.0.saturating_mul(U256::from(gas.get()))
    }
}

impl Default for GasPrice {
    fn default() -> Self {
        GasPrice(U256::from(DEFAULT_GAS_PRICE))
    }
}

/// Reference to an unspent asset output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetOutputRef {
    /// Short script hint identifying the owning group.
    pub hint: i32,
    /// Output key.
    pub key: Hash,
}

/// Spending condition attached to an asset output.
///
/// | Discriminant | Variant |
/// |--------------|---------|
/// | `0x00` | `P2pkh(public key hash)` |
/// | `0x01` | `P2mpkh { keys, m }` |
/// | `0x02` | `P2sh(script hash)` |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockupScript {
    /// Pay to public key hash.
    P2pkh(Hash),
    /// Pay to `m` of the listed public key hashes.
    P2mpkh {
        /// Candidate public key hashes.
        keys: Vec<Hash>,
        /// Number of signatures required.
        m: i32,
    },
    /// Pay to script hash.
    P2sh(Hash),
}

/// Data proving the right to spend an input.
///
/// | Discriminant | Variant |
/// |--------------|---------|
/// | `0x00` | `P2pkh(public key)` |
/// | `0x03` | `SameAsPrevious` |
///
/// `0x01` and `0x02` are reserved for multisig and script unlocks, which
/// this crate does not construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnlockScript {
    /// Reveals the public key whose hash locks the spent output.
    P2pkh(PublicKey),
    /// Reuses the unlock data of the preceding input.
    SameAsPrevious,
}

/// Transaction script slot. No scripts are built, so the type has no values
/// and the slot always encodes as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxScript {}

/// Input of an unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// Spent output.
    pub output_ref: AssetOutputRef,
    /// Unlock data for the spent output.
    pub unlock_script: UnlockScript,
}

/// Asset output created by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetOutput {
    /// ALPH amount in atto-ALPH.
    pub amount: U256,
    /// Spending condition.
    pub lockup_script: LockupScript,
    /// Earliest time the output can be spent.
    pub lock_time: TimeStamp,
    /// Token balances carried by the output, in wire order.
    pub tokens: Vec<(TokenId, U256)>,
    /// Arbitrary payload attached to the output.
    #[serde(with = "hex_vec")]
    pub additional_data: Vec<u8>,
}

/// Transaction body that gets signed and broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Layout version.
    pub version: u8,
    /// Network the transaction is valid on.
    pub network_id: u8,
    /// Optional transaction script.
    pub script: Option<TxScript>,
    /// Gas reserved for execution.
    pub gas_amount: GasBox,
    /// Price per gas unit.
    pub gas_price: GasPrice,
    /// Spent outputs.
    pub inputs: Vec<TxInput>,
    /// Outputs created by the transaction.
    pub fixed_outputs: Vec<AssetOutput>,
}

impl UnsignedTransaction {
    /// Builds a script-less transfer with the default version.
    pub fn transfer(
        network_id: u8,
        gas_amount: GasBox,
        gas_price: GasPrice,
        inputs: Vec<TxInput>,
        fixed_outputs: Vec<AssetOutput>,
    ) -> Self {
        Self {
            version: DEFAULT_TX_VERSION,
            network_id,
            script: None,
            gas_amount,
            gas_price,
            inputs,
            fixed_outputs,
        }
    }

    /// Fee reserved by the transaction.
    pub fn fee(&self) -> U256 {
        self.gas_price.fee(self.gas_amount)
    }
}
