//! Composable binary codecs for blockchain wire formats.
//!
//! [`ser`] holds the format-agnostic framework: the [`ser::Codec`] trait,
//! primitive codecs, and combinators for records, sequences, optionals and
//! tagged unions. [`alph`] assembles Alephium transaction codecs from those
//! parts and adds unspent output selection. [`config`] carries the decoding
//! bounds every codec is built with.
//!
//! ```
//! use chain_codec::alph::{self, UnsignedTransaction, GasPrice, MINIMAL_GAS, NETWORK_ID_MAINNET};
//!
//! let tx = UnsignedTransaction::transfer(
//!     NETWORK_ID_MAINNET,
//!     MINIMAL_GAS,
//!     GasPrice::default(),
//!     Vec::new(),
//!     Vec::new(),
//! );
//! let bytes = alph::serialize_unsigned_transaction(&tx);
//! assert_eq!(alph::decode_unsigned_transaction(&bytes).unwrap(), tx);
//! ```

pub mod alph;
pub mod config;
pub mod ser;

pub use config::CodecLimits;
pub use ser::{Codec, CodecError, CodecResult, ErrorKind, Staged};
