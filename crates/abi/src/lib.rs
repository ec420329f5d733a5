//! Encodes and decodes values in the Ethereum contract ABI wire format.
//!
//! The ABI's head-tail layout inlines static values in place and replaces
//! dynamic values with offset pointers resolved at assembly time. This crate
//! implements both directions of that layout over the complete ABI type set
//! (integers, booleans, addresses, fixed and variable byte strings,
//! strings, arrays, tuples), plus the packed concatenation mode used for
//! hash preimages.
//!
//! Parameter lists use [`alloy_json_abi::Param`], so contract-ABI JSON
//! documents plug in directly. Every encode or decode call is synchronous,
//! pure, and all-or-nothing: it either returns a complete result or an
//! [`Error`](error::Error).
//!
//! ```
//! use brokkr_abi::{decode_parameters, encode, AbiValue, Param};
//!
//! let params = [Param {
//!     ty: "uint256".to_string(),
//!     name: "amount".to_string(),
//!     components: vec![],
//!     internal_type: None,
//! }];
//! let encoded = encode(&params, &[AbiValue::from(7u64)]).expect("encoding should succeed");
//! let decoded = decode_parameters(&params, &encoded).expect("decoding should succeed");
//! assert_eq!(decoded.get("amount"), Some(&AbiValue::from(7u64)));
//! ```

pub mod error;

mod decode;
mod encode;
mod packed;
mod signatures;
mod slots;
mod types;
mod values;

// re-export the public interface
pub use decode::{decode_parameter, decode_parameters, DecodeResult};
pub use encode::{encode, encode_parameter, encode_parameters, encode_values};
pub use packed::{encode_packed, encode_packed_parameters, encode_packed_values};
pub use signatures::{canonical_signature, encode_call, parse_function_parameters, selector};
pub use types::AbiType;
pub use values::{AbiValue, AbiValueExt};

pub use alloy_json_abi::Param;
