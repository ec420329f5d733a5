//! Run-time values bound to ABI parameters.

use alloy_primitives::{Address, I256, U256};
use brokkr_common::utils::hex::ToLowerHex;
use serde_json::Value;

/// A run-time value that can be bound to an ABI parameter.
///
/// Values carry no type information beyond their variant; the declared
/// [`AbiType`](crate::AbiType) decides the wire representation, and the
/// encoders check that the value's shape matches the declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbiValue {
    /// An unsigned integer, encoded left-padded.
    Uint(U256),
    /// A signed integer, encoded as sign-extended two's complement.
    Int(I256),
    /// A boolean, encoded as a left-padded 0 or 1.
    Bool(bool),
    /// A 20-byte account address, encoded left-padded.
    Address(Address),
    /// A fixed-size byte string (`bytesN`), encoded right-padded.
    FixedBytes(Vec<u8>),
    /// A variable-length byte string.
    Bytes(Vec<u8>),
    /// Variable-length UTF-8 text.
    String(String),
    /// An ordered sequence of element values, for `T[]` and `T[k]`.
    Array(Vec<AbiValue>),
    /// An ordered sequence of member values, for tuple types.
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// A short name for the value's shape, used in type-mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Uint(_) => "uint",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Address(_) => "address",
            Self::FixedBytes(_) => "fixed bytes",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Tuple(_) => "tuple",
        }
    }

    /// Builds a [`AbiValue::FixedBytes`] value from a slice.
    pub fn fixed_bytes(data: &[u8]) -> Self {
        Self::FixedBytes(data.to_vec())
    }

    /// The unsigned integer inside, if this is a `Uint` value.
    pub fn as_uint(&self) -> Option<&U256> {
        match self {
            Self::Uint(value) => Some(value),
            _ => None,
        }
    }

    /// The signed integer inside, if this is an `Int` value.
    pub fn as_int(&self) -> Option<&I256> {
        match self {
            Self::Int(value) => Some(value),
            _ => None,
        }
    }

    /// The boolean inside, if this is a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The address inside, if this is an `Address` value.
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Address(value) => Some(value),
            _ => None,
        }
    }

    /// The raw bytes inside, if this is a `Bytes` or `FixedBytes` value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(value) | Self::FixedBytes(value) => Some(value),
            _ => None,
        }
    }

    /// The text inside, if this is a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// The element values inside, if this is an `Array` value.
    pub fn as_array(&self) -> Option<&[AbiValue]> {
        match self {
            Self::Array(values) => Some(values),
            _ => None,
        }
    }

    /// The member values inside, if this is a `Tuple` value.
    pub fn as_tuple(&self) -> Option<&[AbiValue]> {
        match self {
            Self::Tuple(values) => Some(values),
            _ => None,
        }
    }
}

macro_rules! impl_from_uint {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for AbiValue {
                fn from(value: $ty) -> Self {
                    Self::Uint(U256::from(value))
                }
            }
        )*
    };
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for AbiValue {
                fn from(value: $ty) -> Self {
                    Self::Int(I256::try_from(value).expect("primitive int fits I256"))
                }
            }
        )*
    };
}

impl_from_uint!(u8, u16, u32, u64, u128, U256);
impl_from_int!(i8, i16, i32, i64, i128);

impl From<I256> for AbiValue {
    fn from(value: I256) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Address> for AbiValue {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<u8>> for AbiValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for AbiValue {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<Vec<AbiValue>> for AbiValue {
    fn from(values: Vec<AbiValue>) -> Self {
        Self::Array(values)
    }
}

/// An extension on [`AbiValue`] which allows serialization to a JSON value.
pub trait AbiValueExt {
    /// Serialize the value to a [`serde_json::Value`].
    ///
    /// Integers serialize as decimal strings (they exceed JSON number
    /// precision), byte strings and addresses as `0x`-prefixed hex, and
    /// arrays and tuples as JSON arrays.
    fn serialize(&self) -> Value;
}

impl AbiValueExt for AbiValue {
    fn serialize(&self) -> Value {
        match self {
            AbiValue::Uint(value) => Value::String(value.to_string()),
            AbiValue::Int(value) => Value::String(value.to_string()),
            AbiValue::Bool(value) => Value::Bool(*value),
            AbiValue::Address(addr) => Value::String(format!("0x{}", addr.to_lower_hex())),
            AbiValue::FixedBytes(data) | AbiValue::Bytes(data) => {
                Value::String(format!("0x{}", data.to_lower_hex()))
            }
            AbiValue::String(text) => Value::String(text.clone()),
            AbiValue::Array(values) | AbiValue::Tuple(values) => {
                Value::Array(values.iter().map(|value| value.serialize()).collect())
            }
        }
    }
}
