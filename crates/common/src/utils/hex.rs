use super::strings::encode_hex;
use alloy_primitives::{Address, Bytes, I256, U256};

/// A convenience trait which encodes a given EVM type into a sized, lowercase hex string.
pub trait ToLowerHex {
    /// Returns the value as a lowercase hex string, without a `0x` prefix.
    fn to_lower_hex(&self) -> String;
}

impl ToLowerHex for Bytes {
    fn to_lower_hex(&self) -> String {
        encode_hex(self)
    }
}

impl ToLowerHex for U256 {
    fn to_lower_hex(&self) -> String {
        format!("{self:064x}")
    }
}

impl ToLowerHex for I256 {
    fn to_lower_hex(&self) -> String {
        format!("{:064x}", self.into_raw())
    }
}

impl ToLowerHex for Address {
    fn to_lower_hex(&self) -> String {
        encode_hex(self.as_slice())
    }
}

impl ToLowerHex for Vec<u8> {
    fn to_lower_hex(&self) -> String {
        encode_hex(self)
    }
}

impl ToLowerHex for [u8] {
    fn to_lower_hex(&self) -> String {
        encode_hex(self)
    }
}
