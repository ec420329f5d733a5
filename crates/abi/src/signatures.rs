//! Function-signature parsing, selectors, and calldata assembly.

use crate::{
    encode::encode_values,
    error::Error,
    types::AbiType,
    values::AbiValue,
};
use alloy_primitives::{keccak256, Bytes};
use brokkr_common::utils::strings::{find_balanced_encapsulator, split_top_level};
use tracing::trace;

/// Parses the parameter types from a human-readable function signature.
///
/// ```
/// use brokkr_abi::{parse_function_parameters, AbiType};
///
/// let types = parse_function_parameters("transfer(address,uint256)")
///     .expect("should parse signature");
/// assert_eq!(types, vec![AbiType::Address, AbiType::Uint(256)]);
/// ```
pub fn parse_function_parameters(signature: &str) -> Result<Vec<AbiType>, Error> {
    let range = find_balanced_encapsulator(signature, ('(', ')'))
        .map_err(|_| Error::InvalidType(signature.to_string()))?;
    let inputs = &signature[range];
    if inputs.trim().is_empty() {
        return Ok(vec![]);
    }
    split_top_level(inputs, ',').iter().map(|ty| AbiType::parse(ty)).collect()
}

/// Renders the canonical signature for a function name and parameter types,
/// e.g. `transfer(address,uint256)`.
pub fn canonical_signature(name: &str, types: &[AbiType]) -> String {
    let joined = types.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
    format!("{name}({joined})")
}

/// Computes the 4-byte selector for a function signature.
///
/// The signature is canonicalized first, so `transfer(address,uint)` and
/// `transfer(address,uint256)` select identically.
///
/// ```
/// use brokkr_abi::selector;
///
/// let sel = selector("transfer(address,uint256)").expect("should parse signature");
/// assert_eq!(sel, [0xa9, 0x05, 0x9c, 0xbb]);
/// ```
pub fn selector(signature: &str) -> Result<[u8; 4], Error> {
    let types = parse_function_parameters(signature)?;
    let name = signature
        .split('(')
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() {
        return Err(Error::InvalidType(signature.to_string()));
    }
    let canonical = canonical_signature(name, &types);
    let hash = keccak256(canonical.as_bytes());
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&hash[..4]);
    Ok(sel)
}

/// Encodes a function call: the 4-byte selector followed by the
/// standard-encoded arguments.
pub fn encode_call(signature: &str, values: &[AbiValue]) -> Result<Bytes, Error> {
    let types = parse_function_parameters(signature)?;
    let sel = selector(signature)?;
    trace!("encoding call to {signature} with {} arguments", values.len());

    let arguments = encode_values(&types, values)?;
    let mut calldata = Vec::with_capacity(4 + arguments.len());
    calldata.extend_from_slice(&sel);
    calldata.extend_from_slice(&arguments);
    Ok(Bytes::from(calldata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use brokkr_common::utils::strings::encode_hex;

    #[test]
    fn test_parse_empty_signature() {
        let types = parse_function_parameters("totalSupply()").expect("should parse");
        assert!(types.is_empty());
    }

    #[test]
    fn test_parse_nested_tuple_signature() {
        let types = parse_function_parameters(
            "fulfill((address,uint256,bytes)[],bytes32)",
        )
        .expect("should parse");
        assert_eq!(
            types,
            vec![
                AbiType::Array(Box::new(AbiType::Tuple(vec![
                    AbiType::Address,
                    AbiType::Uint(256),
                    AbiType::Bytes
                ]))),
                AbiType::FixedBytes(32),
            ]
        );
    }

    #[test]
    fn test_parse_signature_without_parens() {
        assert!(parse_function_parameters("notASignature").is_err());
    }

    #[test]
    fn test_selector_canonicalizes_aliases() {
        let canonical = selector("transfer(address,uint256)").expect("should parse");
        let aliased = selector("transfer(address,uint)").expect("should parse");
        assert_eq!(canonical, aliased);
    }

    #[test]
    fn test_selector_known_vectors() {
        assert_eq!(
            selector("balanceOf(address)").expect("should parse"),
            [0x70, 0xa0, 0x82, 0x31]
        );
        assert_eq!(
            selector("approve(address,uint256)").expect("should parse"),
            [0x09, 0x5e, 0xa7, 0xb3]
        );
    }

    #[test]
    fn test_encode_call_erc20_transfer() {
        let to = Address::repeat_byte(0x22);
        let calldata = encode_call(
            "transfer(address,uint256)",
            &[AbiValue::from(to), AbiValue::Uint(U256::from(1000u64))],
        )
        .expect("should encode");

        assert_eq!(calldata.len(), 4 + 64);
        assert_eq!(&calldata[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(&calldata[16..36], to.as_slice());
        assert_eq!(
            encode_hex(&calldata[36..68]),
            "00000000000000000000000000000000000000000000000000000000000003e8"
        );
    }
}
