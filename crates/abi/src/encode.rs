//! The standard (head-tail) ABI encoder.
//!
//! Parameters are walked in declared order: static values are inlined into
//! the head region, dynamic values are encoded into self-contained tail
//! blocks and replaced in the head by offset pointers. Offsets are relative
//! to the start of the enclosing dynamic value's own block, or to the start
//! of the whole encoding for top-level parameters.

use crate::{
    error::Error,
    slots::{uint_word, CollectionId, SlotSpace, Word},
    types::AbiType,
    values::AbiValue,
};
use alloy_json_abi::Param;
use alloy_primitives::{Bytes, I256};
use hashbrown::HashMap;
use tracing::trace;

/// Encodes a parameter list against a name-keyed value map.
///
/// The map must supply a value for every declared parameter name; the byte
/// layout follows the declared parameter order, not the map order. Any
/// missing value, shape mismatch, or unresolvable type aborts the whole call.
pub fn encode_parameters(
    parameters: &[Param],
    values: &HashMap<String, AbiValue>,
) -> Result<Bytes, Error> {
    let mut ordered = Vec::with_capacity(parameters.len());
    for param in parameters {
        let value = values
            .get(&param.name)
            .ok_or_else(|| Error::MissingParameter(param.name.clone()))?;
        ordered.push(value.clone());
    }
    encode(parameters, &ordered)
}

/// Encodes a parameter list against positionally-matched values.
pub fn encode(parameters: &[Param], values: &[AbiValue]) -> Result<Bytes, Error> {
    if parameters.len() != values.len() {
        return Err(Error::ValueCountMismatch {
            expected: parameters.len(),
            got: values.len(),
        });
    }
    trace!("encoding {} parameters", parameters.len());

    let mut space = SlotSpace::new();
    let head = space.append_collection();
    for (i, (param, value)) in parameters.iter().zip(values).enumerate() {
        let ty = AbiType::from_param(param)?;
        let name = if param.name.is_empty() { format!("param{i}") } else { param.name.clone() };
        encode_into(&mut space, head, &name, &ty, value)?;
    }
    trace!("assembling {} slots", space.slot_count());
    Ok(Bytes::from(space.to_bytes()?))
}

/// Encodes a single parameter and value.
pub fn encode_parameter(parameter: &Param, value: &AbiValue) -> Result<Bytes, Error> {
    encode(std::slice::from_ref(parameter), std::slice::from_ref(value))
}

/// Encodes values against resolved [`AbiType`]s, bypassing parameter lists.
pub fn encode_values(types: &[AbiType], values: &[AbiValue]) -> Result<Bytes, Error> {
    if types.len() != values.len() {
        return Err(Error::ValueCountMismatch { expected: types.len(), got: values.len() });
    }

    let mut space = SlotSpace::new();
    let head = space.append_collection();
    for (i, (ty, value)) in types.iter().zip(values).enumerate() {
        encode_into(&mut space, head, &format!("arg{i}"), ty, value)?;
    }
    Ok(Bytes::from(space.to_bytes()?))
}

/// Encodes one value into a head collection: static values in place, dynamic
/// values as a pointer to a freshly appended tail block.
fn encode_into(
    space: &mut SlotSpace,
    head: CollectionId,
    name: &str,
    ty: &AbiType,
    value: &AbiValue,
) -> Result<(), Error> {
    if ty.is_static() {
        for word in encode_static(name, ty, value)? {
            space.push_word(head, word)?;
        }
    } else {
        let block = encode_dynamic(name, ty, value)?;
        let target = space.append_block(&block)?;
        space.push_pointer(head, head, target)?;
    }
    Ok(())
}

/// Encodes a static value into its inlined head words.
pub(crate) fn encode_static(
    name: &str,
    ty: &AbiType,
    value: &AbiValue,
) -> Result<Vec<Word>, Error> {
    match ty {
        AbiType::Uint(bits) => {
            let v = value.as_uint().ok_or_else(|| mismatch(name, ty, value))?;
            if v.bit_len() > *bits {
                return Err(out_of_range(name, ty, v.to_string()));
            }
            Ok(vec![v.to_be_bytes::<32>()])
        }
        AbiType::Int(bits) => {
            let v = value.as_int().ok_or_else(|| mismatch(name, ty, value))?;
            if *bits < 256 {
                let bound = I256::ONE << (*bits - 1);
                if *v >= bound || *v < -bound {
                    return Err(out_of_range(name, ty, v.to_string()));
                }
            }
            Ok(vec![v.to_be_bytes::<32>()])
        }
        AbiType::Bool => {
            let v = value.as_bool().ok_or_else(|| mismatch(name, ty, value))?;
            let mut word = [0u8; 32];
            word[31] = v as u8;
            Ok(vec![word])
        }
        AbiType::Address => {
            let v = value.as_address().ok_or_else(|| mismatch(name, ty, value))?;
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(v.as_slice());
            Ok(vec![word])
        }
        AbiType::FixedBytes(size) => {
            let data = value.as_bytes().ok_or_else(|| mismatch(name, ty, value))?;
            if data.len() != *size {
                return Err(out_of_range(name, ty, format!("{} bytes", data.len())));
            }
            let mut word = [0u8; 32];
            word[..data.len()].copy_from_slice(data);
            Ok(vec![word])
        }
        AbiType::FixedArray(element, size) => {
            let items = value.as_array().ok_or_else(|| mismatch(name, ty, value))?;
            if items.len() != *size {
                return Err(out_of_range(name, ty, format!("array of {}", items.len())));
            }
            let mut words = Vec::with_capacity(ty.head_words());
            for (i, item) in items.iter().enumerate() {
                words.extend(encode_static(&format!("{name}[{i}]"), element, item)?);
            }
            Ok(words)
        }
        AbiType::Tuple(members) => {
            let items = value.as_tuple().ok_or_else(|| mismatch(name, ty, value))?;
            if items.len() != members.len() {
                return Err(out_of_range(name, ty, format!("tuple of {}", items.len())));
            }
            let mut words = Vec::with_capacity(ty.head_words());
            for (i, (member, item)) in members.iter().zip(items).enumerate() {
                words.extend(encode_static(&format!("{name}.{i}"), member, item)?);
            }
            Ok(words)
        }
        AbiType::Bytes | AbiType::String | AbiType::Array(_) => Err(Error::Eyre(eyre::eyre!(
            "dynamic type {ty} reached the static encoder"
        ))),
    }
}

/// Encodes a dynamic value into a self-contained block with internal
/// relative offsets.
fn encode_dynamic(name: &str, ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>, Error> {
    match ty {
        AbiType::Bytes => {
            let data = value.as_bytes().ok_or_else(|| mismatch(name, ty, value))?;
            encode_byte_string(data)
        }
        AbiType::String => {
            let text = value.as_str().ok_or_else(|| mismatch(name, ty, value))?;
            encode_byte_string(text.as_bytes())
        }
        AbiType::Array(element) => {
            let items = value.as_array().ok_or_else(|| mismatch(name, ty, value))?;
            let mut space = SlotSpace::new();
            if element.is_static() {
                if element.head_words() == 1 {
                    let reservation = space.reserve_array(items.len());
                    for (i, item) in items.iter().enumerate() {
                        let words = encode_static(&format!("{name}[{i}]"), element, item)?;
                        space.fill_element_word(&reservation, i, words[0])?;
                    }
                } else {
                    // elements wider than one slot are inlined directly
                    space.append_word(uint_word(items.len()));
                    let elements = space.append_collection();
                    for (i, item) in items.iter().enumerate() {
                        for word in encode_static(&format!("{name}[{i}]"), element, item)? {
                            space.push_word(elements, word)?;
                        }
                    }
                }
            } else {
                let reservation = space.reserve_array(items.len());
                for (i, item) in items.iter().enumerate() {
                    let block = encode_dynamic(&format!("{name}[{i}]"), element, item)?;
                    let target = space.append_block(&block)?;
                    space.fill_element_pointer(&reservation, i, target)?;
                }
            }
            space.to_bytes()
        }
        AbiType::FixedArray(element, size) => {
            // a fixed array is only dynamic when its element type is; its
            // block is a head of offsets (no length slot) followed by the
            // element payloads
            let items = value.as_array().ok_or_else(|| mismatch(name, ty, value))?;
            if items.len() != *size {
                return Err(out_of_range(name, ty, format!("array of {}", items.len())));
            }
            let mut space = SlotSpace::new();
            let heads = space.append_collection();
            for (i, item) in items.iter().enumerate() {
                let block = encode_dynamic(&format!("{name}[{i}]"), element, item)?;
                let target = space.append_block(&block)?;
                space.push_pointer(heads, heads, target)?;
            }
            space.to_bytes()
        }
        AbiType::Tuple(members) => {
            let items = value.as_tuple().ok_or_else(|| mismatch(name, ty, value))?;
            if items.len() != members.len() {
                return Err(out_of_range(name, ty, format!("tuple of {}", items.len())));
            }
            // a dynamic tuple's block is itself head-tail encoded
            let mut space = SlotSpace::new();
            let head = space.append_collection();
            for (i, (member, item)) in members.iter().zip(items).enumerate() {
                encode_into(&mut space, head, &format!("{name}.{i}"), member, item)?;
            }
            space.to_bytes()
        }
        _ => Err(Error::Eyre(eyre::eyre!("static type {ty} reached the dynamic encoder"))),
    }
}

/// Encodes a `bytes`/`string` payload: length slot, then right-padded data.
fn encode_byte_string(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut space = SlotSpace::new();
    let reservation = space.reserve_bytes(data.len());
    space.fill_bytes(&reservation, data)?;
    space.to_bytes()
}

fn mismatch(name: &str, ty: &AbiType, value: &AbiValue) -> Error {
    Error::TypeMismatch {
        name: name.to_string(),
        expected: ty.to_string(),
        got: value.kind().to_string(),
    }
}

fn out_of_range(name: &str, ty: &AbiType, got: String) -> Error {
    Error::TypeMismatch { name: name.to_string(), expected: ty.to_string(), got }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use brokkr_common::utils::strings::{decode_hex, encode_hex};

    fn param(name: &str, ty: &str) -> Param {
        Param { ty: ty.to_string(), name: name.to_string(), components: vec![], internal_type: None }
    }

    #[test]
    fn test_encode_uint8_is_one_left_padded_slot() {
        let encoded = encode(&[param("a", "uint8")], &[AbiValue::from(5u8)])
            .expect("should encode");
        assert_eq!(encoded.len(), 32);
        assert_eq!(
            encode_hex(&encoded),
            "0000000000000000000000000000000000000000000000000000000000000005"
        );
    }

    #[test]
    fn test_encode_static_fixed_array_is_inlined() {
        let values = AbiValue::Array(vec![AbiValue::from(1u64), AbiValue::from(2u64)]);
        let encoded =
            encode(&[param("a", "uint256[2]")], &[values]).expect("should encode");
        // two consecutive value slots, no length prefix, no pointer
        assert_eq!(encoded.len(), 64);
        assert_eq!(U256::from_be_slice(&encoded[0..32]), U256::from(1));
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(2));
    }

    #[test]
    fn test_encode_string_head_tail_layout() {
        let encoded =
            encode(&[param("s", "string")], &[AbiValue::from("abc")]).expect("should encode");
        assert_eq!(encoded.len(), 96);
        // offset slot: 0x20
        assert_eq!(U256::from_be_slice(&encoded[0..32]), U256::from(32));
        // length slot: 3
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(3));
        // "abc" right-padded to a full slot
        assert_eq!(&encoded[64..67], b"abc");
        assert_eq!(&encoded[67..96], &[0u8; 29]);
    }

    #[test]
    fn test_encode_empty_dynamic_array_emits_length_slot_only() {
        let encoded = encode(&[param("a", "uint256[]")], &[AbiValue::Array(vec![])])
            .expect("should encode");
        // pointer slot then a zero length slot
        assert_eq!(encoded.len(), 64);
        assert_eq!(U256::from_be_slice(&encoded[0..32]), U256::from(32));
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::ZERO);
    }

    #[test]
    fn test_encode_array_of_strings_layout() {
        let values = AbiValue::Array(vec![AbiValue::from("ab"), AbiValue::from("c")]);
        let encoded =
            encode(&[param("a", "string[]")], &[values]).expect("should encode");
        // top-level pointer, length, two element pointers, two 2-slot byte-string blocks
        assert_eq!(encoded.len(), 32 * 8);
        assert_eq!(U256::from_be_slice(&encoded[0..32]), U256::from(0x20));
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(2));
        // element offsets are relative to the first element head
        assert_eq!(U256::from_be_slice(&encoded[64..96]), U256::from(0x40));
        assert_eq!(U256::from_be_slice(&encoded[96..128]), U256::from(0x80));
        assert_eq!(U256::from_be_slice(&encoded[128..160]), U256::from(2));
        assert_eq!(&encoded[160..162], b"ab");
    }

    #[test]
    fn test_encode_mixed_static_dynamic_heads() {
        let encoded = encode(
            &[param("a", "uint256"), param("b", "string"), param("c", "bool")],
            &[AbiValue::from(7u64), AbiValue::from("hi"), AbiValue::from(true)],
        )
        .expect("should encode");
        assert_eq!(encoded.len(), 32 * 5);
        assert_eq!(U256::from_be_slice(&encoded[0..32]), U256::from(7));
        // the string pointer skips all three head slots
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(0x60));
        assert_eq!(U256::from_be_slice(&encoded[64..96]), U256::from(1));
        assert_eq!(U256::from_be_slice(&encoded[96..128]), U256::from(2));
        assert_eq!(&encoded[128..130], b"hi");
    }

    #[test]
    fn test_encode_address_left_padded() {
        let addr = Address::from_slice(
            &decode_hex("00112233445566778899aabbccddeeff00112233").expect("should decode hex"),
        );
        let encoded =
            encode(&[param("to", "address")], &[AbiValue::from(addr)]).expect("should encode");
        assert_eq!(&encoded[0..12], &[0u8; 12]);
        assert_eq!(&encoded[12..32], addr.as_slice());
    }

    #[test]
    fn test_encode_negative_int_sign_extends() {
        let encoded = encode(&[param("a", "int256")], &[AbiValue::from(-1i64)])
            .expect("should encode");
        assert_eq!(encoded.to_vec(), vec![0xff; 32]);
    }

    #[test]
    fn test_encode_uint_out_of_range() {
        let result = encode(&[param("a", "uint8")], &[AbiValue::from(256u64)]);
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_encode_int_range_bounds() {
        assert!(encode(&[param("a", "int8")], &[AbiValue::from(-128i64)]).is_ok());
        assert!(encode(&[param("a", "int8")], &[AbiValue::from(127i64)]).is_ok());
        assert!(encode(&[param("a", "int8")], &[AbiValue::from(128i64)]).is_err());
        assert!(encode(&[param("a", "int8")], &[AbiValue::from(-129i64)]).is_err());
    }

    #[test]
    fn test_encode_shape_mismatch() {
        let result = encode(&[param("a", "uint256[]")], &[AbiValue::from(1u8)]);
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_encode_fixed_bytes_size_mismatch() {
        let result = encode(&[param("a", "bytes4")], &[AbiValue::fixed_bytes(&[1, 2, 3])]);
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_encode_parameters_binds_by_name() {
        let mut values = HashMap::new();
        values.insert("b".to_string(), AbiValue::from(2u8));
        values.insert("a".to_string(), AbiValue::from(1u8));
        let encoded = encode_parameters(&[param("a", "uint8"), param("b", "uint8")], &values)
            .expect("should encode");
        // layout follows declared order, not map order
        assert_eq!(encoded[31], 1);
        assert_eq!(encoded[63], 2);
    }

    #[test]
    fn test_encode_parameters_missing_value() {
        let values = HashMap::new();
        let result = encode_parameters(&[param("a", "uint8")], &values);
        assert!(matches!(result, Err(Error::MissingParameter(name)) if name == "a"));
    }

    #[test]
    fn test_encode_value_count_mismatch() {
        let result = encode(&[param("a", "uint8")], &[]);
        assert!(matches!(result, Err(Error::ValueCountMismatch { expected: 1, got: 0 })));
    }

    #[test]
    fn test_encode_dynamic_tuple_block_offsets() {
        let value = AbiValue::Tuple(vec![AbiValue::from(1u8), AbiValue::from("xy")]);
        let encoded = encode(&[param("t", "(uint256,string)")], &[value])
            .expect("should encode");
        // pointer to the tuple block, then the block's own head-tail layout
        assert_eq!(U256::from_be_slice(&encoded[0..32]), U256::from(0x20));
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(1));
        // the string offset is relative to the tuple block start
        assert_eq!(U256::from_be_slice(&encoded[64..96]), U256::from(0x40));
        assert_eq!(U256::from_be_slice(&encoded[96..128]), U256::from(2));
        assert_eq!(&encoded[128..130], b"xy");
    }
}
