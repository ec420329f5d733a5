//! The packed (concatenation-only) ABI encoder.
//!
//! Packed encoding strips the head-tail machinery: no offset pointers and no
//! length prefixes, with scalars emitted at their natural width. Array
//! elements are still padded to a full 32-byte slot each. The result is
//! shorter but position-losing, usable only when the parameter shapes are
//! known out-of-band (hash preimages, signature-style digests), and it has no
//! decoder by design.

use crate::{
    encode::encode_static,
    error::Error,
    types::AbiType,
    values::AbiValue,
};
use alloy_json_abi::Param;
use alloy_primitives::{Bytes, I256};
use hashbrown::HashMap;
use tracing::trace;

/// Packed-encodes a parameter list against a name-keyed value map.
///
/// Every declared parameter must be pack-supported and have a value; any
/// violation aborts the call before a single byte is produced.
pub fn encode_packed_parameters(
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
    encode_packed(parameters, &ordered)
}

/// Packed-encodes a parameter list against positionally-matched values.
pub fn encode_packed(parameters: &[Param], values: &[AbiValue]) -> Result<Bytes, Error> {
    if parameters.len() != values.len() {
        return Err(Error::ValueCountMismatch {
            expected: parameters.len(),
            got: values.len(),
        });
    }
    let mut types = Vec::with_capacity(parameters.len());
    let mut names = Vec::with_capacity(parameters.len());
    for (i, param) in parameters.iter().enumerate() {
        types.push(AbiType::from_param(param)?);
        names.push(if param.name.is_empty() { format!("param{i}") } else { param.name.clone() });
    }
    packed(&types, &names, values)
}

/// Packed-encodes values against resolved [`AbiType`]s.
pub fn encode_packed_values(types: &[AbiType], values: &[AbiValue]) -> Result<Bytes, Error> {
    if types.len() != values.len() {
        return Err(Error::ValueCountMismatch { expected: types.len(), got: values.len() });
    }
    let names = (0..types.len()).map(|i| format!("arg{i}")).collect::<Vec<_>>();
    packed(types, &names, values)
}

fn packed(types: &[AbiType], names: &[String], values: &[AbiValue]) -> Result<Bytes, Error> {
    // classify everything up front so nothing is emitted on failure
    for ty in types {
        if !ty.supports_packed() {
            return Err(Error::UnsupportedPackedType(ty.to_string()));
        }
    }
    trace!("packed-encoding {} parameters", types.len());

    let mut out = Vec::new();
    for ((ty, name), value) in types.iter().zip(names).zip(values) {
        out.extend(packed_value(name, ty, value)?);
    }
    Ok(Bytes::from(out))
}

/// Packed-encodes a single value: arrays one full slot per element, scalars
/// at natural width.
fn packed_value(name: &str, ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>, Error> {
    match ty {
        AbiType::Array(element) => {
            let items = value.as_array().ok_or_else(|| mismatch(name, ty, value))?;
            packed_elements(name, element, items)
        }
        AbiType::FixedArray(element, size) => {
            let items = value.as_array().ok_or_else(|| mismatch(name, ty, value))?;
            if items.len() != *size {
                return Err(Error::TypeMismatch {
                    name: name.to_string(),
                    expected: ty.to_string(),
                    got: format!("array of {}", items.len()),
                });
            }
            packed_elements(name, element, items)
        }
        AbiType::Uint(bits) => {
            let v = value.as_uint().ok_or_else(|| mismatch(name, ty, value))?;
            if v.bit_len() > *bits {
                return Err(Error::TypeMismatch {
                    name: name.to_string(),
                    expected: ty.to_string(),
                    got: v.to_string(),
                });
            }
            let word = v.to_be_bytes::<32>();
            Ok(word[32 - bits / 8..].to_vec())
        }
        AbiType::Int(bits) => {
            let v = value.as_int().ok_or_else(|| mismatch(name, ty, value))?;
            if *bits < 256 {
                let bound = I256::ONE << (*bits - 1);
                if *v >= bound || *v < -bound {
                    return Err(Error::TypeMismatch {
                        name: name.to_string(),
                        expected: ty.to_string(),
                        got: v.to_string(),
                    });
                }
            }
            // two's complement truncation keeps the sign bits
            let word = v.to_be_bytes::<32>();
            Ok(word[32 - bits / 8..].to_vec())
        }
        AbiType::Bool => {
            let v = value.as_bool().ok_or_else(|| mismatch(name, ty, value))?;
            Ok(vec![v as u8])
        }
        AbiType::Address => {
            let v = value.as_address().ok_or_else(|| mismatch(name, ty, value))?;
            Ok(v.as_slice().to_vec())
        }
        AbiType::FixedBytes(size) => {
            let data = value.as_bytes().ok_or_else(|| mismatch(name, ty, value))?;
            if data.len() != *size {
                return Err(Error::TypeMismatch {
                    name: name.to_string(),
                    expected: ty.to_string(),
                    got: format!("{} bytes", data.len()),
                });
            }
            Ok(data.to_vec())
        }
        AbiType::Bytes => {
            let data = value.as_bytes().ok_or_else(|| mismatch(name, ty, value))?;
            Ok(data.to_vec())
        }
        AbiType::String => {
            let text = value.as_str().ok_or_else(|| mismatch(name, ty, value))?;
            Ok(text.as_bytes().to_vec())
        }
        AbiType::Tuple(_) => {
            Err(Error::Eyre(eyre::eyre!("pack-unsupported type {ty} passed validation")))
        }
    }
}

fn packed_elements(
    name: &str,
    element: &AbiType,
    items: &[AbiValue],
) -> Result<Vec<u8>, Error> {
    let mut out = Vec::with_capacity(items.len() * 32);
    for (i, item) in items.iter().enumerate() {
        for word in encode_static(&format!("{name}[{i}]"), element, item)? {
            out.extend_from_slice(&word);
        }
    }
    Ok(out)
}

fn mismatch(name: &str, ty: &AbiType, value: &AbiValue) -> Error {
    Error::TypeMismatch {
        name: name.to_string(),
        expected: ty.to_string(),
        got: value.kind().to_string(),
    }
}
