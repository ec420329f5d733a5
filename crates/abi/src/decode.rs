//! The head-tail ABI decoder.
//!
//! Decoding walks the head region in declared parameter order: static values
//! are read in place, dynamic values through a bounds-checked offset
//! dereference relative to the enclosing block's base. Any offset or length
//! that does not fit the buffer aborts the call; no partially populated
//! result is ever returned.

use crate::{error::Error, types::AbiType, values::AbiValue};
use alloy_json_abi::Param;
use alloy_primitives::{Address, I256, U256};
use tracing::trace;

/// The result of decoding a parameter list: an ordered sequence of
/// (parameter, value) pairs, addressable by position or by parameter name.
#[derive(Clone, Debug)]
pub struct DecodeResult {
    decoded: Vec<(Param, AbiValue)>,
}

impl DecodeResult {
    /// Number of decoded parameters.
    pub fn len(&self) -> usize {
        self.decoded.len()
    }

    /// Whether the result holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.decoded.is_empty()
    }

    /// The decoded value at `index`, in declared parameter order.
    pub fn at(&self, index: usize) -> Option<&AbiValue> {
        self.decoded.get(index).map(|(_, value)| value)
    }

    /// The decoded value of the first parameter named `name`.
    pub fn get(&self, name: &str) -> Option<&AbiValue> {
        self.decoded
            .iter()
            .find(|(param, _)| param.name == name)
            .map(|(_, value)| value)
    }

    /// Iterates the (parameter, value) pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = &(Param, AbiValue)> {
        self.decoded.iter()
    }

    /// Consumes the result into just the values, in declared order.
    pub fn into_values(self) -> Vec<AbiValue> {
        self.decoded.into_iter().map(|(_, value)| value).collect()
    }
}

/// Decodes a byte buffer against a parameter list.
pub fn decode_parameters(parameters: &[Param], data: &[u8]) -> Result<DecodeResult, Error> {
    trace!("decoding {} parameters from {} bytes", parameters.len(), data.len());

    let mut cursor = 0usize;
    let mut decoded = Vec::with_capacity(parameters.len());
    for param in parameters {
        let ty = AbiType::from_param(param)?;
        let value = decode_head(&ty, data, &mut cursor)?;
        decoded.push((param.clone(), value));
    }
    Ok(DecodeResult { decoded })
}

/// Decodes a single parameter from a byte buffer.
///
/// Wraps the parameter into a one-element list and unwraps the single result.
pub fn decode_parameter(parameter: &Param, data: &[u8]) -> Result<AbiValue, Error> {
    let result = decode_parameters(std::slice::from_ref(parameter), data)?;
    result
        .into_values()
        .into_iter()
        .next()
        .ok_or_else(|| Error::Eyre(eyre::eyre!("single-parameter decode produced no value")))
}

/// Decodes one head entry: static values in place, dynamic values through an
/// offset dereference relative to the start of `block`.
fn decode_head(ty: &AbiType, block: &[u8], cursor: &mut usize) -> Result<AbiValue, Error> {
    if ty.is_static() {
        let width = ty.head_words() * 32;
        let bytes = slice_at(block, *cursor, width)?;
        *cursor += width;
        decode_static(ty, bytes)
    } else {
        let offset = read_word_as_len(block, *cursor)?;
        *cursor += 32;
        let tail = block.get(offset..).ok_or_else(|| Error::OutOfBounds {
            offset,
            needed: 32,
            available: block.len(),
        })?;
        decode_dynamic(ty, tail)
    }
}

/// Decodes a static value from its exact inlined width.
fn decode_static(ty: &AbiType, bytes: &[u8]) -> Result<AbiValue, Error> {
    match ty {
        AbiType::Uint(_) => Ok(AbiValue::Uint(U256::from_be_slice(&bytes[..32]))),
        AbiType::Int(_) => {
            let mut word = [0u8; 32];
            word.copy_from_slice(&bytes[..32]);
            Ok(AbiValue::Int(I256::from_be_bytes(word)))
        }
        AbiType::Bool => Ok(AbiValue::Bool(bytes[31] != 0)),
        AbiType::Address => Ok(AbiValue::Address(Address::from_slice(&bytes[12..32]))),
        AbiType::FixedBytes(size) => Ok(AbiValue::FixedBytes(bytes[..*size].to_vec())),
        AbiType::FixedArray(element, size) => {
            let width = element.head_words() * 32;
            let mut items = Vec::with_capacity(*size);
            for i in 0..*size {
                items.push(decode_static(element, &bytes[i * width..(i + 1) * width])?);
            }
            Ok(AbiValue::Array(items))
        }
        AbiType::Tuple(members) => {
            let mut offset = 0usize;
            let mut items = Vec::with_capacity(members.len());
            for member in members {
                let width = member.head_words() * 32;
                items.push(decode_static(member, &bytes[offset..offset + width])?);
                offset += width;
            }
            Ok(AbiValue::Tuple(items))
        }
        AbiType::Bytes | AbiType::String | AbiType::Array(_) => Err(Error::Eyre(eyre::eyre!(
            "dynamic type {ty} reached the static decoder"
        ))),
    }
}

/// Decodes a dynamic value from its self-contained block.
fn decode_dynamic(ty: &AbiType, block: &[u8]) -> Result<AbiValue, Error> {
    match ty {
        AbiType::Bytes => {
            let len = read_word_as_len(block, 0)?;
            let data = slice_at(block, 32, len)?;
            Ok(AbiValue::Bytes(data.to_vec()))
        }
        AbiType::String => {
            let len = read_word_as_len(block, 0)?;
            let data = slice_at(block, 32, len)?;
            Ok(AbiValue::String(
                String::from_utf8(data.to_vec()).map_err(|_| Error::InvalidUtf8)?,
            ))
        }
        AbiType::Array(element) => {
            let len = read_word_as_len(block, 0)?;
            // the array's own block starts after the length slot
            let area = &block[32..];
            if element.is_static() {
                let width = element.head_words() * 32;
                let total = len.checked_mul(width).ok_or_else(|| Error::OutOfBounds {
                    offset: 32,
                    needed: usize::MAX,
                    available: block.len(),
                })?;
                let data = slice_at(area, 0, total)?;
                let mut items = Vec::with_capacity(len);
                for i in 0..len {
                    items.push(decode_static(element, &data[i * width..(i + 1) * width])?);
                }
                Ok(AbiValue::Array(items))
            } else {
                let mut items = Vec::with_capacity(len);
                for i in 0..len {
                    let offset = read_word_as_len(area, i * 32)?;
                    let element_block = area.get(offset..).ok_or_else(|| Error::OutOfBounds {
                        offset,
                        needed: 32,
                        available: area.len(),
                    })?;
                    items.push(decode_dynamic(element, element_block)?);
                }
                Ok(AbiValue::Array(items))
            }
        }
        AbiType::FixedArray(element, size) => {
            // only reachable with a dynamic element type; offsets are
            // relative to the block start since there is no length slot
            let mut items = Vec::with_capacity(*size);
            for i in 0..*size {
                let offset = read_word_as_len(block, i * 32)?;
                let element_block = block.get(offset..).ok_or_else(|| Error::OutOfBounds {
                    offset,
                    needed: 32,
                    available: block.len(),
                })?;
                items.push(decode_dynamic(element, element_block)?);
            }
            Ok(AbiValue::Array(items))
        }
        AbiType::Tuple(members) => {
            let mut cursor = 0usize;
            let mut items = Vec::with_capacity(members.len());
            for member in members {
                items.push(decode_head(member, block, &mut cursor)?);
            }
            Ok(AbiValue::Tuple(items))
        }
        _ => Err(Error::Eyre(eyre::eyre!("static type {ty} reached the dynamic decoder"))),
    }
}

/// A bounds-checked slice of `len` bytes at `offset`.
fn slice_at(block: &[u8], offset: usize, len: usize) -> Result<&[u8], Error> {
    let end = offset.checked_add(len).ok_or_else(|| Error::OutOfBounds {
        offset,
        needed: len,
        available: block.len(),
    })?;
    block.get(offset..end).ok_or_else(|| Error::OutOfBounds {
        offset,
        needed: len,
        available: block.len(),
    })
}

/// Reads a 32-byte word as a length or offset, rejecting values that do not
/// fit the platform's address space.
fn read_word_as_len(block: &[u8], offset: usize) -> Result<usize, Error> {
    let word = slice_at(block, offset, 32)?;
    usize::try_from(U256::from_be_slice(word)).map_err(|_| Error::OutOfBounds {
        offset,
        needed: usize::MAX,
        available: block.len(),
    })
}
