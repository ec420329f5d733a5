//! The canonical ABI type grammar and its static/dynamic classification.

use crate::error::Error;
use alloy_json_abi::Param;
use brokkr_common::utils::strings::{find_balanced_encapsulator, split_top_level};
use hashbrown::HashMap;
use lazy_static::lazy_static;
use std::fmt;

lazy_static! {
    /// Type-name aliases accepted on input, mapped to their canonical names.
    static ref TYPE_ALIASES: HashMap<&'static str, &'static str> = {
        let mut aliases = HashMap::new();
        aliases.insert("uint", "uint256");
        aliases.insert("int", "int256");
        aliases.insert("byte", "bytes1");
        aliases
    };
}

/// A canonical ABI type.
///
/// The ABI type set is closed and finite, so the codec dispatches over this
/// enum with exhaustive matches instead of consulting an open-ended list of
/// per-type codecs. Classification (static vs. dynamic) follows the ABI
/// specification: a type is dynamic if its encoded width depends on the value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbiType {
    /// `uintN` for `8 <= N <= 256`, `N % 8 == 0`.
    Uint(usize),
    /// `intN` for `8 <= N <= 256`, `N % 8 == 0`.
    Int(usize),
    /// `bool`.
    Bool,
    /// `address`, a 20-byte account identifier.
    Address,
    /// `bytesN` for `1 <= N <= 32`.
    FixedBytes(usize),
    /// `bytes`, a variable-length byte string.
    Bytes,
    /// `string`, variable-length UTF-8 text.
    String,
    /// `T[k]`, a fixed-size array of `k` elements.
    FixedArray(Box<AbiType>, usize),
    /// `T[]`, a dynamically-sized array.
    Array(Box<AbiType>),
    /// `(T1,...,Tn)`, an ordered composite of member types.
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Parses a type string into its canonical [`AbiType`].
    ///
    /// Accepts canonical names (`uint256`, `bytes32[4]`), the aliases
    /// `uint`/`int`/`byte`, and parenthesized tuple literals
    /// (`(address,uint256)[]`). Malformed input is an error, never a fallback
    /// type. The bare name `tuple` cannot be resolved here since its member
    /// types live in the parameter's components; use [`AbiType::from_param`].
    pub fn parse(type_str: &str) -> Result<Self, Error> {
        let s = type_str.trim();
        if s.is_empty() {
            return Err(Error::InvalidType(type_str.to_string()));
        }

        // the outermost array suffix is the last bracket group
        if s.ends_with(']') {
            let open = s.rfind('[').ok_or_else(|| Error::InvalidType(type_str.to_string()))?;
            let inner = Self::parse(&s[..open])?;
            let size = &s[open + 1..s.len() - 1];
            if size.is_empty() {
                return Ok(Self::Array(Box::new(inner)));
            }
            let size = size
                .parse::<usize>()
                .map_err(|_| Error::InvalidType(type_str.to_string()))?;
            return Ok(Self::FixedArray(Box::new(inner), size));
        }

        if s.starts_with('(') {
            let range = find_balanced_encapsulator(s, ('(', ')'))
                .map_err(|_| Error::InvalidType(type_str.to_string()))?;
            // the parens must span the whole string to be a tuple literal
            if range.start != 1 || range.end != s.len() - 1 {
                return Err(Error::InvalidType(type_str.to_string()));
            }
            let contents = &s[range];
            if contents.trim().is_empty() {
                return Ok(Self::Tuple(vec![]));
            }
            let members = split_top_level(contents, ',')
                .iter()
                .map(|member| Self::parse(member))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::Tuple(members));
        }

        let s = TYPE_ALIASES.get(s).copied().unwrap_or(s);
        match s {
            "address" => Ok(Self::Address),
            "bool" => Ok(Self::Bool),
            "string" => Ok(Self::String),
            "bytes" => Ok(Self::Bytes),
            _ => {
                if let Some(bits) = s.strip_prefix("uint") {
                    let bits = bits
                        .parse::<usize>()
                        .map_err(|_| Error::InvalidType(type_str.to_string()))?;
                    if bits == 0 || bits > 256 || bits % 8 != 0 {
                        return Err(Error::InvalidType(type_str.to_string()));
                    }
                    Ok(Self::Uint(bits))
                } else if let Some(bits) = s.strip_prefix("int") {
                    let bits = bits
                        .parse::<usize>()
                        .map_err(|_| Error::InvalidType(type_str.to_string()))?;
                    if bits == 0 || bits > 256 || bits % 8 != 0 {
                        return Err(Error::InvalidType(type_str.to_string()));
                    }
                    Ok(Self::Int(bits))
                } else if let Some(size) = s.strip_prefix("bytes") {
                    let size = size
                        .parse::<usize>()
                        .map_err(|_| Error::InvalidType(type_str.to_string()))?;
                    if size == 0 || size > 32 {
                        return Err(Error::InvalidType(type_str.to_string()));
                    }
                    Ok(Self::FixedBytes(size))
                } else {
                    Err(Error::InvalidType(type_str.to_string()))
                }
            }
        }
    }

    /// Returns the canonical form of a type string, e.g. `uint` -> `uint256`.
    pub fn canonicalize(type_str: &str) -> Result<String, Error> {
        Ok(Self::parse(type_str)?.to_string())
    }

    /// Resolves a JSON-ABI parameter into its [`AbiType`].
    ///
    /// JSON contract-ABI documents spell struct types as `tuple` (optionally
    /// with array suffixes) and carry the member types in `components`; all
    /// other type strings go through [`AbiType::parse`].
    pub fn from_param(param: &Param) -> Result<Self, Error> {
        let ty = param.ty.trim();
        if let Some(suffix) = ty.strip_prefix("tuple") {
            let members = param
                .components
                .iter()
                .map(Self::from_param)
                .collect::<Result<Vec<_>, _>>()?;
            return Self::wrap_array_suffixes(Self::Tuple(members), suffix, ty);
        }
        Self::parse(ty)
    }

    /// Applies a chain of `[k]`/`[]` suffixes to `base`, innermost first.
    fn wrap_array_suffixes(base: Self, suffixes: &str, full: &str) -> Result<Self, Error> {
        let mut ty = base;
        let mut rest = suffixes;
        while !rest.is_empty() {
            let close = match (rest.starts_with('['), rest.find(']')) {
                (true, Some(close)) => close,
                _ => return Err(Error::InvalidType(full.to_string())),
            };
            let size = &rest[1..close];
            ty = if size.is_empty() {
                Self::Array(Box::new(ty))
            } else {
                let size = size
                    .parse::<usize>()
                    .map_err(|_| Error::InvalidType(full.to_string()))?;
                Self::FixedArray(Box::new(ty), size)
            };
            rest = &rest[close + 1..];
        }
        Ok(ty)
    }

    /// Whether the type has a fixed encoded width and is inlined in place.
    ///
    /// `bytes`, `string` and `T[]` are always dynamic; fixed arrays and
    /// tuples are dynamic iff any constituent type is.
    pub fn is_static(&self) -> bool {
        match self {
            Self::Bytes | Self::String | Self::Array(_) => false,
            Self::FixedArray(element, _) => element.is_static(),
            Self::Tuple(members) => members.iter().all(Self::is_static),
            _ => true,
        }
    }

    /// Whether the type is encoded out-of-line behind an offset pointer.
    pub fn is_dynamic(&self) -> bool {
        !self.is_static()
    }

    /// The number of 32-byte head slots the type occupies.
    ///
    /// Dynamic types occupy exactly one head slot (the offset pointer);
    /// static types occupy their full inlined width.
    pub fn head_words(&self) -> usize {
        if self.is_dynamic() {
            return 1;
        }
        match self {
            Self::FixedArray(element, size) => element.head_words() * size,
            Self::Tuple(members) => members.iter().map(Self::head_words).sum(),
            _ => 1,
        }
    }

    /// The element type and optional fixed size, if this is an array type.
    pub fn element_type(&self) -> Option<(&Self, Option<usize>)> {
        match self {
            Self::Array(element) => Some((element, None)),
            Self::FixedArray(element, size) => Some((element, Some(*size))),
            _ => None,
        }
    }

    /// Whether the type can be represented in packed encoding.
    ///
    /// Scalars, `bytes` and `string` pack at natural width; arrays pack one
    /// 32-byte slot per element and so only admit static scalar elements.
    /// Tuples and nested arrays have no packed representation.
    pub fn supports_packed(&self) -> bool {
        match self {
            Self::Tuple(_) => false,
            Self::Array(element) | Self::FixedArray(element, _) => {
                matches!(
                    **element,
                    Self::Uint(_) |
                        Self::Int(_) |
                        Self::Bool |
                        Self::Address |
                        Self::FixedBytes(_)
                )
            }
            _ => true,
        }
    }

    /// The natural (minimal) byte width of a scalar type in packed encoding.
    ///
    /// `None` for types whose packed width depends on the value or which do
    /// not pack at all.
    pub fn packed_width(&self) -> Option<usize> {
        match self {
            Self::Uint(bits) | Self::Int(bits) => Some(bits / 8),
            Self::Bool => Some(1),
            Self::Address => Some(20),
            Self::FixedBytes(size) => Some(*size),
            _ => None,
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::Bool => write!(f, "bool"),
            Self::Address => write!(f, "address"),
            Self::FixedBytes(size) => write!(f, "bytes{size}"),
            Self::Bytes => write!(f, "bytes"),
            Self::String => write!(f, "string"),
            Self::FixedArray(element, size) => write!(f, "{element}[{size}]"),
            Self::Array(element) => write!(f, "{element}[]"),
            Self::Tuple(members) => {
                write!(f, "(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{member}")?;
                }
                write!(f, ")")
            }
        }
    }
}
