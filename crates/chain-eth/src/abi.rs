//! Solidity ABI encoding and decoding for EVM contract calls.
//!
//! Covers the type system a contract interface can describe: elementary
//! types, dynamic `string`/`bytes`, arrays and tuples. Values travel as
//! [`Token`]s; their shapes are described by [`ParamType`]s.

use alloy_primitives::U256;
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Size of one ABI word.
const WORD: usize = 32;

/// The type of a single ABI parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Address,
    /// Unsigned integer with the given bit width.
    Uint(usize),
    /// Signed integer with the given bit width.
    Int(usize),
    Bool,
    String,
    Bytes,
    /// `bytesN` with `1 <= N <= 32`.
    FixedBytes(usize),
    /// `T[]`
    Array(Box<ParamType>),
    /// `T[k]`
    FixedArray(Box<ParamType>, usize),
    /// `(T1,T2,...)`
    Tuple(Vec<ParamType>),
}

/// A single ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address([u8; 20]),
    Uint(U256),
    /// Two's complement representation of a signed integer.
    Int(U256),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    FixedBytes(Vec<u8>),
    Array(Vec<Token>),
    FixedArray(Vec<Token>),
    Tuple(Vec<Token>),
}

impl ParamType {
    /// Parses a canonical Solidity type string such as `uint256`,
    /// `address[]` or `(string,address)[]`.
    pub fn parse(ty: &str) -> Result<Self, EthError> {
        let ty = ty.trim();

        if let Some(prefix) = ty.strip_suffix(']') {
            let open = prefix
                .rfind('[')
                .ok_or_else(|| EthError::InvalidAbiType(ty.to_string()))?;
            let inner = Self::parse(&prefix[..open])?;
            let size = &prefix[open + 1..];
            if size.is_empty() {
                return Ok(Self::Array(Box::new(inner)));
            }
            let len = size
                .parse::<usize>()
                .map_err(|_| EthError::InvalidAbiType(ty.to_string()))?;
            return Ok(Self::FixedArray(Box::new(inner), len));
        }

        if let Some(body) = ty.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            let members = split_top_level(body)
                .into_iter()
                .map(Self::parse)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::Tuple(members));
        }

        match ty {
            "address" => Ok(Self::Address),
            "bool" => Ok(Self::Bool),
            "string" => Ok(Self::String),
            "bytes" => Ok(Self::Bytes),
            "uint" => Ok(Self::Uint(256)),
            "int" => Ok(Self::Int(256)),
            _ => {
                if let Some(bits) = ty.strip_prefix("uint") {
                    return parse_bits(bits, ty).map(Self::Uint);
                }
                if let Some(bits) = ty.strip_prefix("int") {
                    return parse_bits(bits, ty).map(Self::Int);
                }
                if let Some(len) = ty.strip_prefix("bytes") {
                    return match len.parse::<usize>() {
                        Ok(n) if (1..=32).contains(&n) => Ok(Self::FixedBytes(n)),
                        _ => Err(EthError::InvalidAbiType(ty.to_string())),
                    };
                }
                Err(EthError::InvalidAbiType(ty.to_string()))
            }
        }
    }

    /// The canonical type string used in function signatures.
    pub fn canonical(&self) -> String {
        match self {
            Self::Address => "address".into(),
            Self::Uint(bits) => format!("uint{bits}"),
            Self::Int(bits) => format!("int{bits}"),
            Self::Bool => "bool".into(),
            Self::String => "string".into(),
            Self::Bytes => "bytes".into(),
            Self::FixedBytes(n) => format!("bytes{n}"),
            Self::Array(inner) => format!("{}[]", inner.canonical()),
            Self::FixedArray(inner, n) => format!("{}[{n}]", inner.canonical()),
            Self::Tuple(members) => {
                let parts: Vec<String> = members.iter().map(Self::canonical).collect();
                format!("({})", parts.join(","))
            }
        }
    }

    /// Whether values of this type are encoded out of line.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::String | Self::Bytes | Self::Array(_) => true,
            Self::FixedArray(inner, n) => *n > 0 && inner.is_dynamic(),
            Self::Tuple(members) => members.iter().any(Self::is_dynamic),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head of an enclosing sequence.
    fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return WORD;
        }
        match self {
            Self::FixedArray(inner, n) => inner.head_size() * n,
            Self::Tuple(members) => members.iter().map(Self::head_size).sum(),
            _ => WORD,
        }
    }

    /// Whether `token` is a value of this type.
    pub fn matches(&self, token: &Token) -> bool {
        match (self, token) {
            (Self::Address, Token::Address(_))
            | (Self::Uint(_), Token::Uint(_))
            | (Self::Int(_), Token::Int(_))
            | (Self::Bool, Token::Bool(_))
            | (Self::String, Token::String(_))
            | (Self::Bytes, Token::Bytes(_)) => true,
            (Self::FixedBytes(n), Token::FixedBytes(b)) => b.len() == *n,
            (Self::Array(inner), Token::Array(items)) => items.iter().all(|t| inner.matches(t)),
            (Self::FixedArray(inner, n), Token::FixedArray(items)) => {
                items.len() == *n && items.iter().all(|t| inner.matches(t))
            }
            (Self::Tuple(members), Token::Tuple(items)) => {
                members.len() == items.len()
                    && members.iter().zip(items).all(|(ty, t)| ty.matches(t))
            }
            _ => false,
        }
    }
}

impl Token {
    /// Whether this value is encoded out of line.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::String(_) | Self::Bytes(_) | Self::Array(_) => true,
            Self::FixedArray(items) | Self::Tuple(items) => items.iter().any(Self::is_dynamic),
            _ => false,
        }
    }

    pub fn into_address(self) -> Option<[u8; 20]> {
        match self {
            Self::Address(addr) => Some(addr),
            _ => None,
        }
    }

    pub fn into_uint(self) -> Option<U256> {
        match self {
            Self::Uint(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_bool(self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Elements of a dynamic or fixed-size array.
    pub fn into_array(self) -> Option<Vec<Token>> {
        match self {
            Self::Array(items) | Self::FixedArray(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_tuple(self) -> Option<Vec<Token>> {
        match self {
            Self::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

/// Computes the 4-byte selector of a canonical function signature such as
/// `getMessages(address)`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// Encodes a function call as `selector || encode(params)`.
pub fn encode_function_call(selector: [u8; 4], params: &[Token]) -> Vec<u8> {
    let body = encode(params);
    let mut data = Vec::with_capacity(4 + body.len());
    data.extend_from_slice(&selector);
    data.extend_from_slice(&body);
    data
}

/// ABI-encodes a sequence of tokens as a tuple (head followed by tail).
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len: usize = tokens.iter().map(token_head_size).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend_from_slice(&encode_token(token));
        } else {
            head.extend_from_slice(&encode_token(token));
        }
    }

    head.extend_from_slice(&tail);
    head
}

fn token_head_size(token: &Token) -> usize {
    if token.is_dynamic() {
        return WORD;
    }
    match token {
        Token::FixedArray(items) | Token::Tuple(items) => items.iter().map(token_head_size).sum(),
        _ => WORD,
    }
}

fn encode_token(token: &Token) -> Vec<u8> {
    match token {
        Token::Address(addr) => {
            // Left-pad: 12 zero bytes + 20 address bytes.
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(addr);
            word.to_vec()
        }
        Token::Uint(value) | Token::Int(value) => value.to_be_bytes::<WORD>().to_vec(),
        Token::Bool(value) => {
            let mut word = [0u8; WORD];
            word[31] = u8::from(*value);
            word.to_vec()
        }
        Token::String(value) => encode_dynamic_bytes(value.as_bytes()),
        Token::Bytes(value) => encode_dynamic_bytes(value),
        Token::FixedBytes(value) => {
            // Right-pad, truncating anything past one word.
            let mut word = [0u8; WORD];
            let len = value.len().min(WORD);
            word[..len].copy_from_slice(&value[..len]);
            word.to_vec()
        }
        Token::Array(items) => {
            let mut out = usize_word(items.len()).to_vec();
            out.extend_from_slice(&encode(items));
            out
        }
        Token::FixedArray(items) | Token::Tuple(items) => encode(items),
    }
}

fn encode_dynamic_bytes(bytes: &[u8]) -> Vec<u8> {
    let padded_len = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded_len);
    out.extend_from_slice(&usize_word(bytes.len()));
    out.extend_from_slice(bytes);
    out.resize(WORD + padded_len, 0);
    out
}

fn usize_word(value: usize) -> [u8; WORD] {
    U256::from(value).to_be_bytes::<WORD>()
}

/// Decodes ABI data laid out as a tuple of `types`.
///
/// Every offset and length is bounds-checked against `data`, and the total
/// number of bytes read may not exceed `data.len()`, so offsets that alias
/// the same region cannot multiply the decoded size. Malformed input yields
/// [`EthError::DecodingError`].
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, EthError> {
    let mut decoder = Decoder {
        data,
        budget: data.len(),
    };
    decoder.sequence(types, 0)
}

struct Decoder<'a> {
    data: &'a [u8],
    /// Bytes that may still be read.
    budget: usize,
}

impl<'a> Decoder<'a> {
    fn sequence(&mut self, types: &[ParamType], base: usize) -> Result<Vec<Token>, EthError> {
        let mut tokens = Vec::with_capacity(types.len());
        let mut cursor = base;

        for ty in types {
            if ty.is_dynamic() {
                let offset = self.read_usize(cursor)?;
                let at = base
                    .checked_add(offset)
                    .ok_or_else(|| EthError::DecodingError("offset overflow".into()))?;
                tokens.push(self.token(ty, at)?);
            } else {
                tokens.push(self.token(ty, cursor)?);
            }
            cursor += ty.head_size();
        }

        Ok(tokens)
    }

    fn token(&mut self, ty: &ParamType, at: usize) -> Result<Token, EthError> {
        match ty {
            ParamType::Address => {
                let word = self.read_word(at)?;
                let mut addr = [0u8; 20];
                addr.copy_from_slice(&word[12..]);
                Ok(Token::Address(addr))
            }
            ParamType::Uint(_) => Ok(Token::Uint(U256::from_be_slice(self.read_word(at)?))),
            ParamType::Int(_) => Ok(Token::Int(U256::from_be_slice(self.read_word(at)?))),
            ParamType::Bool => {
                let word = self.read_word(at)?;
                Ok(Token::Bool(word.iter().any(|&b| b != 0)))
            }
            ParamType::FixedBytes(n) => Ok(Token::FixedBytes(self.read_word(at)?[..*n].to_vec())),
            ParamType::String => {
                let bytes = self.read_dynamic_bytes(at)?;
                String::from_utf8(bytes)
                    .map(Token::String)
                    .map_err(|e| EthError::DecodingError(format!("invalid utf-8 string: {e}")))
            }
            ParamType::Bytes => self.read_dynamic_bytes(at).map(Token::Bytes),
            ParamType::Array(inner) => {
                let len = self.read_usize(at)?;
                let start = at + WORD;
                // Every element needs at least one head word.
                let available = self.data.len().saturating_sub(start) / WORD;
                if len > available {
                    return Err(EthError::DecodingError(format!(
                        "array length {len} exceeds available data"
                    )));
                }
                let types = vec![(**inner).clone(); len];
                self.sequence(&types, start).map(Token::Array)
            }
            ParamType::FixedArray(inner, n) => {
                let types = vec![(**inner).clone(); *n];
                self.sequence(&types, at).map(Token::FixedArray)
            }
            ParamType::Tuple(members) => self.sequence(members, at).map(Token::Tuple),
        }
    }

    fn charge(&mut self, len: usize) -> Result<(), EthError> {
        self.budget = self.budget.checked_sub(len).ok_or_else(|| {
            EthError::DecodingError(format!(
                "decoded size exceeds input ({} bytes); offsets overlap",
                self.data.len()
            ))
        })?;
        Ok(())
    }

    fn read_word(&mut self, at: usize) -> Result<&'a [u8], EthError> {
        let end = at
            .checked_add(WORD)
            .ok_or_else(|| EthError::DecodingError("offset overflow".into()))?;
        let data = self.data;
        let word = data.get(at..end).ok_or_else(|| {
            EthError::DecodingError(format!(
                "word at offset {at} out of bounds (data is {} bytes)",
                data.len()
            ))
        })?;
        self.charge(WORD)?;
        Ok(word)
    }

    fn read_usize(&mut self, at: usize) -> Result<usize, EthError> {
        let value = U256::from_be_slice(self.read_word(at)?);
        u64::try_from(value)
            .ok()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| EthError::DecodingError(format!("length or offset too large: {value}")))
    }

    fn read_dynamic_bytes(&mut self, at: usize) -> Result<Vec<u8>, EthError> {
        let len = self.read_usize(at)?;
        let start = at + WORD;
        let end = start
            .checked_add(len)
            .ok_or_else(|| EthError::DecodingError("length overflow".into()))?;
        let data = self.data;
        let bytes = data.get(start..end).ok_or_else(|| {
            EthError::DecodingError(format!("{len} bytes at offset {start} out of bounds"))
        })?;
        self.charge(len)?;
        Ok(bytes.to_vec())
    }
}

fn parse_bits(bits: &str, ty: &str) -> Result<usize, EthError> {
    match bits.parse::<usize>() {
        Ok(n) if n > 0 && n <= 256 && n % 8 == 0 => Ok(n),
        _ => Err(EthError::InvalidAbiType(ty.to_string())),
    }
}

/// Splits a tuple body on commas that are not nested in parentheses.
fn split_top_level(body: &str) -> Vec<&str> {
    if body.trim().is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}
