//! Decoding of raw `eth_call` return data.
//!
//! Every read goes through [`AbiCursor`], which bounds-checks the word it
//! touches and, for dynamic values, the `[length][data]` block the head word
//! points to. Truncated or garbled data is an [`AbiDecodeError`], never a
//! silent truncation.

use alloy_primitives::aliases::{U48, U160};
use alloy_primitives::{Address, B256, U256, Uint};

const WORD: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum AbiDecodeError {
    /// A read of `needed` bytes at `offset` runs past the return data.
    #[error("Return data too short: need {needed} bytes at offset {offset}, have {available}")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// A narrowing integer decode found non-zero bits above the declared width.
    #[error("Value {value} does not fit into uint{bits}")]
    ValueOutOfRange { bits: usize, value: U256 },
    /// An address word carries non-zero bytes above the low 20.
    #[error("Address word has dirty high bytes: {0}")]
    DirtyAddress(B256),
}

/// Read-only view over ABI return data, addressed by 32-byte head slot.
#[derive(Debug, Clone, Copy)]
pub struct AbiCursor<'a> {
    data: &'a [u8],
}

impl<'a> AbiCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn slice(&self, offset: usize, needed: usize) -> Result<&'a [u8], AbiDecodeError> {
        let out_of_bounds = || AbiDecodeError::OutOfBounds {
            offset,
            needed,
            available: self.data.len(),
        };
        let end = offset.checked_add(needed).ok_or_else(out_of_bounds)?;
        self.data.get(offset..end).ok_or_else(out_of_bounds)
    }

    fn word_at_byte(&self, offset: usize) -> Result<B256, AbiDecodeError> {
        self.slice(offset, WORD).map(B256::from_slice)
    }

    /// The head word in slot `index`.
    pub fn word(&self, index: usize) -> Result<B256, AbiDecodeError> {
        let offset = index.checked_mul(WORD).unwrap_or(usize::MAX);
        self.word_at_byte(offset)
    }

    pub fn uint256_at(&self, index: usize) -> Result<U256, AbiDecodeError> {
        self.word(index).map(|word| U256::from_be_bytes(word.0))
    }

    /// Narrowing read of slot `index` into a `BITS`-wide unsigned integer.
    pub fn uint_at<const BITS: usize, const LIMBS: usize>(
        &self,
        index: usize,
    ) -> Result<Uint<BITS, LIMBS>, AbiDecodeError> {
        let value = self.uint256_at(index)?;
        if value.bit_len() > BITS {
            return Err(AbiDecodeError::ValueOutOfRange { bits: BITS, value });
        }
        let word = value.to_be_bytes::<32>();
        // Only the low `Uint::BYTES` bytes can be non-zero past the width check.
        Uint::<BITS, LIMBS>::try_from_be_slice(&word[WORD - Uint::<BITS, LIMBS>::BYTES..])
            .ok_or(AbiDecodeError::ValueOutOfRange { bits: BITS, value })
    }

    pub fn address_at(&self, index: usize) -> Result<Address, AbiDecodeError> {
        let word = self.word(index)?;
        if word[..12].iter().any(|b| *b != 0) {
            return Err(AbiDecodeError::DirtyAddress(word));
        }
        Ok(Address::from_word(word))
    }

    /// Follows the byte offset in slot `index` to its dynamic block.
    fn dynamic_offset(&self, index: usize) -> Result<usize, AbiDecodeError> {
        let offset = self.uint256_at(index)?;
        // An offset that does not even fit the data length can never be read.
        if offset > U256::from(self.data.len()) {
            return Err(AbiDecodeError::OutOfBounds {
                offset: usize::MAX,
                needed: WORD,
                available: self.data.len(),
            });
        }
        Ok(offset.to::<usize>())
    }

    fn length_at_byte(&self, offset: usize) -> Result<usize, AbiDecodeError> {
        let length = U256::from_be_bytes(self.word_at_byte(offset)?.0);
        if length > U256::from(self.data.len()) {
            return Err(AbiDecodeError::OutOfBounds {
                offset: offset + WORD,
                needed: usize::MAX,
                available: self.data.len(),
            });
        }
        Ok(length.to::<usize>())
    }

    /// Dynamic `string` whose offset lives in slot `index`.
    ///
    /// Bytes map to characters one-to-one by code point; no UTF-8 decoding.
    pub fn string_at_offset_word(&self, index: usize) -> Result<String, AbiDecodeError> {
        let offset = self.dynamic_offset(index)?;
        let length = self.length_at_byte(offset)?;
        let bytes = self.slice(offset + WORD, length)?;
        Ok(bytes.iter().map(|b| char::from(*b)).collect())
    }

    /// Dynamic `uint256[]` whose offset lives in slot `index`.
    pub fn uint_array_at_offset_word(&self, index: usize) -> Result<Vec<U256>, AbiDecodeError> {
        let offset = self.dynamic_offset(index)?;
        let length = self.length_at_byte(offset)?;
        let start = offset + WORD;
        (0..length)
            .map(|i| {
                self.word_at_byte(start + i * WORD)
                    .map(|word| U256::from_be_bytes(word.0))
            })
            .collect()
    }
}

pub fn decode_uint256(data: &[u8]) -> Result<U256, AbiDecodeError> {
    AbiCursor::new(data).uint256_at(0)
}

pub fn decode_uint160(data: &[u8]) -> Result<U160, AbiDecodeError> {
    AbiCursor::new(data).uint_at(0)
}

pub fn decode_uint48(data: &[u8]) -> Result<U48, AbiDecodeError> {
    AbiCursor::new(data).uint_at(0)
}

pub fn decode_string(data: &[u8]) -> Result<String, AbiDecodeError> {
    AbiCursor::new(data).string_at_offset_word(0)
}

/// The full EIP-5267 `eip712Domain()` return tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip5267Domain {
    /// Bitmap of the populated domain fields (`bytes1`).
    pub fields: u8,
    pub name: String,
    pub version: String,
    pub chain_id: U256,
    pub verifying_contract: Address,
    pub salt: B256,
    pub extensions: Vec<U256>,
}

/// Decodes `(bytes1, string, string, uint256, address, bytes32, uint256[])`.
pub fn decode_eip712_domain(data: &[u8]) -> Result<Eip5267Domain, AbiDecodeError> {
    let cursor = AbiCursor::new(data);
    Ok(Eip5267Domain {
        // bytes1 is left-aligned in its word
        fields: cursor.word(0)?[0],
        name: cursor.string_at_offset_word(1)?,
        version: cursor.string_at_offset_word(2)?,
        chain_id: cursor.uint256_at(3)?,
        verifying_contract: cursor.address_at(4)?,
        salt: cursor.word(5)?,
        extensions: cursor.uint_array_at_offset_word(6)?,
    })
}

/// Raw Permit2 `allowance(owner, token, spender)` return values.
pub fn decode_permit2_allowance(data: &[u8]) -> Result<(U160, U48, U48), AbiDecodeError> {
    let cursor = AbiCursor::new(data);
    Ok((cursor.uint_at(0)?, cursor.uint_at(1)?, cursor.uint_at(2)?))
}
