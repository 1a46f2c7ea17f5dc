//! `CtExtensions` of RFC 6962 section 3.2.
//!
//! The block is a `u16` length followed by the concatenated extension
//! records, each `kind ‖ u16 length ‖ data`. Records keep the order they
//! were given in.

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use crate::codec::WriteLengthPrefixedBytesExt;
use crate::error::{Result, SctError};

/// The largest leaf index that fits the 40-bit extension field.
pub const MAX_LEAF_INDEX: u64 = (1 << 40) - 1;

/// The position of an entry in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeafIndex(u64);

impl LeafIndex {
    pub fn new(value: u64) -> Result<Self> {
        if value > MAX_LEAF_INDEX {
            return Err(SctError::InvalidInput(format!(
                "leaf index {value} does not fit in 40 bits"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// The 5-byte big-endian encoding.
    pub fn to_bytes(self) -> [u8; 5] {
        let mut bytes = [0u8; 5];
        BigEndian::write_uint(&mut bytes, self.0, 5);
        bytes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExtensionType {
    LeafIndex = 0,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub kind: u8,
    pub data: Vec<u8>,
}

impl Extension {
    pub fn leaf_index(index: LeafIndex) -> Self {
        Self {
            kind: ExtensionType::LeafIndex as u8,
            data: index.to_bytes().to_vec(),
        }
    }
}

impl From<LeafIndex> for Extension {
    fn from(index: LeafIndex) -> Self {
        Self::leaf_index(index)
    }
}

/// The extensions carried by an SCT with the given leaf index.
pub fn extensions_for(leaf_index: Option<LeafIndex>) -> Vec<Extension> {
    leaf_index.into_iter().map(Extension::from).collect()
}

/// Encodes `extensions` into a length-prefixed block.
pub fn encode_extensions(extensions: &[Extension]) -> Result<Vec<u8>> {
    let mut records = Vec::new();
    for extension in extensions {
        records.write_u8(extension.kind)?;
        records.write_length_prefixed("extension_data", &extension.data, 2)?;
    }
    let mut block = Vec::with_capacity(records.len() + 2);
    block.write_length_prefixed("extensions", &records, 2)?;
    tracing::debug!(count = extensions.len(), block_len = block.len(), "encoded extensions");
    Ok(block)
}
