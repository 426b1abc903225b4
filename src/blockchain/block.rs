use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fmt;

use super::account::{AccountId, Amount};
use super::crypto::{BlockHash, HashFunction};

/// Payload text carried by the genesis block
pub const GENESIS_NOTE: &str = "Genesis Block";

const NOTE_TAG: u8 = 0x00;
const TRANSFER_TAG: u8 = 0x01;

/// A balance movement between two accounts, recorded by id
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferDescriptor {
    pub sender: AccountId,
    pub receiver: AccountId,
    pub amount: Amount,
}

/// Application content carried by a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Free-form text
    Note(String),

    /// A transfer between two accounts
    Transfer(TransferDescriptor),
}

impl Payload {
    pub fn note(text: impl Into<String>) -> Self {
        Payload::Note(text.into())
    }

    /// Tagged byte encoding. Field widths are fixed for transfers and the
    /// enclosing block encoding length-prefixes the whole payload.
    fn canonical_bytes(&self) -> Vec<u8> {
        match self {
            Payload::Note(text) => {
                let mut bytes = Vec::with_capacity(1 + text.len());
                bytes.push(NOTE_TAG);
                bytes.extend_from_slice(text.as_bytes());
                bytes
            }
            Payload::Transfer(transfer) => {
                let mut bytes = Vec::with_capacity(1 + 8 + 8 + 8);
                bytes.push(TRANSFER_TAG);
                bytes.extend_from_slice(&transfer.sender.0.to_be_bytes());
                bytes.extend_from_slice(&transfer.receiver.0.to_be_bytes());
                bytes.extend_from_slice(&transfer.amount.to_bits().to_be_bytes());
                bytes
            }
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Note(text) => write!(f, "{}", text),
            Payload::Transfer(t) => write!(f, "{} -> {} : {}", t.sender, t.receiver, t.amount),
        }
    }
}

/// Why a block failed a structural check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StructuralDefect {
    #[error("non-genesis block has index 0")]
    ZeroIndex,

    #[error("expected index {expected}, found {found}")]
    IndexOutOfSequence { expected: u64, found: u64 },

    #[error("predecessor index {0} has no successor")]
    IndexOverflow(u64),

    #[error("transfer amount is negative or not finite")]
    InvalidAmount,

    #[error("sender and receiver are the same account")]
    SelfTransfer,

    #[error("genesis block must have index 0 and the sentinel predecessor")]
    InvalidGenesis,
}

/// The invariant a block violates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ViolationKind {
    #[error("stored hash does not match the recomputed hash")]
    BadHash,

    #[error("previous hash does not match the predecessor's hash")]
    BadLinkage,

    #[error("bad structure: {0}")]
    BadStructure(StructuralDefect),
}

/// Represents an immutable record in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain, genesis is 0
    index: u64,

    /// Wall-clock time when the block was created
    timestamp: DateTime<Utc>,

    payload: Payload,

    /// Hash of the previous block, or the sentinel for genesis
    previous_hash: BlockHash,

    /// Digest over the other four fields
    hash: BlockHash,
}

impl Block {
    /// Creates a new block and computes its hash
    ///
    /// # Arguments
    ///
    /// * `index` - The index of the block in the chain
    /// * `timestamp` - Creation time
    /// * `payload` - Note or transfer carried by the block
    /// * `previous_hash` - The hash of the previous block
    /// * `hasher` - Digest used for the block hash
    pub fn new<H: HashFunction + ?Sized>(
        index: u64,
        timestamp: DateTime<Utc>,
        payload: Payload,
        previous_hash: BlockHash,
        hasher: &H,
    ) -> Self {
        let mut block = Block {
            index,
            timestamp,
            payload,
            previous_hash,
            hash: BlockHash(String::new()),
        };
        block.hash = block.calculate_hash(hasher);
        block
    }

    /// Builds the genesis block: index 0, sentinel predecessor, fixed note
    pub fn genesis<H: HashFunction + ?Sized>(timestamp: DateTime<Utc>, hasher: &H) -> Self {
        Block::new(
            0,
            timestamp,
            Payload::note(GENESIS_NOTE),
            BlockHash::sentinel(),
            hasher,
        )
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn previous_hash(&self) -> &BlockHash {
        &self.previous_hash
    }

    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    /// Recomputes the hash from the block's fields
    pub fn calculate_hash<H: HashFunction + ?Sized>(&self, hasher: &H) -> BlockHash {
        hasher.digest(&self.canonical_bytes())
    }

    /// Length-prefixed encoding of `(index, payload, previous_hash, timestamp)`.
    ///
    /// Every field is written as an 8-byte big-endian length followed by its
    /// bytes, so distinct field tuples never share an encoding.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let timestamp = self.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true);

        let mut bytes = Vec::new();
        put_field(&mut bytes, &self.index.to_be_bytes());
        put_field(&mut bytes, &self.payload.canonical_bytes());
        put_field(&mut bytes, self.previous_hash.as_str().as_bytes());
        put_field(&mut bytes, timestamp.as_bytes());
        bytes
    }

    /// Checks a non-genesis block in isolation
    pub fn check_structure<H: HashFunction + ?Sized>(&self, hasher: &H) -> Result<(), ViolationKind> {
        if self.index == 0 {
            return Err(ViolationKind::BadStructure(StructuralDefect::ZeroIndex));
        }
        self.check_payload()?;
        self.check_hash(hasher)
    }

    /// Checks the block as the first entry of a chain
    pub fn check_genesis<H: HashFunction + ?Sized>(&self, hasher: &H) -> Result<(), ViolationKind> {
        if !self.is_genesis() {
            return Err(ViolationKind::BadStructure(StructuralDefect::InvalidGenesis));
        }
        self.check_payload()?;
        self.check_hash(hasher)
    }

    pub fn is_structurally_valid<H: HashFunction + ?Sized>(&self, hasher: &H) -> bool {
        self.check_structure(hasher).is_ok()
    }

    /// True iff this block names `predecessor` as its parent
    pub fn is_chained_to(&self, predecessor: &Block) -> bool {
        self.previous_hash == predecessor.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash.is_sentinel()
    }

    fn check_payload(&self) -> Result<(), ViolationKind> {
        if let Payload::Transfer(transfer) = &self.payload {
            if !transfer.amount.is_finite() || transfer.amount < 0.0 {
                return Err(ViolationKind::BadStructure(StructuralDefect::InvalidAmount));
            }
            if transfer.sender == transfer.receiver {
                return Err(ViolationKind::BadStructure(StructuralDefect::SelfTransfer));
            }
        }
        Ok(())
    }

    fn check_hash<H: HashFunction + ?Sized>(&self, hasher: &H) -> Result<(), ViolationKind> {
        if self.hash != self.calculate_hash(hasher) {
            return Err(ViolationKind::BadHash);
        }
        Ok(())
    }
}

fn put_field(out: &mut Vec<u8>, field: &[u8]) {
    out.extend_from_slice(&(field.len() as u64).to_be_bytes());
    out.extend_from_slice(field);
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Index: {}", self.index)?;
        writeln!(f, "Timestamp: {}", self.timestamp.to_rfc3339())?;
        writeln!(f, "Payload: {}", self.payload)?;
        writeln!(f, "Hash: {}", self.hash)?;
        write!(f, "Prev Hash: {}", self.previous_hash)
    }
}

#[cfg(test)]
impl Block {
    /// Copy of this block with `payload` swapped in and the stale hash kept
    pub(crate) fn with_payload(&self, payload: Payload) -> Block {
        Block {
            payload,
            ..self.clone()
        }
    }

    pub(crate) fn with_timestamp(&self, timestamp: DateTime<Utc>) -> Block {
        Block {
            timestamp,
            ..self.clone()
        }
    }

    pub(crate) fn with_previous_hash(&self, previous_hash: BlockHash) -> Block {
        Block {
            previous_hash,
            ..self.clone()
        }
    }

    /// Copy of this block with its hash recomputed
    pub(crate) fn rehashed<H: HashFunction + ?Sized>(mut self, hasher: &H) -> Block {
        self.hash = self.calculate_hash(hasher);
        self
    }
}
