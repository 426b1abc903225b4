use chrono::Utc;
use log::{debug, info, warn};
use thiserror::Error;

use std::fmt;

use super::account::{Account, AccountError, Amount};
use super::block::{Block, Payload, StructuralDefect, ViolationKind};
use super::crypto::{HashFunction, Sha512Hasher};

/// Errors that can occur during blockchain operations
#[derive(Debug, Error)]
pub enum BlockchainError {
    #[error("Chain has no genesis block")]
    EmptyChain,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Outcome of a full-chain integrity check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid { at_index: u64, reason: ViolationKind },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationResult::Valid => write!(f, "valid"),
            ValidationResult::Invalid { at_index, reason } => {
                write!(f, "invalid at block {}: {}", at_index, reason)
            }
        }
    }
}

/// Represents the append-only ledger
///
/// The chain always starts with a genesis block and only grows through
/// [`Blockchain::append`]. Appending never consults validity: a chain that
/// fails [`Blockchain::validate`] still accepts new blocks.
#[derive(Debug, Clone)]
pub struct Blockchain<H: HashFunction = Sha512Hasher> {
    /// The chain of blocks, genesis first
    chain: Vec<Block>,

    hasher: H,
}

impl Blockchain<Sha512Hasher> {
    /// Creates a new SHA-512 blockchain with a genesis block
    pub fn new() -> Self {
        Blockchain::with_hasher(Sha512Hasher)
    }
}

impl Default for Blockchain<Sha512Hasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HashFunction> Blockchain<H> {
    /// Creates a new blockchain hashed with `hasher`
    pub fn with_hasher(hasher: H) -> Self {
        let genesis = Self::create_genesis(&hasher);
        debug!("Created genesis block {} using {}", genesis.hash(), hasher.name());

        Blockchain {
            chain: vec![genesis],
            hasher,
        }
    }

    /// Adopts an existing sequence of blocks, for example one read back from JSON
    ///
    /// The blocks are taken as-is; call [`Blockchain::validate`] before
    /// trusting them.
    pub fn from_blocks(blocks: Vec<Block>, hasher: H) -> Result<Self, BlockchainError> {
        if blocks.is_empty() {
            return Err(BlockchainError::EmptyChain);
        }

        Ok(Blockchain {
            chain: blocks,
            hasher,
        })
    }

    /// Creates the genesis block (first block in the chain)
    fn create_genesis(hasher: &H) -> Block {
        Block::genesis(Utc::now(), hasher)
    }

    /// Gets the last block in the chain
    pub fn latest(&self) -> &Block {
        match self.try_latest() {
            Ok(block) => block,
            Err(_) => unreachable!("blockchain is constructed with a genesis block"),
        }
    }

    pub fn try_latest(&self) -> Result<&Block, BlockchainError> {
        self.chain.last().ok_or(BlockchainError::EmptyChain)
    }

    /// Appends a block carrying `payload` after the current tail
    ///
    /// The new index saturates at `u64::MAX`; an imported chain that already
    /// ends there gets a duplicate index, which [`Blockchain::validate`] flags.
    ///
    /// # Returns
    ///
    /// A copy of the newly appended block
    pub fn append(&mut self, payload: Payload) -> Block {
        let previous = self.latest();
        let block = Block::new(
            previous.index().saturating_add(1),
            Utc::now(),
            payload,
            previous.hash().clone(),
            &self.hasher,
        );

        debug!("Appending block {} ({})", block.index(), block.hash());
        self.chain.push(block.clone());
        block
    }

    /// Transfers `amount` from `sender` to `receiver` and records it
    ///
    /// No block is appended when the transfer is rejected.
    pub fn record_transfer(
        &mut self,
        sender: &mut Account,
        receiver: &mut Account,
        amount: Amount,
    ) -> Result<Block, AccountError> {
        match sender.transfer(receiver, amount) {
            Ok(receipt) => {
                let block = self.append(receipt.to_payload());
                info!(
                    "Transaction successful: {} -> {} : {}",
                    sender.name(),
                    receiver.name(),
                    amount
                );
                Ok(block)
            }
            Err(err) => {
                warn!(
                    "Transaction failed: {} -> {} : {} ({})",
                    sender.name(),
                    receiver.name(),
                    amount,
                    err
                );
                Err(err)
            }
        }
    }

    /// Validates the whole chain
    ///
    /// Genesis is checked on its own, then every later block is checked for
    /// structure, hash, linkage and index continuity. The first violation is
    /// reported with its position.
    pub fn validate(&self) -> ValidationResult {
        let Some(genesis) = self.chain.first() else {
            return ValidationResult::Invalid {
                at_index: 0,
                reason: ViolationKind::BadStructure(StructuralDefect::InvalidGenesis),
            };
        };

        if let Err(reason) = genesis.check_genesis(&self.hasher) {
            warn!("Invalid genesis block: {}", reason);
            return ValidationResult::Invalid { at_index: 0, reason };
        }

        for (position, pair) in self.chain.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            if let Err(reason) = Self::check_link(previous, current, &self.hasher) {
                let at_index = position as u64 + 1;
                warn!("Invalid block at index {}: {}", at_index, reason);
                return ValidationResult::Invalid { at_index, reason };
            }
        }

        ValidationResult::Valid
    }

    fn check_link(previous: &Block, current: &Block, hasher: &H) -> Result<(), ViolationKind> {
        current.check_structure(hasher)?;

        if !current.is_chained_to(previous) {
            return Err(ViolationKind::BadLinkage);
        }

        let expected = previous
            .index()
            .checked_add(1)
            .ok_or(ViolationKind::BadStructure(StructuralDefect::IndexOverflow(previous.index())))?;
        if current.index() != expected {
            return Err(ViolationKind::BadStructure(StructuralDefect::IndexOutOfSequence {
                expected,
                found: current.index(),
            }));
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_valid()
    }

    /// Gets the entire blockchain
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn get(&self, position: usize) -> Option<&Block> {
        self.chain.get(position)
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false: the genesis block is never removed
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Exports the chain as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, BlockchainError> {
        serde_json::to_string_pretty(&self.chain)
            .map_err(|e| BlockchainError::Serialization(e.to_string()))
    }

    /// Reads a chain exported by [`Blockchain::to_json`]
    pub fn from_json(json: &str, hasher: H) -> Result<Self, BlockchainError> {
        let blocks: Vec<Block> = serde_json::from_str(json)
            .map_err(|e| BlockchainError::Serialization(e.to_string()))?;

        Self::from_blocks(blocks, hasher)
    }
}
