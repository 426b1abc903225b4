// Blockchain module
//
// This module contains the ledger core:
// - Block structure and canonical hashing
// - Blockchain structure and chain validation
// - Accounts and balance transfers
// - Pluggable hash functions
// - A lock-guarded handle for shared use

pub mod account;
pub mod block;
pub mod chain;
pub mod crypto;
pub mod shared;

// Re-export main components for easier access
pub use account::{Account, AccountError, AccountId, Amount, TransferReceipt};
pub use block::{Block, Payload, StructuralDefect, TransferDescriptor, ViolationKind};
pub use chain::{Blockchain, BlockchainError, ValidationResult};
pub use crypto::{BlockHash, HashAlgorithm, HashFunction, Sha256Hasher, Sha512Hasher};
pub use shared::SharedBlockchain;
