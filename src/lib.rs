//! An append-only, hash-chained ledger.
//!
//! Blocks are bound to their predecessor by a cryptographic digest over an
//! unambiguous encoding of their fields. Accounts move balances between each
//! other and successful transfers are recorded on the chain by account id.

pub mod blockchain;
pub mod config;

pub use blockchain::{
    Account, AccountError, AccountId, Block, Blockchain, Payload, SharedBlockchain,
    ValidationResult, ViolationKind,
};
pub use config::Config;
