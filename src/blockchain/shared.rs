use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::account::{Account, AccountError, Amount};
use super::block::{Block, Payload};
use super::chain::{Blockchain, ValidationResult};
use super::crypto::{HashFunction, Sha512Hasher};

/// A cloneable handle to a blockchain shared between threads
///
/// Appends hold the write lock across reading the tail, hashing and pushing,
/// so two writers can never claim the same predecessor. Reads take the lock
/// in shared mode.
#[derive(Debug)]
pub struct SharedBlockchain<H: HashFunction = Sha512Hasher> {
    inner: Arc<RwLock<Blockchain<H>>>,
}

impl<H: HashFunction> Clone for SharedBlockchain<H> {
    fn clone(&self) -> Self {
        SharedBlockchain {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SharedBlockchain<Sha512Hasher> {
    pub fn new() -> Self {
        SharedBlockchain::from(Blockchain::new())
    }
}

impl Default for SharedBlockchain<Sha512Hasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HashFunction> From<Blockchain<H>> for SharedBlockchain<H> {
    fn from(blockchain: Blockchain<H>) -> Self {
        SharedBlockchain {
            inner: Arc::new(RwLock::new(blockchain)),
        }
    }
}

impl<H: HashFunction> SharedBlockchain<H> {
    // A panicking writer cannot leave a partial block: blocks are pushed whole.
    fn read(&self) -> RwLockReadGuard<'_, Blockchain<H>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Blockchain<H>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, payload: Payload) -> Block {
        self.write().append(payload)
    }

    /// Transfers and appends under one exclusive lock
    pub fn record_transfer(
        &self,
        sender: &mut Account,
        receiver: &mut Account,
        amount: Amount,
    ) -> Result<Block, AccountError> {
        self.write().record_transfer(sender, receiver, amount)
    }

    pub fn validate(&self) -> ValidationResult {
        self.read().validate()
    }

    pub fn latest(&self) -> Block {
        self.read().latest().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copies the current chain
    pub fn snapshot(&self) -> Vec<Block> {
        self.read().blocks().to_vec()
    }
}
