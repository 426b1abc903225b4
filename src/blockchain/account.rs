use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fmt;

use super::block::{Payload, TransferDescriptor};

/// Monetary amount. Balances are kept as `f64`.
pub type Amount = f64;

/// Errors that can occur during account operations
#[derive(Debug, Error, PartialEq)]
pub enum AccountError {
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    #[error("Invalid amount: {0}")]
    InvalidAmount(Amount),
}

/// Stable identifier recorded in block payloads in place of the account itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a named balance holder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    name: String,
    balance: Amount,
    id: AccountId,
}

/// Outcome of a successful transfer, used to build a block payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferReceipt {
    pub sender: AccountId,
    pub receiver: AccountId,
    pub amount: Amount,
    pub sender_balance: Amount,
    pub receiver_balance: Amount,
}

impl TransferReceipt {
    /// Converts the receipt into the payload recorded on the ledger
    pub fn to_payload(&self) -> Payload {
        Payload::Transfer(TransferDescriptor {
            sender: self.sender,
            receiver: self.receiver,
            amount: self.amount,
        })
    }
}

impl Account {
    /// Creates a new account
    ///
    /// # Arguments
    ///
    /// * `name` - Display name of the holder
    /// * `initial_balance` - Opening balance
    /// * `id` - Identifier recorded on the ledger
    pub fn new(name: impl Into<String>, initial_balance: Amount, id: AccountId) -> Self {
        Account {
            name: name.into(),
            balance: initial_balance,
            id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Checks if the account can cover `amount`
    pub fn has_sufficient_funds(&self, amount: Amount) -> bool {
        self.balance >= amount
    }

    /// Moves `amount` from this account to `other`
    ///
    /// Both balances are left untouched when the amount is invalid or the
    /// balance does not cover it.
    ///
    /// # Returns
    ///
    /// A receipt with both resulting balances
    pub fn transfer(
        &mut self,
        other: &mut Account,
        amount: Amount,
    ) -> Result<TransferReceipt, AccountError> {
        validate_amount(amount)?;

        if !self.has_sufficient_funds(amount) {
            return Err(AccountError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }

        self.balance -= amount;
        other.balance += amount;

        Ok(TransferReceipt {
            sender: self.id,
            receiver: other.id,
            amount,
            sender_balance: self.balance,
            receiver_balance: other.balance,
        })
    }
}

fn validate_amount(amount: Amount) -> Result<(), AccountError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(AccountError::InvalidAmount(amount));
    }
    Ok(())
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{}): {}", self.name, self.id, self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> (Account, Account, Account) {
        (
            Account::new("Alice", 5000.0, AccountId(1)),
            Account::new("Bob", 3000.0, AccountId(2)),
            Account::new("Charlie", 1000.0, AccountId(3)),
        )
    }

    #[test]
    fn test_account_creation() {
        let account = Account::new("Alice", 5000.0, AccountId(1));

        assert_eq!(account.name(), "Alice");
        assert_eq!(account.balance(), 5000.0);
        assert_eq!(account.id(), AccountId(1));
    }

    #[test]
    fn test_transfer_conserves_balance() {
        let (mut alice, mut bob, _) = accounts();
        let total_before = alice.balance() + bob.balance();

        let receipt = alice.transfer(&mut bob, 1000.0).unwrap();

        assert_eq!(alice.balance(), 4000.0);
        assert_eq!(bob.balance(), 4000.0);
        assert_eq!(alice.balance() + bob.balance(), total_before);
        assert_eq!(receipt.sender, AccountId(1));
        assert_eq!(receipt.receiver, AccountId(2));
        assert_eq!(receipt.amount, 1000.0);
        assert_eq!(receipt.sender_balance, 4000.0);
        assert_eq!(receipt.receiver_balance, 4000.0);
    }

    #[test]
    fn test_insufficient_funds_leaves_balances_unchanged() {
        let (mut alice, _, mut charlie) = accounts();

        let result = charlie.transfer(&mut alice, 2000.0);

        assert_eq!(
            result,
            Err(AccountError::InsufficientFunds {
                requested: 2000.0,
                available: 1000.0,
            })
        );
        assert_eq!(charlie.balance(), 1000.0);
        assert_eq!(alice.balance(), 5000.0);
    }

    #[test]
    fn test_exact_balance_can_be_transferred() {
        let (_, mut bob, mut charlie) = accounts();

        charlie.transfer(&mut bob, 1000.0).unwrap();

        assert_eq!(charlie.balance(), 0.0);
        assert_eq!(bob.balance(), 4000.0);
    }

    #[test]
    fn test_invalid_amounts_are_rejected() {
        let (mut alice, mut bob, _) = accounts();

        assert_eq!(
            alice.transfer(&mut bob, -1.0),
            Err(AccountError::InvalidAmount(-1.0))
        );
        assert!(matches!(
            alice.transfer(&mut bob, f64::NAN),
            Err(AccountError::InvalidAmount(_))
        ));
        assert_eq!(alice.balance(), 5000.0);
        assert_eq!(bob.balance(), 3000.0);
    }

    #[test]
    fn test_sum_is_invariant_over_sequence() {
        let (mut alice, mut bob, mut charlie) = accounts();
        let total = alice.balance() + bob.balance() + charlie.balance();

        alice.transfer(&mut bob, 1000.0).unwrap();
        bob.transfer(&mut charlie, 500.0).unwrap();
        assert!(charlie.transfer(&mut alice, 2000.0).is_err());
        charlie.transfer(&mut alice, 1500.0).unwrap();

        assert_eq!(alice.balance() + bob.balance() + charlie.balance(), total);
    }

    #[test]
    fn test_receipt_to_payload() {
        let (mut alice, mut bob, _) = accounts();
        let receipt = alice.transfer(&mut bob, 250.0).unwrap();

        assert_eq!(
            receipt.to_payload(),
            Payload::Transfer(TransferDescriptor {
                sender: AccountId(1),
                receiver: AccountId(2),
                amount: 250.0,
            })
        );
    }
}
