//! Account-related types for the balance engine
//!
//! An `Account` is a plain value: an account number and a balance. It carries
//! no lock of its own. Mutual exclusion lives in the
//! [`LockRegistry`](crate::core::LockRegistry) and is applied by the engine.

use super::error::BalanceError;
use super::money::Money;

/// Account number
///
/// Opaque, unique, immutable after creation. Lock ordering for transfers uses
/// plain lexicographic comparison of these strings.
pub type AccountNumber = String;

/// Account state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    account_number: AccountNumber,
    balance: Money,
}

impl Account {
    /// Create an account with an opening balance
    pub fn new(account_number: impl Into<AccountNumber>, balance: Money) -> Self {
        Account {
            account_number: account_number.into(),
            balance,
        }
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Credit `amount`
    ///
    /// Fails with `ArithmeticOverflow` if the balance would leave the decimal
    /// range; the balance is unchanged in that case.
    pub fn deposit(&mut self, amount: Money) -> Result<(), BalanceError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| BalanceError::arithmetic_overflow("deposit", &self.account_number))?;
        Ok(())
    }

    /// Debit `amount`
    ///
    /// Fails with `InsufficientFunds` if `amount` exceeds the balance; the
    /// balance is unchanged in that case.
    pub fn withdraw(&mut self, amount: Money) -> Result<(), BalanceError> {
        self.balance = self.balance.checked_sub(amount).ok_or_else(|| {
            BalanceError::insufficient_funds(
                &self.account_number,
                self.balance.value(),
                amount.value(),
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use rust_decimal::Decimal;

    fn money(units: i64) -> Money {
        Money::new(Decimal::new(units, 0)).unwrap()
    }

    #[test]
    fn test_new_account() {
        let account = Account::new("12345", money(1000));
        assert_eq!(account.account_number(), "12345");
        assert_eq!(account.balance(), money(1000));
    }

    #[test]
    fn test_deposit_then_withdraw() {
        let mut account = Account::new("12345", money(1000));

        account.deposit(money(200)).unwrap();
        assert_eq!(account.balance(), money(1200));

        account.withdraw(money(100)).unwrap();
        assert_eq!(account.balance(), money(1100));
    }

    #[test]
    fn test_withdraw_entire_balance() {
        let mut account = Account::new("12345", money(100));
        account.withdraw(money(100)).unwrap();
        assert!(account.balance().is_zero());
    }

    #[test]
    fn test_withdraw_insufficient_funds_leaves_balance() {
        let mut account = Account::new("12345", money(100));

        let err = account.withdraw(money(200)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert_eq!(
            err,
            BalanceError::insufficient_funds("12345", Decimal::new(100, 0), Decimal::new(200, 0))
        );
        assert_eq!(account.balance(), money(100));
    }

    #[test]
    fn test_deposit_overflow_leaves_balance() {
        let max = Money::new(Decimal::MAX).unwrap();
        let mut account = Account::new("12345", max);

        let err = account.deposit(money(1)).unwrap_err();

        assert!(matches!(err, BalanceError::ArithmeticOverflow { .. }));
        assert_eq!(account.balance(), max);
    }
}
