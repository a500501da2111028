//! Value-transfer primitive.
//!
//! Components never move value themselves. They describe a [`Transfer`] and
//! the store performs it through a [`ValueTransfer`] implementation once the
//! call's state is final. A failed transfer fails, and rolls back, the whole
//! call.

use crate::types::{Money, Principal};
use serde::{Deserialize, Serialize};
use stagepass_core::effect::Interaction;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Why value is moving
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferPurpose {
    /// Payer to ledger, when a payment is processed
    PaymentCollection,
    /// Ledger to organizer
    OrganizerWithdrawal,
    /// Ledger to admin, sweeping platform fees
    PlatformFeeWithdrawal,
}

impl TransferPurpose {
    /// Name used for the interaction and in logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentCollection => "payment_collection",
            Self::OrganizerWithdrawal => "organizer_withdrawal",
            Self::PlatformFeeWithdrawal => "platform_fee_withdrawal",
        }
    }
}

impl fmt::Display for TransferPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One movement of value between principals
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Source account
    pub from: Principal,
    /// Destination account
    pub to: Principal,
    /// Amount moved
    pub amount: Money,
    /// Why
    pub purpose: TransferPurpose,
}

/// Transfer primitive errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The source account cannot cover the amount
    #[error("{account} holds {available}, cannot send {requested}")]
    InsufficientFunds {
        /// Source account
        account: Principal,
        /// Amount requested
        requested: Money,
        /// Amount held
        available: Money,
    },

    /// The counterparty refused the transfer
    #[error("transfer rejected: {reason}")]
    Rejected {
        /// Reason given
        reason: String,
    },
}

/// Moves value between principals
///
/// Implementations must either move the whole amount or nothing.
pub trait ValueTransfer: Send + Sync {
    /// Perform the transfer
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] if the transfer cannot be completed.
    fn transfer(&self, transfer: &Transfer) -> Result<(), TransferError>;
}

/// Wraps a transfer as a store interaction named after its purpose
pub(crate) fn interaction(primitive: &Arc<dyn ValueTransfer>, transfer: Transfer) -> Interaction {
    let primitive = Arc::clone(primitive);
    Interaction::new(transfer.purpose.as_str(), move || {
        primitive
            .transfer(&transfer)
            .map_err(|error| error.to_string())
    })
}

/// Accepts every transfer without bookkeeping
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTransfer;

impl NoopTransfer {
    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn ValueTransfer> {
        Arc::new(Self)
    }
}

impl ValueTransfer for NoopTransfer {
    fn transfer(&self, transfer: &Transfer) -> Result<(), TransferError> {
        tracing::debug!(
            from = %transfer.from,
            to = %transfer.to,
            amount = %transfer.amount,
            purpose = %transfer.purpose,
            "noop transfer"
        );
        Ok(())
    }
}

/// In-memory balance book
///
/// Accounts must be funded before they can send; overdrafts are rejected.
#[derive(Debug, Default)]
pub struct InMemoryTransfer {
    balances: Mutex<HashMap<Principal, Money>>,
}

impl InMemoryTransfer {
    /// Creates an empty book
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` to `account` out of thin air
    pub fn fund(&self, account: Principal, amount: Money) {
        let mut balances = self.lock();
        let balance = balances.entry(account).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Balance currently held by `account`
    #[must_use]
    pub fn balance_of(&self, account: Principal) -> Money {
        self.lock().get(&account).copied().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Principal, Money>> {
        self.balances.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ValueTransfer for InMemoryTransfer {
    fn transfer(&self, transfer: &Transfer) -> Result<(), TransferError> {
        let mut balances = self.lock();
        let available = balances.get(&transfer.from).copied().unwrap_or_default();
        let remaining = available
            .checked_sub(transfer.amount)
            .ok_or(TransferError::InsufficientFunds {
                account: transfer.from,
                requested: transfer.amount,
                available,
            })?;
        balances.insert(transfer.from, remaining);
        let destination = balances.entry(transfer.to).or_default();
        *destination = destination.saturating_add(transfer.amount);

        tracing::debug!(
            from = %transfer.from,
            to = %transfer.to,
            amount = %transfer.amount,
            purpose = %transfer.purpose,
            "transfer settled"
        );
        Ok(())
    }
}
