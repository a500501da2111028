//! Domain types for the Stagepass platform.
//!
//! This module contains the value objects and records shared by the three
//! components: principals, identifiers, money, fee percentages, and the
//! event, payment and ticket records with their query views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Principals
// ============================================================================

/// An authenticated identity: a participant, organizer, admin, or component.
///
/// Components are principals too; references between components are checked
/// by principal equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Principal(Uuid);

impl Principal {
    /// The null principal. Never a valid owner, recipient, or reference.
    pub const NULL: Self = Self(Uuid::nil());

    /// Creates a new random `Principal`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `Principal` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns true for [`Principal::NULL`]
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for Principal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! sequential_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw id
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw id
            #[must_use]
            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

sequential_id!(
    /// Identifier of an event; allocated from 1 in creation order
    EventId
);

sequential_id!(
    /// Identifier of a payment record; allocated from 1 in processing order
    PaymentId
);

sequential_id!(
    /// Identifier of a ticket; global, allocated from 1 in mint order
    TokenId
);

// ============================================================================
// Money Value Object (integer base units, no fractional amounts)
// ============================================================================

/// An amount of value in indivisible base units
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(u128);

impl Money {
    /// Zero value
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from base units
    #[must_use]
    pub const fn from_units(units: u128) -> Self {
        Self(units)
    }

    /// Returns the amount in base units
    #[must_use]
    pub const fn units(&self) -> u128 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Subtracts two money amounts (returns None if result would be negative)
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Adds two money amounts, clamping at the maximum representable value
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts two money amounts, clamping at zero
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Returns `⌊self × percent / 100⌋` without intermediate overflow
    ///
    /// With `self = 100q + r`, the product splits into `q × percent` plus
    /// `⌊r × percent / 100⌋`, both of which fit whenever the result does.
    #[must_use]
    pub fn percent_floor(self, percent: FeePercent) -> Self {
        let percent = u128::from(percent.get());
        let whole = (self.0 / 100) * percent;
        let part = (self.0 % 100) * percent / 100;
        Self(whole + part)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform fee as a whole percentage in `0..=20`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FeePercent(u8);

impl FeePercent {
    /// Highest fee the platform may charge
    pub const MAX: u8 = 20;

    /// Fee used when nothing else is configured
    pub const DEFAULT: Self = Self(5);

    /// Validates a percentage; `None` if above [`FeePercent::MAX`]
    #[must_use]
    pub const fn new(percent: u8) -> Option<Self> {
        if percent <= Self::MAX {
            Some(Self(percent))
        } else {
            None
        }
    }

    /// Returns the percentage
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl Default for FeePercent {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for FeePercent {
    type Error = String;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        Self::new(percent).ok_or_else(|| format!("fee percent {percent} exceeds {}", Self::MAX))
    }
}

impl std::str::FromStr for FeePercent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let percent: u8 = s.trim().parse().map_err(|e| format!("{e}"))?;
        Self::try_from(percent)
    }
}

impl From<FeePercent> for u8 {
    fn from(percent: FeePercent) -> Self {
        percent.0
    }
}

impl fmt::Display for FeePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// ============================================================================
// Events
// ============================================================================

/// The organizer-editable fields of an event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Display title; must not be empty
    pub title: String,
    /// Free-form description
    pub description: String,
    /// When the event starts
    pub start_date: DateTime<Utc>,
    /// When the event ends; strictly after `start_date`
    pub end_date: DateTime<Utc>,
    /// Exact price of one registration
    pub ticket_price: Money,
    /// Maximum number of registrations; positive
    pub capacity: u32,
    /// Venue or address
    pub location: String,
    /// Ordered category labels
    pub categories: Vec<String>,
}

/// An event and its registration bookkeeping
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event ID
    pub id: EventId,
    /// Organizer who created the event
    pub organizer: Principal,
    /// Editable fields
    pub details: EventDetails,
    /// Registrations so far, never above `details.capacity`
    pub registered_count: u32,
    /// Cleared exactly once, by cancellation
    pub is_active: bool,
    /// When the event was created
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Returns true when no more registrations fit
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.registered_count >= self.details.capacity
    }

    /// Registrations still available
    #[must_use]
    pub const fn remaining_capacity(&self) -> u32 {
        self.details.capacity.saturating_sub(self.registered_count)
    }
}

// ============================================================================
// Payments
// ============================================================================

/// A processed payment and its fee split
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Payment ID
    pub id: PaymentId,
    /// Event the payment is for
    pub event_id: EventId,
    /// Who paid
    pub payer: Principal,
    /// Who receives the organizer share
    pub organizer: Principal,
    /// Total amount collected
    pub amount: Money,
    /// `⌊amount × fee / 100⌋` at processing time
    pub platform_fee: Money,
    /// `amount − platform_fee`
    pub organizer_share: Money,
    /// Always true for stored records
    pub processed: bool,
    /// When the payment was processed
    pub processed_at: DateTime<Utc>,
}

/// Earnings and withdrawals of one organizer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizerBalance {
    /// Sum of organizer shares credited
    pub total_earned: Money,
    /// Sum of withdrawals; never decreases
    pub withdrawn_amount: Money,
}

impl OrganizerBalance {
    /// `total_earned − withdrawn_amount`
    #[must_use]
    pub const fn available_balance(&self) -> Money {
        self.total_earned.saturating_sub(self.withdrawn_amount)
    }
}

/// Aggregate figures reported by the payment ledger
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStats {
    /// Number of payment records
    pub total_payments: u64,
    /// Sum of all payment amounts
    pub total_volume: Money,
    /// Sum of all platform fees charged
    pub total_platform_fees: Money,
    /// Value the ledger still holds (volume minus every withdrawal)
    pub current_held_balance: Money,
}

// ============================================================================
// Tickets
// ============================================================================

/// A unique, ownable ticket
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Token ID
    pub token_id: TokenId,
    /// Event the ticket admits to
    pub event_id: EventId,
    /// Event registry the event lives in
    pub event_ref: Principal,
    /// Current owner
    pub owner: Principal,
    /// Seat label, free-form
    pub seat_info: String,
    /// Ticket class, for example "VIP"
    pub ticket_type: String,
    /// Metadata location reported by `token_uri`
    pub metadata_uri: String,
    /// When the ticket was minted
    pub purchase_date: DateTime<Utc>,
    /// Set once, when the owner uses the ticket
    pub is_used: bool,
    /// Cleared once, when an admin cancels the ticket
    pub is_active: bool,
}

impl Ticket {
    /// Active and not yet used
    #[must_use]
    pub const fn is_redeemable(&self) -> bool {
        self.is_active && !self.is_used
    }
}

/// One ownership change of a ticket; a mint is recorded with `from` = NULL
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Previous owner
    pub from: Principal,
    /// New owner
    pub to: Principal,
    /// When ownership changed
    pub at: DateTime<Utc>,
}

/// Aggregate figures reported by the ticket registry
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStats {
    /// Tickets ever minted
    pub total_tickets: u64,
    /// Tickets neither cancelled nor used
    pub active_tickets: u64,
    /// Tickets that have been used
    pub total_used_tickets: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_split_floors() {
        let fee = FeePercent::new(5).unwrap_or_default();
        assert_eq!(
            Money::from_units(10_000_000).percent_floor(fee),
            Money::from_units(500_000)
        );
        assert_eq!(Money::from_units(19).percent_floor(fee), Money::ZERO);
        assert_eq!(Money::from_units(119).percent_floor(fee), Money::from_units(5));
    }

    #[test]
    fn fee_percent_is_capped() {
        assert!(FeePercent::new(20).is_some());
        assert!(FeePercent::new(21).is_none());
        assert!(FeePercent::try_from(42).is_err());
    }

    #[test]
    fn null_principal() {
        assert!(Principal::NULL.is_null());
        assert!(!Principal::new().is_null());
    }

    #[test]
    fn available_balance_is_earned_minus_withdrawn() {
        let balance = OrganizerBalance {
            total_earned: Money::from_units(90),
            withdrawn_amount: Money::from_units(30),
        };
        assert_eq!(balance.available_balance(), Money::from_units(60));
    }
}
