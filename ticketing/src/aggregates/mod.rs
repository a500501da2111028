//! Component reducers for the Stagepass platform.
//!
//! This module contains the three components and their composition:
//! - Event registry: event definitions, registrations, capacity
//! - Payment ledger: fee split, organizer balances, withdrawals, pause
//! - Ticket registry: issuance, ownership, lifecycle, validity
//! - Platform: the composed reducer that runs cross-component flows atomically

pub mod event_registry;
pub mod payment_ledger;
pub mod platform;
pub mod ticket_registry;

pub use event_registry::{EventDirectory, EventRegistryAction, EventRegistryReducer, EventRegistryState};
pub use payment_ledger::{PaymentLedgerAction, PaymentLedgerReducer, PaymentLedgerState};
pub use platform::{Addresses, PlatformAction, PlatformReducer, PlatformState};
pub use ticket_registry::{TicketRegistryAction, TicketRegistryReducer, TicketRegistryState};

use crate::error::{PlatformError, PlatformResult, Role};
use crate::notification::Notification;
use crate::transfer::ValueTransfer;
use crate::types::Principal;
use stagepass_core::{SmallVec, effect::Effect, environment::Clock};
use std::sync::Arc;

/// Effects returned by every component reducer
pub type Effects = SmallVec<[Effect<Notification>; 4]>;

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies shared by all components
#[derive(Clone)]
pub struct PlatformEnvironment {
    /// Clock for timestamps and the event start-date check
    pub clock: Arc<dyn Clock>,
    /// Value-transfer primitive used by payment interactions
    pub transfer: Arc<dyn ValueTransfer>,
}

impl PlatformEnvironment {
    /// Creates a new `PlatformEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, transfer: Arc<dyn ValueTransfer>) -> Self {
        Self { clock, transfer }
    }
}

impl std::fmt::Debug for PlatformEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformEnvironment").finish_non_exhaustive()
    }
}

// ============================================================================
// Shared checks
// ============================================================================

fn ensure_admin(admin: Principal, caller: Principal) -> PlatformResult<()> {
    if caller == admin {
        Ok(())
    } else {
        Err(PlatformError::unauthorized(caller, Role::Admin))
    }
}

fn ensure_not_null(field: &'static str, principal: Principal) -> PlatformResult<()> {
    if principal.is_null() {
        Err(PlatformError::invalid_input(field, "must not be the null principal"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::PlatformEnvironment;
    use crate::transfer::NoopTransfer;
    use crate::types::{EventDetails, Money};
    use chrono::Duration;
    use stagepass_testing::{test_clock, test_epoch};
    use std::sync::Arc;

    pub fn env() -> PlatformEnvironment {
        PlatformEnvironment::new(Arc::new(test_clock()), NoopTransfer::shared())
    }

    /// Details of an event starting one day after the test epoch
    pub fn details(capacity: u32, price: u128) -> EventDetails {
        let start_date = test_epoch() + Duration::days(1);
        EventDetails {
            title: "RustConf".to_string(),
            description: "Systems programming".to_string(),
            start_date,
            end_date: start_date + Duration::hours(8),
            ticket_price: Money::from_units(price),
            capacity,
            location: "Montreal".to_string(),
            categories: vec!["tech".to_string(), "conference".to_string()],
        }
    }
}
