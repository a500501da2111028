//! Shared fixtures for the integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use chrono::Duration;
use stagepass::{
    EventDetails, EventId, InMemoryTransfer, MintRequest, Money, Platform, PlatformConfig,
    PlatformEnvironment, Principal, TokenId,
};
use stagepass_testing::{ManualClock, init_tracing, test_epoch};
use std::sync::Arc;

/// Ticket price used by most scenarios
pub const PRICE: u128 = 10_000_000;

/// A deployed platform with an in-memory transfer book and movable clock
pub struct Harness {
    pub platform: Platform,
    pub transfer: Arc<InMemoryTransfer>,
    pub clock: Arc<ManualClock>,
    pub admin: Principal,
    pub organizer: Principal,
}

impl Harness {
    /// Deploys a platform at the test epoch with default configuration
    pub fn deploy() -> Self {
        Self::deploy_with(|_| {})
    }

    /// Deploys a platform after letting `adjust` tweak the configuration
    pub fn deploy_with(adjust: impl FnOnce(&mut PlatformConfig)) -> Self {
        init_tracing();
        let admin = Principal::new();
        let mut config = PlatformConfig::with_admin(admin);
        adjust(&mut config);

        let transfer = Arc::new(InMemoryTransfer::new());
        let clock = Arc::new(ManualClock::new(test_epoch()));
        let environment = PlatformEnvironment::new(clock.clone(), transfer.clone());
        let platform = Platform::deploy(config, environment).unwrap();

        Self {
            platform,
            transfer,
            clock,
            admin,
            organizer: Principal::new(),
        }
    }

    /// A participant funded with `units` in the transfer book
    pub fn funded_participant(&self, units: u128) -> Principal {
        let participant = Principal::new();
        self.transfer.fund(participant, Money::from_units(units));
        participant
    }

    /// Creates an event owned by the harness organizer
    pub fn create_event(&self, capacity: u32, price: u128) -> EventId {
        self.platform
            .create_event(self.organizer, details(capacity, price))
            .unwrap()
    }

    /// Mints one ticket through the event registry's minter role
    pub fn mint(&self, recipient: Principal, event_id: EventId) -> TokenId {
        self.platform
            .mint_ticket(self.platform.addresses().event_registry, mint_request(recipient, event_id))
            .unwrap()
    }
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
        categories: vec!["tech".to_string()],
    }
}

/// A general-admission mint request
pub fn mint_request(recipient: Principal, event_id: EventId) -> MintRequest {
    MintRequest {
        recipient,
        event_id,
        seat_info: "GA".to_string(),
        ticket_type: "General".to_string(),
        metadata_uri: "ipfs://ticket".to_string(),
    }
}
