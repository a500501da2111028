//! Stagepass - paid-event ticketing on three cooperating components
//!
//! The platform lets organizers publish capacity-limited events, collects an
//! exact payment for each registration, splits it between the organizer and
//! the platform, and issues transferable, single-use tickets whose validity
//! tracks the underlying event.
//!
//! # Architecture
//!
//! ```text
//!                   ┌──────────────────────────────┐
//!   principals ───▶ │      Platform (facade)       │ ───▶ notifications
//!                   │  Store: guard, lock, journal │      (journal + broadcast)
//!                   └──────────────┬───────────────┘
//!                                  │ PlatformAction
//!                                  ▼
//!                   ┌──────────────────────────────┐
//!                   │        PlatformReducer       │
//!                   └──────┬─────────┬─────────┬───┘
//!                          │         │         │
//!                 ┌────────▼───┐ ┌───▼──────┐ ┌▼───────────────┐
//!                 │   Event    │ │ Payment  │ │    Ticket      │
//!                 │  Registry  │ │  Ledger  │ │   Registry     │
//!                 └────────────┘ └────┬─────┘ └────────────────┘
//!                                     │ Interaction
//!                                     ▼
//!                              ValueTransfer
//! ```
//!
//! # Key Properties
//!
//! ## 1. Atomic calls
//!
//! Each call either applies all of its effects or none. Registration checks
//! the event, then the payment, and records both only after every check
//! passed. A failed value transfer restores the pre-call state.
//!
//! ## 2. Exact accounting
//!
//! ```text
//! platform_fee    = floor(amount * fee_percent / 100)
//! organizer_share = amount - platform_fee
//! ```
//!
//! Nothing is ever rounded away.
//!
//! ## 3. Live ticket validity
//!
//! A ticket is valid only while it is unused, not cancelled, and its event is
//! still active. Cancelling an event needs no sweep over its tickets.
//!
//! # Usage
//!
//! See [`Platform`] for the operations and [`aggregates`] for the reducers
//! and their tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregates;
pub mod app;
pub mod config;
pub mod error;
pub mod metrics;
pub mod notification;
pub mod transfer;
pub mod types;

pub use aggregates::{Addresses, PlatformEnvironment, PlatformState};
pub use app::{MintRequest, Platform};
pub use config::PlatformConfig;
pub use error::{ErrorKind, PlatformError, PlatformResult, Role};
pub use notification::{Component, Notification};
pub use transfer::{
    InMemoryTransfer, NoopTransfer, Transfer, TransferError, TransferPurpose, ValueTransfer,
};
pub use types::*;
