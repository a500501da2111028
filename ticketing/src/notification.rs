//! Notifications published after a call commits.
//!
//! The gateway is the only consumer. Every notification is serializable with
//! serde (JSON for the gateway, bincode via [`Event::to_bytes`] for storage)
//! and carries a versioned type name.

use crate::types::{EventId, Money, PaymentId, Principal, TokenId};
use serde::{Deserialize, Serialize};
use stagepass_core::event::Event;

/// Which component a reference setter updated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    /// The event registry
    EventRegistry,
    /// The payment ledger
    PaymentLedger,
    /// The ticket registry
    TicketRegistry,
}

/// A fact about a committed state change
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    /// An event was created
    EventCreated {
        /// Event ID
        event_id: EventId,
        /// Organizer
        organizer: Principal,
    },

    /// An event's details were overwritten
    EventUpdated {
        /// Event ID
        event_id: EventId,
    },

    /// An event was cancelled
    EventCancelled {
        /// Event ID
        event_id: EventId,
    },

    /// A participant registered for an event
    UserRegistered {
        /// Event ID
        event_id: EventId,
        /// Participant
        participant: Principal,
    },

    /// A payment was recorded and split
    PaymentProcessed {
        /// Payment ID
        payment_id: PaymentId,
        /// Event ID
        event_id: EventId,
        /// Payer
        payer: Principal,
        /// Total amount
        amount: Money,
        /// Platform's part
        platform_fee: Money,
        /// Organizer's part
        organizer_share: Money,
    },

    /// An organizer withdrew earnings
    WithdrawalMade {
        /// Organizer
        organizer: Principal,
        /// Amount paid out
        amount: Money,
    },

    /// The platform fee percentage changed
    PlatformFeeUpdated {
        /// New percentage
        percent: u8,
    },

    /// A ticket was issued
    TicketMinted {
        /// Token ID
        token_id: TokenId,
        /// Event ID
        event_id: EventId,
        /// Owner
        owner: Principal,
    },

    /// A ticket was used at the door
    TicketUsed {
        /// Token ID
        token_id: TokenId,
    },

    /// A ticket changed owner
    TicketTransferred {
        /// Token ID
        token_id: TokenId,
        /// Previous owner
        from: Principal,
        /// New owner
        to: Principal,
    },

    /// A ticket was cancelled by an admin
    TicketCancelled {
        /// Token ID
        token_id: TokenId,
    },

    /// The admin swept the platform fee pool
    PlatformFeesWithdrawn {
        /// Admin receiving the fees
        admin: Principal,
        /// Amount swept
        amount: Money,
    },

    /// Payment operations were suspended
    PaymentsPaused {
        /// Admin who paused
        by: Principal,
    },

    /// Payment operations resumed
    PaymentsUnpaused {
        /// Admin who unpaused
        by: Principal,
    },

    /// A component reference was set
    ReferenceUpdated {
        /// Component whose reference changed
        component: Component,
        /// Which reference was set
        reference: Component,
        /// New target
        target: Principal,
    },

    /// A minter was authorized or revoked
    MinterUpdated {
        /// Minter
        minter: Principal,
        /// Whether it may mint now
        authorized: bool,
    },

    /// A single-ticket approval was set or cleared
    TicketApproved {
        /// Token ID
        token_id: TokenId,
        /// Owner granting the approval
        owner: Principal,
        /// Approved principal, NULL when cleared
        approved: Principal,
    },

    /// An operator approval was granted or revoked
    ApprovalForAll {
        /// Owner
        owner: Principal,
        /// Operator
        operator: Principal,
        /// Granted or revoked
        approved: bool,
    },
}

impl Event for Notification {
    fn event_type(&self) -> &'static str {
        match self {
            Self::EventCreated { .. } => "EventCreated.v1",
            Self::EventUpdated { .. } => "EventUpdated.v1",
            Self::EventCancelled { .. } => "EventCancelled.v1",
            Self::UserRegistered { .. } => "UserRegistered.v1",
            Self::PaymentProcessed { .. } => "PaymentProcessed.v1",
            Self::WithdrawalMade { .. } => "WithdrawalMade.v1",
            Self::PlatformFeeUpdated { .. } => "PlatformFeeUpdated.v1",
            Self::TicketMinted { .. } => "TicketMinted.v1",
            Self::TicketUsed { .. } => "TicketUsed.v1",
            Self::TicketTransferred { .. } => "TicketTransferred.v1",
            Self::TicketCancelled { .. } => "TicketCancelled.v1",
            Self::PlatformFeesWithdrawn { .. } => "PlatformFeesWithdrawn.v1",
            Self::PaymentsPaused { .. } => "PaymentsPaused.v1",
            Self::PaymentsUnpaused { .. } => "PaymentsUnpaused.v1",
            Self::ReferenceUpdated { .. } => "ReferenceUpdated.v1",
            Self::MinterUpdated { .. } => "MinterUpdated.v1",
            Self::TicketApproved { .. } => "TicketApproved.v1",
            Self::ApprovalForAll { .. } => "ApprovalForAll.v1",
        }
    }
}
