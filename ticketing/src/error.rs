//! Error taxonomy shared by every component.
//!
//! Every rejected call returns a [`PlatformError`] and leaves all state as it
//! was before the call. Variants carry the offending field, principal or
//! amount so the gateway can report precisely what went wrong.

use crate::types::{EventId, Money, Principal};
use serde::{Deserialize, Serialize};
use stagepass_core::store::StoreError;
use std::fmt;
use thiserror::Error;

/// The role a caller needed but did not hold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Organizer of the event
    Organizer,
    /// Component admin
    Admin,
    /// The wired event registry, or the admin
    EventRegistry,
    /// Authorized ticket minter
    Minter,
    /// Owner of the ticket
    Owner,
    /// Owner, approved address, or operator of the owner
    OwnerOrApproved,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self {
            Self::Organizer => "organizer",
            Self::Admin => "admin",
            Self::EventRegistry => "event registry",
            Self::Minter => "minter",
            Self::Owner => "owner",
            Self::OwnerOrApproved => "owner or approved",
        };
        f.write_str(role)
    }
}

/// Errors returned by platform operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// A supplied value is malformed, out of range, or refers to nothing
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// The caller lacks the role the operation requires
    #[error("{caller} is not authorized: requires {required}")]
    Unauthorized {
        /// Who called
        caller: Principal,
        /// Role that was required
        required: Role,
    },

    /// The target exists but is in the wrong lifecycle state
    #[error("{entity} {reason}")]
    InvalidState {
        /// What was in the wrong state, for example "event 3"
        entity: String,
        /// Why the operation cannot proceed
        reason: String,
    },

    /// The supplied value does not equal the required amount
    #[error("payment of {supplied} does not match required {required}")]
    InvalidPayment {
        /// Amount the operation requires
        required: Money,
        /// Amount the caller supplied
        supplied: Money,
    },

    /// The event has no registrations left
    #[error("event {event_id} is at capacity ({capacity})")]
    CapacityExceeded {
        /// Event ID
        event_id: EventId,
        /// Capacity of the event
        capacity: u32,
    },

    /// The participant already holds a registration for the event
    #[error("{participant} is already registered for event {event_id}")]
    AlreadyRegistered {
        /// Event ID
        event_id: EventId,
        /// Participant
        participant: Principal,
    },

    /// A withdrawal exceeds what is available
    #[error("requested {requested} but only {available} is available")]
    InsufficientBalance {
        /// Amount requested
        requested: Money,
        /// Amount available
        available: Money,
    },

    /// Payment operations are suspended by an emergency pause
    #[error("payments are paused")]
    Paused,

    /// A call arrived while another call was still in progress
    #[error("reentrant call rejected")]
    Reentrancy,

    /// The value-transfer primitive rejected a transfer; the call was rolled back
    #[error("value transfer failed: {reason}")]
    TransferFailed {
        /// Reason reported by the transfer primitive
        reason: String,
    },
}

impl PlatformError {
    /// `InvalidInput` for `field`
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// `InvalidState` for `entity`
    pub fn invalid_state(entity: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            entity: entity.to_string(),
            reason: reason.into(),
        }
    }

    /// `Unauthorized` for `caller`
    #[must_use]
    pub const fn unauthorized(caller: Principal, required: Role) -> Self {
        Self::Unauthorized { caller, required }
    }

    /// `InvalidInput` for an id that does not resolve
    pub fn not_found(field: &'static str, id: impl fmt::Display) -> Self {
        Self::invalid_input(field, format!("{id} does not exist"))
    }

    /// The flat kind of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::InvalidPayment { .. } => ErrorKind::InvalidPayment,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::AlreadyRegistered { .. } => ErrorKind::AlreadyRegistered,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::Paused => ErrorKind::Paused,
            Self::Reentrancy => ErrorKind::Reentrancy,
            Self::TransferFailed { .. } => ErrorKind::TransferFailed,
        }
    }
}

impl From<StoreError> for PlatformError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Reentrant(_) => Self::Reentrancy,
            StoreError::InteractionFailed(failure) => Self::TransferFailed {
                reason: failure.to_string(),
            },
        }
    }
}

/// Discriminant of [`PlatformError`], for gateways and metric labels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`PlatformError::InvalidInput`]
    InvalidInput,
    /// See [`PlatformError::Unauthorized`]
    Unauthorized,
    /// See [`PlatformError::InvalidState`]
    InvalidState,
    /// See [`PlatformError::InvalidPayment`]
    InvalidPayment,
    /// See [`PlatformError::CapacityExceeded`]
    CapacityExceeded,
    /// See [`PlatformError::AlreadyRegistered`]
    AlreadyRegistered,
    /// See [`PlatformError::InsufficientBalance`]
    InsufficientBalance,
    /// See [`PlatformError::Paused`]
    Paused,
    /// See [`PlatformError::Reentrancy`]
    Reentrancy,
    /// See [`PlatformError::TransferFailed`]
    TransferFailed,
}

impl ErrorKind {
    /// Stable snake-case name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Unauthorized => "unauthorized",
            Self::InvalidState => "invalid_state",
            Self::InvalidPayment => "invalid_payment",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::AlreadyRegistered => "already_registered",
            Self::InsufficientBalance => "insufficient_balance",
            Self::Paused => "paused",
            Self::Reentrancy => "reentrancy",
            Self::TransferFailed => "transfer_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result alias for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;
    use stagepass_core::effect::InteractionError;
    use stagepass_core::guard::ReentrancyError;

    #[test]
    fn store_errors_map_to_runtime_kinds() {
        let reentrant = PlatformError::from(StoreError::Reentrant(ReentrancyError));
        assert_eq!(reentrant.kind(), ErrorKind::Reentrancy);

        let failed = PlatformError::from(StoreError::InteractionFailed(InteractionError {
            name: "organizer_withdrawal",
            reason: "recipient rejected".to_string(),
        }));
        assert_eq!(failed.kind(), ErrorKind::TransferFailed);
        assert!(failed.to_string().contains("organizer_withdrawal"));
    }

    #[test]
    fn messages_name_the_offending_field() {
        let error = PlatformError::invalid_input("title", "must not be empty");
        assert_eq!(error.to_string(), "invalid title: must not be empty");
        assert_eq!(PlatformError::not_found("event_id", EventId::new(9)).kind(), ErrorKind::InvalidInput);
    }
}
