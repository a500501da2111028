//! Event registry component.
//!
//! Owns event definitions and registration bookkeeping. Events are created by
//! an organizer, edited by that organizer while active, and cancelled once.
//! Registrations are never removed and never exceed an event's capacity.
//!
//! Registration itself is a cross-component flow (it forwards value to the
//! payment ledger) and is driven by [`PlatformReducer`](super::PlatformReducer)
//! through [`check_registration`] and [`record_registration`].

use super::{Effects, PlatformEnvironment, ensure_admin, ensure_not_null};
use crate::error::{PlatformError, PlatformResult, Role};
use crate::notification::{Component, Notification};
use crate::types::{Event, EventDetails, EventId, FeePercent, Money, Principal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stagepass_core::{arena::Arena, effect::Effect, reducer::Reducer, smallvec};
use std::collections::{HashMap, HashSet};

// ============================================================================
// State
// ============================================================================

/// Read access to events, as needed by the ticket registry
pub trait EventDirectory {
    /// Principal of the registry holding the events
    fn directory_address(&self) -> Principal;

    /// Looks up an event
    fn lookup_event(&self, event_id: EventId) -> Option<&Event>;
}

/// State of the event registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRegistryState {
    address: Principal,
    admin: Principal,
    payment_ledger: Option<Principal>,
    ticket_registry: Option<Principal>,
    events: Arena<Event>,
    registrations: HashSet<(EventId, Principal)>,
    by_organizer: HashMap<Principal, Vec<EventId>>,
}

impl EventRegistryState {
    /// Creates an empty registry at `address`, administered by `admin`
    #[must_use]
    pub fn new(address: Principal, admin: Principal) -> Self {
        Self {
            address,
            admin,
            payment_ledger: None,
            ticket_registry: None,
            events: Arena::new(),
            registrations: HashSet::new(),
            by_organizer: HashMap::new(),
        }
    }

    /// This registry's principal
    #[must_use]
    pub const fn address(&self) -> Principal {
        self.address
    }

    /// Admin principal
    #[must_use]
    pub const fn admin(&self) -> Principal {
        self.admin
    }

    /// Configured payment ledger, if any
    #[must_use]
    pub const fn payment_ledger(&self) -> Option<Principal> {
        self.payment_ledger
    }

    /// Configured ticket registry, if any
    #[must_use]
    pub const fn ticket_registry(&self) -> Option<Principal> {
        self.ticket_registry
    }

    /// Gets an event by ID
    #[must_use]
    pub fn event(&self, event_id: EventId) -> Option<&Event> {
        self.events.get(event_id.get())
    }

    /// Number of events ever created
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Returns true if `participant` holds a registration for the event
    #[must_use]
    pub fn is_registered(&self, event_id: EventId, participant: Principal) -> bool {
        self.registrations.contains(&(event_id, participant))
    }

    /// Ids of the events created by `organizer`, in creation order
    ///
    /// The iterator is lazy and can be cloned to restart it.
    pub fn events_by_organizer(
        &self,
        organizer: Principal,
    ) -> impl Iterator<Item = EventId> + Clone + '_ {
        self.by_organizer
            .get(&organizer)
            .into_iter()
            .flatten()
            .copied()
    }

    /// Ids of the events that are still active, in creation order
    ///
    /// The iterator is lazy and can be cloned to restart it.
    pub fn active_events(&self) -> impl Iterator<Item = EventId> + Clone + '_ {
        self.events
            .iter()
            .filter(|(_, event)| event.is_active)
            .map(|(id, _)| EventId::new(id))
    }

    fn require_event(&self, event_id: EventId) -> PlatformResult<&Event> {
        self.event(event_id)
            .ok_or_else(|| PlatformError::not_found("event_id", event_id))
    }

    fn require_organizer(&self, event_id: EventId, caller: Principal) -> PlatformResult<&Event> {
        let event = self.require_event(event_id)?;
        if event.organizer != caller {
            return Err(PlatformError::unauthorized(caller, Role::Organizer));
        }
        Ok(event)
    }
}

impl EventDirectory for EventRegistryState {
    fn directory_address(&self) -> Principal {
        self.address
    }

    fn lookup_event(&self, event_id: EventId) -> Option<&Event> {
        self.event(event_id)
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Commands handled by the event registry alone
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventRegistryAction {
    /// Create an event owned by `organizer`
    CreateEvent {
        /// Organizer
        organizer: Principal,
        /// Event fields
        details: EventDetails,
    },

    /// Overwrite the editable fields of an active event
    UpdateEvent {
        /// Event ID
        event_id: EventId,
        /// Must be the organizer
        caller: Principal,
        /// New fields
        details: EventDetails,
    },

    /// Cancel an active event
    CancelEvent {
        /// Event ID
        event_id: EventId,
        /// Must be the organizer
        caller: Principal,
    },

    /// Point the registry at a payment ledger
    SetPaymentLedger {
        /// Must be the admin
        caller: Principal,
        /// Ledger principal
        ledger: Principal,
    },

    /// Point the registry at a ticket registry
    SetTicketRegistry {
        /// Must be the admin
        caller: Principal,
        /// Ticket registry principal
        registry: Principal,
    },
}

// ============================================================================
// Validation
// ============================================================================

/// Checks event fields
///
/// `previous_start` is the start date before an update; an unchanged start
/// date is not required to lie in the future, so an ongoing event can still
/// have its description fixed.
fn validate_details(
    details: &EventDetails,
    now: DateTime<Utc>,
    previous_start: Option<DateTime<Utc>>,
    registered: u32,
) -> PlatformResult<()> {
    if details.title.trim().is_empty() {
        return Err(PlatformError::invalid_input("title", "must not be empty"));
    }
    if previous_start != Some(details.start_date) && details.start_date <= now {
        return Err(PlatformError::invalid_input(
            "start_date",
            "must be in the future",
        ));
    }
    if details.end_date <= details.start_date {
        return Err(PlatformError::invalid_input(
            "end_date",
            "must be after start_date",
        ));
    }
    if details.capacity == 0 {
        return Err(PlatformError::invalid_input("capacity", "must be positive"));
    }
    if details.capacity < registered {
        return Err(PlatformError::invalid_input(
            "capacity",
            format!("cannot drop below the {registered} existing registrations"),
        ));
    }
    Ok(())
}

/// Checks whether `participant` may register, returning the event; its
/// ticket price is the exact amount due
///
/// # Errors
///
/// In order: `InvalidInput` for an unknown event or a null participant,
/// `InvalidState` if the event is cancelled, `InvalidPayment` unless
/// `supplied` equals the ticket price, `AlreadyRegistered`, and
/// `CapacityExceeded`.
pub(crate) fn check_registration(
    state: &EventRegistryState,
    event_id: EventId,
    participant: Principal,
    supplied: Money,
) -> PlatformResult<&Event> {
    let event = state.require_event(event_id)?;
    ensure_not_null("participant", participant)?;
    if !event.is_active {
        return Err(PlatformError::invalid_state(
            format!("event {event_id}"),
            "is not active",
        ));
    }
    let price = event.details.ticket_price;
    if supplied != price {
        return Err(PlatformError::InvalidPayment {
            required: price,
            supplied,
        });
    }
    if state.is_registered(event_id, participant) {
        return Err(PlatformError::AlreadyRegistered {
            event_id,
            participant,
        });
    }
    if event.is_full() {
        return Err(PlatformError::CapacityExceeded {
            event_id,
            capacity: event.details.capacity,
        });
    }
    Ok(event)
}

/// Records a registration already accepted by [`check_registration`]
pub(crate) fn record_registration(
    state: &mut EventRegistryState,
    event_id: EventId,
    participant: Principal,
) -> Notification {
    if let Some(event) = state.events.get_mut(event_id.get()) {
        event.registered_count = event.registered_count.saturating_add(1);
    }
    state.registrations.insert((event_id, participant));
    Notification::UserRegistered {
        event_id,
        participant,
    }
}

/// Checks a platform fee change requested through the registry
///
/// # Errors
///
/// `Unauthorized` unless `caller` is the registry admin; `InvalidInput` if
/// `percent` exceeds [`FeePercent::MAX`].
pub(crate) fn check_fee_update(
    state: &EventRegistryState,
    caller: Principal,
    percent: u8,
) -> PlatformResult<FeePercent> {
    ensure_admin(state.admin, caller)?;
    FeePercent::new(percent).ok_or_else(|| {
        PlatformError::invalid_input("percent", format!("must be at most {}", FeePercent::MAX))
    })
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the event registry
#[derive(Clone, Copy, Debug, Default)]
pub struct EventRegistryReducer;

impl EventRegistryReducer {
    /// Creates a new `EventRegistryReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for EventRegistryReducer {
    type State = EventRegistryState;
    type Action = EventRegistryAction;
    type Event = Notification;
    type Error = PlatformError;
    type Environment = PlatformEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> PlatformResult<Effects> {
        match action {
            // ========== Create ==========
            EventRegistryAction::CreateEvent { organizer, details } => {
                ensure_not_null("organizer", organizer)?;
                let now = env.clock.now();
                validate_details(&details, now, None, 0)?;

                let raw_id = state.events.insert_with(|raw| Event {
                    id: EventId::new(raw),
                    organizer,
                    details,
                    registered_count: 0,
                    is_active: true,
                    created_at: now,
                });
                let event_id = EventId::new(raw_id);
                state.by_organizer.entry(organizer).or_default().push(event_id);

                Ok(smallvec![Effect::Emit(Notification::EventCreated {
                    event_id,
                    organizer,
                })])
            }

            // ========== Update ==========
            EventRegistryAction::UpdateEvent {
                event_id,
                caller,
                details,
            } => {
                let event = state.require_organizer(event_id, caller)?;
                if !event.is_active {
                    return Err(PlatformError::invalid_state(
                        format!("event {event_id}"),
                        "is not active",
                    ));
                }
                validate_details(
                    &details,
                    env.clock.now(),
                    Some(event.details.start_date),
                    event.registered_count,
                )?;

                if let Some(event) = state.events.get_mut(event_id.get()) {
                    event.details = details;
                }
                Ok(smallvec![Effect::Emit(Notification::EventUpdated {
                    event_id
                })])
            }

            // ========== Cancel ==========
            EventRegistryAction::CancelEvent { event_id, caller } => {
                let event = state.require_organizer(event_id, caller)?;
                if !event.is_active {
                    return Err(PlatformError::invalid_state(
                        format!("event {event_id}"),
                        "is already cancelled",
                    ));
                }

                if let Some(event) = state.events.get_mut(event_id.get()) {
                    event.is_active = false;
                }
                Ok(smallvec![Effect::Emit(Notification::EventCancelled {
                    event_id
                })])
            }

            // ========== References ==========
            EventRegistryAction::SetPaymentLedger { caller, ledger } => {
                ensure_admin(state.admin, caller)?;
                ensure_not_null("ledger", ledger)?;
                state.payment_ledger = Some(ledger);
                Ok(smallvec![Effect::Emit(Notification::ReferenceUpdated {
                    component: Component::EventRegistry,
                    reference: Component::PaymentLedger,
                    target: ledger,
                })])
            }

            EventRegistryAction::SetTicketRegistry { caller, registry } => {
                ensure_admin(state.admin, caller)?;
                ensure_not_null("registry", registry)?;
                state.ticket_registry = Some(registry);
                Ok(smallvec![Effect::Emit(Notification::ReferenceUpdated {
                    component: Component::EventRegistry,
                    reference: Component::TicketRegistry,
                    target: registry,
                })])
            }
        }
    }
}
