//! Ticket registry component.
//!
//! Issues unique tickets, tracks their ownership, and enforces the one-way
//! lifecycle: a used ticket stays used, a cancelled ticket stays cancelled,
//! and neither can move again. Whether a ticket is valid is never stored; it
//! is re-derived from the ticket's flags and the live state of its event.

use super::{Effects, EventDirectory, PlatformEnvironment, ensure_admin, ensure_not_null};
use crate::error::{PlatformError, PlatformResult, Role};
use crate::notification::{Component, Notification};
use crate::types::{EventId, Principal, Ticket, TicketStats, TokenId, TransferRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stagepass_core::{arena::Arena, effect::Effect, reducer::Reducer, smallvec};
use std::collections::{HashMap, HashSet};
use std::fmt;

// ============================================================================
// State
// ============================================================================

/// State of the ticket registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRegistryState {
    address: Principal,
    admin: Principal,
    event_registry: Option<Principal>,
    payment_ledger: Option<Principal>,
    minters: HashSet<Principal>,
    tickets: Arena<Ticket>,
    by_event: HashMap<EventId, Vec<TokenId>>,
    by_owner: HashMap<Principal, Vec<TokenId>>,
    approvals: HashMap<TokenId, Principal>,
    operators: HashSet<(Principal, Principal)>,
    history: HashMap<TokenId, Vec<TransferRecord>>,
    used: u64,
    cancelled: u64,
}

impl TicketRegistryState {
    /// Creates an empty registry; only the admin may mint until others are authorized
    #[must_use]
    pub fn new(address: Principal, admin: Principal) -> Self {
        Self {
            address,
            admin,
            event_registry: None,
            payment_ledger: None,
            minters: HashSet::new(),
            tickets: Arena::new(),
            by_event: HashMap::new(),
            by_owner: HashMap::new(),
            approvals: HashMap::new(),
            operators: HashSet::new(),
            history: HashMap::new(),
            used: 0,
            cancelled: 0,
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

    /// Event registry tickets are validated against
    #[must_use]
    pub const fn event_registry(&self) -> Option<Principal> {
        self.event_registry
    }

    /// Configured payment ledger, if any
    #[must_use]
    pub const fn payment_ledger(&self) -> Option<Principal> {
        self.payment_ledger
    }

    /// The admin is always a minter
    #[must_use]
    pub fn is_minter(&self, principal: Principal) -> bool {
        principal == self.admin || self.minters.contains(&principal)
    }

    /// Gets a ticket by ID
    #[must_use]
    pub fn ticket(&self, token_id: TokenId) -> Option<&Ticket> {
        self.tickets.get(token_id.get())
    }

    /// Current owner of a ticket
    #[must_use]
    pub fn owner_of(&self, token_id: TokenId) -> Option<Principal> {
        self.ticket(token_id).map(|ticket| ticket.owner)
    }

    /// Number of tickets held by `owner`
    #[must_use]
    pub fn balance_of(&self, owner: Principal) -> usize {
        self.tickets_by_owner(owner).len()
    }

    /// The `index`-th ticket held by `owner`, in ascending id order
    #[must_use]
    pub fn token_of_owner_by_index(&self, owner: Principal, index: usize) -> Option<TokenId> {
        self.tickets_by_owner(owner).get(index).copied()
    }

    /// Metadata location of a ticket
    #[must_use]
    pub fn token_uri(&self, token_id: TokenId) -> Option<&str> {
        self.ticket(token_id).map(|ticket| ticket.metadata_uri.as_str())
    }

    /// Tickets minted for an event, in mint order
    #[must_use]
    pub fn event_tickets(&self, event_id: EventId) -> &[TokenId] {
        self.by_event.get(&event_id).map_or(&[][..], Vec::as_slice)
    }

    /// Tickets held by `owner`, in ascending id order
    #[must_use]
    pub fn tickets_by_owner(&self, owner: Principal) -> &[TokenId] {
        self.by_owner.get(&owner).map_or(&[][..], Vec::as_slice)
    }

    /// Principal approved to move a single ticket
    #[must_use]
    pub fn get_approved(&self, token_id: TokenId) -> Option<Principal> {
        self.approvals.get(&token_id).copied()
    }

    /// Returns true if `operator` may move every ticket of `owner`
    #[must_use]
    pub fn is_approved_for_all(&self, owner: Principal, operator: Principal) -> bool {
        self.operators.contains(&(owner, operator))
    }

    /// Every ownership change of a ticket, starting with its mint
    #[must_use]
    pub fn transfer_history(&self, token_id: TokenId) -> &[TransferRecord] {
        self.history.get(&token_id).map_or(&[][..], Vec::as_slice)
    }

    /// Registry-wide figures
    #[must_use]
    pub fn stats(&self) -> TicketStats {
        let total_tickets = self.tickets.len() as u64;
        TicketStats {
            total_tickets,
            // A used ticket can no longer be cancelled and vice versa.
            active_tickets: total_tickets - self.used - self.cancelled,
            total_used_tickets: self.used,
        }
    }

    /// Returns true iff the ticket exists, belongs to `event_id` in this
    /// directory, is active and unused, and the event is still active.
    ///
    /// Never fails; an unknown ticket or event is simply not valid.
    #[must_use]
    pub fn verify_ticket(
        &self,
        events: &dyn EventDirectory,
        token_id: TokenId,
        event_id: EventId,
    ) -> bool {
        self.ticket(token_id).is_some_and(|ticket| {
            ticket.event_id == event_id
                && ticket.event_ref == events.directory_address()
                && ticket.is_redeemable()
                && events
                    .lookup_event(event_id)
                    .is_some_and(|event| event.is_active)
        })
    }

    fn require_ticket(&self, token_id: TokenId) -> PlatformResult<&Ticket> {
        self.ticket(token_id)
            .ok_or_else(|| PlatformError::not_found("token_id", token_id))
    }

    fn may_move(&self, ticket: &Ticket, caller: Principal) -> bool {
        caller == ticket.owner
            || self.get_approved(ticket.token_id) == Some(caller)
            || self.is_approved_for_all(ticket.owner, caller)
    }

    fn ticket_mut(&mut self, token_id: TokenId) -> Option<&mut Ticket> {
        self.tickets.get_mut(token_id.get())
    }
}

/// Adds `token_id` to the owner's index, keeping it in ascending id order
fn hold(by_owner: &mut HashMap<Principal, Vec<TokenId>>, owner: Principal, token_id: TokenId) {
    let held = by_owner.entry(owner).or_default();
    if let Err(position) = held.binary_search(&token_id) {
        held.insert(position, token_id);
    }
}

fn ensure_transferable(ticket: &Ticket) -> PlatformResult<()> {
    if ticket.is_used {
        return Err(PlatformError::invalid_state(
            format!("ticket {}", ticket.token_id),
            "is already used",
        ));
    }
    if !ticket.is_active {
        return Err(PlatformError::invalid_state(
            format!("ticket {}", ticket.token_id),
            "is cancelled",
        ));
    }
    Ok(())
}

// ============================================================================
// Actions
// ============================================================================

/// Commands handled by the ticket registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketRegistryAction {
    /// Issue one ticket
    MintTicket {
        /// Must be a minter
        caller: Principal,
        /// First owner
        recipient: Principal,
        /// Event ID
        event_id: EventId,
        /// Event registry holding the event
        event_ref: Principal,
        /// Seat label
        seat_info: String,
        /// Ticket class
        ticket_type: String,
        /// Metadata location
        metadata_uri: String,
    },

    /// Issue one ticket per recipient, in input order
    MintBatchTickets {
        /// Must be a minter
        caller: Principal,
        /// Owners, one per ticket
        recipients: Vec<Principal>,
        /// Event ID
        event_id: EventId,
        /// Event registry holding the event
        event_ref: Principal,
        /// Seat labels, parallel to `recipients`
        seat_infos: Vec<String>,
        /// Ticket class for all tickets
        ticket_type: String,
        /// Metadata location prefix; the token id is appended
        uri_prefix: String,
    },

    /// Mark a ticket as used
    UseTicket {
        /// Must be the owner
        caller: Principal,
        /// Token ID
        token_id: TokenId,
    },

    /// Move a ticket to a new owner
    TransferFrom {
        /// Owner, approved principal, or operator
        caller: Principal,
        /// Current owner
        from: Principal,
        /// New owner
        to: Principal,
        /// Token ID
        token_id: TokenId,
    },

    /// Cancel a ticket
    CancelTicket {
        /// Must be the admin
        caller: Principal,
        /// Token ID
        token_id: TokenId,
    },

    /// Approve one principal to move one ticket; NULL clears
    Approve {
        /// Owner or operator
        caller: Principal,
        /// Approved principal
        approved: Principal,
        /// Token ID
        token_id: TokenId,
    },

    /// Grant or revoke an operator for all of the caller's tickets
    SetApprovalForAll {
        /// Owner
        caller: Principal,
        /// Operator
        operator: Principal,
        /// Grant or revoke
        approved: bool,
    },

    /// Point the registry at an event registry
    SetEventRegistry {
        /// Must be the admin
        caller: Principal,
        /// Event registry principal
        registry: Principal,
    },

    /// Point the registry at a payment ledger
    SetPaymentLedger {
        /// Must be the admin
        caller: Principal,
        /// Ledger principal
        ledger: Principal,
    },

    /// Allow a principal to mint
    AuthorizeMinter {
        /// Must be the admin
        caller: Principal,
        /// New minter
        minter: Principal,
    },

    /// Withdraw a principal's mint permission
    RevokeMinter {
        /// Must be the admin
        caller: Principal,
        /// Minter to revoke
        minter: Principal,
    },
}

// ============================================================================
// Minting
// ============================================================================

/// Fields shared by every ticket of one mint call
struct TicketDraft {
    event_id: EventId,
    event_ref: Principal,
    ticket_type: String,
}

fn check_mint(
    state: &TicketRegistryState,
    events: &dyn EventDirectory,
    caller: Principal,
    recipients: &[Principal],
    event_id: EventId,
    event_ref: Principal,
) -> PlatformResult<()> {
    if !state.is_minter(caller) {
        return Err(PlatformError::unauthorized(caller, Role::Minter));
    }
    if state.event_registry != Some(events.directory_address()) {
        return Err(PlatformError::invalid_state(
            "ticket registry",
            "is not connected to the event registry",
        ));
    }
    if event_ref != events.directory_address() {
        return Err(PlatformError::invalid_input(
            "event_ref",
            "does not name the connected event registry",
        ));
    }
    match events.lookup_event(event_id) {
        None => return Err(PlatformError::not_found("event_id", event_id)),
        Some(event) if !event.is_active => {
            return Err(PlatformError::invalid_input(
                "event_id",
                format!("event {event_id} is not active"),
            ));
        }
        Some(_) => {}
    }
    for recipient in recipients {
        ensure_not_null("recipient", *recipient)?;
    }
    Ok(())
}

fn mint_one(
    state: &mut TicketRegistryState,
    draft: &TicketDraft,
    recipient: Principal,
    seat_info: String,
    metadata_uri: impl FnOnce(TokenId) -> String,
    now: DateTime<Utc>,
) -> Notification {
    let token_id = TokenId::new(state.tickets.insert_with(|raw| {
        let token_id = TokenId::new(raw);
        Ticket {
            token_id,
            event_id: draft.event_id,
            event_ref: draft.event_ref,
            owner: recipient,
            seat_info,
            ticket_type: draft.ticket_type.clone(),
            metadata_uri: metadata_uri(token_id),
            purchase_date: now,
            is_used: false,
            is_active: true,
        }
    }));
    state.by_event.entry(draft.event_id).or_default().push(token_id);
    hold(&mut state.by_owner, recipient, token_id);
    state.history.entry(token_id).or_default().push(TransferRecord {
        from: Principal::NULL,
        to: recipient,
        at: now,
    });

    Notification::TicketMinted {
        token_id,
        event_id: draft.event_id,
        owner: recipient,
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the ticket registry
///
/// Borrows the event directory it validates mints against, so the registry
/// always sees the events' current state.
#[derive(Clone, Copy)]
pub struct TicketRegistryReducer<'a> {
    events: &'a dyn EventDirectory,
}

impl<'a> TicketRegistryReducer<'a> {
    /// Creates a reducer reading events from `events`
    #[must_use]
    pub const fn new(events: &'a dyn EventDirectory) -> Self {
        Self { events }
    }
}

impl fmt::Debug for TicketRegistryReducer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketRegistryReducer")
            .field("events", &self.events.directory_address())
            .finish()
    }
}

impl Reducer for TicketRegistryReducer<'_> {
    type State = TicketRegistryState;
    type Action = TicketRegistryAction;
    type Event = Notification;
    type Error = PlatformError;
    type Environment = PlatformEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per command
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> PlatformResult<Effects> {
        match action {
            // ========== Mint ==========
            TicketRegistryAction::MintTicket {
                caller,
                recipient,
                event_id,
                event_ref,
                seat_info,
                ticket_type,
                metadata_uri,
            } => {
                check_mint(state, self.events, caller, &[recipient], event_id, event_ref)?;
                let draft = TicketDraft {
                    event_id,
                    event_ref,
                    ticket_type,
                };
                let minted = mint_one(
                    state,
                    &draft,
                    recipient,
                    seat_info,
                    |_| metadata_uri,
                    env.clock.now(),
                );
                Ok(smallvec![Effect::Emit(minted)])
            }

            TicketRegistryAction::MintBatchTickets {
                caller,
                recipients,
                event_id,
                event_ref,
                seat_infos,
                ticket_type,
                uri_prefix,
            } => {
                check_mint(state, self.events, caller, &recipients, event_id, event_ref)?;
                if recipients.is_empty() {
                    return Err(PlatformError::invalid_input("recipients", "must not be empty"));
                }
                if recipients.len() != seat_infos.len() {
                    return Err(PlatformError::invalid_input(
                        "seat_infos",
                        format!(
                            "has {} entries for {} recipients",
                            seat_infos.len(),
                            recipients.len()
                        ),
                    ));
                }

                let draft = TicketDraft {
                    event_id,
                    event_ref,
                    ticket_type,
                };
                let now = env.clock.now();
                let effects: Effects = recipients
                    .into_iter()
                    .zip(seat_infos)
                    .map(|(recipient, seat_info)| {
                        let minted = mint_one(
                            state,
                            &draft,
                            recipient,
                            seat_info,
                            |token_id| format!("{uri_prefix}{token_id}"),
                            now,
                        );
                        Effect::Emit(minted)
                    })
                    .collect();
                Ok(effects)
            }

            // ========== Lifecycle ==========
            TicketRegistryAction::UseTicket { caller, token_id } => {
                let ticket = state.require_ticket(token_id)?;
                if caller != ticket.owner {
                    return Err(PlatformError::unauthorized(caller, Role::Owner));
                }
                if !ticket.is_active {
                    return Err(PlatformError::invalid_state(
                        format!("ticket {token_id}"),
                        "is cancelled",
                    ));
                }
                if ticket.is_used {
                    return Err(PlatformError::invalid_state(
                        format!("ticket {token_id}"),
                        "is already used",
                    ));
                }

                if let Some(ticket) = state.ticket_mut(token_id) {
                    ticket.is_used = true;
                }
                state.used += 1;
                Ok(smallvec![Effect::Emit(Notification::TicketUsed { token_id })])
            }

            TicketRegistryAction::TransferFrom {
                caller,
                from,
                to,
                token_id,
            } => {
                let ticket = state.require_ticket(token_id)?;
                if !state.may_move(ticket, caller) {
                    return Err(PlatformError::unauthorized(caller, Role::OwnerOrApproved));
                }
                ensure_not_null("to", to)?;
                if from != ticket.owner {
                    return Err(PlatformError::invalid_input("from", "is not the current owner"));
                }
                ensure_transferable(ticket)?;

                if let Some(ticket) = state.ticket_mut(token_id) {
                    ticket.owner = to;
                }
                state.approvals.remove(&token_id);
                if let Some(held) = state.by_owner.get_mut(&from) {
                    held.retain(|held_id| *held_id != token_id);
                }
                hold(&mut state.by_owner, to, token_id);
                state.history.entry(token_id).or_default().push(TransferRecord {
                    from,
                    to,
                    at: env.clock.now(),
                });

                Ok(smallvec![Effect::Emit(Notification::TicketTransferred {
                    token_id,
                    from,
                    to,
                })])
            }

            TicketRegistryAction::CancelTicket { caller, token_id } => {
                ensure_admin(state.admin, caller)?;
                ensure_transferable(state.require_ticket(token_id)?)?;

                if let Some(ticket) = state.ticket_mut(token_id) {
                    ticket.is_active = false;
                }
                state.cancelled += 1;
                state.approvals.remove(&token_id);
                Ok(smallvec![Effect::Emit(Notification::TicketCancelled {
                    token_id
                })])
            }

            // ========== Approvals ==========
            TicketRegistryAction::Approve {
                caller,
                approved,
                token_id,
            } => {
                let ticket = state.require_ticket(token_id)?;
                let owner = ticket.owner;
                if caller != owner && !state.is_approved_for_all(owner, caller) {
                    return Err(PlatformError::unauthorized(caller, Role::OwnerOrApproved));
                }
                if approved == owner {
                    return Err(PlatformError::invalid_input(
                        "approved",
                        "is already the owner",
                    ));
                }

                if approved.is_null() {
                    state.approvals.remove(&token_id);
                } else {
                    state.approvals.insert(token_id, approved);
                }
                Ok(smallvec![Effect::Emit(Notification::TicketApproved {
                    token_id,
                    owner,
                    approved,
                })])
            }

            TicketRegistryAction::SetApprovalForAll {
                caller,
                operator,
                approved,
            } => {
                ensure_not_null("operator", operator)?;
                if operator == caller {
                    return Err(PlatformError::invalid_input(
                        "operator",
                        "cannot be the caller",
                    ));
                }

                if approved {
                    state.operators.insert((caller, operator));
                } else {
                    state.operators.remove(&(caller, operator));
                }
                Ok(smallvec![Effect::Emit(Notification::ApprovalForAll {
                    owner: caller,
                    operator,
                    approved,
                })])
            }

            // ========== Administration ==========
            TicketRegistryAction::SetEventRegistry { caller, registry } => {
                ensure_admin(state.admin, caller)?;
                ensure_not_null("registry", registry)?;
                state.event_registry = Some(registry);
                Ok(smallvec![Effect::Emit(Notification::ReferenceUpdated {
                    component: Component::TicketRegistry,
                    reference: Component::EventRegistry,
                    target: registry,
                })])
            }

            TicketRegistryAction::SetPaymentLedger { caller, ledger } => {
                ensure_admin(state.admin, caller)?;
                ensure_not_null("ledger", ledger)?;
                state.payment_ledger = Some(ledger);
                Ok(smallvec![Effect::Emit(Notification::ReferenceUpdated {
                    component: Component::TicketRegistry,
                    reference: Component::PaymentLedger,
                    target: ledger,
                })])
            }

            TicketRegistryAction::AuthorizeMinter { caller, minter } => {
                ensure_admin(state.admin, caller)?;
                ensure_not_null("minter", minter)?;
                state.minters.insert(minter);
                Ok(smallvec![Effect::Emit(Notification::MinterUpdated {
                    minter,
                    authorized: true,
                })])
            }

            TicketRegistryAction::RevokeMinter { caller, minter } => {
                ensure_admin(state.admin, caller)?;
                if minter == state.admin {
                    return Err(PlatformError::invalid_input(
                        "minter",
                        "the admin is always a minter",
                    ));
                }
                state.minters.remove(&minter);
                Ok(smallvec![Effect::Emit(Notification::MinterUpdated {
                    minter,
                    authorized: false,
                })])
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::aggregates::test_support::{details, env};
    use crate::aggregates::{EventRegistryAction, EventRegistryReducer, EventRegistryState};
    use crate::error::ErrorKind;
    use stagepass_testing::{ReducerTest, assertions};

    struct Fixture {
        organizer: Principal,
        events: EventRegistryState,
        tickets: TicketRegistryState,
    }

    impl Fixture {
        /// One active event (id 1) and a ticket registry wired to it
        fn new() -> Self {
            let admin = Principal::new();
            let organizer = Principal::new();
            let mut events = EventRegistryState::new(Principal::new(), admin);
            EventRegistryReducer
                .reduce(
                    &mut events,
                    EventRegistryAction::CreateEvent {
                        organizer,
                        details: details(100, 0),
                    },
                    &env(),
                )
                .unwrap();
            let mut tickets = TicketRegistryState::new(Principal::new(), admin);
            tickets.event_registry = Some(events.address());
            Self {
                organizer,
                events,
                tickets,
            }
        }

        fn admin(&self) -> Principal {
            self.tickets.admin()
        }

        fn send(&mut self, action: TicketRegistryAction) -> PlatformResult<Effects> {
            TicketRegistryReducer::new(&self.events).reduce(&mut self.tickets, action, &env())
        }

        fn mint_to(&mut self, recipient: Principal) -> TokenId {
            let action = TicketRegistryAction::MintTicket {
                caller: self.admin(),
                recipient,
                event_id: EventId::new(1),
                event_ref: self.events.address(),
                seat_info: "A-1".to_string(),
                ticket_type: "General".to_string(),
                metadata_uri: "ipfs://ticket".to_string(),
            };
            self.send(action).unwrap();
            TokenId::new(self.tickets.tickets.len() as u64)
        }

        fn cancel_event(&mut self) {
            EventRegistryReducer
                .reduce(
                    &mut self.events,
                    EventRegistryAction::CancelEvent {
                        event_id: EventId::new(1),
                        caller: self.organizer,
                    },
                    &env(),
                )
                .unwrap();
        }
    }

    #[test]
    fn admin_mints_and_history_starts_at_null() {
        let fixture = Fixture::new();
        let owner = Principal::new();
        let event_ref = fixture.events.address();
        ReducerTest::new(TicketRegistryReducer::new(&fixture.events))
            .with_env(env())
            .given_state(fixture.tickets.clone())
            .when_action(TicketRegistryAction::MintTicket {
                caller: fixture.tickets.admin(),
                recipient: owner,
                event_id: EventId::new(1),
                event_ref,
                seat_info: "B-12".to_string(),
                ticket_type: "VIP".to_string(),
                metadata_uri: "ipfs://vip".to_string(),
            })
            .then_state(move |state| {
                let token_id = TokenId::new(1);
                assert_eq!(state.owner_of(token_id), Some(owner));
                assert_eq!(state.token_uri(token_id), Some("ipfs://vip"));
                assert_eq!(state.balance_of(owner), 1);
                let history = state.transfer_history(token_id);
                assert_eq!(history.len(), 1);
                assert_eq!(history[0].from, Principal::NULL);
                assert_eq!(history[0].to, owner);
            })
            .then_effects(|effects| assertions::assert_emitted_count(effects, 1))
            .run();
    }

    #[test]
    fn non_minter_cannot_mint() {
        let mut fixture = Fixture::new();
        let event_ref = fixture.events.address();
        let result = fixture.send(TicketRegistryAction::MintTicket {
            caller: Principal::new(),
            recipient: Principal::new(),
            event_id: EventId::new(1),
            event_ref,
            seat_info: String::new(),
            ticket_type: String::new(),
            metadata_uri: String::new(),
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn mint_for_unknown_or_cancelled_event_is_invalid_input() {
        let mut fixture = Fixture::new();
        let event_ref = fixture.events.address();
        let admin = fixture.admin();
        let mint = |event_id| TicketRegistryAction::MintTicket {
            caller: admin,
            recipient: Principal::new(),
            event_id,
            event_ref,
            seat_info: String::new(),
            ticket_type: String::new(),
            metadata_uri: String::new(),
        };

        let unknown = fixture.send(mint(EventId::new(2)));
        assert!(matches!(unknown, Err(PlatformError::InvalidInput { field: "event_id", .. })));

        fixture.cancel_event();
        let cancelled = fixture.send(mint(EventId::new(1)));
        assert!(matches!(cancelled, Err(PlatformError::InvalidInput { field: "event_id", .. })));
        assert_eq!(fixture.tickets.stats().total_tickets, 0);
    }

    #[test]
    fn batch_mint_preserves_order_and_checks_lengths() {
        let mut fixture = Fixture::new();
        let recipients = vec![Principal::new(), Principal::new(), Principal::new()];
        let event_ref = fixture.events.address();
        let admin = fixture.admin();

        let mismatch = fixture.send(TicketRegistryAction::MintBatchTickets {
            caller: admin,
            recipients: recipients.clone(),
            event_id: EventId::new(1),
            event_ref,
            seat_infos: vec!["A-1".to_string()],
            ticket_type: "General".to_string(),
            uri_prefix: "ipfs://batch/".to_string(),
        });
        assert!(matches!(mismatch, Err(PlatformError::InvalidInput { field: "seat_infos", .. })));

        let effects = fixture
            .send(TicketRegistryAction::MintBatchTickets {
                caller: admin,
                recipients: recipients.clone(),
                event_id: EventId::new(1),
                event_ref,
                seat_infos: vec!["A-1".into(), "A-2".into(), "A-3".into()],
                ticket_type: "General".to_string(),
                uri_prefix: "ipfs://batch/".to_string(),
            })
            .unwrap();
        assertions::assert_emitted_count(&effects, 3);

        for (index, recipient) in recipients.iter().enumerate() {
            let token_id = TokenId::new(index as u64 + 1);
            assert_eq!(fixture.tickets.owner_of(token_id), Some(*recipient));
            assert_eq!(
                fixture.tickets.token_uri(token_id),
                Some(format!("ipfs://batch/{}", index + 1).as_str())
            );
        }
        assert_eq!(
            fixture.tickets.event_tickets(EventId::new(1)),
            &[TokenId::new(1), TokenId::new(2), TokenId::new(3)]
        );
    }

    #[test]
    fn used_ticket_cannot_be_used_transferred_or_cancelled() {
        let mut fixture = Fixture::new();
        let owner = Principal::new();
        let token_id = fixture.mint_to(owner);
        let admin = fixture.admin();

        fixture
            .send(TicketRegistryAction::UseTicket {
                caller: owner,
                token_id,
            })
            .unwrap();

        let again = fixture.send(TicketRegistryAction::UseTicket {
            caller: owner,
            token_id,
        });
        assert_eq!(again.unwrap_err().kind(), ErrorKind::InvalidState);

        let transfer = fixture.send(TicketRegistryAction::TransferFrom {
            caller: owner,
            from: owner,
            to: Principal::new(),
            token_id,
        });
        assert_eq!(transfer.unwrap_err().kind(), ErrorKind::InvalidState);

        let cancel = fixture.send(TicketRegistryAction::CancelTicket {
            caller: admin,
            token_id,
        });
        assert_eq!(cancel.unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(fixture.tickets.stats().total_used_tickets, 1);
    }

    #[test]
    fn only_owner_may_use() {
        let mut fixture = Fixture::new();
        let token_id = fixture.mint_to(Principal::new());
        let result = fixture.send(TicketRegistryAction::UseTicket {
            caller: Principal::new(),
            token_id,
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn cancelled_ticket_cannot_be_used_or_transferred() {
        let mut fixture = Fixture::new();
        let owner = Principal::new();
        let token_id = fixture.mint_to(owner);
        let admin = fixture.admin();
        fixture
            .send(TicketRegistryAction::CancelTicket {
                caller: admin,
                token_id,
            })
            .unwrap();

        let result = fixture.send(TicketRegistryAction::UseTicket {
            caller: owner,
            token_id,
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidState);

        let transfer = fixture.send(TicketRegistryAction::TransferFrom {
            caller: owner,
            from: owner,
            to: Principal::new(),
            token_id,
        });
        assert_eq!(transfer.unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(fixture.tickets.owner_of(token_id), Some(owner));
        assert_eq!(fixture.tickets.tickets_by_owner(owner), &[token_id]);
        assert_eq!(fixture.tickets.stats().active_tickets, 0);
    }

    #[test]
    fn received_ticket_keeps_owner_index_ascending() {
        let mut fixture = Fixture::new();
        let alice = Principal::new();
        let bob = Principal::new();
        let first = fixture.mint_to(alice);
        let second = fixture.mint_to(bob);
        let third = fixture.mint_to(bob);

        fixture
            .send(TicketRegistryAction::TransferFrom {
                caller: alice,
                from: alice,
                to: bob,
                token_id: first,
            })
            .unwrap();

        assert_eq!(fixture.tickets.tickets_by_owner(bob), &[first, second, third]);
        assert_eq!(fixture.tickets.token_of_owner_by_index(bob, 0), Some(first));
        assert_eq!(fixture.tickets.balance_of(bob), 3);
        assert_eq!(fixture.tickets.balance_of(alice), 0);
    }

    #[test]
    fn stats_track_used_and_cancelled_tickets() {
        let mut fixture = Fixture::new();
        let owner = Principal::new();
        let used = fixture.mint_to(owner);
        let cancelled = fixture.mint_to(owner);
        fixture.mint_to(owner);
        let admin = fixture.admin();

        fixture
            .send(TicketRegistryAction::UseTicket {
                caller: owner,
                token_id: used,
            })
            .unwrap();
        fixture
            .send(TicketRegistryAction::CancelTicket {
                caller: admin,
                token_id: cancelled,
            })
            .unwrap();
        // Rejected calls leave the totals alone.
        let _ = fixture.send(TicketRegistryAction::CancelTicket {
            caller: admin,
            token_id: used,
        });

        assert_eq!(
            fixture.tickets.stats(),
            TicketStats {
                total_tickets: 3,
                active_tickets: 1,
                total_used_tickets: 1,
            }
        );
    }

    #[test]
    fn approved_principal_moves_ticket_once() {
        let mut fixture = Fixture::new();
        let owner = Principal::new();
        let spender = Principal::new();
        let buyer = Principal::new();
        let token_id = fixture.mint_to(owner);

        fixture
            .send(TicketRegistryAction::Approve {
                caller: owner,
                approved: spender,
                token_id,
            })
            .unwrap();
        fixture
            .send(TicketRegistryAction::TransferFrom {
                caller: spender,
                from: owner,
                to: buyer,
                token_id,
            })
            .unwrap();

        assert_eq!(fixture.tickets.owner_of(token_id), Some(buyer));
        assert_eq!(fixture.tickets.get_approved(token_id), None);
        assert!(fixture.tickets.tickets_by_owner(owner).is_empty());
        assert_eq!(fixture.tickets.token_of_owner_by_index(buyer, 0), Some(token_id));
        assert_eq!(fixture.tickets.transfer_history(token_id).len(), 2);

        let replay = fixture.send(TicketRegistryAction::TransferFrom {
            caller: spender,
            from: buyer,
            to: spender,
            token_id,
        });
        assert_eq!(replay.unwrap_err().kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn operator_may_move_any_ticket_of_owner() {
        let mut fixture = Fixture::new();
        let owner = Principal::new();
        let operator = Principal::new();
        let token_id = fixture.mint_to(owner);

        fixture
            .send(TicketRegistryAction::SetApprovalForAll {
                caller: owner,
                operator,
                approved: true,
            })
            .unwrap();
        assert!(fixture.tickets.is_approved_for_all(owner, operator));

        let to_null = fixture.send(TicketRegistryAction::TransferFrom {
            caller: operator,
            from: owner,
            to: Principal::NULL,
            token_id,
        });
        assert!(matches!(to_null, Err(PlatformError::InvalidInput { field: "to", .. })));

        fixture
            .send(TicketRegistryAction::TransferFrom {
                caller: operator,
                from: owner,
                to: operator,
                token_id,
            })
            .unwrap();
        assert_eq!(fixture.tickets.owner_of(token_id), Some(operator));
    }

    #[test]
    fn verify_ticket_follows_event_state() {
        let mut fixture = Fixture::new();
        let token_id = fixture.mint_to(Principal::new());

        assert!(fixture.tickets.verify_ticket(&fixture.events, token_id, EventId::new(1)));
        assert!(!fixture.tickets.verify_ticket(&fixture.events, token_id, EventId::new(2)));
        assert!(!fixture.tickets.verify_ticket(&fixture.events, TokenId::new(99), EventId::new(1)));

        fixture.cancel_event();
        assert!(!fixture.tickets.verify_ticket(&fixture.events, token_id, EventId::new(1)));
    }

    #[test]
    fn minter_management() {
        let mut fixture = Fixture::new();
        let admin = fixture.admin();
        let minter = Principal::new();

        fixture
            .send(TicketRegistryAction::AuthorizeMinter { caller: admin, minter })
            .unwrap();
        assert!(fixture.tickets.is_minter(minter));

        fixture
            .send(TicketRegistryAction::RevokeMinter { caller: admin, minter })
            .unwrap();
        assert!(!fixture.tickets.is_minter(minter));

        let revoke_admin = fixture.send(TicketRegistryAction::RevokeMinter {
            caller: admin,
            minter: admin,
        });
        assert_eq!(revoke_admin.unwrap_err().kind(), ErrorKind::InvalidInput);
        assert!(fixture.tickets.is_minter(admin));
    }

    #[test]
    fn unwired_registry_refuses_to_mint() {
        let mut fixture = Fixture::new();
        fixture.tickets.event_registry = None;
        let event_ref = fixture.events.address();
        let admin = fixture.admin();
        let result = fixture.send(TicketRegistryAction::MintTicket {
            caller: admin,
            recipient: Principal::new(),
            event_id: EventId::new(1),
            event_ref,
            seat_info: String::new(),
            ticket_type: String::new(),
            metadata_uri: String::new(),
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidState);
    }
}
