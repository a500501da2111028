//! The composed platform reducer.
//!
//! Runs every component over one [`PlatformState`] so that flows spanning
//! components are atomic: registration checks the event, then the payment,
//! and only then records both. Component-local commands are delegated to the
//! component reducers unchanged.

use super::event_registry::{self, EventRegistryAction, EventRegistryReducer, EventRegistryState};
use super::payment_ledger::{
    self, PaymentLedgerAction, PaymentLedgerReducer, PaymentLedgerState, PaymentRequest,
};
use super::ticket_registry::{TicketRegistryAction, TicketRegistryReducer, TicketRegistryState};
use super::{Effects, PlatformEnvironment};
use crate::config::PlatformConfig;
use crate::error::{PlatformError, PlatformResult};
use crate::notification::Notification;
use crate::types::{EventId, Money, Principal, TokenId};
use serde::{Deserialize, Serialize};
use stagepass_core::{effect::Effect, reducer::Reducer, smallvec};

/// Principals of the three components
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addresses {
    /// Event registry
    pub event_registry: Principal,
    /// Payment ledger
    pub payment_ledger: Principal,
    /// Ticket registry
    pub ticket_registry: Principal,
}

impl Addresses {
    /// Fresh random principals for each component
    #[must_use]
    pub fn generate() -> Self {
        Self {
            event_registry: Principal::new(),
            payment_ledger: Principal::new(),
            ticket_registry: Principal::new(),
        }
    }
}

/// State of all three components
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformState {
    /// Event registry state
    pub events: EventRegistryState,
    /// Payment ledger state
    pub payments: PaymentLedgerState,
    /// Ticket registry state
    pub tickets: TicketRegistryState,
}

impl PlatformState {
    /// Creates the three components with no references between them
    #[must_use]
    pub fn new(addresses: Addresses, config: &PlatformConfig) -> Self {
        Self {
            events: EventRegistryState::new(addresses.event_registry, config.admin),
            payments: PaymentLedgerState::new(addresses.payment_ledger, config.admin)
                .with_fee_percent(config.platform_fee_percent)
                .with_min_withdrawal(config.min_withdrawal)
                .with_max_payment(config.max_payment),
            tickets: TicketRegistryState::new(addresses.ticket_registry, config.admin),
        }
    }

    /// Live validity check of a ticket against its event
    #[must_use]
    pub fn verify_ticket(&self, token_id: TokenId, event_id: EventId) -> bool {
        self.tickets.verify_ticket(&self.events, token_id, event_id)
    }

    fn ensure_ledger_connected(&self) -> PlatformResult<()> {
        if self.events.payment_ledger() == Some(self.payments.address()) {
            Ok(())
        } else {
            Err(PlatformError::invalid_state(
                "event registry",
                "is not connected to the payment ledger",
            ))
        }
    }
}

/// Every command the platform accepts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformAction {
    /// Event registry command
    Events(EventRegistryAction),

    /// Payment ledger command
    Payments(PaymentLedgerAction),

    /// Ticket registry command
    Tickets(TicketRegistryAction),

    /// Register for an event, paying its exact ticket price
    RegisterForEvent {
        /// Event ID
        event_id: EventId,
        /// Participant registering
        participant: Principal,
        /// Value supplied with the call
        supplied: Money,
    },

    /// Change the platform fee through the event registry
    UpdatePlatformFee {
        /// Must be the event registry admin
        caller: Principal,
        /// New fee, 0-20
        percent: u8,
    },
}

impl PlatformAction {
    /// Operation name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Events(action) => match action {
                EventRegistryAction::CreateEvent { .. } => "create_event",
                EventRegistryAction::UpdateEvent { .. } => "update_event",
                EventRegistryAction::CancelEvent { .. } => "cancel_event",
                EventRegistryAction::SetPaymentLedger { .. } => "events.set_payment_ledger",
                EventRegistryAction::SetTicketRegistry { .. } => "events.set_ticket_registry",
            },
            Self::Payments(action) => match action {
                PaymentLedgerAction::ProcessPayment { .. } => "process_payment",
                PaymentLedgerAction::WithdrawOrganizerFunds { .. } => "withdraw_organizer_funds",
                PaymentLedgerAction::WithdrawPlatformFees { .. } => "withdraw_platform_fees",
                PaymentLedgerAction::UpdatePlatformFee { .. } => "payments.update_platform_fee",
                PaymentLedgerAction::EmergencyPause { .. } => "emergency_pause",
                PaymentLedgerAction::EmergencyUnpause { .. } => "emergency_unpause",
                PaymentLedgerAction::SetEventRegistry { .. } => "payments.set_event_registry",
            },
            Self::Tickets(action) => match action {
                TicketRegistryAction::MintTicket { .. } => "mint_ticket",
                TicketRegistryAction::MintBatchTickets { .. } => "mint_batch_tickets",
                TicketRegistryAction::UseTicket { .. } => "use_ticket",
                TicketRegistryAction::TransferFrom { .. } => "transfer_from",
                TicketRegistryAction::CancelTicket { .. } => "cancel_ticket",
                TicketRegistryAction::Approve { .. } => "approve",
                TicketRegistryAction::SetApprovalForAll { .. } => "set_approval_for_all",
                TicketRegistryAction::SetEventRegistry { .. } => "tickets.set_event_registry",
                TicketRegistryAction::SetPaymentLedger { .. } => "tickets.set_payment_ledger",
                TicketRegistryAction::AuthorizeMinter { .. } => "authorize_minter",
                TicketRegistryAction::RevokeMinter { .. } => "revoke_minter",
            },
            Self::RegisterForEvent { .. } => "register_for_event",
            Self::UpdatePlatformFee { .. } => "update_platform_fee",
        }
    }
}

/// Reducer over the whole platform
#[derive(Clone, Copy, Debug, Default)]
pub struct PlatformReducer;

impl PlatformReducer {
    /// Creates a new `PlatformReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Registration: event checks, then payment checks, then both records
    ///
    /// Free events take no payment and create no payment record.
    fn register(
        state: &mut PlatformState,
        env: &PlatformEnvironment,
        event_id: EventId,
        participant: Principal,
        supplied: Money,
    ) -> PlatformResult<Effects> {
        let event =
            event_registry::check_registration(&state.events, event_id, participant, supplied)?;
        let price = event.details.ticket_price;
        let organizer = event.organizer;

        let payment = if price.is_zero() {
            None
        } else {
            state.ensure_ledger_connected()?;
            let request = PaymentRequest {
                event_id,
                payer: participant,
                organizer,
                amount: price,
            };
            payment_ledger::check_payment(&state.payments, state.events.address(), &request, supplied)?;
            Some(request)
        };

        let mut effects: Effects = smallvec![Effect::Emit(event_registry::record_registration(
            &mut state.events,
            event_id,
            participant,
        ))];
        if let Some(request) = payment {
            effects.extend(payment_ledger::record_payment(&mut state.payments, env, request));
        }
        Ok(effects)
    }

    /// Fee change through the event registry, stored by the ledger
    fn update_fee(state: &mut PlatformState, caller: Principal, percent: u8) -> PlatformResult<Effects> {
        let fee_percent = event_registry::check_fee_update(&state.events, caller, percent)?;
        state.ensure_ledger_connected()?;
        payment_ledger::check_fee_update(&state.payments, state.events.address(), percent)?;
        Ok(smallvec![Effect::Emit(payment_ledger::apply_fee_update(
            &mut state.payments,
            fee_percent,
        ))])
    }
}

impl Reducer for PlatformReducer {
    type State = PlatformState;
    type Action = PlatformAction;
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
            PlatformAction::Events(action) => EventRegistryReducer.reduce(&mut state.events, action, env),
            PlatformAction::Payments(action) => PaymentLedgerReducer.reduce(&mut state.payments, action, env),
            PlatformAction::Tickets(action) => {
                TicketRegistryReducer::new(&state.events).reduce(&mut state.tickets, action, env)
            }
            PlatformAction::RegisterForEvent {
                event_id,
                participant,
                supplied,
            } => Self::register(state, env, event_id, participant, supplied),
            PlatformAction::UpdatePlatformFee { caller, percent } => {
                Self::update_fee(state, caller, percent)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::aggregates::test_support::{details, env};
    use crate::error::ErrorKind;
    use stagepass_testing::{ReducerTest, assertions};

    /// Platform with ledger and registry references wired and one event
    /// (id 1) priced at `price`
    fn wired(price: u128) -> (PlatformState, Principal) {
        let config = PlatformConfig::default();
        let admin = config.admin;
        let addresses = Addresses::generate();
        let mut state = PlatformState::new(addresses, &config);
        let organizer = Principal::new();
        for action in [
            PlatformAction::Events(EventRegistryAction::SetPaymentLedger {
                caller: admin,
                ledger: addresses.payment_ledger,
            }),
            PlatformAction::Payments(PaymentLedgerAction::SetEventRegistry {
                caller: admin,
                registry: addresses.event_registry,
            }),
            PlatformAction::Events(EventRegistryAction::CreateEvent {
                organizer,
                details: details(2, price),
            }),
        ] {
            PlatformReducer.reduce(&mut state, action, &env()).unwrap();
        }
        (state, organizer)
    }

    #[test]
    fn paid_registration_records_both_sides() {
        let (state, organizer) = wired(10_000_000);
        let participant = Principal::new();
        ReducerTest::new(PlatformReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(PlatformAction::RegisterForEvent {
                event_id: EventId::new(1),
                participant,
                supplied: Money::from_units(10_000_000),
            })
            .then_state(move |state| {
                assert!(state.events.is_registered(EventId::new(1), participant));
                assert_eq!(state.events.event(EventId::new(1)).unwrap().registered_count, 1);
                let balance = state.payments.organizer_balance(organizer);
                assert_eq!(balance.total_earned, Money::from_units(9_500_000));
            })
            .then_effects(move |effects| {
                let emitted = assertions::emitted(effects);
                assert_eq!(emitted.len(), 2);
                assert_eq!(
                    emitted[0],
                    &Notification::UserRegistered {
                        event_id: EventId::new(1),
                        participant,
                    }
                );
                assert!(matches!(emitted[1], Notification::PaymentProcessed { .. }));
                assertions::assert_has_interaction(effects, "payment_collection");
            })
            .run();
    }

    #[test]
    fn free_registration_skips_the_ledger() {
        let (state, _) = wired(0);
        ReducerTest::new(PlatformReducer)
            .with_env(env())
            .given_state(state)
            .when_action(PlatformAction::RegisterForEvent {
                event_id: EventId::new(1),
                participant: Principal::new(),
                supplied: Money::ZERO,
            })
            .then_state(|state| assert_eq!(state.payments.stats().total_payments, 0))
            .then_effects(|effects| {
                assertions::assert_emitted_count(effects, 1);
                assertions::assert_no_interaction(effects);
            })
            .run();
    }

    #[test]
    fn paused_ledger_rejects_the_whole_registration() {
        let (mut state, _) = wired(100);
        let admin = state.payments.admin();
        PlatformReducer
            .reduce(
                &mut state,
                PlatformAction::Payments(PaymentLedgerAction::EmergencyPause { caller: admin }),
                &env(),
            )
            .unwrap();

        ReducerTest::new(PlatformReducer)
            .with_env(env())
            .given_state(state)
            .when_action(PlatformAction::RegisterForEvent {
                event_id: EventId::new(1),
                participant: Principal::new(),
                supplied: Money::from_units(100),
            })
            .then_error(|error| assert_eq!(*error, PlatformError::Paused))
            .then_state(|state| {
                assert_eq!(state.events.event(EventId::new(1)).unwrap().registered_count, 0);
            })
            .run();
    }

    #[test]
    fn unwired_ledger_rejects_paid_registration() {
        let config = PlatformConfig::default();
        let mut state = PlatformState::new(Addresses::generate(), &config);
        PlatformReducer
            .reduce(
                &mut state,
                PlatformAction::Events(EventRegistryAction::CreateEvent {
                    organizer: Principal::new(),
                    details: details(5, 100),
                }),
                &env(),
            )
            .unwrap();

        let result = PlatformReducer.reduce(
            &mut state,
            PlatformAction::RegisterForEvent {
                event_id: EventId::new(1),
                participant: Principal::new(),
                supplied: Money::from_units(100),
            },
            &env(),
        );
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(state.events.event(EventId::new(1)).unwrap().registered_count, 0);
    }

    #[test]
    fn fee_update_through_registry_lands_in_ledger() {
        let (state, _) = wired(0);
        let admin = state.events.admin();
        ReducerTest::new(PlatformReducer)
            .with_env(env())
            .given_state(state.clone())
            .when_action(PlatformAction::UpdatePlatformFee {
                caller: admin,
                percent: 12,
            })
            .then_state(|state| assert_eq!(state.payments.fee_percent().get(), 12))
            .run();

        ReducerTest::new(PlatformReducer)
            .with_env(env())
            .given_state(state)
            .when_action(PlatformAction::UpdatePlatformFee {
                caller: admin,
                percent: 21,
            })
            .then_error(|error| assert_eq!(error.kind(), ErrorKind::InvalidInput))
            .then_state(|state| assert_eq!(state.payments.fee_percent().get(), 5))
            .run();
    }

    #[test]
    fn action_names_are_stable() {
        let action = PlatformAction::RegisterForEvent {
            event_id: EventId::new(1),
            participant: Principal::new(),
            supplied: Money::ZERO,
        };
        assert_eq!(action.name(), "register_for_event");
    }
}
