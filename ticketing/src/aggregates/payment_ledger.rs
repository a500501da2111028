//! Payment ledger component.
//!
//! Records every payment with its exact fee split, credits organizer shares to
//! per-organizer balances, and pays out withdrawals. Bookkeeping is always
//! finalized before the value transfer runs; the transfer is returned as an
//! interaction and executed by the store afterwards.
//!
//! Conservation: for every organizer,
//! `available_balance + withdrawn_amount == Σ organizer_share`.

use super::{Effects, PlatformEnvironment, ensure_admin, ensure_not_null};
use crate::config::{DEFAULT_MAX_PAYMENT, DEFAULT_MIN_WITHDRAWAL};
use crate::error::{PlatformError, PlatformResult, Role};
use crate::notification::{Component, Notification};
use crate::transfer::{self, Transfer, TransferPurpose};
use crate::types::{
    EventId, FeePercent, Money, OrganizerBalance, PaymentId, PaymentRecord, PaymentStats, Principal,
};
use serde::{Deserialize, Serialize};
use stagepass_core::{arena::Arena, effect::Effect, reducer::Reducer, smallvec};
use std::collections::HashMap;

// ============================================================================
// State
// ============================================================================

/// State of the payment ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLedgerState {
    address: Principal,
    admin: Principal,
    event_registry: Option<Principal>,
    fee_percent: FeePercent,
    min_withdrawal: Money,
    max_payment: Money,
    paused: bool,
    payments: Arena<PaymentRecord>,
    by_event: HashMap<EventId, Vec<PaymentId>>,
    by_organizer: HashMap<Principal, Vec<PaymentId>>,
    by_payer: HashMap<Principal, Vec<PaymentId>>,
    balances: HashMap<Principal, OrganizerBalance>,
    total_volume: Money,
    total_platform_fees: Money,
    platform_fees_withdrawn: Money,
    organizer_withdrawals: Money,
}

impl PaymentLedgerState {
    /// Creates an empty, unpaused ledger with default limits
    #[must_use]
    pub fn new(address: Principal, admin: Principal) -> Self {
        Self {
            address,
            admin,
            event_registry: None,
            fee_percent: FeePercent::DEFAULT,
            min_withdrawal: Money::from_units(DEFAULT_MIN_WITHDRAWAL),
            max_payment: Money::from_units(DEFAULT_MAX_PAYMENT),
            paused: false,
            payments: Arena::new(),
            by_event: HashMap::new(),
            by_organizer: HashMap::new(),
            by_payer: HashMap::new(),
            balances: HashMap::new(),
            total_volume: Money::ZERO,
            total_platform_fees: Money::ZERO,
            platform_fees_withdrawn: Money::ZERO,
            organizer_withdrawals: Money::ZERO,
        }
    }

    /// Sets the initial platform fee
    #[must_use]
    pub fn with_fee_percent(mut self, fee_percent: FeePercent) -> Self {
        self.fee_percent = fee_percent;
        self
    }

    /// Sets the minimum organizer withdrawal
    #[must_use]
    pub fn with_min_withdrawal(mut self, min_withdrawal: Money) -> Self {
        self.min_withdrawal = min_withdrawal;
        self
    }

    /// Sets the payment sanity ceiling
    #[must_use]
    pub fn with_max_payment(mut self, max_payment: Money) -> Self {
        self.max_payment = max_payment;
        self
    }

    /// This ledger's principal; collected payments are held here
    #[must_use]
    pub const fn address(&self) -> Principal {
        self.address
    }

    /// Admin principal
    #[must_use]
    pub const fn admin(&self) -> Principal {
        self.admin
    }

    /// Event registry allowed to submit payments
    #[must_use]
    pub const fn event_registry(&self) -> Option<Principal> {
        self.event_registry
    }

    /// Current platform fee
    #[must_use]
    pub const fn fee_percent(&self) -> FeePercent {
        self.fee_percent
    }

    /// Smallest accepted organizer withdrawal
    #[must_use]
    pub const fn min_withdrawal(&self) -> Money {
        self.min_withdrawal
    }

    /// Returns true while payments are suspended
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Gets a payment record by ID
    #[must_use]
    pub fn payment(&self, payment_id: PaymentId) -> Option<&PaymentRecord> {
        self.payments.get(payment_id.get())
    }

    /// Payments for an event, in processing order
    #[must_use]
    pub fn event_payments(&self, event_id: EventId) -> &[PaymentId] {
        self.by_event.get(&event_id).map_or(&[][..], Vec::as_slice)
    }

    /// The `limit` most recent payments to `organizer`, in processing order
    #[must_use]
    pub fn payments_by_organizer(&self, organizer: Principal, limit: usize) -> &[PaymentId] {
        most_recent(self.by_organizer.get(&organizer), limit)
    }

    /// The `limit` most recent payments by `payer`, in processing order
    #[must_use]
    pub fn payments_by_payer(&self, payer: Principal, limit: usize) -> &[PaymentId] {
        most_recent(self.by_payer.get(&payer), limit)
    }

    /// Balance of an organizer; zero for organizers never paid
    #[must_use]
    pub fn organizer_balance(&self, organizer: Principal) -> OrganizerBalance {
        self.balances.get(&organizer).copied().unwrap_or_default()
    }

    /// Platform fees charged but not yet swept
    #[must_use]
    pub const fn pending_platform_fees(&self) -> Money {
        self.total_platform_fees
            .saturating_sub(self.platform_fees_withdrawn)
    }

    /// Ledger-wide figures
    #[must_use]
    pub fn stats(&self) -> PaymentStats {
        PaymentStats {
            total_payments: u64::try_from(self.payments.len()).unwrap_or(u64::MAX),
            total_volume: self.total_volume,
            total_platform_fees: self.total_platform_fees,
            current_held_balance: self
                .total_volume
                .saturating_sub(self.organizer_withdrawals)
                .saturating_sub(self.platform_fees_withdrawn),
        }
    }

    fn ensure_live(&self) -> PlatformResult<()> {
        if self.paused {
            Err(PlatformError::Paused)
        } else {
            Ok(())
        }
    }

    fn is_registry_or_admin(&self, caller: Principal) -> bool {
        caller == self.admin || self.event_registry == Some(caller)
    }
}

fn most_recent(ids: Option<&Vec<PaymentId>>, limit: usize) -> &[PaymentId] {
    let ids = ids.map_or(&[][..], Vec::as_slice);
    &ids[ids.len().saturating_sub(limit)..]
}

// ============================================================================
// Actions
// ============================================================================

/// Commands handled by the payment ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentLedgerAction {
    /// Record a payment and split it
    ProcessPayment {
        /// Must be the wired event registry or the admin
        caller: Principal,
        /// Event ID
        event_id: EventId,
        /// Payer
        payer: Principal,
        /// Organizer credited with the share
        organizer: Principal,
        /// Amount due
        amount: Money,
        /// Amount supplied with the call
        supplied: Money,
    },

    /// Pay out part of an organizer's available balance
    WithdrawOrganizerFunds {
        /// Organizer withdrawing
        organizer: Principal,
        /// Amount
        amount: Money,
    },

    /// Sweep all pending platform fees to the admin
    WithdrawPlatformFees {
        /// Must be the admin
        caller: Principal,
    },

    /// Change the platform fee
    UpdatePlatformFee {
        /// Must be the admin or the wired event registry
        caller: Principal,
        /// New fee, 0-20
        percent: u8,
    },

    /// Suspend payments and organizer withdrawals
    EmergencyPause {
        /// Must be the admin
        caller: Principal,
    },

    /// Resume payments and organizer withdrawals
    EmergencyUnpause {
        /// Must be the admin
        caller: Principal,
    },

    /// Point the ledger at an event registry
    SetEventRegistry {
        /// Must be the admin
        caller: Principal,
        /// Registry principal
        registry: Principal,
    },
}

// ============================================================================
// Payment processing
// ============================================================================

/// A payment accepted by [`check_payment`], ready to record
#[derive(Clone, Copy, Debug)]
pub(crate) struct PaymentRequest {
    pub event_id: EventId,
    pub payer: Principal,
    pub organizer: Principal,
    pub amount: Money,
}

/// Validates a payment
///
/// # Errors
///
/// In order: `Unauthorized` unless `caller` is the wired event registry or
/// the admin; `InvalidInput` for a zero amount, an amount above the ceiling,
/// or a null payer/organizer; `Paused`; `InvalidPayment` unless `supplied`
/// equals `amount`.
pub(crate) fn check_payment(
    state: &PaymentLedgerState,
    caller: Principal,
    request: &PaymentRequest,
    supplied: Money,
) -> PlatformResult<()> {
    if !state.is_registry_or_admin(caller) {
        return Err(PlatformError::unauthorized(caller, Role::EventRegistry));
    }
    if request.amount.is_zero() {
        return Err(PlatformError::invalid_input("amount", "must be positive"));
    }
    if request.amount > state.max_payment {
        return Err(PlatformError::invalid_input(
            "amount",
            format!("exceeds the ceiling of {}", state.max_payment),
        ));
    }
    ensure_not_null("payer", request.payer)?;
    ensure_not_null("organizer", request.organizer)?;
    state.ensure_live()?;
    if supplied != request.amount {
        return Err(PlatformError::InvalidPayment {
            required: request.amount,
            supplied,
        });
    }
    Ok(())
}

/// Records a payment accepted by [`check_payment`]
///
/// Returns the collection transfer (payer to ledger) as an interaction after
/// the `PaymentProcessed` notification.
pub(crate) fn record_payment(
    state: &mut PaymentLedgerState,
    env: &PlatformEnvironment,
    request: PaymentRequest,
) -> Effects {
    let PaymentRequest {
        event_id,
        payer,
        organizer,
        amount,
    } = request;
    let platform_fee = amount.percent_floor(state.fee_percent);
    let organizer_share = amount.saturating_sub(platform_fee);
    let processed_at = env.clock.now();

    let payment_id = PaymentId::new(state.payments.insert_with(|raw| PaymentRecord {
        id: PaymentId::new(raw),
        event_id,
        payer,
        organizer,
        amount,
        platform_fee,
        organizer_share,
        processed: true,
        processed_at,
    }));
    state.by_event.entry(event_id).or_default().push(payment_id);
    state.by_organizer.entry(organizer).or_default().push(payment_id);
    state.by_payer.entry(payer).or_default().push(payment_id);

    let balance = state.balances.entry(organizer).or_default();
    balance.total_earned = balance.total_earned.saturating_add(organizer_share);
    state.total_volume = state.total_volume.saturating_add(amount);
    state.total_platform_fees = state.total_platform_fees.saturating_add(platform_fee);

    smallvec![
        Effect::Emit(Notification::PaymentProcessed {
            payment_id,
            event_id,
            payer,
            amount,
            platform_fee,
            organizer_share,
        }),
        Effect::Interact(transfer::interaction(
            &env.transfer,
            Transfer {
                from: payer,
                to: state.address,
                amount,
                purpose: TransferPurpose::PaymentCollection,
            },
        )),
    ]
}

/// Validates a fee change
///
/// # Errors
///
/// `Unauthorized` unless `caller` is the admin or the wired event registry;
/// `InvalidInput` if `percent` exceeds [`FeePercent::MAX`].
pub(crate) fn check_fee_update(
    state: &PaymentLedgerState,
    caller: Principal,
    percent: u8,
) -> PlatformResult<FeePercent> {
    if !state.is_registry_or_admin(caller) {
        return Err(PlatformError::unauthorized(caller, Role::Admin));
    }
    FeePercent::new(percent).ok_or_else(|| {
        PlatformError::invalid_input("percent", format!("must be at most {}", FeePercent::MAX))
    })
}

/// Applies a fee change accepted by [`check_fee_update`]
pub(crate) fn apply_fee_update(state: &mut PaymentLedgerState, fee_percent: FeePercent) -> Notification {
    state.fee_percent = fee_percent;
    Notification::PlatformFeeUpdated {
        percent: fee_percent.get(),
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the payment ledger
#[derive(Clone, Copy, Debug, Default)]
pub struct PaymentLedgerReducer;

impl PaymentLedgerReducer {
    /// Creates a new `PaymentLedgerReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for PaymentLedgerReducer {
    type State = PaymentLedgerState;
    type Action = PaymentLedgerAction;
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
            // ========== Process Payment ==========
            PaymentLedgerAction::ProcessPayment {
                caller,
                event_id,
                payer,
                organizer,
                amount,
                supplied,
            } => {
                let request = PaymentRequest {
                    event_id,
                    payer,
                    organizer,
                    amount,
                };
                check_payment(state, caller, &request, supplied)?;
                Ok(record_payment(state, env, request))
            }

            // ========== Organizer Withdrawal ==========
            PaymentLedgerAction::WithdrawOrganizerFunds { organizer, amount } => {
                if amount.is_zero() || amount < state.min_withdrawal {
                    return Err(PlatformError::invalid_input(
                        "amount",
                        format!("below the minimum withdrawal of {}", state.min_withdrawal),
                    ));
                }
                let available = state.organizer_balance(organizer).available_balance();
                if amount > available {
                    return Err(PlatformError::InsufficientBalance {
                        requested: amount,
                        available,
                    });
                }
                state.ensure_live()?;

                let balance = state.balances.entry(organizer).or_default();
                balance.withdrawn_amount = balance.withdrawn_amount.saturating_add(amount);
                state.organizer_withdrawals = state.organizer_withdrawals.saturating_add(amount);

                Ok(smallvec![
                    Effect::Emit(Notification::WithdrawalMade { organizer, amount }),
                    Effect::Interact(transfer::interaction(
                        &env.transfer,
                        Transfer {
                            from: state.address,
                            to: organizer,
                            amount,
                            purpose: TransferPurpose::OrganizerWithdrawal,
                        },
                    )),
                ])
            }

            // ========== Platform Fee Sweep ==========
            PaymentLedgerAction::WithdrawPlatformFees { caller } => {
                ensure_admin(state.admin, caller)?;
                let amount = state.pending_platform_fees();
                if amount.is_zero() {
                    return Err(PlatformError::invalid_state(
                        "platform fee pool",
                        "is empty",
                    ));
                }

                state.platform_fees_withdrawn = state.platform_fees_withdrawn.saturating_add(amount);

                Ok(smallvec![
                    Effect::Emit(Notification::PlatformFeesWithdrawn {
                        admin: caller,
                        amount,
                    }),
                    Effect::Interact(transfer::interaction(
                        &env.transfer,
                        Transfer {
                            from: state.address,
                            to: caller,
                            amount,
                            purpose: TransferPurpose::PlatformFeeWithdrawal,
                        },
                    )),
                ])
            }

            // ========== Administration ==========
            PaymentLedgerAction::UpdatePlatformFee { caller, percent } => {
                let fee_percent = check_fee_update(state, caller, percent)?;
                Ok(smallvec![Effect::Emit(apply_fee_update(state, fee_percent))])
            }

            PaymentLedgerAction::EmergencyPause { caller } => {
                ensure_admin(state.admin, caller)?;
                if state.paused {
                    return Err(PlatformError::invalid_state("payment ledger", "is already paused"));
                }
                state.paused = true;
                Ok(smallvec![Effect::Emit(Notification::PaymentsPaused { by: caller })])
            }

            PaymentLedgerAction::EmergencyUnpause { caller } => {
                ensure_admin(state.admin, caller)?;
                if !state.paused {
                    return Err(PlatformError::invalid_state("payment ledger", "is not paused"));
                }
                state.paused = false;
                Ok(smallvec![Effect::Emit(Notification::PaymentsUnpaused { by: caller })])
            }

            PaymentLedgerAction::SetEventRegistry { caller, registry } => {
                ensure_admin(state.admin, caller)?;
                ensure_not_null("registry", registry)?;
                state.event_registry = Some(registry);
                Ok(smallvec![Effect::Emit(Notification::ReferenceUpdated {
                    component: Component::PaymentLedger,
                    reference: Component::EventRegistry,
                    target: registry,
                })])
            }
        }
    }
}
