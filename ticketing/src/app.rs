//! The platform facade.
//!
//! [`Platform`] owns the store that serializes every call and exposes one
//! typed method per operation and per query. It is what a gateway holds: it
//! turns principals and arguments into actions, actions into committed
//! notifications, and notifications into return values.
//!
//! # Example
//!
//! ```ignore
//! let platform = Platform::deploy(PlatformConfig::from_env(), environment)?;
//! let event_id = platform.create_event(organizer, details)?;
//! let payment_id = platform.register_for_event(event_id, participant, price)?;
//! ```

use crate::aggregates::{
    Addresses, EventRegistryAction, PaymentLedgerAction, PlatformAction, PlatformEnvironment,
    PlatformReducer, PlatformState, TicketRegistryAction,
};
use crate::config::PlatformConfig;
use crate::error::{PlatformError, PlatformResult};
use crate::metrics;
use crate::notification::Notification;
use crate::types::{
    Event, EventDetails, EventId, FeePercent, Money, OrganizerBalance, PaymentId, PaymentRecord,
    PaymentStats, Principal, Ticket, TicketStats, TokenId, TransferRecord,
};
use stagepass_core::event::Event as _;
use stagepass_core::store::Store;
use tokio::sync::broadcast;

/// Arguments of a single-ticket mint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintRequest {
    /// First owner
    pub recipient: Principal,
    /// Event ID
    pub event_id: EventId,
    /// Seat label
    pub seat_info: String,
    /// Ticket class
    pub ticket_type: String,
    /// Metadata location
    pub metadata_uri: String,
}

/// The three components behind one atomic entry point
pub struct Platform {
    store: Store<PlatformReducer>,
    config: PlatformConfig,
    addresses: Addresses,
}

impl Platform {
    /// Creates the components without any references between them
    ///
    /// Paid registration and minting fail with `InvalidState` until the
    /// references are set through the admin setters.
    #[must_use]
    pub fn new(config: PlatformConfig, environment: PlatformEnvironment) -> Self {
        let addresses = Addresses::generate();
        let state = PlatformState::new(addresses, &config);
        let store = Store::with_broadcast_capacity(
            state,
            PlatformReducer::new(),
            environment,
            config.notification_capacity,
        );
        tracing::info!(
            admin = %config.admin,
            event_registry = %addresses.event_registry,
            payment_ledger = %addresses.payment_ledger,
            ticket_registry = %addresses.ticket_registry,
            "platform created"
        );
        Self {
            store,
            config,
            addresses,
        }
    }

    /// Creates the components and wires every reference as the admin
    ///
    /// The ledger accepts payments from the event registry, the ticket
    /// registry validates against the event registry, and the event registry
    /// is authorized to mint.
    ///
    /// # Errors
    ///
    /// Returns the first setter failure; with a valid config there is none.
    pub fn deploy(config: PlatformConfig, environment: PlatformEnvironment) -> PlatformResult<Self> {
        let platform = Self::new(config, environment);
        let admin = platform.admin();
        let Addresses {
            event_registry,
            payment_ledger,
            ticket_registry,
        } = platform.addresses;

        platform.events_set_payment_ledger(admin, payment_ledger)?;
        platform.events_set_ticket_registry(admin, ticket_registry)?;
        platform.payments_set_event_registry(admin, event_registry)?;
        platform.tickets_set_event_registry(admin, event_registry)?;
        platform.tickets_set_payment_ledger(admin, payment_ledger)?;
        platform.authorize_minter(admin, event_registry)?;

        tracing::info!("platform deployed");
        Ok(platform)
    }

    /// Component principals
    #[must_use]
    pub const fn addresses(&self) -> Addresses {
        self.addresses
    }

    /// Admin principal of all components
    #[must_use]
    pub const fn admin(&self) -> Principal {
        self.config.admin
    }

    /// The configuration the platform was created with
    #[must_use]
    pub const fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Every notification committed so far, oldest first
    #[must_use]
    pub fn journal(&self) -> Vec<Notification> {
        self.store.journal()
    }

    /// Subscribe to notifications committed after this call
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.store.subscribe()
    }

    /// Read the state through a closure
    ///
    /// Use this for the lazy, restartable sequences the components expose,
    /// for example `platform.read(|s| s.events.active_events().count())`.
    pub fn read<T>(&self, f: impl FnOnce(&PlatformState) -> T) -> T {
        self.store.state(f)
    }

    /// Executes one action atomically, logging and recording metrics
    fn execute(&self, action: PlatformAction) -> PlatformResult<Vec<Notification>> {
        let operation = action.name();
        match self.store.send(action) {
            Ok(notifications) => {
                for notification in &notifications {
                    log_committed(operation, notification);
                    metrics::record_committed(notification);
                }
                Ok(notifications)
            }
            Err(error) => {
                tracing::warn!(operation, kind = %error.kind(), %error, "call rejected");
                metrics::record_rejected(error.kind());
                Err(error)
            }
        }
    }

    // ========================================================================
    // Event registry
    // ========================================================================

    /// Create an event
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty title, a start date not in the future, an
    /// end date not after the start, or a zero capacity.
    pub fn create_event(&self, organizer: Principal, details: EventDetails) -> PlatformResult<EventId> {
        let notifications = self.execute(PlatformAction::Events(EventRegistryAction::CreateEvent {
            organizer,
            details,
        }))?;
        expect_notification(&notifications, |n| match n {
            Notification::EventCreated { event_id, .. } => Some(*event_id),
            _ => None,
        })
    }

    /// Overwrite an event's editable fields
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` organizes the event; `InvalidState` if
    /// it is cancelled; `InvalidInput` for invalid fields.
    pub fn update_event(
        &self,
        event_id: EventId,
        caller: Principal,
        details: EventDetails,
    ) -> PlatformResult<()> {
        self.execute(PlatformAction::Events(EventRegistryAction::UpdateEvent {
            event_id,
            caller,
            details,
        }))
        .map(drop)
    }

    /// Cancel an event
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` organizes the event; `InvalidState` if
    /// it is already cancelled.
    pub fn cancel_event(&self, event_id: EventId, caller: Principal) -> PlatformResult<()> {
        self.execute(PlatformAction::Events(EventRegistryAction::CancelEvent {
            event_id,
            caller,
        }))
        .map(drop)
    }

    /// Register for an event, supplying exactly its ticket price
    ///
    /// Returns the payment id, or `None` for a free event.
    ///
    /// # Errors
    ///
    /// `InvalidState`, `InvalidPayment`, `AlreadyRegistered`,
    /// `CapacityExceeded` from the event; any payment ledger error; and
    /// `TransferFailed` if collecting the value fails.
    pub fn register_for_event(
        &self,
        event_id: EventId,
        participant: Principal,
        supplied: Money,
    ) -> PlatformResult<Option<PaymentId>> {
        let notifications = self.execute(PlatformAction::RegisterForEvent {
            event_id,
            participant,
            supplied,
        })?;
        Ok(notifications.iter().find_map(|n| match n {
            Notification::PaymentProcessed { payment_id, .. } => Some(*payment_id),
            _ => None,
        }))
    }

    /// Change the platform fee through the event registry
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the admin; `InvalidInput` above 20.
    pub fn update_platform_fee(&self, caller: Principal, percent: u8) -> PlatformResult<()> {
        self.execute(PlatformAction::UpdatePlatformFee { caller, percent })
            .map(drop)
    }

    /// Point the event registry at a payment ledger
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the admin; `InvalidInput` for NULL.
    pub fn events_set_payment_ledger(&self, caller: Principal, ledger: Principal) -> PlatformResult<()> {
        self.execute(PlatformAction::Events(EventRegistryAction::SetPaymentLedger {
            caller,
            ledger,
        }))
        .map(drop)
    }

    /// Point the event registry at a ticket registry
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the admin; `InvalidInput` for NULL.
    pub fn events_set_ticket_registry(
        &self,
        caller: Principal,
        registry: Principal,
    ) -> PlatformResult<()> {
        self.execute(PlatformAction::Events(EventRegistryAction::SetTicketRegistry {
            caller,
            registry,
        }))
        .map(drop)
    }

    /// Gets an event by ID
    #[must_use]
    pub fn event(&self, event_id: EventId) -> Option<Event> {
        self.read(|s| s.events.event(event_id).cloned())
    }

    /// Events created by `organizer`, in creation order
    #[must_use]
    pub fn events_by_organizer(&self, organizer: Principal) -> Vec<EventId> {
        self.read(|s| s.events.events_by_organizer(organizer).collect())
    }

    /// Active events, in creation order
    #[must_use]
    pub fn active_events(&self) -> Vec<EventId> {
        self.read(|s| s.events.active_events().collect())
    }

    /// Returns true if `participant` is registered for the event
    #[must_use]
    pub fn is_registered(&self, event_id: EventId, participant: Principal) -> bool {
        self.read(|s| s.events.is_registered(event_id, participant))
    }

    /// Number of events ever created
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.read(|s| s.events.event_count())
    }

    // ========================================================================
    // Payment ledger
    // ========================================================================

    /// Submit a payment directly to the ledger
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the wired event registry or the
    /// admin; `InvalidInput`, `Paused`, `InvalidPayment`; `TransferFailed`
    /// if collecting the value fails.
    pub fn process_payment(
        &self,
        caller: Principal,
        event_id: EventId,
        payer: Principal,
        organizer: Principal,
        amount: Money,
        supplied: Money,
    ) -> PlatformResult<PaymentId> {
        let notifications = self.execute(PlatformAction::Payments(PaymentLedgerAction::ProcessPayment {
            caller,
            event_id,
            payer,
            organizer,
            amount,
            supplied,
        }))?;
        expect_notification(&notifications, |n| match n {
            Notification::PaymentProcessed { payment_id, .. } => Some(*payment_id),
            _ => None,
        })
    }

    /// Withdraw part of an organizer's available balance
    ///
    /// # Errors
    ///
    /// `InvalidInput` below the minimum, `InsufficientBalance`, `Paused`, and
    /// `TransferFailed` (rolled back) if the payout fails.
    pub fn withdraw_organizer_funds(&self, organizer: Principal, amount: Money) -> PlatformResult<()> {
        self.execute(PlatformAction::Payments(PaymentLedgerAction::WithdrawOrganizerFunds {
            organizer,
            amount,
        }))
        .map(drop)
    }

    /// Sweep pending platform fees to the admin, returning the amount
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the admin; `InvalidState` if the
    /// pool is empty; `TransferFailed` if the payout fails.
    pub fn withdraw_platform_fees(&self, caller: Principal) -> PlatformResult<Money> {
        let notifications = self.execute(PlatformAction::Payments(
            PaymentLedgerAction::WithdrawPlatformFees { caller },
        ))?;
        expect_notification(&notifications, |n| match n {
            Notification::PlatformFeesWithdrawn { amount, .. } => Some(*amount),
            _ => None,
        })
    }

    /// Change the platform fee directly on the ledger
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the admin; `InvalidInput` above 20.
    pub fn payments_update_platform_fee(&self, caller: Principal, percent: u8) -> PlatformResult<()> {
        self.execute(PlatformAction::Payments(PaymentLedgerAction::UpdatePlatformFee {
            caller,
            percent,
        }))
        .map(drop)
    }

    /// Suspend payments and organizer withdrawals
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the admin; `InvalidState` if paused.
    pub fn emergency_pause(&self, caller: Principal) -> PlatformResult<()> {
        self.execute(PlatformAction::Payments(PaymentLedgerAction::EmergencyPause {
            caller,
        }))
        .map(drop)
    }

    /// Resume payments and organizer withdrawals
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the admin; `InvalidState` if not paused.
    pub fn emergency_unpause(&self, caller: Principal) -> PlatformResult<()> {
        self.execute(PlatformAction::Payments(PaymentLedgerAction::EmergencyUnpause {
            caller,
        }))
        .map(drop)
    }

    /// Point the ledger at an event registry
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the admin; `InvalidInput` for NULL.
    pub fn payments_set_event_registry(
        &self,
        caller: Principal,
        registry: Principal,
    ) -> PlatformResult<()> {
        self.execute(PlatformAction::Payments(PaymentLedgerAction::SetEventRegistry {
            caller,
            registry,
        }))
        .map(drop)
    }

    /// Gets a payment record by ID
    #[must_use]
    pub fn payment_record(&self, payment_id: PaymentId) -> Option<PaymentRecord> {
        self.read(|s| s.payments.payment(payment_id).cloned())
    }

    /// Payments for an event, in processing order
    #[must_use]
    pub fn event_payments(&self, event_id: EventId) -> Vec<PaymentId> {
        self.read(|s| s.payments.event_payments(event_id).to_vec())
    }

    /// The `limit` most recent payments to `organizer`, oldest first
    #[must_use]
    pub fn payments_by_organizer(&self, organizer: Principal, limit: usize) -> Vec<PaymentId> {
        self.read(|s| s.payments.payments_by_organizer(organizer, limit).to_vec())
    }

    /// The `limit` most recent payments by `payer`, oldest first
    #[must_use]
    pub fn payments_by_payer(&self, payer: Principal, limit: usize) -> Vec<PaymentId> {
        self.read(|s| s.payments.payments_by_payer(payer, limit).to_vec())
    }

    /// Ledger-wide figures
    #[must_use]
    pub fn payment_stats(&self) -> PaymentStats {
        self.read(|s| s.payments.stats())
    }

    /// Balance of an organizer
    #[must_use]
    pub fn organizer_balance(&self, organizer: Principal) -> OrganizerBalance {
        self.read(|s| s.payments.organizer_balance(organizer))
    }

    /// Platform fees not yet swept
    #[must_use]
    pub fn pending_platform_fees(&self) -> Money {
        self.read(|s| s.payments.pending_platform_fees())
    }

    /// Returns true while payments are paused
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.read(|s| s.payments.is_paused())
    }

    /// Current platform fee
    #[must_use]
    pub fn platform_fee_percent(&self) -> FeePercent {
        self.read(|s| s.payments.fee_percent())
    }

    // ========================================================================
    // Ticket registry
    // ========================================================================

    /// Mint one ticket for an event of the wired event registry
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is a minter; `InvalidState` if the
    /// registry is not wired; `InvalidInput` for a missing or inactive event.
    pub fn mint_ticket(&self, caller: Principal, request: MintRequest) -> PlatformResult<TokenId> {
        let MintRequest {
            recipient,
            event_id,
            seat_info,
            ticket_type,
            metadata_uri,
        } = request;
        let notifications = self.execute(PlatformAction::Tickets(TicketRegistryAction::MintTicket {
            caller,
            recipient,
            event_id,
            event_ref: self.addresses.event_registry,
            seat_info,
            ticket_type,
            metadata_uri,
        }))?;
        expect_notification(&notifications, |n| match n {
            Notification::TicketMinted { token_id, .. } => Some(*token_id),
            _ => None,
        })
    }

    /// Mint one ticket per recipient; ids come back in input order
    ///
    /// # Errors
    ///
    /// As [`Platform::mint_ticket`], plus `InvalidInput` if `recipients` and
    /// `seat_infos` differ in length or are empty.
    pub fn mint_batch_tickets(
        &self,
        caller: Principal,
        recipients: Vec<Principal>,
        event_id: EventId,
        seat_infos: Vec<String>,
        ticket_type: String,
        uri_prefix: String,
    ) -> PlatformResult<Vec<TokenId>> {
        let notifications = self.execute(PlatformAction::Tickets(TicketRegistryAction::MintBatchTickets {
            caller,
            recipients,
            event_id,
            event_ref: self.addresses.event_registry,
            seat_infos,
            ticket_type,
            uri_prefix,
        }))?;
        Ok(notifications
            .iter()
            .filter_map(|n| match n {
                Notification::TicketMinted { token_id, .. } => Some(*token_id),
                _ => None,
            })
            .collect())
    }

    /// Use a ticket
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` owns it; `InvalidState` if cancelled or used.
    pub fn use_ticket(&self, caller: Principal, token_id: TokenId) -> PlatformResult<()> {
        self.execute(PlatformAction::Tickets(TicketRegistryAction::UseTicket {
            caller,
            token_id,
        }))
        .map(drop)
    }

    /// Move a ticket from `from` to `to`
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the owner, approved, or an operator;
    /// `InvalidInput` for a NULL `to` or a wrong `from`; `InvalidState` if
    /// cancelled or used.
    pub fn transfer_from(
        &self,
        caller: Principal,
        from: Principal,
        to: Principal,
        token_id: TokenId,
    ) -> PlatformResult<()> {
        self.execute(PlatformAction::Tickets(TicketRegistryAction::TransferFrom {
            caller,
            from,
            to,
            token_id,
        }))
        .map(drop)
    }

    /// Cancel a ticket
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the admin; `InvalidState` if used or
    /// already cancelled.
    pub fn cancel_ticket(&self, caller: Principal, token_id: TokenId) -> PlatformResult<()> {
        self.execute(PlatformAction::Tickets(TicketRegistryAction::CancelTicket {
            caller,
            token_id,
        }))
        .map(drop)
    }

    /// Approve `approved` to move one ticket; NULL clears the approval
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the owner or an operator.
    pub fn approve(&self, caller: Principal, approved: Principal, token_id: TokenId) -> PlatformResult<()> {
        self.execute(PlatformAction::Tickets(TicketRegistryAction::Approve {
            caller,
            approved,
            token_id,
        }))
        .map(drop)
    }

    /// Grant or revoke `operator` over all of `caller`'s tickets
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `operator` is NULL or the caller.
    pub fn set_approval_for_all(
        &self,
        caller: Principal,
        operator: Principal,
        approved: bool,
    ) -> PlatformResult<()> {
        self.execute(PlatformAction::Tickets(TicketRegistryAction::SetApprovalForAll {
            caller,
            operator,
            approved,
        }))
        .map(drop)
    }

    /// Point the ticket registry at an event registry
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the admin; `InvalidInput` for NULL.
    pub fn tickets_set_event_registry(
        &self,
        caller: Principal,
        registry: Principal,
    ) -> PlatformResult<()> {
        self.execute(PlatformAction::Tickets(TicketRegistryAction::SetEventRegistry {
            caller,
            registry,
        }))
        .map(drop)
    }

    /// Point the ticket registry at a payment ledger
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the admin; `InvalidInput` for NULL.
    pub fn tickets_set_payment_ledger(&self, caller: Principal, ledger: Principal) -> PlatformResult<()> {
        self.execute(PlatformAction::Tickets(TicketRegistryAction::SetPaymentLedger {
            caller,
            ledger,
        }))
        .map(drop)
    }

    /// Allow `minter` to mint tickets
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the admin; `InvalidInput` for NULL.
    pub fn authorize_minter(&self, caller: Principal, minter: Principal) -> PlatformResult<()> {
        self.execute(PlatformAction::Tickets(TicketRegistryAction::AuthorizeMinter {
            caller,
            minter,
        }))
        .map(drop)
    }

    /// Withdraw `minter`'s permission to mint
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the admin; `InvalidInput` for the admin.
    pub fn revoke_minter(&self, caller: Principal, minter: Principal) -> PlatformResult<()> {
        self.execute(PlatformAction::Tickets(TicketRegistryAction::RevokeMinter {
            caller,
            minter,
        }))
        .map(drop)
    }

    /// Gets a ticket by ID
    #[must_use]
    pub fn ticket(&self, token_id: TokenId) -> Option<Ticket> {
        self.read(|s| s.tickets.ticket(token_id).cloned())
    }

    /// Live validity of a ticket for an event; never fails
    #[must_use]
    pub fn verify_ticket(&self, token_id: TokenId, event_id: EventId) -> bool {
        let valid = self.read(|s| s.verify_ticket(token_id, event_id));
        tracing::debug!(%token_id, %event_id, valid, "ticket verified");
        valid
    }

    /// Tickets of an event, in mint order
    #[must_use]
    pub fn event_tickets(&self, event_id: EventId) -> Vec<TokenId> {
        self.read(|s| s.tickets.event_tickets(event_id).to_vec())
    }

    /// Tickets held by `owner`, in ascending id order
    #[must_use]
    pub fn tickets_by_owner(&self, owner: Principal) -> Vec<TokenId> {
        self.read(|s| s.tickets.tickets_by_owner(owner).to_vec())
    }

    /// Registry-wide ticket figures
    #[must_use]
    pub fn ticket_stats(&self) -> TicketStats {
        self.read(|s| s.tickets.stats())
    }

    /// Owner of a ticket
    #[must_use]
    pub fn owner_of(&self, token_id: TokenId) -> Option<Principal> {
        self.read(|s| s.tickets.owner_of(token_id))
    }

    /// Number of tickets held by `owner`
    #[must_use]
    pub fn balance_of(&self, owner: Principal) -> usize {
        self.read(|s| s.tickets.balance_of(owner))
    }

    /// The `index`-th ticket held by `owner`
    #[must_use]
    pub fn token_of_owner_by_index(&self, owner: Principal, index: usize) -> Option<TokenId> {
        self.read(|s| s.tickets.token_of_owner_by_index(owner, index))
    }

    /// Metadata location of a ticket
    #[must_use]
    pub fn token_uri(&self, token_id: TokenId) -> Option<String> {
        self.read(|s| s.tickets.token_uri(token_id).map(str::to_string))
    }

    /// Single-ticket approval
    #[must_use]
    pub fn get_approved(&self, token_id: TokenId) -> Option<Principal> {
        self.read(|s| s.tickets.get_approved(token_id))
    }

    /// Returns true if `operator` may move all of `owner`'s tickets
    #[must_use]
    pub fn is_approved_for_all(&self, owner: Principal, operator: Principal) -> bool {
        self.read(|s| s.tickets.is_approved_for_all(owner, operator))
    }

    /// Returns true if `principal` may mint
    #[must_use]
    pub fn is_minter(&self, principal: Principal) -> bool {
        self.read(|s| s.tickets.is_minter(principal))
    }

    /// Ownership history of a ticket, mint first
    #[must_use]
    pub fn transfer_history(&self, token_id: TokenId) -> Vec<TransferRecord> {
        self.read(|s| s.tickets.transfer_history(token_id).to_vec())
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("admin", &self.config.admin)
            .field("addresses", &self.addresses)
            .finish_non_exhaustive()
    }
}

/// Picks the id a committed call must have announced
fn expect_notification<T>(
    notifications: &[Notification],
    pick: impl Fn(&Notification) -> Option<T>,
) -> PlatformResult<T> {
    notifications.iter().find_map(pick).ok_or_else(|| {
        PlatformError::invalid_state("platform", "committed call announced no result")
    })
}

fn log_committed(operation: &'static str, notification: &Notification) {
    let kind = notification.event_type();
    match notification {
        Notification::EventCreated {
            event_id,
            organizer,
        } => tracing::info!(operation, kind, %event_id, %organizer, "committed"),
        Notification::EventUpdated { event_id } | Notification::EventCancelled { event_id } => {
            tracing::info!(operation, kind, %event_id, "committed");
        }
        Notification::UserRegistered {
            event_id,
            participant,
        } => tracing::info!(operation, kind, %event_id, %participant, "committed"),
        Notification::PaymentProcessed {
            payment_id,
            event_id,
            amount,
            platform_fee,
            ..
        } => tracing::info!(operation, kind, %payment_id, %event_id, %amount, %platform_fee, "committed"),
        Notification::WithdrawalMade { organizer, amount } => {
            tracing::info!(operation, kind, %organizer, %amount, "committed");
        }
        Notification::PlatformFeesWithdrawn { amount, .. } => {
            tracing::info!(operation, kind, %amount, "committed");
        }
        Notification::TicketMinted {
            token_id, event_id, ..
        } => tracing::info!(operation, kind, %token_id, %event_id, "committed"),
        Notification::TicketUsed { token_id } | Notification::TicketCancelled { token_id } => {
            tracing::info!(operation, kind, %token_id, "committed");
        }
        Notification::TicketTransferred { token_id, from, to } => {
            tracing::info!(operation, kind, %token_id, %from, %to, "committed");
        }
        _ => tracing::info!(operation, kind, "committed"),
    }
}
