//! Synchronous store runtime.
//!
//! The [`Store`] owns the state of a reducer and executes one action at a
//! time as an atomic unit of work:
//!
//! 1. Take the call guard (wait for a call on another thread, reject reentry)
//! 2. Snapshot the state and run the reducer under the state lock
//! 3. Release the lock and run outbound interactions in order
//! 4. On interaction failure restore the snapshot and fail the call
//! 5. On success append notifications to the journal and broadcast them
//!
//! Interactions run with the lock released so a collaborator may read the
//! already-finalized state; any attempt to send another action from inside an
//! interaction is rejected by the guard.

use crate::effect::{Effect, InteractionError};
use crate::guard::{ReentrancyError, ReentrancyGuard};
use crate::reducer::Reducer;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors raised by the store itself, independent of domain validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An action was sent while another action was still executing
    #[error(transparent)]
    Reentrant(#[from] ReentrancyError),

    /// An outbound interaction failed; the call was rolled back
    #[error(transparent)]
    InteractionFailed(#[from] InteractionError),
}

/// Default capacity of the notification broadcast channel
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// The runtime that serializes actions over a reducer's state.
///
/// # Type Parameters
///
/// - `R`: The reducer; its state, action, event, error and environment types
///   flow from the trait's associated types
pub struct Store<R: Reducer> {
    state: Mutex<R::State>,
    reducer: R,
    environment: R::Environment,
    guard: ReentrancyGuard,
    journal: Mutex<Vec<R::Event>>,
    notifications: broadcast::Sender<R::Event>,
}

impl<R> Store<R>
where
    R: Reducer,
    R::State: Clone,
    R::Event: Clone,
    R::Error: From<StoreError>,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: R::State, reducer: R, environment: R::Environment) -> Self {
        Self::with_broadcast_capacity(
            initial_state,
            reducer,
            environment,
            DEFAULT_BROADCAST_CAPACITY,
        )
    }

    /// Create a store with a custom notification channel capacity
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: R::State,
        reducer: R,
        environment: R::Environment,
        capacity: usize,
    ) -> Self {
        let (notifications, _) = broadcast::channel(capacity.max(1));
        Self {
            state: Mutex::new(initial_state),
            reducer,
            environment,
            guard: ReentrancyGuard::new(),
            journal: Mutex::new(Vec::new()),
            notifications,
        }
    }

    /// Execute an action atomically
    ///
    /// Returns the notifications emitted by the action, in emission order.
    ///
    /// # Errors
    ///
    /// - The reducer's error if the action is rejected (state unchanged)
    /// - [`StoreError::Reentrant`] if called from inside an in-flight action
    /// - [`StoreError::InteractionFailed`] if an outbound interaction fails
    ///   (state restored to the pre-call snapshot)
    #[tracing::instrument(skip_all, name = "store_send")]
    pub fn send(&self, action: R::Action) -> Result<Vec<R::Event>, R::Error> {
        let _entered = self.guard.enter().map_err(StoreError::from)?;

        let (snapshot, effects) = {
            let mut state = self.lock_state();
            let snapshot = state.clone();
            match self.reducer.reduce(&mut state, action, &self.environment) {
                Ok(effects) => (snapshot, effects),
                Err(error) => {
                    *state = snapshot;
                    return Err(error);
                }
            }
        };

        let mut events = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::Emit(event) => events.push(event),
                Effect::Interact(interaction) => {
                    let name = interaction.name();
                    tracing::debug!(interaction = name, "running interaction");
                    if let Err(error) = interaction.run() {
                        tracing::warn!(interaction = name, %error, "interaction failed, rolling back");
                        *self.lock_state() = snapshot;
                        return Err(StoreError::from(error).into());
                    }
                }
            }
        }

        self.publish(&events);
        Ok(events)
    }

    /// Read state through a closure
    ///
    /// Reads are not guarded and may run while an interaction is in progress;
    /// they observe the state the in-flight call has already finalized.
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&R::State) -> T,
    {
        f(&self.lock_state())
    }

    /// Snapshot of every notification committed so far, oldest first
    #[must_use]
    pub fn journal(&self) -> Vec<R::Event> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subscribe to notifications committed after this call
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<R::Event> {
        self.notifications.subscribe()
    }

    /// The injected environment
    #[must_use]
    pub const fn environment(&self) -> &R::Environment {
        &self.environment
    }

    fn publish(&self, events: &[R::Event]) {
        if events.is_empty() {
            return;
        }
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(events);
        for event in events {
            // No subscribers is not an error: the journal still has the record.
            let _ = self.notifications.send(event.clone());
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, R::State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::effect::Interaction;
    use smallvec::{SmallVec, smallvec};
    use std::sync::Arc;
    use std::sync::OnceLock;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Vault {
        balance: u64,
        paid_out: u64,
    }

    #[derive(Debug)]
    enum VaultAction {
        Deposit(u64),
        Withdraw(u64),
    }

    #[derive(Clone, Debug, PartialEq)]
    enum VaultEvent {
        Deposited(u64),
        Withdrawn(u64),
    }

    #[derive(Debug, PartialEq)]
    enum VaultError {
        Insufficient,
        Store(StoreError),
    }

    impl From<StoreError> for VaultError {
        fn from(error: StoreError) -> Self {
            Self::Store(error)
        }
    }

    type Payout = Arc<dyn Fn(u64) -> Result<(), String> + Send + Sync>;

    struct VaultReducer;

    impl Reducer for VaultReducer {
        type State = Vault;
        type Action = VaultAction;
        type Event = VaultEvent;
        type Error = VaultError;
        type Environment = Payout;

        fn reduce(
            &self,
            state: &mut Vault,
            action: VaultAction,
            env: &Payout,
        ) -> Result<SmallVec<[Effect<VaultEvent>; 4]>, VaultError> {
            match action {
                VaultAction::Deposit(amount) => {
                    state.balance += amount;
                    Ok(smallvec![Effect::Emit(VaultEvent::Deposited(amount))])
                }
                VaultAction::Withdraw(amount) => {
                    if amount > state.balance {
                        return Err(VaultError::Insufficient);
                    }
                    state.balance -= amount;
                    state.paid_out += amount;
                    let payout = Arc::clone(env);
                    Ok(smallvec![
                        Effect::Emit(VaultEvent::Withdrawn(amount)),
                        Effect::Interact(Interaction::new("payout", move || payout(amount))),
                    ])
                }
            }
        }
    }

    fn store_with(payout: Payout) -> Store<VaultReducer> {
        Store::new(Vault::default(), VaultReducer, payout)
    }

    #[test]
    fn committed_events_reach_journal_and_subscribers() {
        let store = store_with(Arc::new(|_| Ok(())));
        let mut receiver = store.subscribe();

        store.send(VaultAction::Deposit(10)).unwrap();
        store.send(VaultAction::Withdraw(4)).unwrap();

        assert_eq!(
            store.journal(),
            vec![VaultEvent::Deposited(10), VaultEvent::Withdrawn(4)]
        );
        assert_eq!(receiver.try_recv().unwrap(), VaultEvent::Deposited(10));
        assert_eq!(receiver.try_recv().unwrap(), VaultEvent::Withdrawn(4));
        assert_eq!(store.state(|s| s.balance), 6);
    }

    #[test]
    fn failed_interaction_restores_snapshot() {
        let store = store_with(Arc::new(|_| Err("recipient rejected".to_string())));
        store.send(VaultAction::Deposit(10)).unwrap();

        let error = store.send(VaultAction::Withdraw(4)).unwrap_err();
        assert!(matches!(
            error,
            VaultError::Store(StoreError::InteractionFailed(_))
        ));
        assert_eq!(store.state(Vault::clone), Vault { balance: 10, paid_out: 0 });
        assert_eq!(store.journal(), vec![VaultEvent::Deposited(10)]);
    }

    #[test]
    fn rejected_action_publishes_nothing() {
        let store = store_with(Arc::new(|_| Ok(())));
        assert_eq!(
            store.send(VaultAction::Withdraw(1)).unwrap_err(),
            VaultError::Insufficient
        );
        assert!(store.journal().is_empty());
    }

    #[test]
    fn interaction_cannot_reenter_but_sees_final_state() {
        let slot: Arc<OnceLock<Arc<Store<VaultReducer>>>> = Arc::new(OnceLock::new());
        let observed = Arc::new(Mutex::new(Vec::new()));

        let payout: Payout = {
            let slot = Arc::clone(&slot);
            let observed = Arc::clone(&observed);
            Arc::new(move |_amount| {
                if let Some(store) = slot.get() {
                    let balance_seen = store.state(|s| s.balance);
                    let reentry = store.send(VaultAction::Withdraw(1));
                    observed.lock().unwrap().push((balance_seen, reentry));
                }
                Ok(())
            })
        };

        let store = Arc::new(store_with(payout));
        let _ = slot.set(Arc::clone(&store));

        store.send(VaultAction::Deposit(10)).unwrap();
        store.send(VaultAction::Withdraw(10)).unwrap();

        let observed = observed.lock().unwrap();
        assert_eq!(observed.len(), 1);
        assert_eq!(observed[0].0, 0);
        assert_eq!(
            observed[0].1,
            Err(VaultError::Store(StoreError::Reentrant(ReentrancyError)))
        );
        assert_eq!(store.state(|s| s.paid_out), 10);
    }
}
