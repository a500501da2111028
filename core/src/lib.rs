//! # Stagepass Core
//!
//! Core traits and types for the Stagepass platform.
//!
//! This crate provides the small framework the platform components are written
//! against. Every component is a deterministic state machine expressed as a
//! reducer, and every call is executed atomically by a [`store::Store`].
//!
//! ## Core Concepts
//!
//! - **State**: Domain records owned by one component (events, payments, tickets)
//! - **Action**: A command issued by an authenticated principal
//! - **Reducer**: `(State, Action, Environment) → Result<Effects, Error>`
//! - **Effect**: A notification to publish or an outbound interaction to perform
//! - **Environment**: Injected dependencies (clock, value transfer)
//!
//! ## Execution Model
//!
//! - Reducers validate first and mutate second, so an `Err` leaves state untouched
//! - Outbound interactions run only after the reducer has finalized state
//! - The store restores a snapshot if an interaction fails
//! - Calls are serialized; a callback that re-enters an in-flight call is rejected
//!
//! ## Example
//!
//! ```ignore
//! use stagepass_core::*;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Event = CounterEvent;
//!     type Error = CounterError;
//!     type Environment = CounterEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         env: &CounterEnvironment,
//!     ) -> Result<SmallVec<[Effect<CounterEvent>; 4]>, CounterError> {
//!         state.count += 1;
//!         Ok(smallvec![Effect::Emit(CounterEvent::Incremented)])
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Dense, id-keyed record storage
pub mod arena;

/// Notification serialization
pub mod event;

/// Reentrancy protection for in-flight calls
pub mod guard;

/// Synchronous, atomic action execution
pub mod store;

/// Reducer module - The core trait for business logic
///
/// Reducers are deterministic functions over owned state:
/// `(State, Action, Environment) → Result<Effects, Error>`.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The records this reducer owns
    /// - `Action`: The commands this reducer accepts
    /// - `Event`: The notification type emitted on success
    /// - `Error`: The structured failure type
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Contract
    ///
    /// An implementation must either apply all of an action's mutations and
    /// return `Ok`, or apply none of them and return `Err`. Interactions
    /// returned in the effects are executed after the state is final.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The notification type emitted by successful actions
        type Event;

        /// The error type for rejected actions
        type Error;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// 1. Validates the action against the current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed by the store
        ///
        /// # Errors
        ///
        /// Returns `Self::Error` when the action is rejected; state is unchanged.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Result<SmallVec<[Effect<Self::Event>; 4]>, Self::Error>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values returned from reducers. They are executed by the
/// [`store::Store`] after the reducer has committed its state changes.
pub mod effect {
    use thiserror::Error;

    /// Error reported by a failed outbound interaction
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    #[error("{name} failed: {reason}")]
    pub struct InteractionError {
        /// Name of the interaction that failed
        pub name: &'static str,
        /// Reason reported by the collaborator
        pub reason: String,
    }

    type Call = Box<dyn FnOnce() -> Result<(), String> + Send>;

    /// An outbound call to an external collaborator.
    ///
    /// Interactions are deferred: the reducer describes them, the store runs
    /// them once the state for the call is final.
    pub struct Interaction {
        name: &'static str,
        call: Call,
    }

    impl Interaction {
        /// Creates a named interaction from a closure
        pub fn new<F>(name: &'static str, call: F) -> Self
        where
            F: FnOnce() -> Result<(), String> + Send + 'static,
        {
            Self {
                name,
                call: Box::new(call),
            }
        }

        /// Returns the interaction name
        #[must_use]
        pub const fn name(&self) -> &'static str {
            self.name
        }

        /// Performs the interaction
        ///
        /// # Errors
        ///
        /// Returns [`InteractionError`] if the collaborator rejects the call.
        pub fn run(self) -> Result<(), InteractionError> {
            (self.call)().map_err(|reason| InteractionError {
                name: self.name,
                reason,
            })
        }
    }

    impl std::fmt::Debug for Interaction {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Interaction")
                .field("name", &self.name)
                .finish_non_exhaustive()
        }
    }

    /// Effect type - describes what should happen after a successful action
    #[derive(Debug)]
    pub enum Effect<Event> {
        /// Publish a notification to outside layers
        Emit(Event),

        /// Perform an outbound interaction
        Interact(Interaction),
    }

    impl<Event> Effect<Event> {
        /// Returns the notification if this is an `Emit` effect
        #[must_use]
        pub const fn as_event(&self) -> Option<&Event> {
            match self {
                Self::Emit(event) => Some(event),
                Self::Interact(_) => None,
            }
        }

        /// Returns true if this effect performs an outbound interaction
        #[must_use]
        pub const fn is_interaction(&self) -> bool {
            matches!(self, Self::Interact(_))
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
