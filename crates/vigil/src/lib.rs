//! # Vigil
//!
//! A reactive state-synchronization core: slow, failable, asynchronous
//! collaborators on one side, synchronously-readable state cells on the
//! other, and cancel-safe pipelines in between.
//!
//! ## Core Concepts
//!
//! Vigil separates **outcomes** from **state**:
//! - [`Resource`] = Outcomes (one step of an async operation: pending,
//!   success, failure)
//! - [`StateCell`] = State (the latest fully-constructed value a consumer
//!   may read)
//!
//! The key principle: **one slot = one in-flight operation**. If two
//! starts race, the last start wins and the loser's writes are dropped.
//!
//! ## Architecture
//!
//! ```text
//! Collaborators (AuthProvider / FavoritesStore / MarketDataProvider)
//!     │
//!     ▼ stream<Resource<T>>
//! Engine pipelines
//!     │
//!     ├─► slot "sign-up"    ──► sign_up cell
//!     ├─► slot "auth-state" ──► auth_status cell ──resolved──┐
//!     ├─► slot "fetch-list" ──► watch_list cell ◄────────────┘
//!     └─► quote poll        ──► market_state cell
//!                │
//!                ▼ replace() (atomic)
//!          StateCell ── read()/changed() ──► consumer layer
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Cells have one writer** - Only engine pipelines replace values
//! 2. **Replacement is whole-value** - No reader sees a torn state
//! 3. **Last start wins** - A superseded task's writes never land, even
//!    if it finishes after its successor starts
//! 4. **Auth resolves before dependents run** - The favorites fetch is
//!    gated on a fully-resolved tier
//! 5. **Failures are state, not panics** - Collaborator errors become
//!    display messages in cells
//!
//! ## Guarantees
//!
//! - `read()` is synchronous and never fails
//! - A dropped engine cancels all of its pipelines
//! - Suppressed stale writes are silent: superseded work is discarded,
//!   not reported
//!
//! ## Example
//!
//! ```ignore
//! use vigil_core::{Deps, Engine, User};
//! use std::sync::Arc;
//!
//! let engine = Engine::builder(Deps {
//!     auth: Arc::new(my_auth),
//!     favorites: Arc::new(my_store),
//!     market: Arc::new(my_market),
//! })
//! .with_quote_asset("bitcoin")
//! .build();
//!
//! engine.evaluate_auth_state();
//!
//! let watch_list = engine.watch_list();
//! // consumer layer: branch on the current slice
//! let state = watch_list.get();
//! if let Some(err) = state.error {
//!     eprintln!("couldn't load favorites: {err}");
//! }
//! ```
//!
//! ## What This Is Not
//!
//! Vigil is **not**:
//! - A UI framework
//! - A network client
//! - A persistence layer
//!
//! Vigil **is**:
//! > The layer that turns racy async emissions into consistent,
//! > observable state.

mod auth;
mod cell;
mod domain;
mod engine;
mod error;
mod provider;
mod resource;
mod slot;
mod state;

// Re-export the envelope and its default failure text
pub use resource::{Resource, DEFAULT_FAILURE_MESSAGE};

// Re-export cells
pub use cell::{StateCell, StateReader};

// Re-export task slots
pub use slot::{Liveness, TaskSlots};

// Re-export the auth state machine
pub use auth::{AuthDecision, AuthMachine, AuthPhase};

// Re-export domain and per-cell state types
pub use domain::{Coin, Credential, Profile, User};
pub use state::{AuthStatus, MarketState, SignUpState, WatchListState};

// Re-export collaborator interfaces
pub use provider::{AuthProvider, FavoritesStore, MarketDataProvider};

// Re-export error types
pub use error::ProviderError;

// Re-export the engine (primary entry point)
pub use engine::{Deps, Engine, EngineBuilder};

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use futures::stream::BoxStream;
