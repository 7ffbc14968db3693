//! The synchronization engine.
//!
//! One engine instance composes the three collaborators into observable
//! state cells through four pipelines:
//!
//! ```text
//! AuthProvider ──current_user_exists()──┐
//!                                       ▼
//!                                 AuthMachine ──Resolved──► auth_status cell
//!                                       │                        │
//!              fetch_user_profile() ◄───┘                        ▼
//!                                              slot "fetch-list" starts
//!                                                       │
//! FavoritesStore ──fetch_favorites()────────────────────┴─► watch_list cell
//!
//! AuthProvider ──sign_up()── slot "sign-up" ───────────────► sign_up cell
//!
//! MarketDataProvider ──fetch_coin()── (engine lifetime) ───► market_state cell
//! ```
//!
//! Key invariants:
//!
//! 1. Cells are written only by engine pipelines; consumers read.
//! 2. Slot-owned pipelines are last-start-wins; superseded writes are
//!    suppressed at the write site by the slot's liveness token.
//! 3. The favorites fetch starts only after the auth tier is fully
//!    resolved, never while resolution is pending.
//! 4. Collaborator failures land in cells as display state; they are
//!    never raised to the caller.
//! 5. Dropping (or shutting down) the engine cancels every outstanding
//!    pipeline through the root cancellation token.

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::auth::{AuthDecision, AuthMachine};
use crate::cell::{StateCell, StateReader};
use crate::domain::{Credential, User};
use crate::provider::{AuthProvider, FavoritesStore, MarketDataProvider};
use crate::resource::{Resource, DEFAULT_FAILURE_MESSAGE};
use crate::slot::{Liveness, TaskSlots};
use crate::state::{AuthStatus, MarketState, SignUpState, WatchListState};

const SLOT_SIGN_UP: &str = "sign-up";
const SLOT_AUTH_STATE: &str = "auth-state";
const SLOT_FETCH_LIST: &str = "fetch-list";

/// The collaborators one engine instance synchronizes against.
pub struct Deps {
    pub auth: Arc<dyn AuthProvider>,
    pub favorites: Arc<dyn FavoritesStore>,
    pub market: Arc<dyn MarketDataProvider>,
}

/// Builds an [`Engine`] and starts its lifetime pipelines.
pub struct EngineBuilder {
    deps: Deps,
    quote_asset: String,
}

impl EngineBuilder {
    pub fn new(deps: Deps) -> Self {
        Self {
            deps,
            quote_asset: "bitcoin".to_string(),
        }
    }

    /// Asset id the live quote pipeline subscribes to.
    pub fn with_quote_asset(mut self, id: impl Into<String>) -> Self {
        self.quote_asset = id.into();
        self
    }

    /// Construct the engine and start the quote-polling pipeline.
    ///
    /// Must be called within a tokio runtime.
    pub fn build(self) -> Engine {
        let root = CancellationToken::new();
        let inner = Arc::new(Inner {
            deps: self.deps,
            slots: TaskSlots::new(root.clone()),
            root,
            quote_asset: self.quote_asset,
            sign_up: StateCell::default(),
            watch_list: StateCell::default(),
            is_refreshing: StateCell::new(false),
            market_state: StateCell::default(),
            auth_status: StateCell::default(),
        });

        inner.spawn_quote_poll();
        Engine { inner }
    }
}

/// The synchronization orchestrator.
///
/// Cheap to clone; all clones share the same cells and slots. See the
/// module docs for the pipeline layout.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

struct Inner {
    deps: Deps,
    slots: TaskSlots,
    root: CancellationToken,
    quote_asset: String,

    sign_up: StateCell<SignUpState>,
    watch_list: StateCell<WatchListState>,
    is_refreshing: StateCell<bool>,
    market_state: StateCell<MarketState>,
    auth_status: StateCell<AuthStatus>,
}

impl Engine {
    pub fn builder(deps: Deps) -> EngineBuilder {
        EngineBuilder::new(deps)
    }

    // ------------------------------------------------------------------
    // Read-only access for the consumer layer
    // ------------------------------------------------------------------

    pub fn sign_up_state(&self) -> StateReader<SignUpState> {
        self.inner.sign_up.subscribe()
    }

    pub fn watch_list(&self) -> StateReader<WatchListState> {
        self.inner.watch_list.subscribe()
    }

    pub fn is_refreshing(&self) -> StateReader<bool> {
        self.inner.is_refreshing.subscribe()
    }

    pub fn market_state(&self) -> StateReader<MarketState> {
        self.inner.market_state.subscribe()
    }

    pub fn auth_status(&self) -> StateReader<AuthStatus> {
        self.inner.auth_status.subscribe()
    }

    // ------------------------------------------------------------------
    // Mutating entry points
    // ------------------------------------------------------------------

    /// Create an account. One-shot: each envelope from the collaborator
    /// replaces the sign-up cell; a Failure is terminal for the attempt.
    pub fn sign_up(&self, user: User, password: String) {
        let inner = self.inner.clone();
        self.inner.slots.start(SLOT_SIGN_UP, move |live| async move {
            debug!(email = %user.email, "sign-up started");
            let mut stream = inner.deps.auth.sign_up(user.email, password).await;
            while let Some(envelope) = stream.next().await {
                let state = match envelope {
                    Resource::Pending => SignUpState::loading(),
                    Resource::Success { value } => SignUpState::succeeded(value),
                    Resource::Failure { message } => {
                        warn!(error = %message, "sign-up failed");
                        SignUpState::failed(displayable(message))
                    }
                };
                live.write(&inner.sign_up, state);
            }
        });
    }

    /// Persist the signed-up viewer's credential. Fire-and-forget:
    /// outcomes are logged, no cell is touched.
    ///
    /// The credential comes from the latest successful sign-up, stamped
    /// with the caller's email. Without a signed-up credential there is
    /// nothing to persist and the call is a logged no-op.
    pub fn add_user_credential(&self, user: User) {
        let Some(credential) = self.inner.sign_up.read().credential else {
            warn!(email = %user.email, "no signed-up credential to persist");
            return;
        };
        let credential = Credential {
            email: user.email,
            ..credential
        };

        let inner = self.inner.clone();
        let token = self.inner.root.clone();
        tokio::spawn(async move {
            let mut stream = inner.deps.auth.add_credential(credential).await;
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    next = stream.next() => {
                        match next {
                            Some(Resource::Failure { message }) => {
                                warn!(error = %message, "credential write failed");
                            }
                            Some(envelope) => {
                                debug!(?envelope, "credential write progressed");
                            }
                            None => break,
                        }
                    }
                }
            }
        });
    }

    /// Resolve the viewer's auth tier, then (and only then) start the
    /// favorites fetch.
    ///
    /// Long-lived: keeps following session changes until superseded or
    /// the engine shuts down. Restarting supersedes the previous
    /// resolution run.
    pub fn evaluate_auth_state(&self) {
        let inner = self.inner.clone();
        self.inner
            .slots
            .start(SLOT_AUTH_STATE, move |live| async move {
                let mut machine = AuthMachine::new();
                machine.begin();

                let mut existence = inner.deps.auth.current_user_exists().await;
                while let Some(exists) = existence.next().await {
                    match machine.on_existence(exists) {
                        AuthDecision::SignedOut => {
                            debug!("no session; viewer unauthenticated");
                            live.write(&inner.auth_status, AuthStatus::Unauthenticated);
                        }
                        AuthDecision::CheckProfile => {
                            inner.resolve_profile(&live, &mut machine).await;
                        }
                        AuthDecision::Nothing | AuthDecision::Resolved(_) => {}
                    }
                }
            });
    }

    /// Re-fetch the favorites list, superseding any in-flight fetch.
    ///
    /// The refreshing flag goes true now and is cleared by the fetch when
    /// it finishes, success or failure.
    pub fn refresh(&self) {
        self.inner.is_refreshing.replace(true);
        self.inner.start_favorites_fetch();
    }

    /// Cancel every pipeline. Idempotent; also runs on drop of the last
    /// engine handle.
    pub fn shutdown(&self) {
        self.inner.root.cancel();
    }
}

impl Inner {
    /// Pipeline B: the slot-owned favorites fetch. Last start wins.
    fn start_favorites_fetch(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        self.slots
            .start(SLOT_FETCH_LIST, move |live| async move {
                debug!("favorites fetch started");
                let mut stream = inner.deps.favorites.fetch_favorites().await;
                while let Some(envelope) = stream.next().await {
                    match envelope {
                        Resource::Pending => {}
                        Resource::Success { value } => {
                            live.write(&inner.watch_list, WatchListState::loaded(value));
                        }
                        Resource::Failure { message } => {
                            warn!(error = %message, "favorites fetch failed");
                            live.write(&inner.watch_list, WatchListState::failed(displayable(message)));
                        }
                    }
                }
                // Fetch finished, whatever the outcome: the refresh flag
                // never survives a completed fetch.
                live.write(&inner.is_refreshing, false);
            });
    }

    /// The profile leg of auth resolution. Only a Success transitions the
    /// status cell; a Resolved decision also starts the favorites fetch.
    async fn resolve_profile(self: &Arc<Self>, live: &Liveness, machine: &mut AuthMachine) {
        let mut stream = self.deps.auth.fetch_user_profile().await;
        while let Some(envelope) = stream.next().await {
            match machine.on_profile(&envelope) {
                AuthDecision::Resolved(status) => {
                    debug!(?status, "auth tier resolved");
                    if live.write(&self.auth_status, status) {
                        self.start_favorites_fetch();
                    }
                    return;
                }
                _ => {
                    if let Some(message) = envelope.failure_message() {
                        warn!(error = %message, "profile fetch failed; tier unchanged");
                    }
                }
            }
        }
    }

    /// Lifetime pipeline: live quote for the configured asset. no slot needed;
    /// exactly one instance runs, scoped to the root token.
    fn spawn_quote_poll(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        let token = inner.root.clone();
        tokio::spawn(async move {
            let mut stream = inner.deps.market.fetch_coin(&inner.quote_asset).await;
            loop {
                tokio::select! {
                    // Teardown must win a tie against a ready emission.
                    biased;
                    _ = token.cancelled() => break,
                    next = stream.next() => {
                        let Some(envelope) = next else { break };
                        let state = match envelope {
                            Resource::Pending => MarketState::loading(),
                            Resource::Success { value } => MarketState::quoted(value),
                            Resource::Failure { message } => {
                                warn!(error = %message, "quote fetch failed");
                                MarketState::failed(displayable(message))
                            }
                        };
                        // Re-check: shutdown may have landed while the
                        // emission was being handled.
                        if token.is_cancelled() {
                            break;
                        }
                        inner.market_state.replace(state);
                    }
                }
            }
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

/// Sources occasionally fail without saying why; readers still get a
/// message.
fn displayable(message: String) -> String {
    if message.trim().is_empty() {
        DEFAULT_FAILURE_MESSAGE.to_string()
    } else {
        message
    }
}
