//! Scripted mock collaborators for testing Vigil pipelines.
//!
//! A [`Script`] describes the emissions of one collaborator stream, with
//! optional virtual-time delays between them (drive them with
//! `#[tokio::test(start_paused = true)]`). The `Scripted*` providers pop
//! one script per call and record every call they receive, so tests can
//! assert both what landed in the cells and how often the collaborators
//! were asked.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use uuid::Uuid;

use vigil_core::{
    AuthProvider, Coin, Credential, FavoritesStore, MarketDataProvider, Profile, Resource,
};

// ============================================================================
// Scripts
// ============================================================================

enum Step<T> {
    Emit(T),
    Wait(Duration),
}

/// An ordered list of emissions and delays for one stream.
pub struct Script<T> {
    steps: Vec<Step<T>>,
}

impl<T: Send + 'static> Default for Script<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Script<T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Emit `value` as the next item.
    pub fn emit(mut self, value: T) -> Self {
        self.steps.push(Step::Emit(value));
        self
    }

    /// Sleep (virtual time) before the next emission.
    pub fn wait(mut self, delay: Duration) -> Self {
        self.steps.push(Step::Wait(delay));
        self
    }

    /// Sleep `ms` milliseconds before the next emission.
    pub fn wait_ms(self, ms: u64) -> Self {
        self.wait(Duration::from_millis(ms))
    }

    pub fn into_stream(self) -> BoxStream<'static, T> {
        stream::iter(self.steps)
            .filter_map(|step| async move {
                match step {
                    Step::Emit(value) => Some(value),
                    Step::Wait(delay) => {
                        tokio::time::sleep(delay).await;
                        None
                    }
                }
            })
            .boxed()
    }
}

impl<T: Send + 'static> Script<Resource<T>> {
    /// Emit a `Pending` envelope.
    pub fn pending(self) -> Self {
        self.emit(Resource::Pending)
    }

    /// Emit a `Success` envelope.
    pub fn success(self, value: T) -> Self {
        self.emit(Resource::success(value))
    }

    /// Emit a `Failure` envelope.
    pub fn failure(self, message: impl Into<String>) -> Self {
        self.emit(Resource::failure(message))
    }
}

/// FIFO of scripts; one is consumed per collaborator call.
struct ScriptQueue<T> {
    scripts: Mutex<VecDeque<Script<T>>>,
}

impl<T: Send + 'static> ScriptQueue<T> {
    fn new() -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
        }
    }

    fn push(&self, script: Script<T>) {
        self.scripts.lock().unwrap().push_back(script);
    }

    /// Next script as a stream; an unscripted call gets an empty stream.
    fn next_stream(&self) -> BoxStream<'static, T> {
        match self.scripts.lock().unwrap().pop_front() {
            Some(script) => script.into_stream(),
            None => stream::empty().boxed(),
        }
    }
}

// ============================================================================
// Call recording
// ============================================================================

/// Records every collaborator call, in order.
#[derive(Default)]
pub struct CallLog {
    entries: Mutex<Vec<&'static str>>,
}

impl CallLog {
    pub fn record(&self, name: &'static str) {
        self.entries.lock().unwrap().push(name);
    }

    pub fn count(&self, name: &'static str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|n| **n == name)
            .count()
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.entries.lock().unwrap().clone()
    }
}

// ============================================================================
// Scripted collaborators
// ============================================================================

/// Scripted [`AuthProvider`].
pub struct ScriptedAuth {
    existence: ScriptQueue<bool>,
    profiles: ScriptQueue<Resource<Profile>>,
    sign_ups: ScriptQueue<Resource<Credential>>,
    credential_writes: ScriptQueue<Resource<()>>,
    pub calls: CallLog,
}

impl Default for ScriptedAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedAuth {
    pub fn new() -> Self {
        Self {
            existence: ScriptQueue::new(),
            profiles: ScriptQueue::new(),
            sign_ups: ScriptQueue::new(),
            credential_writes: ScriptQueue::new(),
            calls: CallLog::default(),
        }
    }

    pub fn script_existence(self, script: Script<bool>) -> Self {
        self.existence.push(script);
        self
    }

    pub fn script_profile(self, script: Script<Resource<Profile>>) -> Self {
        self.profiles.push(script);
        self
    }

    pub fn script_sign_up(self, script: Script<Resource<Credential>>) -> Self {
        self.sign_ups.push(script);
        self
    }

    pub fn script_credential_write(self, script: Script<Resource<()>>) -> Self {
        self.credential_writes.push(script);
        self
    }
}

#[async_trait]
impl AuthProvider for ScriptedAuth {
    async fn current_user_exists(&self) -> BoxStream<'static, bool> {
        self.calls.record("current_user_exists");
        self.existence.next_stream()
    }

    async fn fetch_user_profile(&self) -> BoxStream<'static, Resource<Profile>> {
        self.calls.record("fetch_user_profile");
        self.profiles.next_stream()
    }

    async fn sign_up(
        &self,
        _email: String,
        _password: String,
    ) -> BoxStream<'static, Resource<Credential>> {
        self.calls.record("sign_up");
        self.sign_ups.next_stream()
    }

    async fn add_credential(&self, _credential: Credential) -> BoxStream<'static, Resource<()>> {
        self.calls.record("add_credential");
        self.credential_writes.next_stream()
    }
}

/// Scripted [`FavoritesStore`].
pub struct ScriptedFavorites {
    fetches: ScriptQueue<Resource<Vec<Coin>>>,
    pub calls: CallLog,
}

impl Default for ScriptedFavorites {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedFavorites {
    pub fn new() -> Self {
        Self {
            fetches: ScriptQueue::new(),
            calls: CallLog::default(),
        }
    }

    pub fn script_fetch(self, script: Script<Resource<Vec<Coin>>>) -> Self {
        self.fetches.push(script);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.calls.count("fetch_favorites")
    }
}

#[async_trait]
impl FavoritesStore for ScriptedFavorites {
    async fn fetch_favorites(&self) -> BoxStream<'static, Resource<Vec<Coin>>> {
        self.calls.record("fetch_favorites");
        self.fetches.next_stream()
    }
}

/// Scripted [`MarketDataProvider`].
pub struct ScriptedMarket {
    quotes: ScriptQueue<Resource<Coin>>,
    pub calls: CallLog,
}

impl Default for ScriptedMarket {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedMarket {
    pub fn new() -> Self {
        Self {
            quotes: ScriptQueue::new(),
            calls: CallLog::default(),
        }
    }

    pub fn script_quote(self, script: Script<Resource<Coin>>) -> Self {
        self.quotes.push(script);
        self
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedMarket {
    async fn fetch_coin(&self, _id: &str) -> BoxStream<'static, Resource<Coin>> {
        self.calls.record("fetch_coin");
        self.quotes.next_stream()
    }
}

// ============================================================================
// Sample domain values
// ============================================================================

pub fn coin(id: &str, price: f64) -> Coin {
    Coin {
        id: id.to_string(),
        symbol: id.chars().take(3).collect::<String>().to_uppercase(),
        name: id.to_string(),
        price,
        rank: 1,
        fetched_at: Utc::now(),
    }
}

pub fn profile(premium: bool) -> Profile {
    Profile {
        uid: Uuid::new_v4(),
        email: "viewer@example.com".to_string(),
        premium,
    }
}

pub fn credential() -> Credential {
    Credential {
        uid: Uuid::new_v4(),
        email: "viewer@example.com".to_string(),
    }
}
