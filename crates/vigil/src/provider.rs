//! Collaborator interfaces.
//!
//! The engine consumes three remote services through these traits and
//! nothing else. Each operation returns a lazy stream of [`Resource`]
//! envelopes: implementations emit `Pending` while in flight, then one
//! terminal `Success`/`Failure` per logical request. `current_user_exists`
//! and `fetch_coin` are long-lived subscriptions that keep emitting for
//! the life of the stream.
//!
//! No wire format is mandated here; serialization concerns stay inside
//! the implementations (see [`ProviderError`](crate::ProviderError)).

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::{Coin, Credential, Profile};
use crate::resource::Resource;

/// The remote authentication service.
#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    /// Whether a current user session exists. Long-lived: emits again on
    /// every session change.
    async fn current_user_exists(&self) -> BoxStream<'static, bool>;

    /// The signed-in user's profile.
    async fn fetch_user_profile(&self) -> BoxStream<'static, Resource<Profile>>;

    /// Create an account for `email`.
    async fn sign_up(&self, email: String, password: String)
        -> BoxStream<'static, Resource<Credential>>;

    /// Persist a freshly-created credential.
    async fn add_credential(&self, credential: Credential) -> BoxStream<'static, Resource<()>>;
}

/// The remote store holding the user's saved coins.
#[async_trait]
pub trait FavoritesStore: Send + Sync + 'static {
    async fn fetch_favorites(&self) -> BoxStream<'static, Resource<Vec<Coin>>>;
}

/// The live market-data service.
#[async_trait]
pub trait MarketDataProvider: Send + Sync + 'static {
    /// Quote stream for one asset. Long-lived: emits on every refresh of
    /// the quote.
    async fn fetch_coin(&self, id: &str) -> BoxStream<'static, Resource<Coin>>;
}
