//! Domain types exchanged with the remote collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A market asset as reported by the market-data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub rank: u32,
    /// When the quote was taken, provider-side.
    pub fetched_at: DateTime<Utc>,
}

/// A signed-in user's profile, as held by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub uid: Uuid,
    pub email: String,
    pub premium: bool,
}

impl Profile {
    /// Entitlement predicate gating the premium tier.
    pub fn is_premium(&self) -> bool {
        self.premium
    }
}

/// Proof of a freshly-created account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub uid: Uuid,
    pub email: String,
}

/// Sign-up request payload from the consumer layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub display_name: Option<String>,
}
