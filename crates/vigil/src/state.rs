//! Per-cell state slices the consumer layer branches on.
//!
//! Each slice mirrors one observable cell: the consumer renders a spinner
//! on `is_loading`, an error banner on `error`, data otherwise. Slices are
//! replaced whole, never patched.

use serde::{Deserialize, Serialize};

use crate::domain::{Coin, Credential};

/// State of the one-shot sign-up flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpState {
    pub is_loading: bool,
    pub credential: Option<Credential>,
    pub error: Option<String>,
}

impl SignUpState {
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn succeeded(credential: Credential) -> Self {
        Self {
            credential: Some(credential),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// State of the favorites watch list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchListState {
    pub coins: Vec<Coin>,
    pub error: Option<String>,
}

impl WatchListState {
    pub fn loaded(coins: Vec<Coin>) -> Self {
        Self { coins, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            coins: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// State of the continuously-polled market quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    pub is_loading: bool,
    pub coin: Option<Coin>,
    pub error: Option<String>,
}

impl MarketState {
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn quoted(coin: Coin) -> Self {
        Self {
            coin: Some(coin),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// The viewer's resolved authentication tier.
///
/// Gates whether the favorites pipeline runs at all. Closed enum so the
/// consumer's match stays exhaustive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthStatus {
    #[default]
    Unauthenticated,
    Standard,
    Premium,
}
