//! # Watchlist Demo
//!
//! Walks the consumer side of the Vigil pipelines: resolve the viewer's
//! auth tier, watch the favorites list land, refresh it, and follow the
//! live quote, all against scripted in-process collaborators.
//!
//! Run with `RUST_LOG=vigil_core=debug` to see the pipeline tracing.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use vigil_core::{Deps, Engine};
use vigil_testing::{coin, profile, Script, ScriptedAuth, ScriptedFavorites, ScriptedMarket};

// ============================================================================
// Scripted collaborators (stand-ins for the real remote services)
// ============================================================================

fn auth() -> ScriptedAuth {
    ScriptedAuth::new()
        .script_existence(Script::new().emit(true))
        .script_profile(
            Script::new()
                .pending()
                .wait_ms(200)
                .success(profile(true)),
        )
}

fn favorites() -> ScriptedFavorites {
    ScriptedFavorites::new()
        .script_fetch(
            Script::new()
                .pending()
                .wait_ms(300)
                .success(vec![coin("bitcoin", 45_000.0), coin("ethereum", 3_000.0)]),
        )
        // Second fetch, consumed by the explicit refresh below.
        .script_fetch(
            Script::new()
                .pending()
                .wait_ms(150)
                .success(vec![coin("bitcoin", 45_120.0), coin("ethereum", 3_010.0)]),
        )
}

fn market() -> ScriptedMarket {
    ScriptedMarket::new().script_quote(
        Script::new()
            .pending()
            .wait_ms(100)
            .success(coin("bitcoin", 45_000.0))
            .wait_ms(400)
            .success(coin("bitcoin", 45_120.0)),
    )
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let engine = Engine::builder(Deps {
        auth: Arc::new(auth()),
        favorites: Arc::new(favorites()),
        market: Arc::new(market()),
    })
    .with_quote_asset("bitcoin")
    .build();

    // Resolve the viewer's tier; the favorites fetch follows on its own.
    engine.evaluate_auth_state();

    let mut watch_list = engine.watch_list();
    println!("auth: {:?}", engine.auth_status().get());

    watch_list.changed().await;
    println!("auth: {:?}", engine.auth_status().get());
    for c in &watch_list.get().coins {
        println!("  {} @ ${:.2}", c.symbol, c.price);
    }

    // Pull-to-refresh.
    engine.refresh();
    println!("refreshing: {}", engine.is_refreshing().get());
    watch_list.changed().await;
    for c in &watch_list.get().coins {
        println!("  {} @ ${:.2}", c.symbol, c.price);
    }
    println!("refreshing: {}", engine.is_refreshing().get());

    // Let the quote pipeline emit its updates.
    sleep(Duration::from_millis(600)).await;
    if let Some(c) = engine.market_state().get().coin {
        println!("quote: {} @ ${:.2}", c.symbol, c.price);
    }

    engine.shutdown();
    Ok(())
}
