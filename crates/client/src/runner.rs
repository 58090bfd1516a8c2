//! Composition root: configuration and wiring
//!
//! Builds the event bus, the backend channel, and the list service, and
//! subscribes the channel's `update` notifications to the service's
//! refetch path. The session owns the channel for its lifetime: opened on
//! start, closed explicitly on shutdown.

use std::sync::Arc;

use anyhow::{Context, Result};

use kinoview_protocol::PushEvent;

use crate::application::services::MovieListService;
use crate::infrastructure::http::HttpQueryAdapter;
use crate::infrastructure::messaging::EventBus;
use crate::infrastructure::websocket::{BackendClient, ReconnectPolicy};

/// Configuration types for the client runner.
pub mod config {
    use anyhow::{Context, Result};
    use url::Url;

    #[derive(Clone, Debug)]
    pub struct RunnerConfig {
        /// WebSocket endpoint broadcasting catalog updates
        pub ws_url: String,
        /// Base URL of the catalog REST API
        pub api_url: String,
    }

    impl RunnerConfig {
        pub fn from_env() -> Result<Self> {
            let ws_url = std::env::var("KINOVIEW_WS_URL")
                .unwrap_or_else(|_| "ws://localhost:8080/websocket/movies".to_string());
            let api_url = std::env::var("KINOVIEW_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api".to_string());

            Url::parse(&ws_url).context("invalid KINOVIEW_WS_URL")?;
            Url::parse(&api_url).context("invalid KINOVIEW_API_URL")?;

            Ok(Self { ws_url, api_url })
        }
    }
}

use config::RunnerConfig;

/// A running client session
pub struct Session {
    pub list: MovieListService,
    pub channel: BackendClient,
    pub events: EventBus,
}

impl Session {
    /// Clean shutdown: closes the channel and cancels any pending
    /// reconnect timer
    pub fn close(&self) {
        self.channel.close();
    }
}

/// Wire everything up, load the first page, and open the channel
pub async fn start(config: RunnerConfig) -> Result<Session> {
    let events = EventBus::new();
    let query = Arc::new(HttpQueryAdapter::new(&config.api_url));
    let list = MovieListService::new(query);

    {
        let list = list.clone();
        events
            .subscribe(PushEvent::UPDATE, move |_event| {
                let list = list.clone();
                tokio::spawn(async move {
                    list.on_update_event().await;
                });
            })
            .await;
    }

    let channel = BackendClient::new(config.ws_url.clone(), ReconnectPolicy::default(), events.clone());
    channel.set_on_state_change(|state| {
        tracing::info!(state = ?state, status = state.display_text(), "channel state changed");
    });

    list.refresh().await;
    if let Some(error) = list.view().await.error.as_ref() {
        // Initial load failure is non-fatal; pushes or user actions retry
        tracing::warn!(%error, "initial catalog load failed");
    }

    channel.open();

    Ok(Session {
        list,
        channel,
        events,
    })
}

/// Convenience wrapper used by the binary
pub async fn run() -> Result<()> {
    let config = RunnerConfig::from_env().context("loading configuration")?;
    tracing::info!(ws_url = %config.ws_url, api_url = %config.api_url, "starting kinoview session");

    let session = start(config).await?;
    let view = session.list.view().await;
    tracing::info!(
        movies = view.movies.len(),
        total = view.total_count,
        "initial catalog page loaded"
    );

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    session.close();
    Ok(())
}
