//! WebSocket client for the catalog backend, built on tokio-tungstenite
//!
//! One `BackendClient` owns one logical channel: the socket, the driver
//! task, and the single reconnect timer. Closures are classified by close
//! code; abnormal ones arm the backoff timer, a clean one (or an explicit
//! `close`) ends the driver without rescheduling.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::infrastructure::messaging::EventBus;

use super::core::{
    classify_close, ChannelError, ClosureKind, ConnectionState, ReconnectBackoff, ReconnectPolicy,
    CLOSE_ABNORMAL, CLOSE_NORMAL,
};

type StateCallback = Box<dyn Fn(ConnectionState) + Send + Sync + 'static>;

/// How one channel session ended
enum SessionEnd {
    /// `close()` was called on this side
    UserClosed,
    /// The peer or the transport ended the session
    ServerClosed { code: u16, reason: String },
}

/// Client for the backend's push channel
///
/// `open` spawns the driver task; `close` performs a user-initiated
/// shutdown and cancels any pending reconnect timer. State is observable
/// via [`BackendClient::state`] and a state-change callback. Clones share
/// the same channel.
#[derive(Clone)]
pub struct BackendClient {
    url: String,
    policy: ReconnectPolicy,
    events: EventBus,
    state: Arc<RwLock<ConnectionState>>,
    last_error: Arc<RwLock<Option<ChannelError>>>,
    on_state_change: Arc<Mutex<Option<StateCallback>>>,
    close_tx: Arc<watch::Sender<bool>>,
}

impl BackendClient {
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy, events: EventBus) -> Self {
        let (close_tx, _) = watch::channel(false);
        Self {
            url: url.into(),
            policy,
            events,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            last_error: Arc::new(RwLock::new(None)),
            on_state_change: Arc::new(Mutex::new(None)),
            close_tx: Arc::new(close_tx),
        }
    }

    /// Current state of the channel
    pub fn state(&self) -> ConnectionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Last structured channel error, if any
    pub fn last_error(&self) -> Option<ChannelError> {
        self.last_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register the state-change callback (replaces any previous one)
    pub fn set_on_state_change<F>(&self, callback: F)
    where
        F: Fn(ConnectionState) + Send + Sync + 'static,
    {
        let mut on_state_change = self
            .on_state_change
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *on_state_change = Some(Box::new(callback));
    }

    /// Establish the channel if none is open or reconnect-scheduled
    ///
    /// Valid from `Disconnected`, `Closed`, and `Failed`; a fresh `open`
    /// resets the reconnect attempt counter. While the channel is active
    /// this is a no-op, so there are never two drivers for one client.
    pub fn open(&self) {
        // Check and transition under one guard so racing opens cannot both
        // pass the active-state check and spawn a second driver.
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if matches!(
                *state,
                ConnectionState::Connecting
                    | ConnectionState::Open
                    | ConnectionState::ReconnectScheduled { .. }
            ) {
                tracing::debug!(state = ?*state, "open ignored, channel already active");
                return;
            }
            *state = ConnectionState::Connecting;
        }

        self.close_tx.send_replace(false);
        self.notify(ConnectionState::Connecting);

        let client = self.clone();
        tokio::spawn(async move {
            client.run_driver().await;
        });
    }

    /// User-initiated shutdown: clean close, pending reconnect cancelled
    pub fn close(&self) {
        tracing::info!("client close requested");
        self.close_tx.send_replace(true);
    }

    fn set_state(&self, next: ConnectionState) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = next.clone();
        }
        self.notify(next);
    }

    fn notify(&self, state: ConnectionState) {
        let callback = self
            .on_state_change
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(ref cb) = *callback {
            cb(state);
        }
    }

    fn record_error(&self, error: ChannelError) {
        let mut last_error = self
            .last_error
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *last_error = Some(error);
    }

    fn clear_error(&self) {
        let mut last_error = self
            .last_error
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *last_error = None;
    }

    /// Resolves once `close()` has been called
    async fn close_requested(rx: &mut watch::Receiver<bool>) {
        while !*rx.borrow_and_update() {
            // The sender lives inside the client; a dropped sender counts
            // as shutdown as well.
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    async fn run_driver(self) {
        let mut backoff = ReconnectBackoff::new(self.policy);
        let mut close_rx = self.close_tx.subscribe();

        loop {
            let (code, reason) = match self.connect_once(&mut backoff, &mut close_rx).await {
                SessionEnd::UserClosed => {
                    self.set_state(ConnectionState::Closed {
                        code: CLOSE_NORMAL,
                        reason: "client closed".to_string(),
                    });
                    return;
                }
                SessionEnd::ServerClosed { code, reason } => (code, reason),
            };

            if classify_close(code) == ClosureKind::Clean {
                tracing::info!(code, %reason, "channel closed cleanly");
                self.set_state(ConnectionState::Closed { code, reason });
                return;
            }

            match backoff.next_schedule() {
                Some((attempt, delay_ms)) => {
                    tracing::info!(
                        attempt,
                        delay_ms,
                        max_attempts = self.policy.max_attempts,
                        "channel lost, scheduling reconnect"
                    );
                    self.set_state(ConnectionState::ReconnectScheduled { attempt, delay_ms });
                    tokio::select! {
                        _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
                        _ = Self::close_requested(&mut close_rx) => {
                            tracing::info!("reconnect cancelled by client close");
                            self.set_state(ConnectionState::Closed {
                                code: CLOSE_NORMAL,
                                reason: "client closed".to_string(),
                            });
                            return;
                        }
                    }
                    self.set_state(ConnectionState::Connecting);
                }
                None => {
                    tracing::error!(
                        attempts = backoff.attempts(),
                        "reconnect attempts exhausted, giving up"
                    );
                    self.record_error(ChannelError::Exhausted {
                        attempts: backoff.attempts(),
                    });
                    self.set_state(ConnectionState::Failed {
                        reason: "reconnect attempts exhausted".to_string(),
                    });
                    return;
                }
            }
        }
    }

    /// Dial once and pump frames until the session ends
    async fn connect_once(
        &self,
        backoff: &mut ReconnectBackoff,
        close_rx: &mut watch::Receiver<bool>,
    ) -> SessionEnd {
        if *close_rx.borrow() {
            return SessionEnd::UserClosed;
        }

        let mut ws = match connect_async(self.url.as_str()).await {
            Ok((ws, _response)) => ws,
            Err(e) => {
                tracing::warn!(error = %e, url = %self.url, "failed to connect");
                self.record_error(ChannelError::Transport(e.to_string()));
                return SessionEnd::ServerClosed {
                    code: CLOSE_ABNORMAL,
                    reason: "connection never established".to_string(),
                };
            }
        };

        tracing::info!(url = %self.url, "channel open");
        backoff.reset();
        self.clear_error();
        self.set_state(ConnectionState::Open);

        loop {
            tokio::select! {
                msg = ws.next() => match msg {
                    Some(Ok(Message::Text(text))) => self.events.dispatch_raw(&text).await,
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (u16::from(f.code), f.reason.to_string()))
                            .unwrap_or((CLOSE_ABNORMAL, "closed without close frame".to_string()));
                        return SessionEnd::ServerClosed { code, reason };
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "transport error");
                        self.record_error(ChannelError::Transport(e.to_string()));
                        return SessionEnd::ServerClosed {
                            code: CLOSE_ABNORMAL,
                            reason: e.to_string(),
                        };
                    }
                    None => {
                        return SessionEnd::ServerClosed {
                            code: CLOSE_ABNORMAL,
                            reason: "stream ended".to_string(),
                        };
                    }
                },
                _ = Self::close_requested(close_rx) => {
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: "client closed".into(),
                    };
                    if let Err(e) = ws.send(Message::Close(Some(frame))).await {
                        tracing::debug!(error = %e, "close frame not delivered");
                    }
                    return SessionEnd::UserClosed;
                }
            }
        }
    }
}
