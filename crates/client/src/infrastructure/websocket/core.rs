//! Runtime-agnostic core for the backend channel
//!
//! This is deliberately free of any runtime dependencies (tokio, sockets).
//! The socket-owning client calls into this core for state transitions,
//! closure classification, and reconnection backoff math, which keeps the
//! state machine inspectable in tests without touching timers.

/// Close code for a normal, user-initiated shutdown
pub const CLOSE_NORMAL: u16 = 1000;

/// Close code reported when the connection was never established or was
/// torn down without a closing handshake
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Connection state of the single logical channel
///
/// Owned exclusively by [`super::BackendClient`]; transitions are the only
/// way it mutates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Resting state before the first `open`
    Disconnected,
    /// Attempting to establish the channel
    Connecting,
    /// Channel established and delivering frames
    Open,
    /// Shut down cleanly; no reconnection will be scheduled
    Closed { code: u16, reason: String },
    /// Abnormal closure; a reconnect timer is armed
    ReconnectScheduled { attempt: u32, delay_ms: u64 },
    /// Reconnect attempts exhausted; only an explicit `open` resumes
    Failed { reason: String },
}

impl ConnectionState {
    /// Status line for a non-blocking UI indicator
    pub fn display_text(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Open => "Connected",
            ConnectionState::Closed { .. } => "Disconnected",
            ConnectionState::ReconnectScheduled { .. } => "Reconnecting...",
            ConnectionState::Failed { .. } => "Connection Failed",
        }
    }
}

/// Last structured channel error exposed by the client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// Transport-level failure; the closure that follows drives the state
    #[error("transport error: {0}")]
    Transport(String),
    /// The backoff policy ran out of attempts
    #[error("reconnect attempts exhausted after {attempts} tries")]
    Exhausted { attempts: u32 },
}

/// How one channel closure should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureKind {
    /// Explicit clean closure; suppresses reconnection
    Clean,
    /// Everything else, including "never established"; triggers backoff
    Abnormal,
}

/// Classify a close code
pub fn classify_close(code: u16) -> ClosureKind {
    if code == CLOSE_NORMAL {
        ClosureKind::Clean
    } else {
        ClosureKind::Abnormal
    }
}

/// Immutable reconnection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before attempt `n` (0-indexed): `min(base * 2^n, cap)`
    pub fn delay_for_attempt(&self, n: u32) -> u64 {
        let factor = 1u64.checked_shl(n).unwrap_or(u64::MAX);
        self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms)
    }
}

/// Mutable attempt bookkeeping for one reconnect sequence
#[derive(Debug, Clone, Copy)]
pub struct ReconnectBackoff {
    policy: ReconnectPolicy,
    attempts: u32,
}

impl ReconnectBackoff {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self { policy, attempts: 0 }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Reset after a successful establishment
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.policy.max_attempts
    }

    /// Advance to the next attempt
    ///
    /// Returns `(attempt, delay_ms)` for the timer to arm, 1-indexed, or
    /// `None` once the policy maximum is exceeded.
    pub fn next_schedule(&mut self) -> Option<(u32, u64)> {
        if self.is_exhausted() {
            return None;
        }
        let delay_ms = self.policy.delay_for_attempt(self.attempts);
        self.attempts += 1;
        Some((self.attempts, delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_exhausted() {
        let policy = ReconnectPolicy {
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            max_attempts: 5,
        };
        let mut backoff = ReconnectBackoff::new(policy);

        let mut delays = Vec::new();
        while let Some((attempt, delay_ms)) = backoff.next_schedule() {
            assert_eq!(attempt as usize, delays.len() + 1);
            delays.push(delay_ms);
        }

        assert_eq!(delays, vec![1_000, 2_000, 4_000, 8_000, 16_000]);
        assert!(backoff.is_exhausted());
        assert_eq!(backoff.next_schedule(), None);
    }

    #[test]
    fn backoff_delay_is_capped() {
        let policy = ReconnectPolicy {
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            max_attempts: 10,
        };
        assert_eq!(policy.delay_for_attempt(0), 1_000);
        assert_eq!(policy.delay_for_attempt(4), 16_000);
        assert_eq!(policy.delay_for_attempt(5), 30_000);
        assert_eq!(policy.delay_for_attempt(9), 30_000);
        // Shift overflow saturates instead of wrapping
        assert_eq!(policy.delay_for_attempt(200), 30_000);
    }

    #[test]
    fn reset_restarts_the_sequence() {
        let mut backoff = ReconnectBackoff::new(ReconnectPolicy::default());
        backoff.next_schedule();
        backoff.next_schedule();
        assert_eq!(backoff.attempts(), 2);

        backoff.reset();
        assert_eq!(backoff.attempts(), 0);
        assert_eq!(backoff.next_schedule(), Some((1, 1_000)));
    }

    #[test]
    fn only_the_normal_code_is_clean() {
        assert_eq!(classify_close(CLOSE_NORMAL), ClosureKind::Clean);
        assert_eq!(classify_close(CLOSE_ABNORMAL), ClosureKind::Abnormal);
        assert_eq!(classify_close(1001), ClosureKind::Abnormal);
        assert_eq!(classify_close(1011), ClosureKind::Abnormal);
    }
}
