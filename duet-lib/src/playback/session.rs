//! Session generations used to cancel stale background work.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generation captured by a background thread at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionToken(u64);

impl SessionToken {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Monotonic generation counter.
///
/// Every operation that starts, restarts or stops playback advances the
/// counter. Fade and restart threads hold the token they were spawned with
/// and must confirm it is still current before each side effect; a
/// superseded token turns their remaining work into a no-op.
#[derive(Debug, Default)]
pub struct SessionManager {
    generation: AtomicU64,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new session and return its token.
    pub fn advance(&self) -> SessionToken {
        SessionToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn current(&self) -> SessionToken {
        SessionToken(self.generation.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, token: SessionToken) -> bool {
        self.current() == token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advancing_supersedes_earlier_tokens() {
        let sessions = SessionManager::new();
        let first = sessions.advance();
        assert!(sessions.is_current(first));
        let second = sessions.advance();
        assert!(!sessions.is_current(first));
        assert!(sessions.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn current_does_not_advance() {
        let sessions = SessionManager::new();
        let token = sessions.current();
        assert_eq!(sessions.current(), token);
        assert_eq!(token.generation(), 0);
    }
}
