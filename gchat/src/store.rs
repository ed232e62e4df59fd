//! Session-keyed history storage contracts and a basic in-memory implementation.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use gcommon::SessionId;
use gprovider::Turn;

use crate::{ChatError, ConversationHistory};

pub type ChatFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A session's history behind its own async lock; holding the guard serializes commits.
pub type SessionHistory = Arc<tokio::sync::Mutex<ConversationHistory>>;

pub trait ConversationStore: Send + Sync {
    /// Returns the history for `session_id`, creating it on first use.
    fn session<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> ChatFuture<'a, Result<SessionHistory, ChatError>>;
}

pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug)]
struct SessionSlot {
    history: SessionHistory,
    last_used: u64,
}

#[derive(Debug, Default)]
struct SessionMap {
    slots: HashMap<SessionId, SessionSlot>,
    clock: u64,
}

impl SessionMap {
    /// Drops the least recently used session, preferring ones no turn currently holds.
    fn evict_one(&mut self) -> Option<SessionId> {
        let idle = self
            .slots
            .iter()
            .filter(|(_, slot)| Arc::strong_count(&slot.history) == 1)
            .min_by_key(|(_, slot)| slot.last_used);
        let victim = idle
            .or_else(|| self.slots.iter().min_by_key(|(_, slot)| slot.last_used))
            .map(|(id, _)| id.clone())?;

        self.slots.remove(&victim);
        Some(victim)
    }
}

/// Keeps at most `max_sessions` histories; creating one past the cap evicts the least
/// recently used session.
#[derive(Debug)]
pub struct InMemoryConversationStore {
    preamble: Vec<Turn>,
    capacity: usize,
    max_sessions: usize,
    sessions: Mutex<SessionMap>,
}

impl InMemoryConversationStore {
    pub fn new(preamble: Vec<Turn>, capacity: usize) -> Self {
        Self {
            preamble,
            capacity,
            max_sessions: DEFAULT_MAX_SESSIONS,
            sessions: Mutex::new(SessionMap::default()),
        }
    }

    /// Caps the number of live sessions; values below one are raised to one.
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    pub fn session_count(&self) -> Result<usize, ChatError> {
        Ok(self.lock_sessions()?.slots.len())
    }

    fn lock_sessions(&self) -> Result<std::sync::MutexGuard<'_, SessionMap>, ChatError> {
        self.sessions
            .lock()
            .map_err(|_| ChatError::internal("conversation store lock poisoned"))
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn session<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> ChatFuture<'a, Result<SessionHistory, ChatError>> {
        Box::pin(async move {
            let mut sessions = self.lock_sessions()?;
            sessions.clock += 1;
            let now = sessions.clock;

            if let Some(slot) = sessions.slots.get_mut(session_id) {
                slot.last_used = now;
                return Ok(Arc::clone(&slot.history));
            }

            while sessions.slots.len() >= self.max_sessions {
                let Some(evicted) = sessions.evict_one() else {
                    break;
                };
                tracing::debug!(phase = "store", event = "session_evicted", session = %evicted);
            }

            let history = Arc::new(tokio::sync::Mutex::new(ConversationHistory::new(
                self.preamble.clone(),
                self.capacity,
            )));
            sessions.slots.insert(
                session_id.clone(),
                SessionSlot {
                    history: Arc::clone(&history),
                    last_used: now,
                },
            );

            Ok(history)
        })
    }
}
