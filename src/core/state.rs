//! State Management
//!
//! Per-session `state` parameter generation and validation.
//!
//! Pending authorizations are keyed by the caller's session id (one per user
//! agent), never by a global slot, so one visitor's callback cannot consume
//! another visitor's state.

use base64::Engine;
use constant_time_eq::constant_time_eq;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{AuthError, AuthResult};
use crate::types::PendingAuthorization;

/// Default lifetime of a pending authorization.
pub const DEFAULT_STATE_MAX_AGE: Duration = Duration::from_secs(600);

/// State manager interface (for dependency injection).
pub trait StateManager: Send + Sync {
    /// Remember a pending authorization for a session, replacing any earlier one.
    fn store(&self, session_id: &str, pending: PendingAuthorization);

    /// Remove and return the session's pending authorization, if still valid.
    fn consume(&self, session_id: &str) -> Option<PendingAuthorization>;

    /// Check if the session has a valid pending authorization.
    fn exists(&self, session_id: &str) -> bool;

    /// Clear expired entries.
    fn clear_expired(&self);
}

/// Generate a fresh opaque state value (32 random bytes, base64url).
pub fn generate_state() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// In-memory state manager implementation.
pub struct InMemoryStateManager {
    pending: Mutex<HashMap<String, PendingAuthorization>>,
    max_age: Duration,
}

impl InMemoryStateManager {
    /// Create new state manager with default TTL (10 minutes).
    pub fn new() -> Self {
        Self::with_max_age(DEFAULT_STATE_MAX_AGE)
    }

    /// Create state manager with custom TTL.
    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            max_age,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, PendingAuthorization>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryStateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StateManager for InMemoryStateManager {
    /// Abandoned attempts of other sessions are pruned here.
    fn store(&self, session_id: &str, pending: PendingAuthorization) {
        let max_age = self.max_age;
        let mut entries = self.lock();
        entries.retain(|_, existing| !existing.is_expired(max_age));
        entries.insert(session_id.to_string(), pending);
    }

    fn consume(&self, session_id: &str) -> Option<PendingAuthorization> {
        let pending = self.lock().remove(session_id)?;
        if pending.is_expired(self.max_age) {
            debug!("pending authorization expired");
            return None;
        }
        Some(pending)
    }

    fn exists(&self, session_id: &str) -> bool {
        self.lock()
            .get(session_id)
            .map(|pending| !pending.is_expired(self.max_age))
            .unwrap_or(false)
    }

    fn clear_expired(&self) {
        let max_age = self.max_age;
        self.lock().retain(|_, pending| !pending.is_expired(max_age));
    }
}

/// Consume the session's pending authorization and check `received` against it.
///
/// Fails closed: no pending entry, an expired entry, a missing or different
/// `state` all reject the callback. The entry is discarded either way.
pub fn validate_state(
    state_manager: &dyn StateManager,
    session_id: &str,
    received: Option<&str>,
) -> AuthResult<PendingAuthorization> {
    let pending = state_manager
        .consume(session_id)
        .ok_or(AuthError::MissingState)?;

    let received = received.ok_or(AuthError::MissingState)?;
    if !constant_time_eq(pending.state.as_bytes(), received.as_bytes()) {
        warn!("state parameter mismatch on callback");
        return Err(AuthError::StateMismatch);
    }

    Ok(pending)
}
