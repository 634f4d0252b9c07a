//! In-memory monitoring sessions: raw interaction events plus the analyses run for them.
//!
//! Sessions live for the lifetime of the process. Nothing evicts them and event
//! lists are uncapped; a TTL sweep would be the place to add either limit.

use crate::error::SessionError;
use crate::stress::ClassificationResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub start_time: String,
    /// Client events, stored verbatim
    pub events: Vec<Value>,
    pub analyses: Vec<ClassificationResult>,
}

impl Session {
    fn new(id: String) -> Self {
        Self {
            id,
            start_time: Utc::now().to_rfc3339(),
            events: Vec::new(),
            analyses: Vec::new(),
        }
    }
}

/// Timestamp-derived id (`<seconds>.<microseconds>`). Two starts within the
/// same microsecond collide.
pub fn generate_session_id() -> String {
    let now = Utc::now();
    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start (or restart) a session. An existing session with the same id is replaced.
    pub fn start(&self, id: Option<String>) -> String {
        let id = id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(generate_session_id);
        let replaced = self.lock().insert(id.clone(), Session::new(id.clone())).is_some();
        tracing::debug!(session_id = %id, replaced, "session started");
        id
    }

    /// Append events; returns `(recorded, total)` event counts.
    pub fn record_events(&self, id: &str, events: Vec<Value>) -> Result<(usize, usize), SessionError> {
        let mut sessions = self.lock();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        let recorded = events.len();
        session.events.extend(events);
        Ok((recorded, session.events.len()))
    }

    pub fn get(&self, id: &str) -> Result<Session, SessionError> {
        self.lock()
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    /// Attach an analysis to a session. Unknown or absent ids are ignored.
    pub fn append_analysis(&self, id: Option<&str>, result: &ClassificationResult) {
        let Some(id) = id else { return };
        if let Some(session) = self.lock().get_mut(id) {
            session.analyses.push(result.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
