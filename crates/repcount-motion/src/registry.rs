//! Session registry.
//!
//! Maps session identifiers to their counters. Map operations are serialized
//! by one lock so two callers cannot race to create the counter for the same
//! new session; each counter then sits behind its own lock, so frames of
//! different sessions are analyzed in parallel while frames of one session
//! are analyzed one at a time.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use repcount_core::{Clock, CounterConfig, KeypointFrame, Result, SessionId, SystemClock};

use crate::counter::{CounterSnapshot, RepCounter};
use crate::exercise::ExerciseKind;
use crate::status::Status;

/// Counter shared between the registry and a caller
pub type SharedCounter = Arc<Mutex<RepCounter>>;

/// Counter plus the exercise it was built for, readable without its lock
#[derive(Debug, Clone)]
struct SessionEntry {
    exercise: ExerciseKind,
    counter: SharedCounter,
}

/// Session-id to counter mapping
#[derive(Debug)]
pub struct SessionRegistry {
    config: CounterConfig,
    clock: Arc<dyn Clock>,
    sessions: Mutex<HashMap<SessionId, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new(config: CounterConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Registry whose counters all read `clock`
    pub fn with_clock(config: CounterConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Counter for `session`, created if absent
    ///
    /// A session that switches exercise gets a fresh counter. Never locks a
    /// counter, so a caller may hold one while asking for it again.
    pub fn get_or_create(&self, session: &SessionId, exercise: ExerciseKind) -> Result<SharedCounter> {
        let mut sessions = self.sessions.lock();

        match sessions.get(session) {
            Some(entry) if entry.exercise == exercise => return Ok(Arc::clone(&entry.counter)),
            Some(_) => tracing::info!("Session {} switched to {}", session, exercise),
            None => tracing::info!("Session {} started: {}", session, exercise),
        }

        let counter = RepCounter::with_clock(exercise, self.config.clone(), Arc::clone(&self.clock))?;
        let counter = Arc::new(Mutex::new(counter));
        sessions.insert(
            session.clone(),
            SessionEntry {
                exercise,
                counter: Arc::clone(&counter),
            },
        );
        Ok(counter)
    }

    /// Analyze one frame for `session`
    pub fn analyze(
        &self,
        session: &SessionId,
        exercise: ExerciseKind,
        frame: Option<&KeypointFrame>,
    ) -> Result<(u32, Status)> {
        let counter = self.get_or_create(session, exercise)?;
        let mut counter = counter.lock();
        Ok(counter.analyze(frame))
    }

    /// Reset the counter of `session`; returns false if there is none
    pub fn reset(&self, session: &SessionId) -> bool {
        let counter = self.sessions.lock().get(session).map(|entry| Arc::clone(&entry.counter));
        match counter {
            Some(counter) => {
                counter.lock().reset();
                tracing::info!("Session {} reset", session);
                true
            }
            None => false,
        }
    }

    /// Discard the counter of `session`
    pub fn remove(&self, session: &SessionId) -> bool {
        let removed = self.sessions.lock().remove(session).is_some();
        if removed {
            tracing::info!("Session {} removed", session);
        }
        removed
    }

    pub fn snapshot(&self, session: &SessionId) -> Option<CounterSnapshot> {
        let counter = self.sessions.lock().get(session).map(|entry| Arc::clone(&entry.counter))?;
        let snapshot = counter.lock().snapshot();
        Some(snapshot)
    }

    pub fn sessions(&self) -> Vec<SessionId> {
        self.sessions.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }
}
