//! Session id to runner mapping, with eviction of finished sessions.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use log::{debug, info};

use crate::program::{Program, QuestParams};

use super::SessionRunner;

/// Registry of live runners, keyed by opaque session id.
///
/// At most one runner per id is running at any time. Finished runners stay
/// registered so late polls still see their final state, until a sweep
/// drops them.
pub struct SessionRegistry {
    runners: DashMap<String, Arc<SessionRunner>>,
    program: Arc<dyn Program>,
    idle_timeout: Option<Duration>,
}

impl SessionRegistry {
    pub fn new(program: Arc<dyn Program>, idle_timeout: Option<Duration>) -> Self {
        Self {
            runners: DashMap::new(),
            program,
            idle_timeout,
        }
    }

    /// Return the running runner for `session_id`, or start a new one.
    ///
    /// A finished runner is replaced. The flag is `true` when a new runner
    /// was started.
    pub fn get_or_create(
        &self,
        session_id: &str,
        params: QuestParams,
    ) -> (Arc<SessionRunner>, bool) {
        match self.runners.entry(session_id.to_string()) {
            Entry::Occupied(entry) if !entry.get().is_finished() => {
                debug!("Rejoining running session {}", session_id);
                (entry.get().clone(), false)
            }
            Entry::Occupied(mut entry) => {
                debug!("Replacing finished session {}", session_id);
                let runner = self.spawn(session_id, params);
                entry.insert(runner.clone());
                (runner, true)
            }
            Entry::Vacant(entry) => {
                let runner = self.spawn(session_id, params);
                entry.insert(runner.clone());
                (runner, true)
            }
        }
    }

    fn spawn(&self, session_id: &str, params: QuestParams) -> Arc<SessionRunner> {
        SessionRunner::spawn(session_id, params, self.program.clone(), self.idle_timeout)
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<SessionRunner>> {
        self.runners.get(session_id).map(|entry| entry.value().clone())
    }

    /// Drop runners that finished at least `max_age` ago. Returns how many.
    pub fn sweep(&self, max_age: Duration) -> usize {
        self.sweep_at(Utc::now(), max_age)
    }

    /// [`sweep`](Self::sweep) against an explicit clock reading.
    pub fn sweep_at(&self, now: DateTime<Utc>, max_age: Duration) -> usize {
        let mut removed = 0;
        self.runners.retain(|session_id, runner| {
            if runner.is_expired(now, max_age) {
                info!("Evicting finished session {}: {:?}", session_id, runner.info());
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    /// Number of registered runners whose program is still running.
    pub fn running_count(&self) -> usize {
        self.runners
            .iter()
            .filter(|entry| !entry.value().is_finished())
            .count()
    }
}
