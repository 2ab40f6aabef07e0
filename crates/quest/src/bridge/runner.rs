//! One session's program thread and its running/finished state.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use quest_protocol::PlayResponse;

use crate::program::{Program, QuestParams};

use super::{ChannelConsole, InteractionChannel};

/// Lifecycle of a session. Only ever moves from `Running` to `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy)]
struct Lifecycle {
    state: RunState,
    finished_at: Option<DateTime<Utc>>,
}

/// Point-in-time view of a runner, logged on eviction.
#[derive(Debug, Clone)]
pub struct RunnerInfo {
    pub session_id: String,
    pub uid: String,
    pub program: String,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Owns the thread running one session's program.
///
/// The thread is detached: it holds its own reference to the runner and its
/// effects are only observed through the channel. A program parked on input
/// stays parked until input arrives, the idle bound fires, or the process
/// exits.
pub struct SessionRunner {
    session_id: String,
    params: QuestParams,
    program_name: String,
    started_at: DateTime<Utc>,
    lifecycle: Mutex<Lifecycle>,
    channel: Arc<InteractionChannel>,
}

impl SessionRunner {
    /// Start `program` on its own thread with I/O bound to a fresh channel.
    pub fn spawn(
        session_id: impl Into<String>,
        params: QuestParams,
        program: Arc<dyn Program>,
        idle_timeout: Option<Duration>,
    ) -> Arc<Self> {
        let runner = Arc::new(Self {
            session_id: session_id.into(),
            params,
            program_name: program.name().to_string(),
            started_at: Utc::now(),
            lifecycle: Mutex::new(Lifecycle {
                state: RunState::Running,
                finished_at: None,
            }),
            channel: Arc::new(InteractionChannel::with_idle_timeout(idle_timeout)),
        });

        let worker = runner.clone();
        let spawned = thread::Builder::new()
            .name(format!("quest-{}", thread_tag(&runner.session_id)))
            .spawn(move || worker.execute(program));

        match spawned {
            Ok(_) => info!(
                "Started {} for session {} (uid {})",
                runner.program_name, runner.session_id, runner.params.uid
            ),
            Err(e) => {
                error!(
                    "Failed to spawn program thread for session {}: {:?}",
                    runner.session_id, e
                );
                runner.channel.write(format!("Could not start the game: {e}"));
                runner.finish();
            }
        }

        runner
    }

    fn execute(&self, program: Arc<dyn Program>) {
        let mut console = ChannelConsole::new(self.channel.clone());
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            program.run(&self.params, &mut console)
        }));

        match outcome {
            Ok(Ok(())) => info!("Session {} completed", self.session_id),
            Ok(Err(err)) => {
                warn!("Session {} stopped with error: {}", self.session_id, err);
                self.channel.write(format!("Game stopped: {err}"));
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Program panicked in session {}: {}", self.session_id, message);
                self.channel.write(format!("Game stopped: {message}"));
            }
        }

        self.finish();
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn finish(&self) {
        let mut lifecycle = self.lifecycle();
        if lifecycle.state == RunState::Running {
            lifecycle.state = RunState::Finished;
            lifecycle.finished_at = Some(Utc::now());
        }
        drop(lifecycle);
        // Close after the state flips so a closed channel always implies Finished.
        self.channel.close();
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn state(&self) -> RunState {
        self.lifecycle().state
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.lifecycle().finished_at
    }

    pub fn is_finished(&self) -> bool {
        self.state() == RunState::Finished
    }

    /// Queue one answer for the program. Harmless once the program has exited.
    pub fn submit_input(&self, text: &str) {
        if !self.channel.submit(text) {
            debug!(
                "Dropped input for finished session {}",
                self.session_id
            );
        }
    }

    /// Wait up to `max_wait` for new output and report whether the game is over.
    pub fn collect_output(&self, max_wait: Duration) -> PlayResponse {
        let drained = self.channel.wait_output(max_wait);
        // `closed` was read under the same lock as the drain, so no output
        // can slip in behind a `finished = true`.
        PlayResponse::new(drained.text(), drained.closed)
    }

    /// True once finished for at least `retention` as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        let Some(finished_at) = self.finished_at() else {
            return false;
        };
        (now - finished_at)
            .to_std()
            .map(|age| age >= retention)
            .unwrap_or(false)
    }

    pub fn info(&self) -> RunnerInfo {
        let lifecycle = *self.lifecycle();
        RunnerInfo {
            session_id: self.session_id.clone(),
            uid: self.params.uid.clone(),
            program: self.program_name.clone(),
            state: lifecycle.state,
            started_at: self.started_at,
            finished_at: lifecycle.finished_at,
        }
    }
}

fn thread_tag(session_id: &str) -> String {
    session_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(8)
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "program panicked".to_string()
    }
}
