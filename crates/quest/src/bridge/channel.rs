//! Thread-safe mailbox between a blocking program and a polling caller.
//!
//! Exactly two parties touch a channel: the program thread (`write`,
//! `read_input`) and whichever request handler is serving the session
//! (`submit`, `drain_output`, `wait_output`). One mutex guards all state and
//! one condition variable carries every wakeup; waiters always re-check their
//! predicate after waking, so a notify can never be lost between the check
//! and the wait.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Quiet period after the last write before a still-busy program's output
/// is handed out.
const OUTPUT_SETTLE: Duration = Duration::from_millis(30);

/// Errors surfaced to the program by the blocking read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// No input arrived within the configured idle bound.
    #[error("no input received for {0:?}")]
    IdleTimeout(Duration),
}

#[derive(Debug, Default)]
struct ChannelState {
    output: Vec<String>,
    input: VecDeque<String>,
    waiting_readers: usize,
    last_write: Option<Instant>,
    closed: bool,
}

impl ChannelState {
    /// True once the program cannot print again without new input.
    fn is_quiescent(&self) -> bool {
        self.closed || (self.waiting_readers > 0 && self.input.is_empty())
    }
}

/// Output taken from the channel by [`InteractionChannel::wait_output`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drained {
    pub lines: Vec<String>,
    /// The program side has exited; nothing more will be written.
    pub closed: bool,
}

impl Drained {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Append-only output log paired with a FIFO input queue.
#[derive(Debug)]
pub struct InteractionChannel {
    state: Mutex<ChannelState>,
    changed: Condvar,
    idle_timeout: Option<Duration>,
}

impl Default for InteractionChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionChannel {
    /// Channel whose reads block until input arrives, however long that takes.
    pub fn new() -> Self {
        Self::with_idle_timeout(None)
    }

    /// Channel whose reads give up after `idle_timeout` without input.
    pub fn with_idle_timeout(idle_timeout: Option<Duration>) -> Self {
        Self {
            state: Mutex::new(ChannelState::default()),
            changed: Condvar::new(),
            idle_timeout,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChannelState> {
        // A panicking program thread must not wedge the session.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append one line to the output log. Never blocks.
    pub fn write(&self, text: impl Into<String>) {
        let mut state = self.lock();
        state.output.push(text.into());
        state.last_write = Some(Instant::now());
        drop(state);
        self.changed.notify_all();
    }

    /// Pop the oldest queued input, blocking until one is available.
    pub fn read_input(&self) -> Result<String, ChannelError> {
        let deadline = self.idle_timeout.map(|timeout| Instant::now() + timeout);
        let mut state = self.lock();
        state.waiting_readers += 1;
        // Pollers waiting for the program to go quiet need to see this.
        self.changed.notify_all();

        let result = loop {
            if let Some(line) = state.input.pop_front() {
                break Ok(line);
            }
            match (deadline, self.idle_timeout) {
                (Some(deadline), Some(timeout)) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break Err(ChannelError::IdleTimeout(timeout));
                    }
                    let (guard, _) = self
                        .changed
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(|e| e.into_inner());
                    state = guard;
                }
                _ => {
                    state = self.changed.wait(state).unwrap_or_else(|e| e.into_inner());
                }
            }
        };

        state.waiting_readers -= 1;
        result
    }

    /// Queue one input line for the program. Never blocks.
    ///
    /// Returns `false` when the program has already exited and the line was
    /// dropped.
    pub fn submit(&self, text: impl Into<String>) -> bool {
        let mut state = self.lock();
        if state.closed {
            return false;
        }
        state.input.push_back(text.into());
        drop(state);
        self.changed.notify_all();
        true
    }

    /// Take every pending output line, in the order written.
    pub fn drain_lines(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().output)
    }

    /// Take every pending output line joined with newlines.
    pub fn drain_output(&self) -> String {
        self.drain_lines().join("\n")
    }

    /// Wait up to `max_wait` for output, then drain it.
    ///
    /// Returns as soon as the program exits. Once there is output, returns
    /// when the program goes quiet (blocked on input) or has written nothing
    /// for a short settle period, so a program still computing does not hold
    /// the poll. On timeout whatever has accumulated is returned, possibly nothing.
    pub fn wait_output(&self, max_wait: Duration) -> Drained {
        let deadline = Instant::now() + max_wait;
        let mut state = self.lock();

        loop {
            if state.closed {
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let wake_at = if state.output.is_empty() {
                deadline
            } else {
                if state.is_quiescent() {
                    break;
                }
                let settled_at = state.last_write.map_or(now, |at| at + OUTPUT_SETTLE);
                if now >= settled_at {
                    break;
                }
                settled_at.min(deadline)
            };
            let (guard, _) = self
                .changed
                .wait_timeout(state, wake_at - now)
                .unwrap_or_else(|e| e.into_inner());
            state = guard;
        }

        Drained {
            lines: std::mem::take(&mut state.output),
            closed: state.closed,
        }
    }

    /// Mark the program side as exited and wake every waiter.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        drop(state);
        self.changed.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// True while the program is parked in `read_input` with nothing queued.
    pub fn is_awaiting_input(&self) -> bool {
        let state = self.lock();
        state.waiting_readers > 0 && state.input.is_empty()
    }
}
