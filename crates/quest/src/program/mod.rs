//! The sequential program contract.
//!
//! A program is ordinary blocking code: it prints lines and reads answers
//! through a [`Console`] handed to it, and returns when it is done. I/O is
//! always injected, so any number of sessions can run side by side without
//! sharing an output or input slot.

mod subquest;
mod uid;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::bridge::ChannelError;

pub use subquest::SubquestProgram;
pub use uid::make_uid;

/// Static inputs a program is started with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestParams {
    pub team: String,
    pub players: String,
    pub uid: String,
}

impl QuestParams {
    pub fn new(team: impl Into<String>, players: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            players: players.into(),
            uid: uid.into(),
        }
    }
}

/// Errors a program can fail with.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// The player stopped answering.
    #[error("no answer received for {0:?}")]
    InputTimedOut(Duration),

    /// Writing the score log failed.
    #[error("failed to record score: {0}")]
    ScoreLog(#[from] std::io::Error),

    /// Any other fault in the program logic.
    #[error("{0}")]
    Fault(String),
}

impl ProgramError {
    pub fn fault(msg: impl Into<String>) -> Self {
        Self::Fault(msg.into())
    }
}

impl From<ChannelError> for ProgramError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::IdleTimeout(timeout) => ProgramError::InputTimedOut(timeout),
        }
    }
}

/// Line-oriented I/O available to a running program.
pub trait Console {
    /// Emit one line of output. Never blocks.
    fn print(&mut self, line: &str);

    /// Show `prompt` (when non-empty) and block until an answer arrives.
    fn read(&mut self, prompt: &str) -> Result<String, ProgramError>;
}

/// A blocking, sequential program driven through a [`Console`].
pub trait Program: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Run to completion. Returning `Err` marks the session as faulted.
    fn run(&self, params: &QuestParams, console: &mut dyn Console) -> Result<(), ProgramError>;
}

/// Adapter that turns a closure into a [`Program`].
pub struct FnProgram<F> {
    name: String,
    body: F,
}

impl<F> Program for FnProgram<F>
where
    F: Fn(&QuestParams, &mut dyn Console) -> Result<(), ProgramError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, params: &QuestParams, console: &mut dyn Console) -> Result<(), ProgramError> {
        (self.body)(params, console)
    }
}

/// Wrap a closure as a shareable program.
pub fn from_fn<F>(name: impl Into<String>, body: F) -> Arc<dyn Program>
where
    F: Fn(&QuestParams, &mut dyn Console) -> Result<(), ProgramError> + Send + Sync + 'static,
{
    Arc::new(FnProgram {
        name: name.into(),
        body,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted console for driving programs without a channel.

    use std::collections::VecDeque;

    use super::{Console, ProgramError};

    #[derive(Debug, Default)]
    pub struct ScriptedConsole {
        answers: VecDeque<String>,
        pub transcript: Vec<String>,
    }

    impl ScriptedConsole {
        pub fn new<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                answers: answers.into_iter().map(Into::into).collect(),
                transcript: Vec::new(),
            }
        }

        pub fn output(&self) -> String {
            self.transcript.join("\n")
        }
    }

    impl Console for ScriptedConsole {
        fn print(&mut self, line: &str) {
            self.transcript.push(line.to_string());
        }

        fn read(&mut self, prompt: &str) -> Result<String, ProgramError> {
            if !prompt.is_empty() {
                self.print(prompt);
            }
            self.answers
                .pop_front()
                .ok_or_else(|| ProgramError::fault("script ran out of answers"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testing::ScriptedConsole;

    #[test]
    fn test_from_fn_runs_closure() {
        let program = from_fn("echo", |params, console| {
            let line = console.read("Say something: ")?;
            console.print(&format!("{} says {}", params.team, line));
            Ok(())
        });

        let mut console = ScriptedConsole::new(["hi"]);
        program
            .run(&QuestParams::new("Owls", "Ada", "OWLS-A-000000"), &mut console)
            .unwrap();
        assert_eq!(program.name(), "echo");
        assert_eq!(console.output(), "Say something: \nOwls says hi");
    }

    #[test]
    fn test_idle_timeout_maps_to_input_timed_out() {
        let err: ProgramError = ChannelError::IdleTimeout(Duration::from_secs(90)).into();
        assert!(matches!(err, ProgramError::InputTimedOut(_)));
        assert_eq!(err.to_string(), "no answer received for 90s");

        let err: ProgramError = ChannelError::IdleTimeout(Duration::from_millis(250)).into();
        assert_eq!(err.to_string(), "no answer received for 250ms");
    }
}
