//! Start/answer operations for the driving layer.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use quest_protocol::PlayResponse;

use crate::program::{Program, QuestParams};

use super::{SessionRegistry, SessionRunner};

/// Default wait for the first output of a freshly started game.
const DEFAULT_START_WAIT: Duration = Duration::from_millis(2000);

/// Default wait when a start request rejoins a running game.
const DEFAULT_REJOIN_WAIT: Duration = Duration::from_millis(500);

/// Default wait for the reaction to an answer.
const DEFAULT_ANSWER_WAIT: Duration = Duration::from_millis(2000);

/// Default time a finished session stays registered.
const DEFAULT_RETENTION: Duration = Duration::from_secs(300);

/// Bridge service configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Output wait after starting a new runner.
    pub start_wait: Duration,
    /// Output wait after rejoining a running runner.
    pub rejoin_wait: Duration,
    /// Output wait after submitting an answer.
    pub answer_wait: Duration,
    /// How long finished sessions are kept before eviction.
    pub retention: Duration,
    /// Fail a program that waits this long for input. `None` waits forever.
    pub input_idle_timeout: Option<Duration>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            start_wait: DEFAULT_START_WAIT,
            rejoin_wait: DEFAULT_REJOIN_WAIT,
            answer_wait: DEFAULT_ANSWER_WAIT,
            retention: DEFAULT_RETENTION,
            input_idle_timeout: None,
        }
    }
}

/// Service for driving sessions through poll cycles.
///
/// Every call blocks for at most the configured wait; async callers should
/// run it on a blocking thread.
pub struct BridgeService {
    registry: SessionRegistry,
    config: BridgeConfig,
}

impl BridgeService {
    pub fn new(program: Arc<dyn Program>, config: BridgeConfig) -> Self {
        Self {
            registry: SessionRegistry::new(program, config.input_idle_timeout),
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn runner(&self, session_id: &str) -> Option<Arc<SessionRunner>> {
        self.registry.get(session_id)
    }

    /// Start a game for `session_id`, or rejoin the one already running.
    pub fn start(&self, session_id: &str, params: QuestParams) -> PlayResponse {
        self.sweep();
        let (runner, created) = self.registry.get_or_create(session_id, params);
        let wait = if created {
            self.config.start_wait
        } else {
            self.config.rejoin_wait
        };
        runner.collect_output(wait)
    }

    /// Forward one answer and collect the program's reaction.
    pub fn answer(&self, session_id: &str, text: &str) -> PlayResponse {
        self.sweep();
        let Some(runner) = self.registry.get(session_id) else {
            debug!("Answer for unknown session {}", session_id);
            return PlayResponse::no_game();
        };
        runner.submit_input(text);
        runner.collect_output(self.config.answer_wait)
    }

    fn sweep(&self) {
        let removed = self.registry.sweep(self.config.retention);
        if removed > 0 {
            debug!(
                "Swept {} finished session(s), {} remaining",
                removed,
                self.registry.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::from_fn;

    fn params() -> QuestParams {
        QuestParams::new("owls", "ada", "OWLS-A-000000")
    }

    fn service(retention: Duration) -> BridgeService {
        let program = from_fn("greeter", |params, console| {
            console.print(&format!("Hello {}", params.team));
            let answer = console.read("Your answer: ")?;
            console.print(&format!("You said {answer}"));
            Ok(())
        });
        BridgeService::new(
            program,
            BridgeConfig {
                start_wait: Duration::from_secs(5),
                rejoin_wait: Duration::from_millis(50),
                answer_wait: Duration::from_secs(5),
                retention,
                input_idle_timeout: None,
            },
        )
    }

    #[test]
    fn test_answer_without_game() {
        let service = service(Duration::from_secs(300));
        let response = service.answer("Sx", "hello");
        assert!(response.finished);
        assert!(response.output.contains("No game in progress"));
    }

    #[test]
    fn test_start_then_answer() {
        let service = service(Duration::from_secs(300));

        let response = service.start("S1", params());
        assert_eq!(response, PlayResponse::new("Hello owls\nYour answer: ", false));

        let response = service.answer("S1", "blue");
        assert_eq!(response, PlayResponse::new("You said blue", true));
    }

    #[test]
    fn test_second_start_rejoins() {
        let service = service(Duration::from_secs(300));

        service.start("S1", params());
        let rejoin = service.start("S1", params());
        assert_eq!(rejoin, PlayResponse::new("", false));
        assert_eq!(service.registry().len(), 1);
    }

    #[test]
    fn test_finished_session_is_evicted_on_next_request() {
        let service = service(Duration::ZERO);

        service.start("S1", params());
        assert!(service.answer("S1", "blue").finished);

        let response = service.answer("S1", "again");
        assert_eq!(response, PlayResponse::no_game());
        assert!(service.runner("S1").is_none());
    }
}
