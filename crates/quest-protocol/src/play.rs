//! Request and response bodies for the play loop.

use serde::{Deserialize, Serialize};

/// Message returned when an answer arrives for a session with no runner.
pub const NO_GAME_MESSAGE: &str = "No game in progress. Click Start first.";

/// Message returned for an action the backend does not understand.
pub const UNKNOWN_ACTION_MESSAGE: &str = "Unknown action";

/// Action requested by a poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayAction {
    /// Start a new game, or rejoin the one already running.
    Start,
    /// Submit one answer line to the running game.
    Answer,
    /// Anything else. Kept so malformed actions get a normal response.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Body of `POST /play`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayRequest {
    #[serde(default)]
    pub action: PlayAction,
    #[serde(default)]
    pub answer: String,
}

/// Output accumulated since the last poll, plus whether the game is over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayResponse {
    pub output: String,
    pub finished: bool,
}

impl PlayResponse {
    pub fn new(output: impl Into<String>, finished: bool) -> Self {
        Self {
            output: output.into(),
            finished,
        }
    }

    /// Response for an answer that has no game to go to.
    pub fn no_game() -> Self {
        Self::new(NO_GAME_MESSAGE, true)
    }

    /// Response for an unrecognized action.
    pub fn unknown_action() -> Self {
        Self::new(UNKNOWN_ACTION_MESSAGE, false)
    }
}

/// Body of `POST /start_quest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartQuestRequest {
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub players: String,
}

/// Registration echoed back after `POST /start_quest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartQuestResponse {
    pub uid: String,
    pub team: String,
    pub players: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_action_deserializes() {
        let req: PlayRequest = serde_json::from_str(r#"{"action": "dance"}"#).unwrap();
        assert_eq!(req.action, PlayAction::Unknown);
        assert_eq!(req.answer, "");
    }

    #[test]
    fn test_missing_action_defaults_to_unknown() {
        let req: PlayRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.action, PlayAction::Unknown);
    }

    #[test]
    fn test_answer_request_parses() {
        let req: PlayRequest =
            serde_json::from_str(r#"{"action": "answer", "answer": "eetoain"}"#).unwrap();
        assert_eq!(req.action, PlayAction::Answer);
        assert_eq!(req.answer, "eetoain");
    }

    #[test]
    fn test_play_response_shape() {
        let json = serde_json::to_value(PlayResponse::no_game()).unwrap();
        assert_eq!(json["finished"], true);
        assert!(json["output"].as_str().unwrap().contains("No game in progress"));

        let json = serde_json::to_value(PlayResponse::unknown_action()).unwrap();
        assert_eq!(json["finished"], false);
        assert_eq!(json["output"], "Unknown action");
    }
}
