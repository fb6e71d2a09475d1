//! The per-connection state machine: `Idle -> Running -> Idle` (repeatable)
//! and `* -> Closed`. Transition functions return the next state or a typed
//! error rather than mutating stray booleans, per the session controller's
//! design notes.

use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Voice,
}

impl OutputMode {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(OutputMode::Text),
            "voice" => Some(OutputMode::Voice),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running {
        translation_id: i64,
        output_mode: OutputMode,
    },
    Closed,
}

impl SessionState {
    /// `IDLE -> RUNNING`. Quota and credit checks happen at the call site
    /// (they need the wallet and request counter, which this pure state
    /// value doesn't carry); this only enforces the state-machine shape.
    pub fn start(self, translation_id: i64, output_mode: OutputMode) -> Result<Self, SessionError> {
        match self {
            SessionState::Idle => Ok(SessionState::Running {
                translation_id,
                output_mode,
            }),
            // `start` while already RUNNING is idempotent-ignored per the
            // error taxonomy, not an error — callers check `is_running`
            // before calling `start` and skip the call entirely.
            SessionState::Running { .. } => Err(SessionError::StateTransition),
            SessionState::Closed => Err(SessionError::StateTransition),
        }
    }

    /// `RUNNING -> IDLE`.
    pub fn stop(self) -> Result<Self, SessionError> {
        match self {
            SessionState::Running { .. } => Ok(SessionState::Idle),
            SessionState::Idle => Err(SessionError::StateTransition),
            SessionState::Closed => Err(SessionError::StateTransition),
        }
    }

    /// `* -> CLOSED`, always allowed.
    #[must_use]
    pub fn close(self) -> Self {
        SessionState::Closed
    }

    #[must_use]
    pub fn is_running(self) -> bool {
        matches!(self, SessionState::Running { .. })
    }

    #[must_use]
    pub fn running_output_mode(self) -> Option<OutputMode> {
        match self {
            SessionState::Running { output_mode, .. } => Some(output_mode),
            _ => None,
        }
    }

    #[must_use]
    pub fn running_translation_id(self) -> Option<i64> {
        match self {
            SessionState::Running { translation_id, .. } => Some(translation_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_to_running_succeeds() {
        let next = SessionState::Idle.start(1, OutputMode::Text).unwrap();
        assert!(next.is_running());
    }

    #[test]
    fn start_while_running_is_rejected() {
        let running = SessionState::Running {
            translation_id: 1,
            output_mode: OutputMode::Text,
        };
        assert!(matches!(
            running.start(2, OutputMode::Text),
            Err(SessionError::StateTransition)
        ));
    }

    #[test]
    fn stop_while_idle_is_rejected() {
        assert!(matches!(
            SessionState::Idle.stop(),
            Err(SessionError::StateTransition)
        ));
    }

    #[test]
    fn running_to_idle_via_stop() {
        let running = SessionState::Running {
            translation_id: 1,
            output_mode: OutputMode::Voice,
        };
        assert_eq!(running.stop().unwrap(), SessionState::Idle);
    }

    #[test]
    fn close_is_always_allowed() {
        assert_eq!(SessionState::Idle.close(), SessionState::Closed);
        let running = SessionState::Running {
            translation_id: 1,
            output_mode: OutputMode::Text,
        };
        assert_eq!(running.close(), SessionState::Closed);
    }
}
