//! Decision backends the console can drive a session with.
//!
//! Dispatch is a plain enum rather than a trait object so the async
//! `decide` stays statically dispatched.

use squad_core::{
    DecisionError, DecisionSource, MockDecisionSource, SessionConfig, SessionMode,
    StubDecisionSource,
};
use squad_types::{DecisionRequest, RawAction};

/// The decision source behind a console session.
#[derive(Debug)]
pub enum Backend {
    /// Every agent takes its safe default.
    Stub(StubDecisionSource),
    /// Random proposals, some of them malformed.
    Mock(MockDecisionSource),
}

impl Backend {
    /// Pick the backend the session mode calls for.
    pub fn for_config(config: &SessionConfig) -> Self {
        match config.session.mode {
            SessionMode::Production => Self::Stub(StubDecisionSource::new()),
            SessionMode::Mock => Self::Mock(MockDecisionSource::new(
                config.session.seed.wrapping_add(2),
            )),
        }
    }

    /// Short name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Stub(_) => "stub",
            Self::Mock(_) => "mock",
        }
    }
}

impl DecisionSource for Backend {
    async fn decide(&mut self, request: &DecisionRequest) -> Result<RawAction, DecisionError> {
        match self {
            Self::Stub(source) => source.decide(request).await,
            Self::Mock(source) => source.decide(request).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use squad_core::TurnSequencer;

    use super::*;

    #[test]
    fn production_sessions_use_the_stub() {
        let backend = Backend::for_config(&SessionConfig::default());
        assert_eq!(backend.name(), "stub");
    }

    #[test]
    fn mock_sessions_use_the_mock() {
        let mut config = SessionConfig::default();
        config.session.mode = SessionMode::Mock;
        assert_eq!(Backend::for_config(&config).name(), "mock");
    }

    #[tokio::test]
    async fn a_stub_round_needs_no_fallbacks() {
        let config = SessionConfig::default();
        let mut backend = Backend::for_config(&config);
        let mut sequencer = TurnSequencer::new(&config);
        let summary = sequencer.run_round(&mut backend, None).await.unwrap();
        assert_eq!(summary.turns.len(), 5);
        assert_eq!(summary.fallbacks(), 0);
    }
}
