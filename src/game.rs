use serde::{Deserialize, Serialize};

/// Step of the linear session flow.
///
/// The serialized variant names (camelCase) are the stored-snapshot contract
/// and must not change without migrating existing session files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "title_case")]
pub enum Phase {
    Intro,
    Ready,
    Playing,
    RoundResult,
    FinalResult,
    Reflection,
}

/// One trial: the user's estimate of the target interval, with derived error.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    /// 1-based position in the session; equals recording order
    pub round: u32,
    /// target duration in milliseconds, constant across a session
    pub target_time: f64,
    /// user-reported elapsed duration in milliseconds
    pub measured_time: f64,
    /// signed error in milliseconds; negative means the user stopped early
    pub error: f64,
    pub error_percentage: f64,
}

impl RoundResult {
    pub fn new(round: u32, target_time: f64, measured_time: f64) -> Self {
        let error = measured_time - target_time;
        Self {
            round,
            target_time,
            measured_time,
            error,
            error_percentage: error / target_time * 100.0,
        }
    }
}

/// Free-text self-reflection, set once at submission.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionAnswers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_perception: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_impact: Option<String>,
}

impl ReflectionAnswers {
    pub fn is_complete(&self) -> bool {
        let filled = |a: &Option<String>| a.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.time_perception) && filled(&self.task_impact)
    }
}

/// Session configuration, immutable once a session has started.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub total_rounds: u32,
    /// target duration in milliseconds
    pub target_time: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_rounds: 5,
            target_time: 10_000.0,
        }
    }
}

impl GameConfig {
    pub fn target_secs(&self) -> f64 {
        self.target_time / 1000.0
    }
}

/// The session state machine: single owner of phase, round counter, results
/// and reflection answers. All mutation goes through the transition methods;
/// a transition invoked from an unexpected phase is silently ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Game {
    phase: Phase,
    current_round: u32,
    #[serde(flatten)]
    config: GameConfig,
    results: Vec<RoundResult>,
    reflection_answers: ReflectionAnswers,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self {
            phase: Phase::Intro,
            current_round: 0,
            config,
            results: Vec::new(),
            reflection_answers: ReflectionAnswers::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn results(&self) -> &[RoundResult] {
        &self.results
    }

    pub fn reflection_answers(&self) -> &ReflectionAnswers {
        &self.reflection_answers
    }

    pub fn is_last_round(&self) -> bool {
        self.current_round >= self.config.total_rounds
    }

    /// Intro -> Ready, round 1, prior data cleared.
    pub fn start_game(&mut self) {
        if self.phase != Phase::Intro {
            return;
        }
        self.phase = Phase::Ready;
        self.current_round = 1;
        self.results.clear();
        self.reflection_answers = ReflectionAnswers::default();
    }

    /// Ready -> Playing. Called by the owner of the round timer when it
    /// actually starts; the machine itself never runs a clock.
    pub fn begin_round(&mut self) {
        if self.phase == Phase::Ready {
            self.phase = Phase::Playing;
        }
    }

    /// Append the measurement for the current round and show it.
    ///
    /// Accepted while Playing (or Ready, where callers that own the timer
    /// themselves may never have entered Playing). Once the phase is
    /// RoundResult a repeat call for the same round is ignored.
    pub fn record_result(&mut self, measured_time: f64) {
        if !matches!(self.phase, Phase::Playing | Phase::Ready) {
            return;
        }
        self.results.push(RoundResult::new(
            self.current_round,
            self.config.target_time,
            measured_time,
        ));
        self.phase = Phase::RoundResult;
    }

    /// RoundResult -> Ready for the next round, or FinalResult after the last.
    pub fn next_round(&mut self) {
        if self.phase != Phase::RoundResult {
            return;
        }
        if self.current_round < self.config.total_rounds {
            self.current_round += 1;
            self.phase = Phase::Ready;
        } else {
            self.phase = Phase::FinalResult;
        }
    }

    /// FinalResult -> Reflection.
    pub fn start_reflection(&mut self) {
        if self.phase == Phase::FinalResult {
            self.phase = Phase::Reflection;
        }
    }

    /// Store both reflection answers. No phase change.
    pub fn save_reflection(&mut self, time_perception: String, task_impact: String) {
        if self.phase != Phase::Reflection {
            return;
        }
        self.reflection_answers = ReflectionAnswers {
            time_perception: Some(time_perception),
            task_impact: Some(task_impact),
        };
    }

    /// Return to the initial state from any phase. Idempotent. The session
    /// configuration survives; everything else is cleared.
    pub fn reset(&mut self) {
        self.phase = Phase::Intro;
        self.current_round = 0;
        self.results.clear();
        self.reflection_answers = ReflectionAnswers::default();
    }

    /// Undo the last phase transition.
    ///
    /// From RoundResult this is a destructive undo: the most recently
    /// recorded result is removed. From Ready with round > 1 the counter is
    /// decremented and the prior round's result is shown again; the result
    /// removed by an earlier RoundResult -> Ready step is NOT restored, so
    /// repeated back-and-forth can permanently lose a recording. That exact
    /// behavior is kept on purpose and covered by tests.
    pub fn go_back(&mut self) {
        match self.phase {
            Phase::Reflection => self.phase = Phase::FinalResult,
            Phase::FinalResult => self.phase = Phase::RoundResult,
            Phase::RoundResult => {
                self.results.pop();
                self.phase = Phase::Ready;
            }
            Phase::Ready if self.current_round > 1 => {
                self.current_round -= 1;
                self.phase = Phase::RoundResult;
            }
            Phase::Ready => {
                self.phase = Phase::Intro;
                self.current_round = 0;
                self.results.clear();
            }
            // Intro has no prior state; Playing is not on the back surface
            // (the view offers no "back" while a round is running).
            Phase::Intro | Phase::Playing => {}
        }
    }

    /// A restored snapshot may carry a Playing phase, but a round timer
    /// cannot be resurrected from disk; land in Ready instead.
    pub fn normalize_after_restore(&mut self) {
        if self.phase == Phase::Playing {
            self.phase = Phase::Ready;
        }
    }
}
