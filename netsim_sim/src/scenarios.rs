//! Named simulation scenarios.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Default cadence and 1-in-5 failure odds
    Baseline,

    /// Failures disabled; every route must be found
    Stable,

    /// A router fails on every route cycle
    Outage,

    /// Paused for the middle third of the run
    PauseResume,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Baseline,
            ScenarioId::Stable,
            ScenarioId::Outage,
            ScenarioId::PauseResume,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Baseline => "baseline",
            ScenarioId::Stable => "stable",
            ScenarioId::Outage => "outage",
            ScenarioId::PauseResume => "pause_resume",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Baseline => "Rebuild every 3s, route every 2s, 1-in-5 router failure",
            ScenarioId::Stable => "No failures; every client pair must stay reachable",
            ScenarioId::Outage => "A router fails on every route cycle",
            ScenarioId::PauseResume => "Pause for the middle third; cadence resumes on unpause",
        }
    }

    /// Failure die override, if the scenario has one.
    pub fn failure_odds(&self) -> Option<u32> {
        match self {
            ScenarioId::Stable => Some(0),
            ScenarioId::Outage => Some(1),
            ScenarioId::Baseline | ScenarioId::PauseResume => None,
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baseline" | "default" => Ok(ScenarioId::Baseline),
            "stable" => Ok(ScenarioId::Stable),
            "outage" => Ok(ScenarioId::Outage),
            "pause_resume" | "pauseresume" | "pause" => Ok(ScenarioId::PauseResume),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
