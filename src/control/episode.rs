use std::fmt;

use crate::{convergence::ConvergenceStatus, mass_model::InversionPath, types::Float};

/// Lifecycle of one control episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeState {
    Running,
    Converged,
    TimedOut,
}

impl fmt::Display for EpisodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EpisodeState::Running => "running",
            EpisodeState::Converged => "converged",
            EpisodeState::TimedOut => "timed out",
        };
        write!(f, "{}", name)
    }
}

/// Summary of a finished episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeReport {
    pub outcome: EpisodeState,
    /// Number of control ticks, each followed by one engine step.
    pub ticks: usize,
    /// Simulated time spent in the episode.
    pub elapsed: Float,
    pub position_error: Float,
    pub orientation_error: Float,
    /// Inversion path of the last tick, `None` if no tick ran.
    pub inversion_path: Option<InversionPath>,
}

impl EpisodeReport {
    pub(crate) fn new(
        outcome: EpisodeState,
        ticks: usize,
        elapsed: Float,
        status: &ConvergenceStatus,
        inversion_path: Option<InversionPath>,
    ) -> Self {
        EpisodeReport {
            outcome,
            ticks,
            elapsed,
            position_error: status.position_error,
            orientation_error: status.orientation_error,
            inversion_path,
        }
    }

    pub fn converged(&self) -> bool {
        self.outcome == EpisodeState::Converged
    }
}
