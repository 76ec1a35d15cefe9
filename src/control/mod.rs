use na::DVector;

use crate::{error::ControlError, types::Float};

pub mod episode;
pub mod osc;

pub use episode::{EpisodeReport, EpisodeState};
pub use osc::Osc;

pub trait Controller {
    /// Compute the command for the current engine state and write it to the
    /// engine's control vector. Does not step the engine.
    fn control(&mut self) -> Result<DVector<Float>, ControlError>;
}
