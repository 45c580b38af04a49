//! Pipeline entry points
//!
//! [`TrainPipeline`] is the offline batch path (run once to produce
//! artifacts); [`PredictPipeline`] is the online path (loads artifacts
//! per call).

mod predict;
mod train;

pub use predict::PredictPipeline;
pub use train::TrainPipeline;
