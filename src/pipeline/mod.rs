//! Cyclic style-transfer pipeline.

mod cycle;
mod generator;

pub use cycle::{Config, Pipeline};
pub use generator::{GeneratorHandle, InferenceEngine, OnnxGenerator};
