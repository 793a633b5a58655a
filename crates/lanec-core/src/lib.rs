pub mod config;
pub mod error;
pub mod stage;

pub use config::{AtomicScanStrategy, Flag, OptLevel, PipelineConfig, StructurizerMode};
pub use error::{Error, Result};
pub use stage::{Phase, Stage};
