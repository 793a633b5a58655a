// lanec-backend: pass-pipeline composition for the lane-parallel target
//
// Architecture:
// - sink: the append-only collaborator contract stages are handed to
// - generic: the injected target-independent baseline pipeline
// - disabled: stage kinds this target never runs
// - constraints: declared ordering/exclusion rules, verified after assembly
// - builder: the five phase sequencers and the session builder

pub mod builder;
pub mod constraints;
pub mod disabled;
pub mod generic;
pub mod pipeline;
pub mod sink;

pub use builder::PassPipelineBuilder;
pub use disabled::DisabledStages;
pub use generic::{BaselineCodeGen, GenericCodeGen};
pub use pipeline::Pipeline;
pub use sink::{PhaseBuffer, StageSink};
