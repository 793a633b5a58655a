use lanec_core::Stage;
use std::collections::HashSet;

/// Stage kinds tied to execution-model features this target does not
/// support. The generic baseline offers them unconditionally; running them
/// here would be inert at best, so they are filtered out of every
/// delegation. The set is fixed at construction and no flag re-enables a
/// member.
const TARGET_DISABLED: [Stage; 3] = [
    // Exceptions are not supported.
    Stage::ExceptionLivenessTracking,
    Stage::ExceptionFuncletLayout,
    // Garbage collection is not supported.
    Stage::GcShadowStackLowering,
];

#[derive(Debug)]
pub struct DisabledStages {
    stages: HashSet<Stage>,
}

impl DisabledStages {
    pub fn for_target() -> Self {
        Self {
            stages: TARGET_DISABLED.into_iter().collect(),
        }
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn iter(&self) -> impl Iterator<Item = Stage> + '_ {
        self.stages.iter().copied()
    }
}
