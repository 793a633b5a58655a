use crate::disabled::DisabledStages;
use lanec_core::Stage;
use tracing::debug;

/// Order-preserving stage collector. The builder hands named stages to a
/// sink and never inspects stage internals.
pub trait StageSink {
    fn append(&mut self, stage: Stage);
}

/// Plain in-memory sink used while assembling one phase.
#[derive(Debug, Default)]
pub struct PhaseBuffer {
    stages: Vec<Stage>,
}

impl PhaseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn into_stages(self) -> Vec<Stage> {
        self.stages
    }
}

impl StageSink for PhaseBuffer {
    fn append(&mut self, stage: Stage) {
        self.stages.push(stage);
    }
}

/// Sink wrapper interposed on every delegation to the generic baseline
/// pipeline: stages in the target's disabled set are dropped instead of
/// forwarded. Built once at construction; nothing can re-enable a dropped
/// stage later.
pub struct FilteredSink<'a> {
    inner: &'a mut dyn StageSink,
    disabled: &'a DisabledStages,
}

impl<'a> FilteredSink<'a> {
    pub fn new(inner: &'a mut dyn StageSink, disabled: &'a DisabledStages) -> Self {
        Self { inner, disabled }
    }
}

impl StageSink for FilteredSink<'_> {
    fn append(&mut self, stage: Stage) {
        if self.disabled.contains(stage) {
            debug!("dropping disabled baseline stage {stage}");
            return;
        }
        self.inner.append(stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filtered_sink_drops_disabled_stages() {
        let disabled = DisabledStages::for_target();
        let mut buffer = PhaseBuffer::new();
        {
            let mut filtered = FilteredSink::new(&mut buffer, &disabled);
            filtered.append(Stage::LoopStrengthReduce);
            filtered.append(Stage::GcShadowStackLowering);
            filtered.append(Stage::UnreachableBlockElim);
        }
        assert_eq!(
            buffer.stages(),
            &[Stage::LoopStrengthReduce, Stage::UnreachableBlockElim]
        );
    }
}
