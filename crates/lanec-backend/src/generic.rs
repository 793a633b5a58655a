use crate::sink::StageSink;
use lanec_core::Stage;

/// The injected target-independent baseline pipeline.
///
/// The builder invokes it explicitly where the phase order calls for the
/// generic contribution, always through a disabled-stage filter, and
/// consults it as the registry of stages and analyses the execution engine
/// can actually instantiate for this session.
pub trait GenericCodeGen {
    /// Contribute the generic IR-level stages.
    fn ir_passes(&self, sink: &mut dyn StageSink);

    /// Contribute the generic code-generation-preparation stages.
    fn codegen_prepare(&self, sink: &mut dyn StageSink);

    /// Whether `stage` (or the analysis it materializes) can be registered.
    fn has_stage(&self, stage: Stage) -> bool {
        let _ = stage;
        true
    }
}

/// Default baseline contribution. Includes the exception and GC stages a
/// generic pipeline offers unconditionally; the target's disabled-stage
/// filter removes them on the way through.
#[derive(Debug, Default)]
pub struct BaselineCodeGen;

impl GenericCodeGen for BaselineCodeGen {
    fn ir_passes(&self, sink: &mut dyn StageSink) {
        sink.append(Stage::LoopStrengthReduce);
        sink.append(Stage::ExpandMemCmp);
        sink.append(Stage::GcShadowStackLowering);
        sink.append(Stage::LowerInvoke);
        sink.append(Stage::UnreachableBlockElim);
    }

    fn codegen_prepare(&self, sink: &mut dyn StageSink) {
        sink.append(Stage::ExceptionLivenessTracking);
        sink.append(Stage::ExceptionFuncletLayout);
        sink.append(Stage::CodeGenPrepare);
        sink.append(Stage::ConstantHoisting);
    }
}
