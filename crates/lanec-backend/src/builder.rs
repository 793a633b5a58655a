//! The per-session pipeline builder.
//!
//! Constructed once per compilation session from an immutable
//! [`PipelineConfig`] and an injected generic baseline, then asked for the
//! five phases in fixed macro-order: IR passes, code-generation
//! preparation, pre-instruction-selection normalization, instruction
//! selection, assembly emission. Construction is deterministic and either
//! completes fully or fails without producing a pipeline.

use crate::constraints;
use crate::disabled::DisabledStages;
use crate::generic::GenericCodeGen;
use crate::pipeline::Pipeline;
use crate::sink::{FilteredSink, PhaseBuffer, StageSink};
use lanec_core::error::{registration_error, Result};
use lanec_core::{AtomicScanStrategy, OptLevel, Phase, PipelineConfig, Stage, StructurizerMode};
use tracing::debug;

/// Select the CSE variant for the session: the exhaustive value-numbering
/// pass at Aggressive, the cheap single-pass otherwise. Both call sites in
/// the IR phase share this one decision.
fn cse_stage(opt: OptLevel) -> Stage {
    if opt == OptLevel::Aggressive {
        Stage::Gvn
    } else {
        Stage::EarlyCse
    }
}

pub struct PassPipelineBuilder<'a> {
    config: &'a PipelineConfig,
    generic: &'a dyn GenericCodeGen,
    disabled: DisabledStages,
}

impl<'a> PassPipelineBuilder<'a> {
    /// Validates the configuration before anything is appended; an
    /// inconsistent configuration fails here, atomically.
    pub fn new(config: &'a PipelineConfig, generic: &'a dyn GenericCodeGen) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            generic,
            disabled: DisabledStages::for_target(),
        })
    }

    pub fn disabled(&self) -> &DisabledStages {
        &self.disabled
    }

    /// Assemble all five phases and verify the declared ordering and
    /// exclusion rules over the result.
    pub fn build(&self) -> Result<Pipeline> {
        let phases: [(Phase, fn(&Self, &mut dyn StageSink) -> Result<()>); 5] = [
            (Phase::Ir, Self::build_ir_phase),
            (Phase::CodeGenPrepare, Self::build_codegen_prepare_phase),
            (Phase::PreInstructionSelection, Self::build_pre_isel_phase),
            (Phase::InstructionSelection, Self::build_isel_phase),
            (Phase::AsmEmission, Self::build_asm_emission_phase),
        ];

        let mut pipeline = Pipeline::default();
        for (phase, sequence) in phases {
            let mut buffer = PhaseBuffer::new();
            sequence(self, &mut buffer)?;
            pipeline.push_phase(phase, buffer.into_stages());
        }
        constraints::verify(&pipeline)?;
        Ok(pipeline)
    }

    pub fn build_ir_phase(&self, sink: &mut dyn StageSink) -> Result<()> {
        let cfg = self.config;

        // First: inlining below would obscure the call-site shapes this
        // pass pattern-matches.
        sink.append(Stage::RuntimeCallBinding);

        if cfg.resolve(&cfg.lower_ctor_dtor) {
            sink.append(Stage::CtorDtorLowering);
        }

        if cfg.resolve(&cfg.intrinsic_optimizer) {
            sink.append(Stage::IntrinsicOptimizer);
        }

        // Lowering mode: no variadic call survives this stage.
        sink.append(Stage::ExpandVariadics);

        // Target-specific inlining first, so its heuristics see un-inlined
        // bodies.
        sink.append(Stage::TargetAlwaysInline);
        sink.append(Stage::AlwaysInline);

        // Runs before PromoteAlloca so promotion can account for the
        // rewritten uses.
        if cfg.resolve(&cfg.lower_module_shared_mem) {
            sink.append(Stage::LowerModuleSharedMem);
        }

        if cfg.opt_level > OptLevel::None {
            sink.append(Stage::InferAddressSpaces);
        }

        // Run the atomic optimizer before expansion.
        if cfg.opt_level >= OptLevel::Less && cfg.atomic_scan != AtomicScanStrategy::None {
            sink.append(Stage::AtomicOptimizer);
        } else {
            debug!("atomic optimizer off (strategy {})", cfg.atomic_scan);
        }
        sink.append(Stage::AtomicExpand);

        if cfg.opt_level > OptLevel::None {
            sink.append(Stage::PromoteAlloca);
            if cfg.resolve(&cfg.scalar_ir_passes) {
                self.straight_line_scalar_passes(sink);
            }
            sink.append(Stage::TargetCodeGenPrepare);
        }

        self.delegate_ir_passes(sink);

        // The cheap pass is not always strong enough to clean up what the
        // generic loop transforms produce; at Aggressive the exhaustive
        // variant also catches commuted and flag-differing duplicates.
        if cfg.resolve(&cfg.scalar_ir_passes) {
            sink.append(cse_stage(cfg.opt_level));
        }

        Ok(())
    }

    fn straight_line_scalar_passes(&self, sink: &mut dyn StageSink) {
        let cfg = self.config;

        if cfg.resolve(&cfg.loop_prefetch) {
            sink.append(Stage::LoopDataPrefetch);
        }

        sink.append(Stage::SeparateConstOffset);

        // Offset separation exposes more strength-reduction candidates.
        sink.append(Stage::StraightLineStrengthReduce);

        // Both passes above create common expressions for the selected CSE
        // variant to reuse.
        sink.append(cse_stage(cfg.opt_level));

        sink.append(Stage::NaryReassociate);

        // Reassociation on addressing expressions leaves redundancy only a
        // cheap always-run pass need clean up.
        sink.append(Stage::EarlyCse);
    }

    pub fn build_codegen_prepare_phase(&self, sink: &mut dyn StageSink) -> Result<()> {
        let cfg = self.config;

        if cfg.resolve(&cfg.lower_kernel_arguments) {
            sink.append(Stage::LowerKernelArguments);
        }

        // Must not be deferred past the generic delegate: the downstream
        // whole-program resource-usage analysis needs the call graph to
        // still contain every function exactly as lowered up to this point.
        // It also precedes the vectorizer so memory passes observe the
        // lowered pointer form.
        sink.append(Stage::LowerBufferFatPointers);

        self.delegate_codegen_prepare(sink);

        if cfg.resolve(&cfg.load_store_vectorizer) {
            sink.append(Stage::LoadStoreVectorizer);
        }

        // Last in phase: may introduce unreachable blocks that the cleanup
        // scheduled next in the flow is relied upon to remove.
        sink.append(Stage::LowerSwitch);

        Ok(())
    }

    pub fn build_pre_isel_phase(&self, sink: &mut dyn StageSink) -> Result<()> {
        let cfg = self.config;
        let early_structurize = cfg.structurizer == StructurizerMode::EarlyDefault;

        if cfg.opt_level > OptLevel::None {
            sink.append(Stage::FlattenCfg);
            sink.append(Stage::Sink);
        }

        sink.append(Stage::LateCodeGenPrepare);

        // Merge divergent exit nodes: the structurizer cannot recognize the
        // multi-exit regions they form.
        sink.append(Stage::UnifyDivergentExitNodes);

        match cfg.structurizer {
            StructurizerMode::EarlyDefault => {
                if cfg.structurizer_workarounds {
                    sink.append(Stage::FixIrreducible);
                    sink.append(Stage::UnifyLoopExits);
                }
                // All regions, including already-uniform ones.
                sink.append(Stage::StructurizeCfg);
            }
            mode => debug!("structurizer {mode}: skipping early structurization"),
        }

        sink.append(Stage::AnnotateUniformValues);

        if early_structurize {
            sink.append(Stage::AnnotateControlFlow);
            // TODO: move this pair right after StructurizeCfg to avoid an
            // extra divergence computation; needs AnnotateControlFlow to
            // stop modifying control flow first.
            sink.append(Stage::RewriteUndefForPhi);
        }

        sink.append(Stage::Lcssa);

        if cfg.opt_level > OptLevel::Less {
            sink.append(Stage::PerfHintAnalysis);
        }

        // Materialize and cache the uniformity result now; instruction
        // selection consumes it without re-requesting it.
        sink.append(Stage::RequireUniformityAnalysis);

        Ok(())
    }

    /// The one fallible phase: every required stage and its prerequisite
    /// analysis must be registered, or nothing is appended.
    pub fn build_isel_phase(&self, sink: &mut dyn StageSink) -> Result<()> {
        const STAGES: [Stage; 3] = [
            Stage::InstructionSelectionDag,
            Stage::FixScalarRegisterCopies,
            Stage::LowerBoolRegisterCopies,
        ];

        for stage in STAGES {
            if !self.generic.has_stage(stage) {
                return Err(registration_error(stage, "stage is not registered"));
            }
        }
        if !self.generic.has_stage(Stage::RequireUniformityAnalysis) {
            return Err(registration_error(
                Stage::RequireUniformityAnalysis,
                "required analysis is not registered",
            ));
        }

        for stage in STAGES {
            sink.append(stage);
        }

        Ok(())
    }

    /// Placeholder: the target contributes no emission stages yet. An empty
    /// phase is legal and must not break assembly or downstream consumers.
    pub fn build_asm_emission_phase(&self, _sink: &mut dyn StageSink) -> Result<()> {
        Ok(())
    }

    fn delegate_ir_passes(&self, sink: &mut dyn StageSink) {
        let mut filtered = FilteredSink::new(sink, &self.disabled);
        self.generic.ir_passes(&mut filtered);
    }

    fn delegate_codegen_prepare(&self, sink: &mut dyn StageSink) {
        let mut filtered = FilteredSink::new(sink, &self.disabled);
        self.generic.codegen_prepare(&mut filtered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cse_policy_is_exhaustive_only_at_aggressive() {
        assert_eq!(cse_stage(OptLevel::None), Stage::EarlyCse);
        assert_eq!(cse_stage(OptLevel::Less), Stage::EarlyCse);
        assert_eq!(cse_stage(OptLevel::Default), Stage::EarlyCse);
        assert_eq!(cse_stage(OptLevel::Aggressive), Stage::Gvn);
    }

    #[test]
    fn both_cse_sites_agree() {
        // The sub-sequence site and the end-of-phase site must select the
        // same variant for any level.
        let config = PipelineConfig::new(OptLevel::Aggressive);
        let generic = crate::generic::BaselineCodeGen;
        let builder = PassPipelineBuilder::new(&config, &generic).unwrap();
        let mut buffer = PhaseBuffer::new();
        builder.build_ir_phase(&mut buffer).unwrap();

        let gvn = buffer.stages().iter().filter(|&&s| s == Stage::Gvn).count();
        assert_eq!(gvn, 2);
    }
}
