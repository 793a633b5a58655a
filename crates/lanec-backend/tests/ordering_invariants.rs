use lanec_backend::{constraints, BaselineCodeGen, PassPipelineBuilder, Pipeline};
use lanec_core::{OptLevel, Phase, PipelineConfig, Stage};
use pretty_assertions::assert_eq;
use strum::IntoEnumIterator;

fn build(config: &PipelineConfig) -> Pipeline {
    let generic = BaselineCodeGen;
    PassPipelineBuilder::new(config, &generic)
        .unwrap()
        .build()
        .unwrap()
}

fn position(stages: &[Stage], stage: Stage) -> usize {
    stages
        .iter()
        .position(|&s| s == stage)
        .unwrap_or_else(|| panic!("{stage} not found"))
}

#[test]
fn every_built_pipeline_passes_verification() {
    for opt_level in OptLevel::iter() {
        let pipeline = build(&PipelineConfig::new(opt_level));
        constraints::verify(&pipeline).unwrap();
    }
}

#[test]
fn runtime_call_binding_opens_the_ir_phase() {
    for opt_level in OptLevel::iter() {
        let pipeline = build(&PipelineConfig::new(opt_level));
        assert_eq!(
            pipeline.phase(Phase::Ir).first(),
            Some(&Stage::RuntimeCallBinding)
        );
    }
}

#[test]
fn buffer_lowering_precedes_vectorizer() {
    // Vectorizer enabled at Default and above.
    let pipeline = build(&PipelineConfig::new(OptLevel::Default));
    let prepare = pipeline.phase(Phase::CodeGenPrepare);
    assert!(prepare.contains(&Stage::LoadStoreVectorizer));
    assert!(
        position(prepare, Stage::LowerBufferFatPointers)
            < position(prepare, Stage::LoadStoreVectorizer)
    );
}

#[test]
fn switch_lowering_closes_codegen_prepare() {
    for opt_level in OptLevel::iter() {
        let pipeline = build(&PipelineConfig::new(opt_level));
        assert_eq!(
            pipeline.phase(Phase::CodeGenPrepare).last(),
            Some(&Stage::LowerSwitch)
        );
    }
}

#[test]
fn buffer_lowering_is_not_deferred_past_generic_prepare() {
    let pipeline = build(&PipelineConfig::new(OptLevel::Default));
    let prepare = pipeline.phase(Phase::CodeGenPrepare);
    // CodeGenPrepare is the generic delegate's contribution.
    assert!(
        position(prepare, Stage::LowerBufferFatPointers)
            < position(prepare, Stage::CodeGenPrepare)
    );
}

#[test]
fn atomic_optimizer_runs_before_expansion() {
    let pipeline = build(&PipelineConfig::new(OptLevel::Less));
    let ir = pipeline.phase(Phase::Ir);
    assert!(position(ir, Stage::AtomicOptimizer) < position(ir, Stage::AtomicExpand));
}

#[test]
fn shared_mem_lowering_precedes_alloca_promotion() {
    let pipeline = build(&PipelineConfig::new(OptLevel::Default));
    let ir = pipeline.phase(Phase::Ir);
    assert!(position(ir, Stage::LowerModuleSharedMem) < position(ir, Stage::PromoteAlloca));
}

#[test]
fn straight_line_subsequence_order_at_aggressive() {
    let mut config = PipelineConfig::new(OptLevel::Aggressive);
    config.loop_prefetch.set(true);
    let pipeline = build(&config);
    let ir = pipeline.phase(Phase::Ir);

    let expected = [
        Stage::LoopDataPrefetch,
        Stage::SeparateConstOffset,
        Stage::StraightLineStrengthReduce,
        Stage::Gvn,
        Stage::NaryReassociate,
        Stage::EarlyCse,
    ];
    let start = position(ir, Stage::LoopDataPrefetch);
    assert_eq!(&ir[start..start + expected.len()], &expected);
}

#[test]
fn cheap_cse_selected_below_aggressive() {
    let pipeline = build(&PipelineConfig::new(OptLevel::Default));
    let ir = pipeline.phase(Phase::Ir);
    assert!(!ir.contains(&Stage::Gvn));
    // Sub-sequence site and end-of-phase site: trailing cheap cleanup makes
    // a third occurrence.
    let early_cse = ir.iter().filter(|&&s| s == Stage::EarlyCse).count();
    assert_eq!(early_cse, 3);
}

#[test]
fn generic_ir_delegate_runs_after_target_prepare() {
    let pipeline = build(&PipelineConfig::new(OptLevel::Default));
    let ir = pipeline.phase(Phase::Ir);
    assert!(position(ir, Stage::TargetCodeGenPrepare) < position(ir, Stage::LoopStrengthReduce));
}

#[test]
fn divergence_annotation_order_is_preserved() {
    // Known placement inefficiency kept as-is: uniform-value annotation,
    // then control-flow annotation, then phi rewriting.
    let pipeline = build(&PipelineConfig::new(OptLevel::Default));
    let pre_isel = pipeline.phase(Phase::PreInstructionSelection);
    let uniform = position(pre_isel, Stage::AnnotateUniformValues);
    let annotate = position(pre_isel, Stage::AnnotateControlFlow);
    let rewrite = position(pre_isel, Stage::RewriteUndefForPhi);
    assert!(position(pre_isel, Stage::StructurizeCfg) < uniform);
    assert!(uniform < annotate);
    assert!(annotate < rewrite);
}

#[test]
fn flatten_and_sink_are_gated_on_optimization() {
    let unoptimized = build(&PipelineConfig::new(OptLevel::None));
    let pre_isel = unoptimized.phase(Phase::PreInstructionSelection);
    assert!(!pre_isel.contains(&Stage::FlattenCfg));
    assert!(!pre_isel.contains(&Stage::Sink));

    let optimized = build(&PipelineConfig::new(OptLevel::Less));
    let pre_isel = optimized.phase(Phase::PreInstructionSelection);
    assert_eq!(&pre_isel[..2], &[Stage::FlattenCfg, Stage::Sink]);
}

#[test]
fn perf_hints_only_above_less() {
    assert!(!build(&PipelineConfig::new(OptLevel::Less)).contains(Stage::PerfHintAnalysis));
    assert!(build(&PipelineConfig::new(OptLevel::Default)).contains(Stage::PerfHintAnalysis));
}
