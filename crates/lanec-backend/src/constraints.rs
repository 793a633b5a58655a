//! Declared ordering and mutual-exclusion rules.
//!
//! The load-bearing dependencies between stages are data here, not call-site
//! comments: after the builder assembles all five phases it verifies every
//! rule against the concrete stage list and fails fast on violation. A
//! violation means the sequencers themselves are wrong, so the error is
//! fatal and no pipeline is produced.

use crate::pipeline::Pipeline;
use itertools::Itertools;
use lanec_core::error::Result;
use lanec_core::{Error, Phase, Stage};

/// `(before, after)` pairs, enforced whenever both stages are present.
/// Duplicated stages satisfy a pair only if every occurrence of `before`
/// precedes every occurrence of `after`.
const ORDERING: &[(Stage, Stage)] = &[
    // Inlining obscures the call-site shapes runtime-call binding matches.
    (Stage::RuntimeCallBinding, Stage::TargetAlwaysInline),
    (Stage::RuntimeCallBinding, Stage::AlwaysInline),
    // Intrinsic optimization pattern-matches pre-variadic-lowering calls.
    (Stage::IntrinsicOptimizer, Stage::ExpandVariadics),
    // Target inlining heuristics must see un-inlined bodies.
    (Stage::TargetAlwaysInline, Stage::AlwaysInline),
    // Alloca promotion accounts for module-scope shared-memory lowering.
    (Stage::LowerModuleSharedMem, Stage::PromoteAlloca),
    // The atomic optimizer rewrites operations expansion would freeze.
    (Stage::AtomicOptimizer, Stage::AtomicExpand),
    // Strength reduction feeds on separated constant offsets.
    (Stage::SeparateConstOffset, Stage::StraightLineStrengthReduce),
    // Memory passes must observe the lowered pointer form.
    (Stage::LowerBufferFatPointers, Stage::LoadStoreVectorizer),
    // The structurizer cannot recognize multi-exit regions.
    (Stage::UnifyDivergentExitNodes, Stage::StructurizeCfg),
    (Stage::FixIrreducible, Stage::UnifyLoopExits),
    (Stage::UnifyLoopExits, Stage::StructurizeCfg),
    (Stage::StructurizeCfg, Stage::AnnotateUniformValues),
    // Current placement; see the pre-ISel sequencer for the known
    // inefficiency kept as-is.
    (Stage::AnnotateUniformValues, Stage::AnnotateControlFlow),
    (Stage::AnnotateControlFlow, Stage::RewriteUndefForPhi),
];

/// Stages that must close their phase's subsequence when present.
const PHASE_TAIL: &[(Phase, Stage)] = &[
    // LowerSwitch can introduce unreachable blocks later cleanup removes.
    (Phase::CodeGenPrepare, Stage::LowerSwitch),
    // Instruction selection consumes the cached uniformity result.
    (Phase::PreInstructionSelection, Stage::RequireUniformityAnalysis),
];

/// Groups from which at most one member may appear in a pipeline.
const EXCLUSION_GROUPS: &[(&str, &[Stage])] = &[(
    "cfg-structurizer",
    &[Stage::StructurizeCfg, Stage::StructurizeCfgLate],
)];

/// Check every declared rule against `pipeline`.
pub fn verify(pipeline: &Pipeline) -> Result<()> {
    let stages: Vec<Stage> = pipeline.stages().collect();

    for &(before, after) in ORDERING {
        let last_before = stages.iter().positions(|&s| s == before).last();
        let first_after = stages.iter().positions(|&s| s == after).next();
        if let (Some(b), Some(a)) = (last_before, first_after) {
            if b >= a {
                return Err(Error::ConstraintViolation(format!(
                    "`{before}` must precede `{after}`"
                )));
            }
        }
    }

    for &(phase, tail) in PHASE_TAIL {
        let subsequence = pipeline.phase(phase);
        if subsequence.contains(&tail) && subsequence.last() != Some(&tail) {
            return Err(Error::ConstraintViolation(format!(
                "`{tail}` must be last in the {phase} phase"
            )));
        }
    }

    for &(name, members) in EXCLUSION_GROUPS {
        let present = members
            .iter()
            .filter(|&&m| stages.contains(&m))
            .collect_vec();
        if present.len() > 1 {
            return Err(Error::ConstraintViolation(format!(
                "exclusion group `{name}` has multiple members present: {present:?}"
            )));
        }
    }

    Ok(())
}
