//! Stage and phase identities.
//!
//! A [`Stage`] is an opaque name for a transformation unit; the pipeline
//! builder only ever orders, filters, and compares these identities. Stage
//! internals live in the execution engine, not here.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// The five macro-phases of one code-generation session, in execution order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    Ir,
    CodeGenPrepare,
    PreInstructionSelection,
    InstructionSelection,
    AsmEmission,
}

/// Identity of one transformation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum Stage {
    // Target IR stages.
    RuntimeCallBinding,
    CtorDtorLowering,
    IntrinsicOptimizer,
    ExpandVariadics,
    TargetAlwaysInline,
    AlwaysInline,
    LowerModuleSharedMem,
    InferAddressSpaces,
    AtomicOptimizer,
    AtomicExpand,
    PromoteAlloca,
    LoopDataPrefetch,
    SeparateConstOffset,
    StraightLineStrengthReduce,
    NaryReassociate,
    EarlyCse,
    Gvn,
    TargetCodeGenPrepare,

    // Generic baseline contributions (IR).
    LoopStrengthReduce,
    ExpandMemCmp,
    GcShadowStackLowering,
    LowerInvoke,
    UnreachableBlockElim,

    // Code-generation preparation.
    LowerKernelArguments,
    LowerBufferFatPointers,
    CodeGenPrepare,
    ConstantHoisting,
    ExceptionLivenessTracking,
    ExceptionFuncletLayout,
    LoadStoreVectorizer,
    LowerSwitch,

    // Pre-instruction-selection.
    FlattenCfg,
    Sink,
    LateCodeGenPrepare,
    UnifyDivergentExitNodes,
    FixIrreducible,
    UnifyLoopExits,
    StructurizeCfg,
    /// Late-phase structurizer variant. Never appended by this builder; the
    /// deferred-late mode leaves structurization to a phase outside this
    /// core. The identity exists so the exclusion group covering both
    /// variants can be declared and checked.
    StructurizeCfgLate,
    AnnotateUniformValues,
    AnnotateControlFlow,
    RewriteUndefForPhi,
    Lcssa,
    PerfHintAnalysis,
    RequireUniformityAnalysis,

    // Instruction selection.
    InstructionSelectionDag,
    FixScalarRegisterCopies,
    LowerBoolRegisterCopies,
}
