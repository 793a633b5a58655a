//! Per-session pipeline configuration.
//!
//! One immutable [`PipelineConfig`] value is built before any phase
//! sequencer runs and passed explicitly into every phase-build operation.
//! There is no global flag state; flag resolution is a pure function of the
//! value and the session's optimization level.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Ordinal optimization level. Order is meaningful: thresholds compare
/// against it with `<`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
pub enum OptLevel {
    None,
    Less,
    Default,
    Aggressive,
}

/// One feature flag: a compiled-in default, an optional
/// minimum-optimization-level threshold, and an explicit-override slot.
///
/// The override slot records whether a caller supplied a value at all, which
/// is distinct from a caller supplying the default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    default: bool,
    threshold: Option<OptLevel>,
    explicit: Option<bool>,
}

impl Flag {
    pub const fn new(default: bool) -> Self {
        Self {
            default,
            threshold: None,
            explicit: None,
        }
    }

    pub const fn with_threshold(default: bool, threshold: OptLevel) -> Self {
        Self {
            default,
            threshold: Some(threshold),
            explicit: None,
        }
    }

    /// Record an explicit caller-supplied value. Overrides both the default
    /// and the threshold from now on.
    pub fn set(&mut self, value: bool) {
        self.explicit = Some(value);
    }

    /// Resolve the effective value at `opt`.
    ///
    /// Precedence, identical for every flag in the system: an explicit
    /// override wins unconditionally, even below the threshold; otherwise a
    /// level strictly below the threshold yields `false`; otherwise the
    /// compiled-in default.
    pub fn resolve(&self, opt: OptLevel) -> bool {
        if let Some(value) = self.explicit {
            return value;
        }
        if let Some(threshold) = self.threshold {
            if opt < threshold {
                return false;
            }
        }
        self.default
    }
}

/// How control-flow structurization is scheduled for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum StructurizerMode {
    /// No structurization at all.
    Disabled,
    /// Structurization happens in a later phase outside this builder.
    DeferredLate,
    /// Structurize early, during pre-instruction-selection.
    EarlyDefault,
}

/// Scan strategy for the atomic-operation optimizer. `None` disables the
/// optimizer regardless of optimization level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum AtomicScanStrategy {
    None,
    GroupScan,
    Iterative,
}

/// The whole configuration surface consumed by the pipeline builder.
/// Immutable once built for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub opt_level: OptLevel,

    pub lower_ctor_dtor: Flag,
    pub intrinsic_optimizer: Flag,
    pub lower_module_shared_mem: Flag,
    pub scalar_ir_passes: Flag,
    pub loop_prefetch: Flag,
    pub lower_kernel_arguments: Flag,
    pub load_store_vectorizer: Flag,

    pub structurizer: StructurizerMode,
    pub structurizer_workarounds: bool,
    pub atomic_scan: AtomicScanStrategy,
}

impl PipelineConfig {
    pub fn new(opt_level: OptLevel) -> Self {
        Self {
            opt_level,
            lower_ctor_dtor: Flag::new(true),
            intrinsic_optimizer: Flag::with_threshold(true, OptLevel::Default),
            lower_module_shared_mem: Flag::new(true),
            scalar_ir_passes: Flag::with_threshold(true, OptLevel::Default),
            loop_prefetch: Flag::with_threshold(false, OptLevel::Aggressive),
            lower_kernel_arguments: Flag::new(true),
            load_store_vectorizer: Flag::with_threshold(true, OptLevel::Default),
            structurizer: StructurizerMode::EarlyDefault,
            structurizer_workarounds: true,
            atomic_scan: AtomicScanStrategy::Iterative,
        }
    }

    /// Effective value of `flag` for this session.
    pub fn resolve(&self, flag: &Flag) -> bool {
        flag.resolve(self.opt_level)
    }

    /// Reject an internally inconsistent configuration before any stage is
    /// appended. Every combination expressible through the public fields is
    /// currently consistent, so this accepts everything today; a future
    /// toggle that can conflict with another must be checked here so
    /// construction fails before a partial pipeline exists.
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(OptLevel::Default)
    }
}
