use lanec_core::{Phase, Stage};

/// One phase's ordered stage subsequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseStages {
    pub phase: Phase,
    pub stages: Vec<Stage>,
}

/// The final ordered stage list for one compilation session, grouped by
/// phase. Read-only after construction; the execution engine runs the
/// stages in exactly this order for any single compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pipeline {
    phases: Vec<PhaseStages>,
}

impl Pipeline {
    pub(crate) fn push_phase(&mut self, phase: Phase, stages: Vec<Stage>) {
        debug_assert!(
            self.phases.iter().all(|p| p.phase != phase),
            "phase {phase} recorded twice"
        );
        self.phases.push(PhaseStages { phase, stages });
    }

    pub fn phases(&self) -> &[PhaseStages] {
        &self.phases
    }

    /// The stage subsequence of `phase`, empty if the phase appended
    /// nothing (legal: the asm-emission phase is a placeholder).
    pub fn phase(&self, phase: Phase) -> &[Stage] {
        self.phases
            .iter()
            .find(|p| p.phase == phase)
            .map(|p| p.stages.as_slice())
            .unwrap_or(&[])
    }

    /// All stages across phases, in execution order.
    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.phases.iter().flat_map(|p| p.stages.iter().copied())
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.stages().any(|s| s == stage)
    }
}
