//! Per-run record of every outcome, keyed by case id

use std::collections::HashMap;

use crate::exec::ExecutionOutcome;

use super::cases::TestCase;
use super::pipeline::Side;

/// Reference and candidate outcomes for every case that ran.
#[derive(Debug, Default)]
pub struct ResultLedger {
    reference: HashMap<TestCase, ExecutionOutcome>,
    candidate: HashMap<TestCase, ExecutionOutcome>,
}

impl ResultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn side_mut(&mut self, side: Side) -> &mut HashMap<TestCase, ExecutionOutcome> {
        match side {
            Side::Reference => &mut self.reference,
            Side::Candidate => &mut self.candidate,
        }
    }

    fn side(&self, side: Side) -> &HashMap<TestCase, ExecutionOutcome> {
        match side {
            Side::Reference => &self.reference,
            Side::Candidate => &self.candidate,
        }
    }

    /// Store an outcome, replacing any earlier one for the same case and side.
    pub fn record(&mut self, side: Side, case: &TestCase, outcome: ExecutionOutcome) -> Option<ExecutionOutcome> {
        let previous = self.side_mut(side).insert(case.clone(), outcome);
        if previous.is_some() {
            tracing::debug!(case = %case, side = %side, "outcome replaced");
        }
        previous
    }

    pub fn get(&self, side: Side, case: &TestCase) -> Option<&ExecutionOutcome> {
        self.side(side).get(case)
    }

    /// Number of cases with a recorded outcome on `side`.
    pub fn len(&self, side: Side) -> usize {
        self.side(side).len()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_empty() && self.candidate.is_empty()
    }
}
