//! Convergence gate: proceed to content generation or refine the plan.
//!
//! Pure function of the latest overall score and the iteration budget. No
//! hidden state — identical inputs always produce identical decisions.

/// Outcome of one gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Plan is good enough, or the budget is spent — move on.
    Proceed,
    /// Score below threshold with budget remaining — refine the plan.
    Refine,
}

/// Decide whether the plan converged.
///
/// Proceed when `overall >= threshold`, or when `refinement_iteration >=
/// max_iterations` (budget exhausted — proceed anyway rather than loop
/// forever). Otherwise refine.
pub fn decide(
    overall: f64,
    refinement_iteration: u32,
    max_iterations: u32,
    threshold: f64,
) -> GateDecision {
    if overall >= threshold {
        GateDecision::Proceed
    } else if refinement_iteration >= max_iterations {
        GateDecision::Proceed
    } else {
        GateDecision::Refine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f64 = 7.5;

    #[test]
    fn high_score_proceeds_immediately() {
        assert_eq!(decide(9.0, 0, 3, THRESHOLD), GateDecision::Proceed);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(decide(7.5, 0, 3, THRESHOLD), GateDecision::Proceed);
        assert_eq!(decide(7.499, 0, 3, THRESHOLD), GateDecision::Refine);
    }

    #[test]
    fn low_score_refines_while_budget_remains() {
        assert_eq!(decide(5.0, 0, 2, THRESHOLD), GateDecision::Refine);
        assert_eq!(decide(5.0, 1, 2, THRESHOLD), GateDecision::Refine);
    }

    #[test]
    fn exhausted_budget_proceeds_regardless_of_score() {
        assert_eq!(decide(5.0, 2, 2, THRESHOLD), GateDecision::Proceed);
        assert_eq!(decide(0.0, 3, 2, THRESHOLD), GateDecision::Proceed);
    }

    #[test]
    fn zero_budget_never_refines() {
        assert_eq!(decide(0.0, 0, 0, THRESHOLD), GateDecision::Proceed);
    }

    #[test]
    fn identical_inputs_yield_identical_decisions() {
        for _ in 0..3 {
            assert_eq!(decide(6.1, 1, 3, THRESHOLD), GateDecision::Refine);
        }
    }
}
