//! SAT solver integration using CaDiCaL

use super::constraints::Clause;
use anyhow::Result;
use cadical::{Solver, Timeout};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// SAT solver wrapper for CaDiCaL
pub struct SatSolver {
    solver: Solver,
    variable_count: usize,
    clause_count: usize,
    timeout: Option<Duration>,
}

/// A satisfying assignment extracted from the solver
#[derive(Debug, Clone)]
pub struct SolverModel {
    pub assignment: HashMap<i32, bool>,
    pub solve_time: Duration,
}

/// Three-way outcome of a solve call. `TimeExhausted` means the solver was
/// interrupted before reaching a verdict; the formula is neither proved
/// satisfiable nor unsatisfiable.
#[derive(Debug, Clone)]
pub enum SolverVerdict {
    Satisfiable(SolverModel),
    Unsatisfiable,
    TimeExhausted,
}

/// Statistics about the solving process
#[derive(Debug, Clone)]
pub struct SolverStatistics {
    pub variable_count: usize,
    pub clause_count: usize,
}

impl SatSolver {
    /// Create a new SAT solver instance
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variable_count: 0,
            clause_count: 0,
            timeout: None,
        }
    }

    /// Set the time budget for the next solve call
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    /// Add clauses to the solver
    pub fn add_clauses(&mut self, clauses: &[Clause]) -> Result<()> {
        for clause in clauses {
            self.add_clause(clause)?;
        }
        Ok(())
    }

    /// Add a single clause to the solver. The empty clause is accepted and
    /// makes the formula immediately unsatisfiable, which lets encoding-level
    /// contradictions surface through the normal verdict path.
    pub fn add_clause(&mut self, clause: &Clause) -> Result<()> {
        for &literal in &clause.literals {
            let var = literal.unsigned_abs() as usize;
            if var > self.variable_count {
                self.variable_count = var;
            }
        }

        self.solver.add_clause(clause.literals.iter().copied());
        self.clause_count += 1;
        Ok(())
    }

    /// Solve the formula under the configured time budget
    pub fn solve(&mut self) -> Result<SolverVerdict> {
        if let Some(timeout) = self.timeout {
            self.solver
                .set_callbacks(Some(Timeout::new(timeout.as_secs_f32())));
        }

        let start_time = Instant::now();
        let result = self.solver.solve();
        let solve_time = start_time.elapsed();

        match result {
            Some(true) => {
                let assignment = self.extract_assignment();
                Ok(SolverVerdict::Satisfiable(SolverModel {
                    assignment,
                    solve_time,
                }))
            }
            Some(false) => Ok(SolverVerdict::Unsatisfiable),
            None => Ok(SolverVerdict::TimeExhausted),
        }
    }

    /// Extract variable assignment from the solver
    fn extract_assignment(&self) -> HashMap<i32, bool> {
        let mut assignment = HashMap::new();

        for var in 1..=self.variable_count as i32 {
            if let Some(value) = self.solver.value(var) {
                assignment.insert(var, value);
            }
        }

        assignment
    }

    /// Get solver statistics
    pub fn statistics(&self) -> SolverStatistics {
        SolverStatistics {
            variable_count: self.variable_count,
            clause_count: self.clause_count,
        }
    }

    /// Reset the solver (clear all clauses)
    pub fn reset(&mut self) {
        self.solver = Solver::new();
        self.variable_count = 0;
        self.clause_count = 0;
    }

    /// Get the number of variables
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Get the number of clauses
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }
}

impl Default for SatSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Solver Statistics:")?;
        writeln!(f, "  Variables: {}", self.variable_count)?;
        writeln!(f, "  Clauses: {}", self.clause_count)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_creation() {
        let solver = SatSolver::new();
        assert_eq!(solver.variable_count(), 0);
        assert_eq!(solver.clause_count(), 0);
    }

    #[test]
    fn test_simple_satisfiable() {
        let mut solver = SatSolver::new();

        // x1 | x2 and -x1 | x2 force x2 true
        solver.add_clause(&Clause::binary(1, 2)).unwrap();
        solver.add_clause(&Clause::binary(-1, 2)).unwrap();

        let verdict = solver.solve().unwrap();
        match verdict {
            SolverVerdict::Satisfiable(model) => {
                assert_eq!(model.assignment.get(&2), Some(&true));
            }
            other => panic!("expected satisfiable, got {:?}", other),
        }
    }

    #[test]
    fn test_unsatisfiable() {
        let mut solver = SatSolver::new();

        solver.add_clause(&Clause::unit(1)).unwrap();
        solver.add_clause(&Clause::unit(-1)).unwrap();

        assert!(matches!(
            solver.solve().unwrap(),
            SolverVerdict::Unsatisfiable
        ));
    }

    #[test]
    fn test_solve_with_time_budget() {
        let mut solver = SatSolver::new();
        solver.set_timeout(Duration::from_secs(30));

        solver.add_clause(&Clause::binary(1, 2)).unwrap();
        solver.add_clause(&Clause::unit(-1)).unwrap();

        match solver.solve().unwrap() {
            SolverVerdict::Satisfiable(model) => {
                assert_eq!(model.assignment.get(&2), Some(&true));
            }
            other => panic!("expected satisfiable, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_clause_is_contradiction() {
        let mut solver = SatSolver::new();

        solver.add_clause(&Clause::unit(1)).unwrap();
        solver.add_clause(&Clause::empty()).unwrap();

        assert!(matches!(
            solver.solve().unwrap(),
            SolverVerdict::Unsatisfiable
        ));
    }

    #[test]
    fn test_variable_count_tracking() {
        let mut solver = SatSolver::new();

        solver.add_clause(&Clause::new(vec![1, -5, 3])).unwrap();
        assert_eq!(solver.variable_count(), 5);

        solver.add_clause(&Clause::binary(2, -7)).unwrap();
        assert_eq!(solver.variable_count(), 7);
        assert_eq!(solver.clause_count(), 2);
    }

    #[test]
    fn test_reset() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::unit(3)).unwrap();
        solver.reset();

        assert_eq!(solver.variable_count(), 0);
        assert_eq!(solver.clause_count(), 0);
        assert!(matches!(
            solver.solve().unwrap(),
            SolverVerdict::Satisfiable(_)
        ));
    }
}
