//! SAT encoding and solving for strip packing

pub mod constraints;
pub mod encoder;
pub mod solver;
pub mod variables;

pub use constraints::{Clause, ConstraintGenerator, PairDirections};
pub use encoder::{decode_position, AttemptOutcome, EncodingStatistics, PlacementEncoder};
pub use solver::{SatSolver, SolverModel, SolverVerdict};
pub use variables::{VariableManager, VariableType};
