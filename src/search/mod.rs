//! Height search, solution representation, and validation

pub mod driver;
pub mod solution;
pub mod validator;

pub use driver::{HeightSearch, SearchOutcome};
pub use solution::{PackingSolution, SolutionMetadata};
pub use validator::{PlacementValidator, ValidationResult, Violation};
