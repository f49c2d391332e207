pub mod defaults;
pub mod error;
pub mod evaluator;
pub mod fees;
pub mod format;
pub mod offer;
pub mod parse;
pub mod scenario;
pub mod time_value;
pub mod types;
pub mod validation;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

#[cfg(feature = "comparison")]
pub mod comparison;

#[cfg(all(feature = "sensitivity", feature = "comparison"))]
pub mod analysis;

#[cfg(feature = "session")]
pub mod session;

pub use error::FeeCalcError;
pub use evaluator::{evaluate_offer, CalculationResult, FeeBreakdown, ReducedResult};
pub use offer::{FeeAmount, HurdleTier, ManagementFeeBasis, Offer};
pub use scenario::{PriceMode, Scenario};
pub use types::*;

/// Standard result type for all feecalc operations
pub type FeeCalcResult<T> = Result<T, FeeCalcError>;
