//! Fee engine: recurring and upfront fee schedules plus the European
//! carry waterfall. Everything here is a pure function of its arguments.

pub mod carry;
pub mod schedule;

pub use carry::{european_carry, preferred_return, CarryTerms, CarryWaterfall};
pub use schedule::{
    annual_admin_fee, annual_management_fee, fee_schedule, nav_estimate, upfront_fees,
    UpfrontFees, YearFees,
};
