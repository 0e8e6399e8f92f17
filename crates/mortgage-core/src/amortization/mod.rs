pub mod scenario;
pub mod schedule;

pub use scenario::{scenario_warnings, InsuranceCharge, Prepayment, PrepaymentMode, Scenario};
pub use schedule::{build_schedule, Schedule, ScheduleRow};
