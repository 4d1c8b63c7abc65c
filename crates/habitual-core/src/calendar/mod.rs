//! Calendar structure generation: week periods and the days inside them.

pub mod days;
pub mod weeks;

pub use days::{extend_calendar_days, generate_calendar_days};
pub use weeks::{extend_week_periods, first_monday_of_year, generate_week_periods};
