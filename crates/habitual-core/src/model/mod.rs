//! Domain model types.
//!
//! Everything here is a plain data row; relations are expressed through
//! explicit foreign-key fields (`week_id`, `day_id`, `habit_id`, `user_id`)
//! rather than object graphs, so all engine logic runs as store queries.

mod calendar;
mod completion;
mod habit;
mod rate;
mod reference;
mod user;

pub use calendar::{CalendarDay, NewCalendarDay, NewWeekPeriod, WeekPeriod};
pub use completion::{CompletionFact, WeightedCompletion};
pub use habit::{Habit, MAX_HABIT_POINTS, MIN_HABIT_POINTS};
pub use rate::{DayRate, WeekRate};
pub use reference::{HabitCategory, NewHabitCategory, NewPriorityLevel, PriorityLevel};
pub use user::User;
