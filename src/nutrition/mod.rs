//! Goal and intake calculations.
//!
//! Pure, synchronous functions over already-fetched data. Nothing in here
//! touches storage, the clock or shared state; callers re-run the summary
//! after every change to a user or their meals.

pub mod goals;
pub mod intake;
pub mod progress;
pub mod recommend;
pub mod units;

pub use goals::{goal_from_macros, goal_from_weight, DailyGoal};
pub use intake::{aggregate, day_window, HasMacros, IntakeTotals, Macros};
pub use progress::{summarize, DailySummary};
pub use recommend::{
    is_valid_weight, parse_weight, recommendations, BodyWeight, MacroRecommendations,
    RecommendationRange, WeightError,
};
pub use units::{check_grams, total_calories, GramsError, MAX_MACRO_GRAMS};
