pub mod filter;
pub mod question;
pub mod stats;

pub use filter::FilterSelection;
pub use question::{display_category, Difficulty, Question, UnknownDifficulty};
pub use stats::{ChartView, DistributionEntry, SummaryStats};
