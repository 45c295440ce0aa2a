pub mod mission_completion;
pub mod user_stats;
