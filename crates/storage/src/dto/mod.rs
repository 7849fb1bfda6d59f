pub mod category;
pub mod common;
pub mod leaderboard;
pub mod scan;
