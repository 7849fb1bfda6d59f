pub mod categories;
pub mod leaderboard;
pub mod profiles;
pub mod scans;
