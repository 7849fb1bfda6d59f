pub mod leaderboard;
pub mod ledger;
pub mod resolver;
pub mod session;
