pub mod category;
pub mod profile;
pub mod ranking;
pub mod scan;
