pub mod category;
pub mod profile;
pub mod scan;

pub use category::{CategoryDetails, WasteCategory};
pub use profile::{RankedProfile, UserProfile};
pub use scan::{NewWasteScan, WasteScan};
