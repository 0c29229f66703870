pub mod constants;
pub mod error;
pub mod info;

pub use constants::*;
pub use error::TraversabilityError;
pub use info::MapInfo;
