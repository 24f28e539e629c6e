mod constants;
pub mod line;
pub mod logging;
mod types;

pub use constants::*;
pub use types::*;
