pub mod path;
pub mod prefs;
pub mod settings;

pub use path::*;
