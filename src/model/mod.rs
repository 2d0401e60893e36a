pub mod attendance;
pub mod config;
pub mod schedule;

pub use attendance::*;
pub use config::*;
pub use schedule::*;
