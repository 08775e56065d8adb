pub mod collection;
pub mod config;
pub mod dashboard;
pub mod task;

pub use collection::*;
pub use config::*;
pub use dashboard::*;
pub use task::*;
