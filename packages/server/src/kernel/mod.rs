pub mod deps;
pub mod scheduled_tasks;
pub mod traits;
pub mod webpush;

pub use deps::ServerDeps;
pub use traits::*;
