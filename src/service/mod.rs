pub mod package;
pub mod pipeline;
pub mod retention;
pub mod ship;
pub mod snapshot;
