pub mod directory;
pub mod file_logger;
pub mod progress;
