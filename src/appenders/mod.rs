//! File appender, archive policy, and the destination registry

pub mod archive;
pub mod file;
pub mod registry;

pub use file::FileAppender;
pub use registry::AppenderRegistry;
