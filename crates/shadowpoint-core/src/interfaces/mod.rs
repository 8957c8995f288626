//! Narrow seams to the host application
//!
//! The engine never reaches for global state: where to store its data,
//! which workspace is active and where diagnostics go are all supplied
//! through these traits.

mod log_sink;
mod workspace;

#[cfg(test)]
mod tests;

pub use log_sink::{FileLogSink, LogSink, MemoryLogSink, TracingLogSink};
pub use workspace::{
    StaticStorageRoot, StaticWorkspaceResolver, StorageRootProvider, WorkspaceRootResolver,
};
