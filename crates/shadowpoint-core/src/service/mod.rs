//! Application-facing checkpoint service
//!
//! ```rust,ignore
//! use shadowpoint_core::{CheckpointConfig, CheckpointEngine, StaticStorageRoot, StaticWorkspaceResolver};
//!
//! let engine = CheckpointEngine::new(
//!     CheckpointConfig::default(),
//!     Arc::new(StaticStorageRoot::new("/var/lib/shadowpoint")),
//!     Arc::new(StaticWorkspaceResolver::new("/work/project")),
//! )?;
//!
//! let service = engine.service_for_task("task-123")?;
//! service.initialize().await?;
//! let before = service.save_checkpoint("before refactor").await?;
//! // ... edit files ...
//! let diffs = service.get_diff(&before, None).await?;
//! service.restore_checkpoint(&before).await?;
//! ```

mod checkpoint_service;
mod engine;
mod locks;

#[cfg(test)]
mod tests;

pub use checkpoint_service::CheckpointService;
pub use engine::CheckpointEngine;
pub use locks::RepositoryLocks;
