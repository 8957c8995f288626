//! Storage maintenance commands

use crate::console::CliConsole;
use serde_json::json;
use shadowpoint_core::migration::needs_migration;
use shadowpoint_core::{CheckpointEngine, CheckpointResult};

/// Migrate legacy storage layouts under the storage root
pub async fn migrate(
    engine: &CheckpointEngine,
    console: &CliConsole,
    json_output: bool,
) -> CheckpointResult<()> {
    let storage_root = engine.storage_root();
    if !needs_migration(&storage_root).await {
        if json_output {
            console.json(&json!({ "migrated": 0, "failed": 0, "taskHistoryRemoved": false }))?;
        } else {
            console.success("Storage is up to date");
        }
        return Ok(());
    }

    let report = engine.migration_runner().run().await;
    if json_output {
        console.json(&json!({
            "migrated": report.repositories_migrated,
            "failed": report.repositories_failed,
            "taskHistoryRemoved": report.task_history_removed,
        }))?;
        return Ok(());
    }

    if report.task_history_removed {
        console.info("Removed legacy task history");
    }
    console.success(&format!(
        "Migrated {} repositories",
        report.repositories_migrated
    ));
    if report.repositories_failed > 0 {
        console.warn(&format!(
            "{} repositories could not be migrated",
            report.repositories_failed
        ));
    }
    Ok(())
}

/// Delete task branches of the workspace's repository not in `keep`
pub async fn prune_branches(
    engine: &CheckpointEngine,
    task_id: &str,
    keep: &[String],
    console: &CliConsole,
    json_output: bool,
) -> CheckpointResult<()> {
    let service = engine.service_for_task(task_id)?;
    let git = service.git();
    let deleted = if git.exists() {
        engine
            .migration_runner()
            .cleanup_orphaned_branches(git, keep)
            .await?
    } else {
        console.info("No shadow repository for this workspace");
        0
    };

    if json_output {
        console.json(&json!({ "deleted": deleted }))?;
    } else {
        console.success(&format!("Deleted {} task branches", deleted));
    }
    Ok(())
}
