//! Checkpoint commands: save, diff, restore, history and cleanup

use crate::console::CliConsole;
use chrono::Local;
use colored::*;
use serde_json::json;
use shadowpoint_core::{CheckpointDiff, CheckpointEngine, CheckpointResult};

/// Snapshot the workspace on the task's branch
pub async fn save(
    engine: &CheckpointEngine,
    task_id: &str,
    message: &str,
    console: &CliConsole,
    json_output: bool,
) -> CheckpointResult<()> {
    let service = engine.service_for_task(task_id)?;
    service.initialize().await?;
    let hash = service.save_checkpoint(message).await?;

    if json_output {
        console.json(&json!({ "task": task_id, "hash": hash }))?;
    } else {
        console.success(&format!("Saved checkpoint {} for task {}", short(&hash), task_id));
    }
    Ok(())
}

fn short(hash: &str) -> &str {
    &hash[..hash.len().min(7)]
}

fn change_kind(diff: &CheckpointDiff) -> ColoredString {
    match (diff.before.is_empty(), diff.after.is_empty()) {
        (true, false) => "added".green(),
        (false, true) => "deleted".red(),
        _ => "modified".yellow(),
    }
}

/// Show the files that changed between two checkpoints, or since one
pub async fn diff(
    engine: &CheckpointEngine,
    task_id: &str,
    from: &str,
    to: Option<&str>,
    full: bool,
    console: &CliConsole,
    json_output: bool,
) -> CheckpointResult<()> {
    let service = engine.service_for_task(task_id)?;
    service.initialize().await?;
    let diffs = service.get_diff(from, to).await?;

    if json_output {
        console.json(&diffs)?;
        return Ok(());
    }

    let target = to.map(short).unwrap_or("working tree");
    console.print_header(&format!("{} → {}", short(from), target));
    if diffs.is_empty() {
        println!("No changes");
        return Ok(());
    }

    for diff in &diffs {
        println!(
            "{:>9}  {}  {}",
            change_kind(diff),
            diff.relative_path,
            format!(
                "(-{} +{} lines)",
                diff.before.lines().count(),
                diff.after.lines().count()
            )
            .dimmed()
        );
        if full {
            console.print_separator();
            for line in diff.before.lines() {
                println!("{}", format!("-{}", line).red());
            }
            for line in diff.after.lines() {
                println!("{}", format!("+{}", line).green());
            }
            console.print_separator();
        }
    }
    println!();
    println!("{} files changed", diffs.len());
    Ok(())
}

/// Restore the workspace to a checkpoint
pub async fn restore(
    engine: &CheckpointEngine,
    task_id: &str,
    hash: &str,
    console: &CliConsole,
    json_output: bool,
) -> CheckpointResult<()> {
    let service = engine.service_for_task(task_id)?;
    service.initialize().await?;
    let marker = service.restore_checkpoint(hash).await?;

    if json_output {
        console.json(&json!({ "task": task_id, "restored": hash, "marker": marker }))?;
    } else {
        console.success(&format!(
            "Restored {} to {} (marker {})",
            service.workspace().display(),
            short(hash),
            short(&marker)
        ));
    }
    Ok(())
}

/// List the task's checkpoints, newest first
pub async fn history(
    engine: &CheckpointEngine,
    task_id: &str,
    console: &CliConsole,
    json_output: bool,
) -> CheckpointResult<()> {
    let service = engine.service_for_task(task_id)?;
    service.initialize().await?;
    let checkpoints = service.get_history().await?;

    if json_output {
        console.json(&checkpoints)?;
        return Ok(());
    }

    console.print_header(&format!("Checkpoints for task {}", task_id));
    if checkpoints.is_empty() {
        println!("No checkpoints yet");
        return Ok(());
    }
    for checkpoint in &checkpoints {
        let when = checkpoint
            .timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S");
        let message = if checkpoint.is_restore_marker() {
            checkpoint.message.dimmed()
        } else {
            checkpoint.message.normal()
        };
        println!(
            "{}  {}  {}",
            checkpoint.short_hash().yellow(),
            when.to_string().dimmed(),
            message
        );
    }
    Ok(())
}

/// Delete the task's branch
pub async fn cleanup(
    engine: &CheckpointEngine,
    task_id: &str,
    console: &CliConsole,
) -> CheckpointResult<()> {
    let service = engine.service_for_task(task_id)?;
    service.cleanup().await?;
    console.success(&format!("Removed checkpoints for task {}", task_id));
    Ok(())
}
