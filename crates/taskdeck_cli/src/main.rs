//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskdeck_core` linkage and the
//!   configured store.
//! - Keep output deterministic for quick local sanity checks.

use std::process::ExitCode;
use taskdeck_core::{core_version, init_logging, CoreConfig, TaskEngine};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("taskdeck: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(dir) = &config.log_dir {
        init_logging(&config.log_level, &dir.to_string_lossy())?;
    }

    println!("taskdeck_core version={}", core_version());
    println!(
        "taskdeck_core backend={} key={}",
        config.backend.as_str(),
        config.storage_key
    );

    let store = config.open_store().map_err(|err| err.to_string())?;
    let engine = TaskEngine::open_default(store);
    let snapshot = engine.snapshot();

    if snapshot.is_empty() {
        println!("(no tasks)");
    }
    for item in &snapshot.items {
        let mark = if item.task.completed { "x" } else { " " };
        let flag = if item.due_soon_highlight { " !" } else { "" };
        println!(
            "[{mark}] {} | {} | {}{flag}",
            item.task.id, item.task.text, item.due_label
        );
    }
    println!("{}", snapshot.stats);
    Ok(())
}
