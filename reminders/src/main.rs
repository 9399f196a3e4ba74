//! Command-line demo for reminder lists.
//!
//! Opens (or seeds) the store in `REMINDERS_DATA_DIR`, prints the current
//! list, checks off the first open item and prints the progress.

use anyhow::Context;
use reminders::{Config, FileStorage, ReminderEnvironment, ReminderList, Reminders};
use reminders_core::environment::{SystemClock, UuidIdGenerator};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn print_list(list: &ReminderList) {
    println!("{} {} ({})", list.emoji, list.name, list.color);
    for group in list.items_by_category() {
        println!("  {}", group.category);
        for item in &group.items {
            let status = if item.is_checked { "✓" } else { " " };
            println!("    [{status}] {}", item.title);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        data_dir = %config.storage.data_dir.display(),
        key = %config.storage.key,
        persistence = ?config.persistence,
        "Starting reminders"
    );

    let env = ReminderEnvironment::new(
        Arc::new(SystemClock),
        Arc::new(UuidIdGenerator),
        Arc::new(FileStorage::new(&config.storage.data_dir)),
    )
    .with_storage_key(config.storage.key.clone())
    .with_persistence(config.persistence);

    let reminders = Reminders::open(env).await;
    tracing::info!(source = ?reminders.load_source(), "Reminder state ready");

    let snapshot = reminders.snapshot().await;
    println!("=== Reminder Lists ===\n");
    for list in snapshot.lists.iter() {
        let marker = if Some(&list.id) == snapshot.current_list_id.as_ref() { "*" } else { " " };
        let progress = list.progress();
        println!(
            "{marker} {} {} {}/{}",
            list.emoji, list.name, progress.completed, progress.total
        );
    }

    let Some(current) = reminders.current_list().await else {
        println!("\nNo list selected.");
        reminders
            .shutdown(config.shutdown_timeout())
            .await
            .context("failed to shut down cleanly")?;
        return Ok(());
    };

    println!();
    print_list(&current);

    match current.items.iter().find(|item| !item.is_checked) {
        Some(item) => {
            println!("\nChecking off '{}'...", item.title);
            reminders.toggle_item(&item.id).await?;
        },
        None => {
            println!("\nEverything checked, resetting...");
            reminders.reset_all_items().await?;
        },
    }

    let progress = reminders.total_progress().await;
    println!(
        "Progress: {}/{} ({} left)",
        progress.completed,
        progress.total,
        progress.remaining()
    );

    reminders
        .shutdown(config.shutdown_timeout())
        .await
        .context("failed to shut down cleanly")?;
    Ok(())
}
