//! Device store inspection CLI.
//!
//! # Responsibility
//! - Verify `abralas_core` linkage without a UI runtime.
//! - Read and mutate a device store file the same way the dashboard does.

use abralas_core::db::{open_db, open_db_in_memory};
use abralas_core::{
    core_version, default_log_level, init_logging, ping, SqliteKeyValueStore, StorageCapability,
    StoryStore,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "abralas")]
#[command(about = "Inspect and edit an Abralas device story store")]
struct Cli {
    /// Device store file; an ephemeral in-memory store is used when omitted
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core health and version
    Ping,
    /// Print the feed, newest first
    Load,
    /// Submit a new story
    Submit {
        #[arg(short, long)]
        name: Option<String>,
        content: String,
    },
    /// Send one unit of energy to a story
    Endorse { id: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(default_log_level(), log_dir).map_err(anyhow::Error::msg)?;
    }

    let command = cli.command.unwrap_or(Commands::Ping);
    if let Commands::Ping = command {
        println!("abralas_core ping={}", ping());
        println!("abralas_core version={}", core_version());
        return Ok(());
    }

    let conn = match cli.db.as_ref() {
        Some(path) => open_db(path)
            .with_context(|| format!("failed to open device store `{}`", path.display()))?,
        None => open_db_in_memory().context("failed to open in-memory store")?,
    };
    let store = StoryStore::new(StorageCapability::Available(
        SqliteKeyValueStore::try_new(&conn)?,
    ));

    match command {
        Commands::Ping => {}
        Commands::Load => {
            for story in store.load() {
                println!(
                    "{}\t{}\t{}\t⚡{}\t{}",
                    story.id,
                    story.date.to_rfc3339(),
                    story.name,
                    story.energy,
                    story.content
                );
            }
        }
        Commands::Submit { name, content } => {
            let story = store.submit(name.as_deref(), Some(content.as_str()))?;
            println!("submitted id={}", story.id);
        }
        Commands::Endorse { id } => {
            let energy = store.endorse(&id)?;
            println!("endorsed id={id} energy={energy}");
        }
    }

    Ok(())
}
