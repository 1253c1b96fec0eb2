use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use prospera_advice::{spawn_insight, GenerativeClient};
use tracing::info;

use crate::display::print_summary;
use crate::settings::Settings;
use crate::store::MemoryStore;
use crate::summary::overview;

pub(crate) fn summary(store: &MemoryStore) -> Result<()> {
    print_summary(io::stdout(), &overview(store, Local::now().date_naive()))
}

/// Ask the advice endpoint about this month's figures. Ctrl-C abandons the
/// request.
#[tracing::instrument(skip_all)]
pub(crate) async fn run(settings: &Settings, store: &MemoryStore) -> Result<()> {
    let snapshot = overview(store, Local::now().date_naive());
    let client = GenerativeClient::new(settings.advice.options())
        .context("building advice client")?;

    let mut handle = spawn_insight(Arc::new(client), snapshot);
    tokio::select! {
        text = handle.wait() => {
            if let Some(text) = text {
                println!("{}", text);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Insight request cancelled.");
        }
    }

    Ok(())
}
