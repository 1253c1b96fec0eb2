mod accounts;
mod bulk;
mod cli;
mod clients;
mod display;
mod edit;
mod insight;
mod model;
mod query;
mod selection;
mod settings;
mod store;
mod summary;
mod txn;
mod validate;

use anyhow::{Context, Result};
use clap::{arg, Command};
use tracing::debug;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::settings::Settings;
use crate::store::MemoryStore;

static CLIENT_NAME: &str = "prospera";

async fn run() -> Result<()> {
    let app = Command::new(CLIENT_NAME)
        .about("The prospera utility keeps clients, accounts and transactions in a local \
         data file and lets you search, sort, edit and bulk update them.")
        .version("0.1.0")
        .subcommand_required(true)
        .allow_external_subcommands(false)
        .arg(arg!(CONFIG: -c --config [FILE] "Sets a custom config file"))
        .arg(arg!(DATA: -d --data [FILE] "Reads and writes records from this data file"))
        .arg(arg!(verbose: -v --verbose "Logs what each command is doing"))
        .subcommand(clients::command())
        .subcommand(txn::command())
        .subcommand(accounts::command())
        .subcommand(Command::new("summary").about("Prints this month's dashboard figures."))
        .subcommand(Command::new("insight")
            .about("Asks the configured advice endpoint for a short insight on this month's figures."));

    let matches = app.get_matches();

    if matches.is_present("verbose") {
        tracing_subscriber::registry()
            .with(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let settings = Settings::new(matches.value_of("CONFIG")).context("reading settings")?;
    let data_file = matches.value_of("DATA").unwrap_or(&settings.data_file);
    debug!(data_file, "opening store");
    let mut store = MemoryStore::open(data_file)
        .with_context(|| format!("opening data file {}", data_file))?;

    match matches.subcommand() {
        Some(("clients", sub_matches)) => clients::run(sub_matches, &settings, &mut store)?,
        Some(("transactions", sub_matches)) => txn::run(sub_matches, &settings, &mut store)?,
        Some(("accounts", sub_matches)) => accounts::run(sub_matches, &store)?,
        Some(("summary", _)) => insight::summary(&store)?,
        Some(("insight", _)) => insight::run(&settings, &store).await?,
        None => unreachable!("subcommand is required"),
        _ => unreachable!(),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        println!("{:#}", err);
        std::process::exit(1);
    }
}
