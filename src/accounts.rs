use std::io;

use anyhow::Result;
use clap::{arg, ArgMatches, Command};

use crate::cli;
use crate::display::print_accounts;
use crate::model::AccountField;
use crate::query::{Direction, Query};
use crate::store::MemoryStore;

pub(crate) fn command() -> Command<'static> {
    Command::new("accounts")
        .about("Prints tracked accounts to stdout.")
        .arg(arg!(query: -q --query [TEXT] "Matches account or institution name."))
        .args(cli::sort_args())
}

pub(crate) fn run(matches: &ArgMatches, store: &MemoryStore) -> Result<()> {
    let mut query = Query::new().search(matches.value_of("query").unwrap_or_default());
    query = if matches.is_present("sort") {
        cli::sorted(matches, query)?
    } else {
        query.sort_by(AccountField::Institution, Direction::Ascending)
    };

    print_accounts(io::stdout(), &query.run(store.accounts().records()))
}
