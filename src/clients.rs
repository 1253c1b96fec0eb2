use std::io;

use anyhow::{bail, Context, Result};
use clap::{arg, Arg, ArgMatches, Command};
use tracing::{debug, info};

use crate::bulk::{self, BulkOp};
use crate::cli;
use crate::display::print_clients;
use crate::model::{ClientField, ClientStatus};
use crate::query::{Filter, Page, Query, ALL};
use crate::settings::Settings;
use crate::store::MemoryStore;
use crate::validate::ClientForm;

fn filter_args() -> Vec<Arg<'static>> {
    vec![
        arg!(query: -q --query [TEXT] "Matches name, company or email, ignoring case."),
        arg!(status: --status [STATUS] "Only clients with this status, or all."),
    ]
}

pub(crate) fn command() -> Command<'static> {
    Command::new("clients")
        .about("Lists and manages clients.")
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about("Prints a page of clients matching the filters.")
                .args(filter_args())
                .args(cli::sort_args())
                .arg(arg!(page: --page [N] "The page to print, starting at 1.")),
        )
        .subcommand(
            Command::new("add")
                .about("Adds a client.")
                .arg(arg!(name: --name [NAME] "Client name."))
                .arg(arg!(email: --email [EMAIL] "Contact email address."))
                .arg(arg!(company: --company [COMPANY] "Company the client works for."))
                .arg(arg!(status: --status [STATUS] "Active, Pending or Inactive, defaults to Active."))
                .arg(arg!(revenue: --revenue [AMOUNT] "Revenue to date, defaults to 0.")),
        )
        .subcommand(
            Command::new("edit")
                .about("Edits one field of a client, reading the new value from stdin.")
                .arg(arg!(id: <ID> "The client to edit."))
                .arg(arg!(field: <FIELD> "name, email, company, status, revenue or lastContact.")),
        )
        .subcommand(
            Command::new("set-status")
                .about("Sets the status of the selected clients.")
                .arg(arg!(value: <STATUS> "Active, Pending or Inactive."))
                .args(filter_args())
                .args(cli::target_args()),
        )
        .subcommand(
            Command::new("delete")
                .about("Deletes the selected clients.")
                .args(filter_args())
                .args(cli::target_args()),
        )
}

fn status_filter(matches: &ArgMatches) -> Result<Option<Filter<ClientField>>> {
    match matches.value_of("status") {
        Some(raw) if !raw.eq_ignore_ascii_case(ALL) => {
            let status: ClientStatus = raw.parse()?;
            Ok(Filter::equals(ClientField::Status, status.as_str()))
        }
        _ => Ok(None),
    }
}

fn filtered(matches: &ArgMatches) -> Result<Query<ClientField>> {
    Ok(Query::new()
        .search(matches.value_of("query").unwrap_or_default())
        .filter(status_filter(matches)?))
}

#[tracing::instrument(skip_all)]
fn list(matches: &ArgMatches, settings: &Settings, store: &MemoryStore) -> Result<()> {
    let query = cli::sorted(matches, filtered(matches)?)?;
    if let Some(sort) = query.sort() {
        debug!(field = %sort.field, direction = %sort.direction, "sorting clients");
    }

    let page = Page::of(
        query.run(store.clients().records()),
        cli::page_number(matches)?,
        settings.page_size,
    );

    print_clients(io::stdout(), &page)
}

#[tracing::instrument(skip_all)]
fn add(matches: &ArgMatches, store: &mut MemoryStore) -> Result<()> {
    let value = |name: &str| matches.value_of(name).unwrap_or_default().to_string();
    let form = ClientForm {
        name: value("name"),
        email: value("email"),
        company: value("company"),
        status: value("status"),
        revenue: value("revenue"),
    };

    let submitted = form.submit(|client| {
        let id = client.id.clone();
        store.clients_mut().insert(client).map(|_| id)
    });
    let id = match submitted {
        Ok(inserted) => inserted?,
        Err(errors) => bail!("{} invalid field(s): {}", errors.len(), errors),
    };
    store.persist()?;

    info!("Added client {}.", id);
    println!("{}", id);

    Ok(())
}

fn edit(matches: &ArgMatches, store: &mut MemoryStore) -> Result<()> {
    let id = matches.value_of("id").context("a client id is required")?;
    let field = cli::parse_opt::<ClientField>(matches, "field")?.context("a field is required")?;

    let stdin = io::stdin();
    let outcome = cli::edit_field(store.clients_mut(), id, field, stdin.lock(), io::stdout())?;

    cli::finish_edit(store, outcome)
}

#[tracing::instrument(skip(matches, store))]
fn apply(matches: &ArgMatches, store: &mut MemoryStore, op: BulkOp<ClientField>) -> Result<()> {
    let query = filtered(matches)?;
    let mut selection = {
        let table = store.clients();
        let view = query.run(table.records());
        cli::select(matches, table, &view)?
    };

    let affected = bulk::apply(store.clients_mut(), &mut selection, &op)?;
    store.persist()?;
    println!("Applied {} to {} clients.", op, affected);

    Ok(())
}

pub(crate) fn run(matches: &ArgMatches, settings: &Settings, store: &mut MemoryStore) -> Result<()> {
    match matches.subcommand() {
        Some(("list", list_matches)) => list(list_matches, settings, store),
        Some(("add", add_matches)) => add(add_matches, store),
        Some(("edit", edit_matches)) => edit(edit_matches, store),
        Some(("set-status", bulk_matches)) => {
            let value = bulk_matches.value_of("value").unwrap_or_default();
            apply(
                bulk_matches,
                store,
                BulkOp::Assign {
                    field: ClientField::Status,
                    value: value.to_string(),
                },
            )
        }
        Some(("delete", bulk_matches)) => apply(bulk_matches, store, BulkOp::Delete),
        None => unreachable!("command is required"),
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::tests::settings;
    use crate::store::tests::sample_snapshot;

    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::from_snapshot(sample_snapshot()).unwrap()
    }

    fn parse(args: &[&str]) -> ArgMatches {
        command().get_matches_from(std::iter::once("clients").chain(args.iter().copied()))
    }

    fn subcommand(args: &[&str]) -> ArgMatches {
        match parse(args).subcommand() {
            Some((_, sub)) => sub.clone(),
            None => unreachable!(),
        }
    }

    #[test]
    fn status_filter_accepts_any_case_and_all() {
        let m = subcommand(&["list", "--status", "pending"]);
        assert_eq!(
            status_filter(&m).unwrap(),
            Filter::equals(ClientField::Status, "Pending")
        );

        let m = subcommand(&["list", "--status", "All"]);
        assert_eq!(status_filter(&m).unwrap(), None);

        let m = subcommand(&["list", "--status", "vip"]);
        assert!(status_filter(&m).is_err());
    }

    #[test]
    fn add_validates_before_inserting() {
        let mut store = store();

        let err = run(&parse(&["add", "--email", "grace@navy.mil"]), &settings(), &mut store)
            .unwrap_err();
        assert!(err.to_string().contains("name"));
        assert_eq!(store.clients().len(), 1);

        run(
            &parse(&["add", "--name", "Grace", "--email", "grace@navy.mil"]),
            &settings(),
            &mut store,
        )
        .unwrap();
        assert_eq!(store.clients().len(), 2);
    }

    #[test]
    fn set_status_over_filtered_view() {
        let mut store = store();
        run(
            &parse(&["set-status", "Inactive", "--all", "-q", "ada"]),
            &settings(),
            &mut store,
        )
        .unwrap();

        assert_eq!(
            store.clients().get("c1").unwrap().status,
            ClientStatus::Inactive
        );
    }

    #[test]
    fn set_status_rejects_unknown_status() {
        let mut store = store();
        assert!(run(&parse(&["set-status", "VIP", "--ids", "c1"]), &settings(), &mut store).is_err());
        assert_eq!(store.clients().get("c1").unwrap().status, ClientStatus::Active);
    }

    #[test]
    fn delete_by_ids() {
        let mut store = store();
        run(&parse(&["delete", "--ids", "c1"]), &settings(), &mut store).unwrap();
        assert!(store.clients().is_empty());
    }

    #[test]
    fn delete_requires_a_target() {
        let mut store = store();
        assert!(run(&parse(&["delete"]), &settings(), &mut store).is_err());
        assert_eq!(store.clients().len(), 1);
    }
}
