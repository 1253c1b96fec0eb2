use std::io;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{arg, Arg, ArgMatches, Command};
use tracing::{debug, info};

use crate::bulk::{self, BulkOp};
use crate::cli;
use crate::display::print_transactions;
use crate::model::{parse_date, TxnField, TxnKind, TxnStatus};
use crate::query::{Filter, Page, Query, ALL};
use crate::settings::Settings;
use crate::store::MemoryStore;
use crate::validate::TransactionForm;

fn filter_args() -> Vec<Arg<'static>> {
    vec![
        arg!(query: -q --query [TEXT] "Matches payee or category, ignoring case."),
        arg!(category: --category [CATEGORY] "Only this category, or all."),
        arg!(kind: --type [TYPE] "income, expense or all."),
        arg!(status: --status [STATUS] "cleared, pending or all."),
        arg!(account: --account [ACCOUNT_ID] "Only transactions of this account, or all."),
        arg!(from: --from [DATE] "The first day to include. Inclusive."),
        arg!(until: --until [DATE] "The last day to include. Inclusive."),
        arg!(min: --min [AMOUNT] "Smallest amount to include."),
        arg!(max: --max [AMOUNT] "Largest amount to include."),
    ]
}

pub(crate) fn command() -> Command<'static> {
    Command::new("transactions")
        .about("Lists and manages transactions.")
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about("Prints a page of transactions matching the filters.")
                .args(filter_args())
                .args(cli::sort_args())
                .arg(arg!(page: --page [N] "The page to print, starting at 1.")),
        )
        .subcommand(
            Command::new("add")
                .about("Records a transaction.")
                .arg(arg!(date: --date [DATE] "Day of the transaction, defaults to today."))
                .arg(arg!(payee: --payee [PAYEE] "Who was paid, or who paid."))
                .arg(arg!(category: --category [CATEGORY] "Spending or income category."))
                .arg(arg!(amount: --amount [AMOUNT] "Positive amount."))
                .arg(arg!(kind: --type [TYPE] "income or expense."))
                .arg(arg!(account: --account [ACCOUNT_ID] "The account the transaction belongs to."))
                .arg(arg!(status: --status [STATUS] "cleared or pending, defaults to cleared.")),
        )
        .subcommand(
            Command::new("edit")
                .about("Edits one field of a transaction, reading the new value from stdin.")
                .arg(arg!(id: <ID> "The transaction to edit."))
                .arg(arg!(field: <FIELD> "date, payee, category, amount, type, accountId or status.")),
        )
        .subcommand(
            Command::new("recategorize")
                .about("Moves the selected transactions to a category.")
                .arg(arg!(value: <CATEGORY> "The new category."))
                .args(filter_args())
                .args(cli::target_args()),
        )
        .subcommand(
            Command::new("set-status")
                .about("Marks the selected transactions cleared or pending.")
                .arg(arg!(value: <STATUS> "cleared or pending."))
                .args(filter_args())
                .args(cli::target_args()),
        )
        .subcommand(
            Command::new("delete")
                .about("Deletes the selected transactions.")
                .args(filter_args())
                .args(cli::target_args()),
        )
}

/// A categorical option, with `all` meaning no constraint.
fn picked<'a>(matches: &'a ArgMatches, name: &str) -> Option<&'a str> {
    matches
        .value_of(name)
        .filter(|v| !v.eq_ignore_ascii_case(ALL))
}

fn day(matches: &ArgMatches, name: &str) -> Result<Option<NaiveDate>> {
    matches
        .value_of(name)
        .map(|raw| parse_date(raw).ok_or_else(|| anyhow!("invalid --{} date {:?}", name, raw)))
        .transpose()
}

fn filtered(matches: &ArgMatches) -> Result<Query<TxnField>> {
    let kind = picked(matches, "kind").map(str::parse::<TxnKind>).transpose()?;
    let status = picked(matches, "status").map(str::parse::<TxnStatus>).transpose()?;

    Ok(Query::new()
        .search(matches.value_of("query").unwrap_or_default())
        .filter(picked(matches, "category").and_then(|c| Filter::equals(TxnField::Category, c)))
        .filter(kind.and_then(|k| Filter::equals(TxnField::Kind, k.as_str())))
        .filter(status.and_then(|s| Filter::equals(TxnField::Status, s.as_str())))
        .filter(picked(matches, "account").and_then(|a| Filter::equals(TxnField::Account, a)))
        .filter(Filter::within(
            TxnField::Date,
            day(matches, "from")?,
            day(matches, "until")?,
        ))
        .filter(Filter::between(
            TxnField::Amount,
            cli::parse_opt(matches, "min")?,
            cli::parse_opt(matches, "max")?,
        )))
}

#[tracing::instrument(skip_all)]
fn list(matches: &ArgMatches, settings: &Settings, store: &MemoryStore) -> Result<()> {
    let query = cli::sorted(matches, filtered(matches)?)?;
    if let Some(sort) = query.sort() {
        debug!(field = %sort.field, direction = %sort.direction, "sorting transactions");
    }

    let page = Page::of(
        query.run(store.txns().records()),
        cli::page_number(matches)?,
        settings.page_size,
    );

    print_transactions(io::stdout(), &page, store.accounts())
}

#[tracing::instrument(skip_all)]
fn add(matches: &ArgMatches, store: &mut MemoryStore) -> Result<()> {
    let value = |name: &str| matches.value_of(name).unwrap_or_default().to_string();
    let form = TransactionForm {
        date: value("date"),
        payee: value("payee"),
        category: value("category"),
        amount: value("amount"),
        kind: value("kind"),
        account_id: value("account"),
        status: value("status"),
    };

    let (accounts, txns) = store.ledger_mut();
    let submitted = form.submit(accounts, |txn| {
        let id = txn.id.clone();
        txns.insert(txn).map(|_| id)
    });
    let id = match submitted {
        Ok(inserted) => inserted?,
        Err(errors) => {
            let mut hint = String::new();
            if errors.get("accountId").is_some() && !accounts.is_empty() {
                let known: Vec<&str> = accounts.records().iter().map(|a| a.id.as_str()).collect();
                hint = format!(" (known accounts: {})", known.join(", "));
            }
            bail!("{} invalid field(s): {}{}", errors.len(), errors, hint)
        }
    };
    store.persist()?;

    info!("Recorded transaction {}.", id);
    println!("{}", id);

    Ok(())
}

fn edit(matches: &ArgMatches, store: &mut MemoryStore) -> Result<()> {
    let id = matches
        .value_of("id")
        .context("a transaction id is required")?;
    let field = cli::parse_opt::<TxnField>(matches, "field")?.context("a field is required")?;

    let stdin = io::stdin();
    let outcome = cli::edit_field(store.txns_mut(), id, field, stdin.lock(), io::stdout())?;

    cli::finish_edit(store, outcome)
}

#[tracing::instrument(skip(matches, store))]
fn apply(matches: &ArgMatches, store: &mut MemoryStore, op: BulkOp<TxnField>) -> Result<()> {
    let query = filtered(matches)?;
    let mut selection = {
        let table = store.txns();
        let view = query.run(table.records());
        cli::select(matches, table, &view)?
    };

    let affected = bulk::apply(store.txns_mut(), &mut selection, &op)?;
    store.persist()?;
    println!("Applied {} to {} transactions.", op, affected);

    Ok(())
}

fn assign(matches: &ArgMatches, field: TxnField) -> BulkOp<TxnField> {
    BulkOp::Assign {
        field,
        value: matches.value_of("value").unwrap_or_default().to_string(),
    }
}

pub(crate) fn run(matches: &ArgMatches, settings: &Settings, store: &mut MemoryStore) -> Result<()> {
    match matches.subcommand() {
        Some(("list", list_matches)) => list(list_matches, settings, store),
        Some(("add", add_matches)) => add(add_matches, store),
        Some(("edit", edit_matches)) => edit(edit_matches, store),
        Some(("recategorize", bulk_matches)) => {
            apply(bulk_matches, store, assign(bulk_matches, TxnField::Category))
        }
        Some(("set-status", bulk_matches)) => {
            apply(bulk_matches, store, assign(bulk_matches, TxnField::Status))
        }
        Some(("delete", bulk_matches)) => apply(bulk_matches, store, BulkOp::Delete),
        None => unreachable!("command is required"),
        _ => unreachable!(),
    }
}
