//! Pieces shared by the `clients` and `transactions` command trees.

use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use clap::{arg, Arg, ArgMatches};
use tracing::debug;

use crate::edit::{CellState, EditCell, Key, Outcome};
use crate::model::Record;
use crate::query::{Direction, Query};
use crate::selection::Selection;
use crate::store::{MemoryStore, Table};

pub(crate) fn sort_args() -> Vec<Arg<'static>> {
    vec![
        arg!(sort: --sort [FIELD] "Sorts the listing by the given field."),
        arg!(desc: --desc "Sorts in descending order."),
        arg!(order: --order [ORDER] "Sort direction, asc or desc.").conflicts_with("desc"),
    ]
}

pub(crate) fn target_args() -> Vec<Arg<'static>> {
    vec![
        arg!(ids: --ids [IDS] "Comma separated record IDs to operate on."),
        arg!(all: --all "Operates on every record matching the list filters.")
            .conflicts_with("ids"),
    ]
}

pub(crate) fn parse_opt<T>(matches: &ArgMatches, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    matches
        .value_of(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| anyhow!("invalid --{} {:?}: {}", name, raw, e))
        })
        .transpose()
}

/// Apply `--sort`, `--desc` and `--order` to a query.
pub(crate) fn sorted<F>(matches: &ArgMatches, query: Query<F>) -> Result<Query<F>>
where
    F: Copy + FromStr,
    F::Err: std::fmt::Display,
{
    let field = match parse_opt::<F>(matches, "sort")? {
        Some(field) => field,
        None => return Ok(query),
    };

    let direction = if matches.is_present("desc") {
        Direction::Descending
    } else {
        parse_opt::<Direction>(matches, "order")?.unwrap_or_default()
    };

    Ok(query.sort_by(field, direction))
}

pub(crate) fn page_number(matches: &ArgMatches) -> Result<usize> {
    Ok(parse_opt::<usize>(matches, "page")?.unwrap_or(1))
}

/// Build the selection named by `--ids` or `--all` over the filtered view.
pub(crate) fn select<R: Record>(
    matches: &ArgMatches,
    table: &Table<R>,
    view: &[&R],
) -> Result<Selection> {
    let mut selection = Selection::new();

    if matches.is_present("all") {
        selection.toggle_all(view);
    } else if let Some(ids) = matches.value_of("ids") {
        for id in ids.split(',').map(str::trim).filter(|id| !id.is_empty()) {
            if !selection.contains(id) {
                selection.toggle(id);
            }
        }
        selection.retain_existing(table);
    } else {
        bail!("pass --ids or --all to choose records");
    }

    if selection.is_empty() {
        bail!("no records matched the selection");
    }
    debug!(ids = ?selection.ids().collect::<Vec<_>>(), "selected");

    Ok(selection)
}

/// Drive an [`EditCell`] over one record field from line input.
///
/// Each line is a draft committed as with Enter, a trailing unterminated line
/// commits as a blur would, and end of input reverts as with Escape. A rejected
/// draft prompts again.
pub(crate) fn edit_field<R, I, W>(
    table: &mut Table<R>,
    id: &str,
    field: R::Field,
    mut input: I,
    mut out: W,
) -> Result<Outcome>
where
    R: Record,
    I: BufRead,
    W: Write,
{
    let current = table
        .get(id)
        .ok_or_else(|| anyhow!("no record with id {}", id))?
        .value(field)
        .text()
        .into_owned();

    let mut cell = EditCell::new(current);
    cell.focus();

    loop {
        if let Some(err) = cell.error() {
            writeln!(out, "error: {}", err)?;
        }
        write!(out, "{} [{}]: ", field, cell.value())?;
        out.flush()?;

        let mut line = String::new();
        let read = input.read_line(&mut line).context("reading edit input")?;
        let commit = |draft: &str| table.update_field(id, field, draft);
        let outcome = if read == 0 {
            cell.key(Key::Escape, commit)
        } else if line.ends_with('\n') {
            cell.set_draft(line.trim_end_matches(&['\r', '\n'][..]));
            cell.key(Key::Enter, commit)
        } else {
            // Input ended mid-line: treat it as leaving the cell.
            cell.set_draft(line);
            cell.blur(commit)
        };

        if !matches!(cell.state(), CellState::Editing { .. }) {
            return Ok(outcome);
        }
    }
}

/// Persist a committed edit and report how the edit ended.
pub(crate) fn finish_edit(store: &MemoryStore, outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Committed => {
            store.persist()?;
            println!("\nSaved.");
        }
        Outcome::Unchanged => println!("\nNo change."),
        Outcome::Reverted => println!("\nEdit cancelled."),
        Outcome::Ignored | Outcome::Rejected(_) => {}
    }

    Ok(())
}
