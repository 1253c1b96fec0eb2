use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::model::{parse_instant, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        })
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Ascending),
            "desc" | "descending" => Ok(Direction::Descending),
            other => Err(format!("unknown sort direction {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
    pub field: F,
    pub direction: Direction,
}

/// Compare two values of the same field.
///
/// Text collates like a dictionary: accents and case are ignored first, then
/// unaccented before accented, then lowercase before uppercase. Numbers
/// compare numerically, dates by parsed instant. Unparseable dates always
/// order after valid ones, whichever the direction.
pub(crate) fn compare(a: Value<'_>, b: Value<'_>, direction: Direction) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => direction.apply(x.total_cmp(&y)),
        (Value::Date(x), Value::Date(y)) => match (parse_instant(x), parse_instant(y)) {
            (Some(x), Some(y)) => direction.apply(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        (a, b) => direction.apply(collate(&a.text(), &b.text())),
    }
}

fn collate(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| accented(a).cmp(accented(b)))
        .then_with(|| lower_first(a).cmp(lower_first(b)))
}

/// Base letters only, lowercased.
fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn accented(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

fn lower_first(s: &str) -> impl Iterator<Item = (bool, char)> + '_ {
    s.nfd().map(|c| (c.is_uppercase(), c))
}
