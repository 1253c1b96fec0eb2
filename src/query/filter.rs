use chrono::NaiveDate;

use crate::model::{parse_date, Record, Value};

/// Sentinel a categorical picker uses for "no constraint".
pub const ALL: &str = "all";

/// One conjunctive constraint over a record field. Range bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter<F> {
    Equals {
        field: F,
        value: String,
    },
    Between {
        field: F,
        min: Option<f64>,
        max: Option<f64>,
    },
    Within {
        field: F,
        from: Option<NaiveDate>,
        until: Option<NaiveDate>,
    },
}

impl<F: Copy> Filter<F> {
    /// `None` for the `all` sentinel or an empty value.
    pub fn equals(field: F, value: &str) -> Option<Self> {
        if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
            return None;
        }

        Some(Filter::Equals {
            field,
            value: value.to_string(),
        })
    }

    pub fn between(field: F, min: Option<f64>, max: Option<f64>) -> Option<Self> {
        if min.is_none() && max.is_none() {
            return None;
        }

        Some(Filter::Between { field, min, max })
    }

    pub fn within(field: F, from: Option<NaiveDate>, until: Option<NaiveDate>) -> Option<Self> {
        if from.is_none() && until.is_none() {
            return None;
        }

        Some(Filter::Within { field, from, until })
    }

    pub fn matches<R: Record<Field = F>>(&self, record: &R) -> bool {
        match self {
            Filter::Equals { field, value } => equals(record.value(*field), value),
            Filter::Between { field, min, max } => match number(record.value(*field)) {
                Some(n) => min.map_or(true, |m| n >= m) && max.map_or(true, |m| n <= m),
                None => false,
            },
            Filter::Within { field, from, until } => match date(record.value(*field)) {
                Some(d) => from.map_or(true, |f| d >= f) && until.map_or(true, |u| d <= u),
                None => false,
            },
        }
    }
}

fn equals(value: Value<'_>, expected: &str) -> bool {
    match value {
        Value::Text(s) => s == expected,
        Value::Number(n) => expected.trim().parse::<f64>().map_or(false, |e| e == n),
        Value::Date(s) => match (parse_date(s), parse_date(expected)) {
            (Some(a), Some(b)) => a == b,
            _ => s == expected,
        },
    }
}

fn number(value: Value<'_>) -> Option<f64> {
    match value {
        Value::Number(n) => Some(n),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Date(_) => None,
    }
}

fn date(value: Value<'_>) -> Option<NaiveDate> {
    match value {
        Value::Date(s) | Value::Text(s) => parse_date(s),
        Value::Number(_) => None,
    }
}
