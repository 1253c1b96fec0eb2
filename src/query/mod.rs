//! Filter, sort and paginate a record collection into a visible view.
//!
//! A [`Query`] is a pure read: running it never touches the source slice and
//! always yields a freshly ordered sequence of borrows, so it can be re-run on
//! every keystroke.

mod filter;
mod sort;

use crate::model::Record;

pub use filter::{Filter, ALL};
pub use sort::{Direction, Sort};

#[derive(Debug, Clone)]
pub struct Query<F> {
    text: String,
    filters: Vec<Filter<F>>,
    sort: Option<Sort<F>>,
}

impl<F> Default for Query<F> {
    fn default() -> Self {
        Self {
            text: String::new(),
            filters: vec![],
            sort: None,
        }
    }
}

impl<F: Copy> Query<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    /// Add a constraint. `None` (an "all" picker) adds nothing.
    pub fn filter<T: Into<Option<Filter<F>>>>(mut self, filter: T) -> Self {
        if let Some(filter) = filter.into() {
            self.filters.push(filter);
        }
        self
    }

    pub fn sort_by(mut self, field: F, direction: Direction) -> Self {
        self.sort = Some(Sort { field, direction });
        self
    }

    pub fn sort(&self) -> Option<&Sort<F>> {
        self.sort.as_ref()
    }

    pub fn matches<R: Record<Field = F>>(&self, record: &R) -> bool {
        self.matches_text(record) && self.filters.iter().all(|f| f.matches(record))
    }

    fn matches_text<R: Record<Field = F>>(&self, record: &R) -> bool {
        if self.text.is_empty() {
            return true;
        }

        let needle = self.text.to_lowercase();
        R::SEARCHABLE
            .iter()
            .any(|field| record.value(*field).text().to_lowercase().contains(&needle))
    }

    pub fn run<'a, R: Record<Field = F>>(&self, records: &'a [R]) -> Vec<&'a R> {
        let mut view: Vec<&'a R> = records.iter().filter(|r| self.matches(*r)).collect();

        if let Some(Sort { field, direction }) = self.sort {
            view.sort_by(|a, b| sort::compare(a.value(field), b.value(field), direction));
        }

        view
    }
}

#[derive(Debug)]
pub struct Page<'a, R> {
    pub items: Vec<&'a R>,
    /// 1-based.
    pub number: usize,
    pub per_page: usize,
    pub total: usize,
}

impl<'a, R> Page<'a, R> {
    pub fn of(view: Vec<&'a R>, number: usize, per_page: usize) -> Self {
        let number = number.max(1);
        let per_page = per_page.max(1);
        let total = view.len();
        let items = view
            .into_iter()
            .skip((number - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        Self {
            items,
            number,
            per_page,
            total,
        }
    }

    pub fn total_pages(&self) -> usize {
        ((self.total + self.per_page - 1) / self.per_page).max(1)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use proptest::prelude::*;

    use crate::model::{Client, ClientField, ClientStatus, Transaction, TxnField, TxnKind, TxnStatus};

    use super::*;

    fn txn(id: &str, payee: &str, category: &str, amount: f64, kind: TxnKind, date: &str) -> Transaction {
        Transaction {
            id: id.into(),
            date: date.into(),
            payee: payee.into(),
            category: category.into(),
            amount,
            kind,
            account_id: "acc-1".into(),
            status: TxnStatus::Cleared,
        }
    }

    fn coffee_and_salary() -> Vec<Transaction> {
        vec![
            txn("1", "Coffee", "Food", 5.4, TxnKind::Expense, "2024-01-05"),
            txn("2", "Salary", "Income", 4200.0, TxnKind::Income, "2024-01-01"),
        ]
    }

    fn ids<R: Record>(view: &[&R]) -> Vec<String> {
        view.iter().map(|r| r.id().to_string()).collect()
    }

    fn client(id: &str, name: &str, company: &str, status: ClientStatus, revenue: f64, last: &str) -> Client {
        Client {
            id: id.into(),
            name: name.into(),
            email: format!("{}@mail.test", id),
            company: company.into(),
            status,
            revenue,
            last_contact: last.into(),
        }
    }

    #[test]
    fn search_matches_payee_case_insensitively() {
        let txns = coffee_and_salary();
        let view = Query::new().search("sal").run(&txns);
        assert_eq!(ids(&view), vec!["2"]);
    }

    #[test]
    fn date_ascending_orders_by_instant() {
        let txns = coffee_and_salary();
        let view = Query::new()
            .sort_by(TxnField::Date, Direction::Ascending)
            .run(&txns);
        assert_eq!(ids(&view), vec!["2", "1"]);
    }

    #[test]
    fn search_covers_category() {
        let txns = coffee_and_salary();
        assert_eq!(ids(&Query::new().search("FOOD").run(&txns)), vec!["1"]);
    }

    #[test]
    fn empty_collection_is_empty_view() {
        let txns: Vec<Transaction> = vec![];
        assert!(Query::new().search("x").run(&txns).is_empty());
    }

    #[test]
    fn filters_are_conjunctive() {
        let clients = vec![
            client("a", "Ann", "Acme", ClientStatus::Active, 100.0, "2024-01-01"),
            client("b", "Bob", "Acme", ClientStatus::Pending, 900.0, "2024-02-01"),
            client("c", "Cid", "Initech", ClientStatus::Active, 500.0, "2024-03-01"),
        ];

        let view = Query::new()
            .search("acme")
            .filter(Filter::equals(ClientField::Status, "Active"))
            .run(&clients);
        assert_eq!(ids(&view), vec!["a"]);

        let view = Query::new()
            .filter(Filter::equals(ClientField::Status, ALL))
            .filter(Filter::between(ClientField::Revenue, Some(100.0), Some(500.0)))
            .run(&clients);
        assert_eq!(ids(&view), vec!["a", "c"]);
    }

    #[test]
    fn date_range_is_inclusive_and_skips_invalid_dates() {
        let txns = vec![
            txn("1", "A", "X", 1.0, TxnKind::Expense, "2024-01-01"),
            txn("2", "B", "X", 1.0, TxnKind::Expense, "2024-01-31"),
            txn("3", "C", "X", 1.0, TxnKind::Expense, "2024-02-01"),
            txn("4", "D", "X", 1.0, TxnKind::Expense, "whenever"),
        ];

        let view = Query::new()
            .filter(Filter::within(
                TxnField::Date,
                NaiveDate::from_ymd_opt(2024, 1, 1),
                NaiveDate::from_ymd_opt(2024, 1, 31),
            ))
            .run(&txns);
        assert_eq!(ids(&view), vec!["1", "2"]);
    }

    #[test]
    fn empty_filters_are_dropped() {
        assert_eq!(Filter::<TxnField>::equals(TxnField::Category, ""), None);
        assert_eq!(Filter::<TxnField>::equals(TxnField::Category, "All"), None);
        assert_eq!(Filter::<TxnField>::between(TxnField::Amount, None, None), None);
        assert_eq!(Filter::<TxnField>::within(TxnField::Date, None, None), None);
    }

    #[test]
    fn invalid_dates_sort_last() {
        let clients = vec![
            client("x", "X", "", ClientStatus::Active, 0.0, "n/a"),
            client("b", "B", "", ClientStatus::Active, 0.0, "2024-02-01"),
            client("a", "A", "", ClientStatus::Active, 0.0, "2024-01-01"),
        ];

        let asc = Query::new()
            .sort_by(ClientField::LastContact, Direction::Ascending)
            .run(&clients);
        assert_eq!(ids(&asc), vec!["a", "b", "x"]);

        let desc = Query::new()
            .sort_by(ClientField::LastContact, Direction::Descending)
            .run(&clients);
        assert_eq!(ids(&desc), vec!["b", "a", "x"]);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let clients = vec![
            client("1", "Same", "", ClientStatus::Active, 10.0, ""),
            client("2", "Same", "", ClientStatus::Active, 10.0, ""),
            client("3", "Same", "", ClientStatus::Active, 10.0, ""),
        ];

        let view = Query::new()
            .sort_by(ClientField::Revenue, Direction::Descending)
            .run(&clients);
        assert_eq!(ids(&view), vec!["1", "2", "3"]);
    }

    #[test]
    fn pages_cut_the_view() {
        let txns: Vec<Transaction> = (1..=7)
            .map(|i| txn(&i.to_string(), "P", "C", i as f64, TxnKind::Expense, "2024-01-01"))
            .collect();

        let page = Page::of(Query::new().run(&txns), 2, 3);
        assert_eq!(ids(&page.items), vec!["4", "5", "6"]);
        assert_eq!(page.total_pages(), 3);

        let last = Page::of(Query::new().run(&txns), 3, 3);
        assert_eq!(ids(&last.items), vec!["7"]);

        let past = Page::of(Query::new().run(&txns), 9, 3);
        assert!(past.items.is_empty());
        assert_eq!(past.total, 7);

        let first = Page::of(Query::new().run(&txns), 0, 0);
        assert_eq!(first.number, 1);
        assert_eq!(first.per_page, 1);
        assert_eq!(ids(&first.items), vec!["1"]);
    }

    #[test]
    fn empty_view_has_one_page() {
        let txns: Vec<Transaction> = vec![];
        assert_eq!(Page::of(Query::new().run(&txns), 1, 10).total_pages(), 1);
    }

    fn clients_strategy() -> impl Strategy<Value = Vec<Client>> {
        prop::collection::vec(("[a-dA-D ]{0,6}", "[a-d]{0,4}", 0u32..50), 0..12).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (name, company, revenue))| {
                    client(&i.to_string(), &name, &company, ClientStatus::Active, revenue as f64, "")
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn empty_query_is_identity(clients in clients_strategy()) {
            let view = Query::<ClientField>::new().run(&clients);
            let expected: Vec<&Client> = clients.iter().collect();
            prop_assert_eq!(view, expected);
        }

        #[test]
        fn search_partitions_by_substring(clients in clients_strategy(), needle in "[a-dA-D]{1,2}") {
            let view = Query::new().search(needle.clone()).run(&clients);
            let lower = needle.to_lowercase();
            let hit = |c: &Client| {
                [&c.name, &c.company, &c.email]
                    .iter()
                    .any(|f| f.to_lowercase().contains(&lower))
            };

            for c in view.iter().copied() {
                prop_assert!(hit(c));
            }
            for c in clients.iter().filter(|c| !view.iter().any(|v| v.id == c.id)) {
                prop_assert!(!hit(c));
            }
        }

        #[test]
        fn sorting_is_idempotent(clients in clients_strategy()) {
            let query = Query::new().sort_by(ClientField::Name, Direction::Ascending);
            let once: Vec<Client> = query.run(&clients).into_iter().cloned().collect();
            let twice = query.run(&once);
            prop_assert_eq!(ids(&twice), once.iter().map(|c| c.id.clone()).collect::<Vec<_>>());
        }

        #[test]
        fn descending_reverses_a_total_order(revenues in prop::collection::hash_set(0u32..1000, 0..12)) {
            let clients: Vec<Client> = revenues
                .into_iter()
                .enumerate()
                .map(|(i, r)| client(&i.to_string(), "n", "", ClientStatus::Active, r as f64, ""))
                .collect();

            let asc = ids(&Query::new().sort_by(ClientField::Revenue, Direction::Ascending).run(&clients));
            let mut desc = ids(&Query::new().sort_by(ClientField::Revenue, Direction::Descending).run(&clients));
            desc.reverse();
            prop_assert_eq!(asc, desc);
        }
    }
}
