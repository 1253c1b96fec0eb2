use std::io::Write;

use anyhow::Result;
use prospera_advice::FinancialSnapshot;
use rusty_money::{iso, Money};
use tabwriter::TabWriter;

use crate::model::{Account, Client, Transaction, TxnKind, TxnStatus};
use crate::query::Page;
use crate::store::Table;

pub fn money(amount: f64) -> String {
    Money::from_minor((amount * 100.0).round() as i64, iso::USD).to_string()
}

fn footer<W: Write, R>(tw: &mut TabWriter<W>, page: &Page<R>) -> Result<()> {
    writeln!(
        tw,
        "\nPage {} of {} ({} records)",
        page.number,
        page.total_pages(),
        page.total
    )?;
    Ok(())
}

pub fn print_clients<W: Write>(wr: W, page: &Page<Client>) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(tw, "ID\tName\tCompany\tEmail\tStatus\tRevenue\tLast Contact")?;

    for client in page.items.iter() {
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            client.id,
            client.name,
            client.company,
            client.email,
            client.status,
            money(client.revenue),
            client.last_contact,
        )?;
    }

    footer(&mut tw, page)?;
    tw.flush()?;

    Ok(())
}

pub fn print_transactions<W: Write>(
    wr: W,
    page: &Page<Transaction>,
    accounts: &Table<Account>,
) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(tw, "ID\tDate\tPayee\tCategory\tAccount\tStatus\tAmount")?;

    for tx in page.items.iter() {
        let account = accounts
            .get(&tx.account_id)
            .map_or(tx.account_id.as_str(), |a| a.name.as_str());
        let sign = match tx.kind {
            TxnKind::Income => "+",
            TxnKind::Expense => "-",
        };
        let status = match tx.status {
            TxnStatus::Cleared => "*",
            TxnStatus::Pending => "!",
        };

        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}{}",
            tx.id,
            tx.date,
            tx.payee,
            tx.category,
            account,
            status,
            sign,
            money(tx.amount),
        )?;
    }

    footer(&mut tw, page)?;
    tw.flush()?;

    Ok(())
}

pub fn print_accounts<W: Write>(wr: W, accounts: &[&Account]) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(tw, "Institution\tAccount\tAccount ID\tType\tBalance")?;

    for account in accounts.iter() {
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}",
            account.institution,
            account.name,
            account.id,
            account.kind.as_str(),
            money(account.balance),
        )?;
    }

    tw.flush()?;

    Ok(())
}

pub fn print_summary<W: Write>(wr: W, s: &FinancialSnapshot) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(tw, "Total balance\t{}", money(s.balance))?;
    writeln!(tw, "Income\t{}\t{:+.1}%", money(s.income), s.income_growth)?;
    writeln!(tw, "Expenses\t{}\t{:+.1}%", money(s.expense), s.expense_growth)?;

    writeln!(tw, "\nTop categories")?;
    for c in s.top_categories.iter() {
        writeln!(tw, "\t{}\t{}", c.name, money(c.amount))?;
    }

    writeln!(tw, "\nBalance history")?;
    for p in s.history.iter() {
        writeln!(tw, "\t{}\t{}", p.label, money(p.balance))?;
    }

    tw.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::model::{AccountKind, ClientStatus};
    use crate::query::Query;
    use crate::store::tests::sample_snapshot;

    use super::*;

    fn render<F: FnOnce(&mut Vec<u8>) -> Result<()>>(f: F) -> String {
        let mut out = vec![];
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn money_uses_dollars_and_grouping() {
        assert_eq!(money(1234.5), "$1,234.50");
        assert_eq!(money(5.4), "$5.40");
    }

    #[test]
    fn transactions_show_account_names() {
        let snapshot = sample_snapshot();
        let accounts = Table::new(snapshot.accounts).unwrap();
        let page = Page::of(Query::new().run(&snapshot.transactions), 1, 10);

        let out = render(|w| print_transactions(w, &page, &accounts));
        assert!(out.contains("Everyday Checking"));
        assert!(out.contains("+$4,200.00"));
        assert!(out.contains("-$5.40"));
        assert!(out.contains("Page 1 of 1 (2 records)"));
    }

    #[test]
    fn clients_table_has_a_row_per_item() {
        let clients = vec![Client {
            id: "c1".into(),
            name: "Ada".into(),
            email: "ada@analytical.io".into(),
            company: "Engines".into(),
            status: ClientStatus::Pending,
            revenue: 10.0,
            last_contact: "2024-02-01".into(),
        }];
        let page = Page::of(Query::new().run(&clients), 1, 10);

        let out = render(|w| print_clients(w, &page));
        assert_eq!(out.lines().count(), 4);
        assert!(out.contains("Pending"));
    }

    #[test]
    fn accounts_show_kind_and_signed_balance() {
        let card = Account {
            id: "acc-2".into(),
            name: "Card".into(),
            institution: "First Bank".into(),
            kind: AccountKind::Credit,
            balance: -50.0,
        };

        let out = render(|w| print_accounts(w, &[&card]));
        assert!(out.lines().nth(1).unwrap().contains("credit"));
        assert!(out.contains("-$50.00"));
    }
}
