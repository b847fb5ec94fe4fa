//! Shared fixtures for ledger integration tests.

#![allow(dead_code)]

use bursar_core::accounts::{AccountType, NewAccount};
use bursar_core::closing::{AccountingPeriod, NewPeriod, PeriodKind};
use bursar_core::journal::{DraftInput, JournalEntry, LineInput};
use bursar_core::{Ledger, LedgerSettings};
use bursar_shared::types::{TenantId, UserId};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub struct Books {
    pub ledger: Ledger,
    pub tenant: TenantId,
    pub clerk: UserId,
    pub controller: UserId,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A tenant with a small university chart and an open January 2025 period.
pub async fn books() -> (Books, AccountingPeriod) {
    let books = Books {
        ledger: Ledger::in_memory(LedgerSettings::default()),
        tenant: TenantId::new(),
        clerk: UserId::new(),
        controller: UserId::new(),
    };

    for (code, name, account_type) in [
        ("1000", "Cash", AccountType::Asset),
        ("1200", "Student Receivables", AccountType::Asset),
        ("2000", "Accounts Payable", AccountType::Liability),
        ("3100", "Retained Earnings", AccountType::Equity),
        ("4000", "Tuition Revenue", AccountType::Income),
        ("5000", "Salaries Expense", AccountType::Expense),
    ] {
        books
            .ledger
            .accounts()
            .create_account(
                books.tenant,
                NewAccount {
                    code: code.into(),
                    name: name.into(),
                    account_type,
                    parent_code: None,
                    description: None,
                },
            )
            .await
            .unwrap();
    }

    let january = books
        .ledger
        .closing()
        .create_period(
            books.tenant,
            books.controller,
            NewPeriod {
                name: "January 2025".into(),
                kind: PeriodKind::Month,
                start_date: date(2025, 1, 1),
                end_date: date(2025, 1, 31),
            },
        )
        .await
        .unwrap();

    (books, january)
}

impl Books {
    pub async fn draft(
        &self,
        on: NaiveDate,
        debit: (&str, Decimal),
        credit: (&str, Decimal),
    ) -> JournalEntry {
        self.ledger
            .journal()
            .create_draft(
                self.tenant,
                self.clerk,
                DraftInput {
                    date: on,
                    description: "Integration test entry".into(),
                    reference: None,
                    lines: vec![
                        LineInput::debit(debit.0, debit.1),
                        LineInput::credit(credit.0, credit.1),
                    ],
                },
            )
            .await
            .unwrap()
    }

    pub async fn post(&self, on: NaiveDate, debit: (&str, Decimal), credit: (&str, Decimal)) -> JournalEntry {
        let draft = self.draft(on, debit, credit).await;
        self.ledger
            .journal()
            .post(self.tenant, draft.id, self.controller)
            .await
            .unwrap()
    }

    pub async fn balance(&self, code: &str) -> Decimal {
        self.ledger
            .accounts()
            .get_account(self.tenant, code)
            .await
            .unwrap()
            .balance
    }
}
