//! In-memory storage backend.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use bursar_shared::types::{JournalEntryId, PeriodId, TenantId};
use chrono::NaiveDate;
use dashmap::DashMap;

use super::{AccountStore, JournalStore, PeriodStore, StoreError};
use crate::accounts::{Account, AccountFilter};
use crate::closing::AccountingPeriod;
use crate::journal::{EntryFilter, JournalEntry};

/// Everything stored for one tenant.
#[derive(Debug, Default)]
struct TenantBooks {
    accounts: BTreeMap<String, Account>,
    entries: HashMap<JournalEntryId, JournalEntry>,
    last_sequence: u64,
    periods: HashMap<PeriodId, AccountingPeriod>,
}

/// Thread-safe in-memory store keyed by tenant.
///
/// Each tenant's books sit behind one map shard lock, so multi-record writes
/// such as [`JournalStore::save_entries`] and
/// [`PeriodStore::save_period_with_entries`] are atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tenants: DashMap<TenantId, TenantBooks>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn insert_account(&self, tenant: TenantId, account: Account) -> Result<(), StoreError> {
        let mut books = self.tenants.entry(tenant).or_default();
        if books.accounts.contains_key(&account.code) {
            return Err(StoreError::Conflict(format!(
                "account {} already exists",
                account.code
            )));
        }
        books.accounts.insert(account.code.clone(), account);
        Ok(())
    }

    async fn save_account(&self, tenant: TenantId, account: Account) -> Result<(), StoreError> {
        let mut books = self.tenants.entry(tenant).or_default();
        match books.accounts.get_mut(&account.code) {
            Some(slot) => {
                *slot = account;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("account {}", account.code))),
        }
    }

    async fn find_account(
        &self,
        tenant: TenantId,
        code: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .tenants
            .get(&tenant)
            .and_then(|books| books.accounts.get(code).cloned()))
    }

    async fn query_accounts(
        &self,
        tenant: TenantId,
        filter: &AccountFilter,
    ) -> Result<Vec<Account>, StoreError> {
        Ok(self
            .tenants
            .get(&tenant)
            .map(|books| {
                books
                    .accounts
                    .values()
                    .filter(|account| filter.matches(account))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl JournalStore for InMemoryStore {
    async fn next_entry_number(&self, tenant: TenantId) -> Result<u64, StoreError> {
        let mut books = self.tenants.entry(tenant).or_default();
        books.last_sequence += 1;
        Ok(books.last_sequence)
    }

    async fn insert_entry(
        &self,
        tenant: TenantId,
        entry: JournalEntry,
    ) -> Result<(), StoreError> {
        let mut books = self.tenants.entry(tenant).or_default();
        if books.entries.contains_key(&entry.id) {
            return Err(StoreError::Conflict(format!(
                "journal entry {} already exists",
                entry.id
            )));
        }
        books.entries.insert(entry.id, entry);
        Ok(())
    }

    async fn save_entries(
        &self,
        tenant: TenantId,
        entries: &[JournalEntry],
    ) -> Result<(), StoreError> {
        let mut books = self.tenants.entry(tenant).or_default();
        for entry in entries {
            books.entries.insert(entry.id, entry.clone());
        }
        Ok(())
    }

    async fn find_entry(
        &self,
        tenant: TenantId,
        id: JournalEntryId,
    ) -> Result<Option<JournalEntry>, StoreError> {
        Ok(self
            .tenants
            .get(&tenant)
            .and_then(|books| books.entries.get(&id).cloned()))
    }

    async fn delete_entry(&self, tenant: TenantId, id: JournalEntryId) -> Result<bool, StoreError> {
        Ok(self
            .tenants
            .get_mut(&tenant)
            .is_some_and(|mut books| books.entries.remove(&id).is_some()))
    }

    async fn query_entries(
        &self,
        tenant: TenantId,
        filter: &EntryFilter,
    ) -> Result<Vec<JournalEntry>, StoreError> {
        let mut entries: Vec<JournalEntry> = self
            .tenants
            .get(&tenant)
            .map(|books| {
                books
                    .entries
                    .values()
                    .filter(|entry| filter.matches(entry))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by_key(|entry| (entry.date, entry.sequence));
        Ok(entries)
    }
}

#[async_trait]
impl PeriodStore for InMemoryStore {
    async fn insert_period(
        &self,
        tenant: TenantId,
        period: AccountingPeriod,
    ) -> Result<(), StoreError> {
        let mut books = self.tenants.entry(tenant).or_default();
        if let Some(existing) = books
            .periods
            .values()
            .find(|existing| existing.overlaps(period.start_date, period.end_date))
        {
            return Err(StoreError::Conflict(existing.name.clone()));
        }
        books.periods.insert(period.id, period);
        Ok(())
    }

    async fn save_period(
        &self,
        tenant: TenantId,
        period: AccountingPeriod,
    ) -> Result<(), StoreError> {
        let mut books = self.tenants.entry(tenant).or_default();
        match books.periods.get_mut(&period.id) {
            Some(slot) => {
                *slot = period;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("period {}", period.id))),
        }
    }

    async fn save_period_with_entries(
        &self,
        tenant: TenantId,
        period: AccountingPeriod,
        entries: &[JournalEntry],
    ) -> Result<(), StoreError> {
        let mut books = self.tenants.entry(tenant).or_default();
        let Some(slot) = books.periods.get_mut(&period.id) else {
            return Err(StoreError::NotFound(format!("period {}", period.id)));
        };
        *slot = period;
        for entry in entries {
            books.entries.insert(entry.id, entry.clone());
        }
        Ok(())
    }

    async fn find_period(
        &self,
        tenant: TenantId,
        id: PeriodId,
    ) -> Result<Option<AccountingPeriod>, StoreError> {
        Ok(self
            .tenants
            .get(&tenant)
            .and_then(|books| books.periods.get(&id).cloned()))
    }

    async fn find_period_for_date(
        &self,
        tenant: TenantId,
        date: NaiveDate,
    ) -> Result<Option<AccountingPeriod>, StoreError> {
        Ok(self.tenants.get(&tenant).and_then(|books| {
            books
                .periods
                .values()
                .find(|period| period.contains(date))
                .cloned()
        }))
    }

    async fn query_periods(&self, tenant: TenantId) -> Result<Vec<AccountingPeriod>, StoreError> {
        let mut periods: Vec<AccountingPeriod> = self
            .tenants
            .get(&tenant)
            .map(|books| books.periods.values().cloned().collect())
            .unwrap_or_default();
        periods.sort_by_key(|period| period.start_date);
        Ok(periods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::AccountType;
    use crate::closing::{NewPeriod, PeriodKind, PeriodStatus};
    use crate::journal::JournalEntryLine;
    use bursar_shared::types::UserId;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(name: &str, start: NaiveDate, end: NaiveDate) -> AccountingPeriod {
        AccountingPeriod::new(
            NewPeriod {
                name: name.to_string(),
                kind: PeriodKind::Month,
                start_date: start,
                end_date: end,
            },
            UserId::new(),
        )
    }

    #[tokio::test]
    async fn test_duplicate_account_code_conflicts() {
        let store = InMemoryStore::new();
        let tenant = TenantId::new();
        let cash = Account::new("1000", "Cash", AccountType::Asset, None, None);

        store.insert_account(tenant, cash.clone()).await.unwrap();
        let err = store.insert_account(tenant, cash).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_tenants_are_isolated() {
        let store = InMemoryStore::new();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();
        let cash = Account::new("1000", "Cash", AccountType::Asset, None, None);

        store.insert_account(tenant_a, cash.clone()).await.unwrap();
        store.insert_account(tenant_b, cash).await.unwrap();

        assert!(store.find_account(tenant_a, "1000").await.unwrap().is_some());
        assert!(
            store
                .find_account(TenantId::new(), "1000")
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(store.next_entry_number(tenant_a).await.unwrap(), 1);
        assert_eq!(store.next_entry_number(tenant_a).await.unwrap(), 2);
        assert_eq!(store.next_entry_number(tenant_b).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_missing_account_is_not_found() {
        let store = InMemoryStore::new();
        let cash = Account::new("1000", "Cash", AccountType::Asset, None, None);
        let err = store
            .save_account(TenantId::new(), cash)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    fn closing_entry(on: NaiveDate) -> JournalEntry {
        let line = |n: usize, code: &str, debit: Decimal, credit: Decimal| JournalEntryLine {
            line_number: n,
            account_code: code.to_string(),
            debit,
            credit,
            description: None,
            reference: None,
        };
        JournalEntry::draft(
            JournalEntryId::new(),
            1,
            on,
            "Closing entry".into(),
            None,
            vec![line(1, "4000", dec!(10), dec!(0)), line(2, "3100", dec!(0), dec!(10))],
            UserId::new(),
        )
    }

    #[tokio::test]
    async fn test_period_and_entries_commit_together() {
        let store = InMemoryStore::new();
        let tenant = TenantId::new();
        let mut january = period("Jan 2025", date(2025, 1, 1), date(2025, 1, 31));
        store.insert_period(tenant, january.clone()).await.unwrap();

        january.transition(PeriodStatus::Closed, UserId::new(), None);
        let entry = closing_entry(date(2025, 1, 31));
        store
            .save_period_with_entries(tenant, january.clone(), std::slice::from_ref(&entry))
            .await
            .unwrap();

        let stored = store.find_period(tenant, january.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PeriodStatus::Closed);
        assert!(store.find_entry(tenant, entry.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_missing_period_writes_no_entries() {
        let store = InMemoryStore::new();
        let tenant = TenantId::new();
        let unknown = period("Jan 2025", date(2025, 1, 1), date(2025, 1, 31));
        let entry = closing_entry(date(2025, 1, 31));

        let err = store
            .save_period_with_entries(tenant, unknown, std::slice::from_ref(&entry))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.find_entry(tenant, entry.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overlapping_periods_conflict() {
        let store = InMemoryStore::new();
        let tenant = TenantId::new();
        let january = period("Jan 2025", date(2025, 1, 1), date(2025, 1, 31));
        store.insert_period(tenant, january).await.unwrap();

        let overlapping = period("Mid Jan", date(2025, 1, 15), date(2025, 2, 15));
        let err = store.insert_period(tenant, overlapping).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref name) if name == "Jan 2025"));

        let february = period("Feb 2025", date(2025, 2, 1), date(2025, 2, 28));
        store.insert_period(tenant, february).await.unwrap();

        let found = store
            .find_period_for_date(tenant, date(2025, 2, 28))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "Feb 2025");

        let names: Vec<String> = store
            .query_periods(tenant)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Jan 2025", "Feb 2025"]);
    }
}
