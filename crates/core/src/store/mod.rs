//! Storage abstraction for accounts, journal entries and periods.
//!
//! The domain services only talk to these traits. Every call carries the
//! tenant explicitly so one tenant's books can never leak into another's.

mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use bursar_shared::types::{JournalEntryId, PeriodId, TenantId};
use chrono::NaiveDate;
use thiserror::Error;

use crate::accounts::{Account, AccountFilter};
use crate::closing::AccountingPeriod;
use crate::journal::{EntryFilter, JournalEntry};

/// Errors reported by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness or overlap constraint rejected the write.
    #[error("Storage conflict: {0}")]
    Conflict(String),

    /// The record to update does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The backend itself failed.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Persistence for chart-of-accounts records.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts a new account. Fails with `Conflict` if the code is taken.
    async fn insert_account(&self, tenant: TenantId, account: Account) -> Result<(), StoreError>;

    /// Replaces an existing account. Fails with `NotFound` if it is missing.
    async fn save_account(&self, tenant: TenantId, account: Account) -> Result<(), StoreError>;

    /// Looks up an account by code.
    async fn find_account(
        &self,
        tenant: TenantId,
        code: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Returns the matching accounts ordered by code.
    async fn query_accounts(
        &self,
        tenant: TenantId,
        filter: &AccountFilter,
    ) -> Result<Vec<Account>, StoreError>;
}

/// Persistence for journal entries.
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Hands out the next per-tenant entry sequence number, starting at 1.
    async fn next_entry_number(&self, tenant: TenantId) -> Result<u64, StoreError>;

    /// Inserts a new entry. Fails with `Conflict` if the id is taken.
    async fn insert_entry(&self, tenant: TenantId, entry: JournalEntry)
    -> Result<(), StoreError>;

    /// Upserts every entry in one atomic write.
    async fn save_entries(
        &self,
        tenant: TenantId,
        entries: &[JournalEntry],
    ) -> Result<(), StoreError>;

    /// Looks up an entry by id.
    async fn find_entry(
        &self,
        tenant: TenantId,
        id: JournalEntryId,
    ) -> Result<Option<JournalEntry>, StoreError>;

    /// Deletes an entry, returning whether it existed.
    async fn delete_entry(&self, tenant: TenantId, id: JournalEntryId) -> Result<bool, StoreError>;

    /// Returns the matching entries ordered by date, then sequence.
    async fn query_entries(
        &self,
        tenant: TenantId,
        filter: &EntryFilter,
    ) -> Result<Vec<JournalEntry>, StoreError>;
}

/// Persistence for accounting periods.
#[async_trait]
pub trait PeriodStore: Send + Sync {
    /// Inserts a new period. Fails with `Conflict` if it overlaps another one.
    async fn insert_period(
        &self,
        tenant: TenantId,
        period: AccountingPeriod,
    ) -> Result<(), StoreError>;

    /// Replaces an existing period. Fails with `NotFound` if it is missing.
    async fn save_period(&self, tenant: TenantId, period: AccountingPeriod)
    -> Result<(), StoreError>;

    /// Replaces an existing period and upserts `entries` in one atomic write.
    /// Fails with `NotFound`, writing nothing, if the period is missing.
    async fn save_period_with_entries(
        &self,
        tenant: TenantId,
        period: AccountingPeriod,
        entries: &[JournalEntry],
    ) -> Result<(), StoreError>;

    /// Looks up a period by id.
    async fn find_period(
        &self,
        tenant: TenantId,
        id: PeriodId,
    ) -> Result<Option<AccountingPeriod>, StoreError>;

    /// Returns the period whose inclusive date range covers `date`.
    async fn find_period_for_date(
        &self,
        tenant: TenantId,
        date: NaiveDate,
    ) -> Result<Option<AccountingPeriod>, StoreError>;

    /// Returns every period ordered by start date.
    async fn query_periods(&self, tenant: TenantId) -> Result<Vec<AccountingPeriod>, StoreError>;
}

/// A backend that stores the complete set of books.
pub trait LedgerStore: AccountStore + JournalStore + PeriodStore + 'static {}

impl<T> LedgerStore for T where T: AccountStore + JournalStore + PeriodStore + 'static {}
