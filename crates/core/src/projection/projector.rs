//! Per-account balance projection over the journal.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bursar_shared::types::{JournalEntryId, TenantId};
use chrono::NaiveDate;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::balance::AccountTotals;
use super::types::{AccountActivity, GeneralLedger, GeneralLedgerLine};
use crate::accounts::AccountType;
use crate::closing::validate_date_range;
use crate::error::{LedgerError, LedgerResult};
use crate::journal::{EntryFilter, EntryStatus, JournalEntry};
use crate::store::LedgerStore;

/// Accumulated state of one tenant.
#[derive(Debug, Default)]
struct TenantProjection {
    totals: HashMap<String, AccountTotals>,
    applied: HashSet<JournalEntryId>,
}

impl TenantProjection {
    /// Totals of the accounts `entry` touches, as they would be after it.
    fn staged(&self, entry: &JournalEntry) -> LedgerResult<HashMap<String, AccountTotals>> {
        let mut staged: HashMap<String, AccountTotals> = HashMap::new();
        for line in &entry.lines {
            let totals = staged
                .entry(line.account_code.clone())
                .or_insert_with(|| {
                    self.totals
                        .get(&line.account_code)
                        .copied()
                        .unwrap_or_default()
                });
            totals.record(line.debit, line.credit)?;
        }
        Ok(staged)
    }

    /// Applies `entry` unless it was applied before. Nothing changes on error.
    fn apply(&mut self, entry: &JournalEntry) -> LedgerResult<bool> {
        if self.applied.contains(&entry.id) {
            return Ok(false);
        }
        let staged = self.staged(entry)?;
        self.totals.extend(staged);
        self.applied.insert(entry.id);
        Ok(true)
    }
}

/// Derives account balances from posted journal entries.
pub struct LedgerProjector<S> {
    store: Arc<S>,
    state: DashMap<TenantId, TenantProjection>,
}

impl<S: LedgerStore> LedgerProjector<S> {
    /// Creates an empty projection over the given store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: DashMap::new(),
        }
    }

    /// Adds a posted entry's lines to the account accumulators.
    ///
    /// Applying the same entry id twice is a no-op; the return value tells
    /// whether the entry was newly applied.
    ///
    /// # Errors
    ///
    /// - `EntryNotPosted` for draft entries
    /// - `AmountOverflow` if an account total would leave the decimal range;
    ///   the accumulators are left untouched
    pub fn apply_posting(&self, tenant: TenantId, entry: &JournalEntry) -> LedgerResult<bool> {
        if !entry.status.affects_balances() {
            return Err(LedgerError::EntryNotPosted {
                id: entry.id,
                status: entry.status,
            });
        }

        let applied = self.state.entry(tenant).or_default().apply(entry)?;
        if applied {
            debug!(
                tenant_id = %tenant,
                entry_id = %entry.id,
                lines = entry.lines.len(),
                "Posting projected"
            );
        }
        Ok(applied)
    }

    /// Checks that `entry` can be applied without changing anything.
    ///
    /// Callers run this before committing an entry, while holding the locks
    /// of every account it touches.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if an account total would leave the decimal
    /// range.
    pub fn check_posting(&self, tenant: TenantId, entry: &JournalEntry) -> LedgerResult<()> {
        match self.state.get(&tenant) {
            Some(projection) if projection.applied.contains(&entry.id) => Ok(()),
            Some(projection) => projection.staged(entry).map(drop),
            None => TenantProjection::default().staged(entry).map(drop),
        }
    }

    /// Returns the accumulated totals of an account.
    #[must_use]
    pub fn totals(&self, tenant: TenantId, code: &str) -> AccountTotals {
        self.state
            .get(&tenant)
            .and_then(|projection| projection.totals.get(code).copied())
            .unwrap_or_default()
    }

    /// Signed balance of an account under its type's sign convention.
    #[must_use]
    pub fn balance(&self, tenant: TenantId, code: &str, account_type: AccountType) -> Decimal {
        self.totals(tenant, code).balance(account_type.normal_side())
    }

    /// Returns true if any posted line ever touched the account.
    #[must_use]
    pub fn has_postings(&self, tenant: TenantId, code: &str) -> bool {
        !self.totals(tenant, code).is_empty()
    }

    /// Replays the journal up to `to` and splits each account's activity into
    /// opening (before `from`) and period (inside the range) totals.
    ///
    /// Posted and reversed entries always count. Drafts count only when
    /// `include_drafts` is set and they are dated inside the range.
    pub async fn activity(
        &self,
        tenant: TenantId,
        from: NaiveDate,
        to: NaiveDate,
        include_drafts: bool,
    ) -> LedgerResult<HashMap<String, AccountActivity>> {
        let filter = EntryFilter {
            to: Some(to),
            ..EntryFilter::default()
        };
        let entries = self.store.query_entries(tenant, &filter).await?;

        let mut activity: HashMap<String, AccountActivity> = HashMap::new();
        for entry in &entries {
            let in_range = entry.date >= from;
            let counts = match entry.status {
                EntryStatus::Draft => include_drafts && in_range,
                EntryStatus::Posted | EntryStatus::Reversed => true,
            };
            if !counts {
                continue;
            }
            for line in &entry.lines {
                let slot = activity.entry(line.account_code.clone()).or_default();
                let totals = if in_range {
                    &mut slot.period
                } else {
                    &mut slot.opening
                };
                totals.record(line.debit, line.credit)?;
            }
        }

        Ok(activity)
    }

    /// Builds the general ledger of one account over an inclusive date range.
    ///
    /// # Errors
    ///
    /// - `InvalidDateRange` if `from` is after `to`
    /// - `AccountNotFound` if the code is not registered
    pub async fn get_ledger(
        &self,
        tenant: TenantId,
        code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<GeneralLedger> {
        validate_date_range(from, to)?;
        let account = self
            .store
            .find_account(tenant, code)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))?;
        let side = account.account_type.normal_side();

        let filter = EntryFilter {
            to: Some(to),
            account_code: Some(account.code.clone()),
            ..EntryFilter::default()
        };
        let entries = self.store.query_entries(tenant, &filter).await?;

        let mut opening = AccountTotals::default();
        let mut period = AccountTotals::default();
        let mut lines = Vec::new();

        for entry in entries.iter().filter(|e| e.status.affects_balances()) {
            for line in entry.lines.iter().filter(|l| l.account_code == account.code) {
                if entry.date < from {
                    opening.record(line.debit, line.credit)?;
                    continue;
                }
                period.record(line.debit, line.credit)?;
                let mut running = opening;
                running.merge(&period)?;
                lines.push(GeneralLedgerLine {
                    date: entry.date,
                    entry_id: entry.id,
                    entry_number: entry.entry_number.clone(),
                    description: line
                        .description
                        .clone()
                        .unwrap_or_else(|| entry.description.clone()),
                    debit: line.debit,
                    credit: line.credit,
                    running_balance: running.balance(side),
                });
            }
        }

        let mut closing = opening;
        closing.merge(&period)?;

        Ok(GeneralLedger {
            account_code: account.code,
            account_name: account.name,
            account_type: account.account_type,
            from,
            to,
            opening_balance: opening.balance(side),
            lines,
            total_debit: period.debit_total,
            total_credit: period.credit_total,
            closing_balance: closing.balance(side),
        })
    }

    /// Discards a tenant's accumulators and replays every posted entry.
    ///
    /// Callers must keep postings out while this runs; the ledger facade
    /// holds the tenant gate exclusively. On error the previous accumulators
    /// stay in place.
    pub async fn rebuild(&self, tenant: TenantId) -> LedgerResult<usize> {
        let entries = self
            .store
            .query_entries(tenant, &EntryFilter::default())
            .await?;

        let mut fresh = TenantProjection::default();
        let mut replayed = 0;
        for entry in entries.iter().filter(|e| e.status.affects_balances()) {
            if fresh.apply(entry)? {
                replayed += 1;
            }
        }

        self.state.insert(tenant, fresh);
        info!(tenant_id = %tenant, entries = replayed, "Projection rebuilt");
        Ok(replayed)
    }

    /// Sum of all debits and all credits projected for a tenant.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if a sum leaves the decimal range.
    pub fn grand_totals(&self, tenant: TenantId) -> LedgerResult<(Decimal, Decimal)> {
        let Some(projection) = self.state.get(&tenant) else {
            return Ok((Decimal::ZERO, Decimal::ZERO));
        };
        let mut grand = AccountTotals::default();
        for totals in projection.totals.values() {
            grand.merge(totals)?;
        }
        Ok((grand.debit_total, grand.credit_total))
    }
}
