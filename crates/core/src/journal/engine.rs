//! Journal engine: draft, post and reverse journal entries.

use std::collections::BTreeSet;
use std::slice;
use std::sync::Arc;

use bursar_shared::types::{JournalEntryId, TenantId, UserId};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::OwnedRwLockReadGuard;
use tracing::info;

use super::reversal::{build_reversal, mark_reversed};
use super::types::{
    DraftInput, EntryFilter, EntryStatus, EntryTotals, JournalEntry, JournalEntryLine, LineInput,
    ReversalOutcome, ReverseInput,
};
use super::validation::{build_lines, ensure_balanced, non_blank, validate_lines};
use crate::closing::AccountingPeriod;
use crate::error::{LedgerError, LedgerResult};
use crate::locks::LockManager;
use crate::projection::LedgerProjector;
use crate::store::LedgerStore;

/// Validates and posts balanced journal entries against the chart of accounts.
///
/// `post` is the only path that marks an entry posted, and every posting is
/// handed to the projector before the call returns.
pub struct JournalEngine<S> {
    store: Arc<S>,
    projector: Arc<LedgerProjector<S>>,
    locks: Arc<LockManager>,
    tolerance: Decimal,
}

impl<S: LedgerStore> JournalEngine<S> {
    /// Creates an engine that accepts debit/credit differences up to `tolerance`.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        projector: Arc<LedgerProjector<S>>,
        locks: Arc<LockManager>,
        tolerance: Decimal,
    ) -> Self {
        Self {
            store,
            projector,
            locks,
            tolerance,
        }
    }

    /// The balance tolerance in use.
    #[must_use]
    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    /// Stores a new draft entry.
    ///
    /// Drafts need not balance yet; balance is enforced when posting.
    ///
    /// # Errors
    ///
    /// - `EmptyEntry` if there are no lines
    /// - `MalformedLine` for a line with both, neither or negative sides
    /// - `UnknownAccount` / `AccountInactive` for unusable accounts
    pub async fn create_draft(
        &self,
        tenant: TenantId,
        created_by: UserId,
        input: DraftInput,
    ) -> LedgerResult<JournalEntry> {
        let lines = self.prepare_lines(tenant, input.lines).await?;
        let sequence = self.store.next_entry_number(tenant).await?;

        let entry = JournalEntry::draft(
            JournalEntryId::new(),
            sequence,
            input.date,
            input.description.trim().to_string(),
            non_blank(input.reference),
            lines,
            created_by,
        );
        self.store.insert_entry(tenant, entry.clone()).await?;

        info!(
            tenant_id = %tenant,
            entry_id = %entry.id,
            entry_number = %entry.entry_number,
            lines = entry.lines.len(),
            "Journal entry drafted"
        );

        Ok(entry)
    }

    /// Replaces the date, description, reference and lines of a draft.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` if the id is unknown
    /// - `InvalidStateTransition` if the entry is no longer a draft
    /// - the same validation errors as [`Self::create_draft`]
    pub async fn update_draft(
        &self,
        tenant: TenantId,
        id: JournalEntryId,
        input: DraftInput,
    ) -> LedgerResult<JournalEntry> {
        let _entry_lock = self.locks.entry(tenant, id).await;

        let mut entry = self.load(tenant, id).await?;
        ensure_draft(&entry)?;

        entry.lines = self.prepare_lines(tenant, input.lines).await?;
        entry.date = input.date;
        entry.description = input.description.trim().to_string();
        entry.reference = non_blank(input.reference);
        entry.updated_at = Utc::now();

        self.store
            .save_entries(tenant, slice::from_ref(&entry))
            .await?;

        info!(
            tenant_id = %tenant,
            entry_id = %entry.id,
            entry_number = %entry.entry_number,
            "Journal entry draft updated"
        );

        Ok(entry)
    }

    /// Deletes a draft.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` if the id is unknown
    /// - `InvalidStateTransition` if the entry is no longer a draft
    pub async fn discard_draft(&self, tenant: TenantId, id: JournalEntryId) -> LedgerResult<()> {
        let _entry_lock = self.locks.entry(tenant, id).await;

        let entry = self.load(tenant, id).await?;
        ensure_draft(&entry)?;

        self.store.delete_entry(tenant, id).await?;
        self.locks.release_entry(tenant, id);

        info!(
            tenant_id = %tenant,
            entry_id = %id,
            entry_number = %entry.entry_number,
            "Journal entry draft discarded"
        );

        Ok(())
    }

    /// Posts a draft: re-validates it, commits it and projects its lines.
    ///
    /// Retrying with the same id after success fails with
    /// `InvalidStateTransition` and never double-counts.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` if the id is unknown
    /// - `InvalidStateTransition` if the entry is not a draft
    /// - `UnbalancedEntry` if debits and credits differ beyond the tolerance
    /// - `NoPeriodForDate` / `PeriodClosed` if no open period covers the date
    /// - `UnknownAccount` / `AccountInactive` if an account became unusable
    /// - `AmountOverflow` if an account total would leave the decimal range
    pub async fn post(
        &self,
        tenant: TenantId,
        id: JournalEntryId,
        approved_by: UserId,
    ) -> LedgerResult<JournalEntry> {
        let _tenant_gate = self.locks.tenant_shared(tenant).await;
        let _entry_lock = self.locks.entry(tenant, id).await;

        let entry = self.load(tenant, id).await?;
        if entry.status != EntryStatus::Draft {
            return Err(LedgerError::InvalidStateTransition {
                from: entry.status,
                to: EntryStatus::Posted,
            });
        }
        ensure_balanced(entry.totals()?, self.tolerance)?;

        let _period_gate = self.open_period_gate(tenant, entry.date).await?;
        self.post_locked(tenant, entry, approved_by, None).await
    }

    /// Reverses a posted entry with a new posted entry whose sides are swapped.
    ///
    /// The reversing entry is dated `input.date`, or the original date when
    /// absent, and must land in an open period. The original is marked
    /// reversed in the same atomic write.
    ///
    /// # Errors
    ///
    /// - `MissingReason` if the reason is blank
    /// - `EntryNotFound` if the id is unknown
    /// - `EntryNotPosted` unless the entry is currently posted
    /// - `NoPeriodForDate` / `PeriodClosed` for the reversal date
    /// - `UnknownAccount` / `AccountInactive` if an account became unusable
    /// - `AmountOverflow` if an account total would leave the decimal range
    pub async fn reverse(
        &self,
        tenant: TenantId,
        id: JournalEntryId,
        reversed_by: UserId,
        input: ReverseInput,
    ) -> LedgerResult<ReversalOutcome> {
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(LedgerError::MissingReason);
        }

        let _tenant_gate = self.locks.tenant_shared(tenant).await;
        let _entry_lock = self.locks.entry(tenant, id).await;

        let mut original = self.load(tenant, id).await?;
        if original.status != EntryStatus::Posted {
            return Err(LedgerError::EntryNotPosted {
                id,
                status: original.status,
            });
        }

        let date = input.date.unwrap_or(original.date);
        let _period_gate = self.open_period_gate(tenant, date).await?;
        let _account_locks = self
            .locks
            .accounts(tenant, original.account_codes())
            .await;
        self.check_accounts(tenant, original.account_codes())
            .await?;

        let sequence = self.store.next_entry_number(tenant).await?;
        let now = Utc::now();
        let reversal = build_reversal(&original, sequence, date, reversed_by, now);
        mark_reversed(&mut original, &reversal, reversed_by, reason.to_string(), now);
        self.projector.check_posting(tenant, &reversal)?;

        self.store
            .save_entries(tenant, &[original.clone(), reversal.clone()])
            .await?;
        self.projector.apply_posting(tenant, &reversal)?;
        self.locks.release_entry(tenant, id);

        info!(
            tenant_id = %tenant,
            entry_id = %original.id,
            entry_number = %original.entry_number,
            reversal_id = %reversal.id,
            reversal_number = %reversal.entry_number,
            reversed_by = %reversed_by,
            "Journal entry reversed"
        );

        Ok(ReversalOutcome { original, reversal })
    }

    /// Returns one entry.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the id is unknown.
    pub async fn get_entry(&self, tenant: TenantId, id: JournalEntryId) -> LedgerResult<JournalEntry> {
        self.load(tenant, id).await
    }

    /// Lists entries ordered by date, then entry number.
    pub async fn list_entries(
        &self,
        tenant: TenantId,
        filter: &EntryFilter,
    ) -> LedgerResult<Vec<JournalEntry>> {
        Ok(self.store.query_entries(tenant, filter).await?)
    }

    /// Builds and posts a system entry while the caller already holds the
    /// covering period's gate, as period closing does. The entry is committed
    /// in the same write as `period`, so either both land or neither does.
    pub(crate) async fn post_system_entry(
        &self,
        tenant: TenantId,
        date: NaiveDate,
        description: String,
        lines: Vec<LineInput>,
        posted_by: UserId,
        period: &AccountingPeriod,
    ) -> LedgerResult<JournalEntry> {
        validate_lines(&lines)?;
        let lines = build_lines(lines);
        ensure_balanced(
            EntryTotals::of(lines.iter().map(|line| (line.debit, line.credit)))?,
            self.tolerance,
        )?;

        let sequence = self.store.next_entry_number(tenant).await?;
        let entry = JournalEntry::draft(
            JournalEntryId::new(),
            sequence,
            date,
            description,
            None,
            lines,
            posted_by,
        );
        self.post_locked(tenant, entry, posted_by, Some(period)).await
    }

    /// Commits a validated entry as posted, together with `period` when
    /// given, and projects it. The caller holds the entry lock (if any) and
    /// the period gate.
    async fn post_locked(
        &self,
        tenant: TenantId,
        mut entry: JournalEntry,
        approved_by: UserId,
        period: Option<&AccountingPeriod>,
    ) -> LedgerResult<JournalEntry> {
        let _account_locks = self.locks.accounts(tenant, entry.account_codes()).await;
        self.check_accounts(tenant, entry.account_codes()).await?;

        let now = Utc::now();
        entry.status = EntryStatus::Posted;
        entry.approved_by = Some(approved_by);
        entry.posted_at = Some(now);
        entry.updated_at = now;

        let totals = entry.totals()?;
        self.projector.check_posting(tenant, &entry)?;

        let entries = slice::from_ref(&entry);
        match period {
            Some(period) => {
                self.store
                    .save_period_with_entries(tenant, period.clone(), entries)
                    .await?;
            }
            None => self.store.save_entries(tenant, entries).await?,
        }
        self.projector.apply_posting(tenant, &entry)?;

        info!(
            tenant_id = %tenant,
            entry_id = %entry.id,
            entry_number = %entry.entry_number,
            date = %entry.date,
            debit = %totals.debit,
            credit = %totals.credit,
            approved_by = %approved_by,
            "Journal entry posted"
        );

        Ok(entry)
    }

    /// Resolves the period covering `date`, takes its gate in shared mode and
    /// confirms that it still accepts postings.
    async fn open_period_gate(
        &self,
        tenant: TenantId,
        date: NaiveDate,
    ) -> LedgerResult<OwnedRwLockReadGuard<()>> {
        let period = self
            .store
            .find_period_for_date(tenant, date)
            .await?
            .ok_or(LedgerError::NoPeriodForDate(date))?;

        let gate = self.locks.period_shared(tenant, period.id).await;

        // Status may have changed while waiting for the gate.
        let period = self
            .store
            .find_period(tenant, period.id)
            .await?
            .ok_or(LedgerError::PeriodNotFound(period.id))?;
        if !period.status.accepts_postings() {
            return Err(LedgerError::PeriodClosed {
                period_id: period.id,
                status: period.status,
            });
        }

        Ok(gate)
    }

    async fn prepare_lines(
        &self,
        tenant: TenantId,
        lines: Vec<LineInput>,
    ) -> LedgerResult<Vec<JournalEntryLine>> {
        validate_lines(&lines)?;
        let lines = build_lines(lines);
        self.check_accounts(tenant, lines.iter().map(|line| line.account_code.as_str()))
            .await?;
        Ok(lines)
    }

    async fn check_accounts<'a>(
        &self,
        tenant: TenantId,
        codes: impl IntoIterator<Item = &'a str>,
    ) -> LedgerResult<()> {
        let codes: BTreeSet<&str> = codes.into_iter().collect();
        for code in codes {
            let account = self
                .store
                .find_account(tenant, code)
                .await?
                .ok_or_else(|| LedgerError::UnknownAccount(code.to_string()))?;
            if !account.is_active {
                return Err(LedgerError::AccountInactive(account.code));
            }
        }
        Ok(())
    }

    async fn load(&self, tenant: TenantId, id: JournalEntryId) -> LedgerResult<JournalEntry> {
        self.store
            .find_entry(tenant, id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))
    }
}

fn ensure_draft(entry: &JournalEntry) -> LedgerResult<()> {
    if entry.status.is_editable() {
        Ok(())
    } else {
        Err(LedgerError::InvalidStateTransition {
            from: entry.status,
            to: EntryStatus::Draft,
        })
    }
}
