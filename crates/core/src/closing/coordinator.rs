//! Trial balance and period closing coordinator.

use std::sync::Arc;

use bursar_shared::types::{PeriodId, TenantId, UserId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::closing_entry::closing_lines;
use super::period::{AccountingPeriod, NewPeriod, PeriodStatus, validate_date_range};
use super::trial_balance::TrialBalance;
use crate::accounts::{Account, AccountFilter, AccountType};
use crate::error::{LedgerError, LedgerResult};
use crate::journal::{JournalEntry, JournalEngine};
use crate::locks::LockManager;
use crate::projection::LedgerProjector;
use crate::store::{LedgerStore, StoreError};

/// Input for closing a period.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClosePeriodInput {
    /// Equity account receiving the period's net result. Falls back to the
    /// configured default; when neither is set no closing entry is posted.
    #[serde(default)]
    pub retained_earnings_code: Option<String>,
}

/// Result of closing a period.
#[derive(Debug, Clone, Serialize)]
pub struct CloseOutcome {
    /// The period, now closed.
    pub period: AccountingPeriod,
    /// The pro-forma trial balance that gated the close.
    pub trial_balance: TrialBalance,
    /// The posted closing entry, if one was needed.
    pub closing_entry: Option<JournalEntry>,
}

/// Builds trial balances and drives period status transitions.
pub struct ClosingCoordinator<S> {
    store: Arc<S>,
    projector: Arc<LedgerProjector<S>>,
    journal: Arc<JournalEngine<S>>,
    locks: Arc<LockManager>,
    tolerance: Decimal,
    retained_earnings_code: Option<String>,
}

impl<S: LedgerStore> ClosingCoordinator<S> {
    /// Creates a coordinator.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        projector: Arc<LedgerProjector<S>>,
        journal: Arc<JournalEngine<S>>,
        locks: Arc<LockManager>,
        tolerance: Decimal,
        retained_earnings_code: Option<String>,
    ) -> Self {
        Self {
            store,
            projector,
            journal,
            locks,
            tolerance,
            retained_earnings_code,
        }
    }

    /// Creates an open period.
    ///
    /// # Errors
    ///
    /// - `InvalidDateRange` if the start is after the end
    /// - `OverlappingPeriod` if the range shares a day with another period
    pub async fn create_period(
        &self,
        tenant: TenantId,
        created_by: UserId,
        input: NewPeriod,
    ) -> LedgerResult<AccountingPeriod> {
        validate_date_range(input.start_date, input.end_date)?;
        let period = AccountingPeriod::new(input, created_by);
        if period.name.is_empty() {
            return Err(LedgerError::MalformedPeriod(
                "period name cannot be empty".to_string(),
            ));
        }

        match self.store.insert_period(tenant, period.clone()).await {
            Ok(()) => {}
            Err(StoreError::Conflict(existing)) => {
                return Err(LedgerError::OverlappingPeriod(existing));
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            tenant_id = %tenant,
            period_id = %period.id,
            name = %period.name,
            start = %period.start_date,
            end = %period.end_date,
            "Accounting period created"
        );

        Ok(period)
    }

    /// Returns one period.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` if the id is unknown.
    pub async fn get_period(&self, tenant: TenantId, id: PeriodId) -> LedgerResult<AccountingPeriod> {
        self.store
            .find_period(tenant, id)
            .await?
            .ok_or(LedgerError::PeriodNotFound(id))
    }

    /// Lists periods ordered by start date.
    pub async fn list_periods(&self, tenant: TenantId) -> LedgerResult<Vec<AccountingPeriod>> {
        Ok(self.store.query_periods(tenant).await?)
    }

    /// Builds the trial balance of posted entries over `[from, to]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from` is after `to`.
    pub async fn generate_trial_balance(
        &self,
        tenant: TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<TrialBalance> {
        validate_date_range(from, to)?;
        self.trial_balance(tenant, from, to, false).await
    }

    /// Closes an open period.
    ///
    /// Holds the period gate exclusively for the whole operation, so no
    /// posting can land between the balance check and the status change.
    /// On any failure the period stays open.
    ///
    /// # Errors
    ///
    /// - `PeriodNotFound` if the id is unknown
    /// - `PeriodAlreadyClosed` if the period is not open
    /// - `InvalidRetainedEarnings` if the closing account is not an active
    ///   equity account
    /// - `UnbalancedPeriod` if the pro-forma trial balance, including drafts
    ///   dated in the period, does not balance
    pub async fn close_period(
        &self,
        tenant: TenantId,
        id: PeriodId,
        closed_by: UserId,
        input: ClosePeriodInput,
    ) -> LedgerResult<CloseOutcome> {
        let _tenant_gate = self.locks.tenant_shared(tenant).await;
        let _period_gate = self.locks.period_exclusive(tenant, id).await;

        let mut period = self.get_period(tenant, id).await?;
        if period.status != PeriodStatus::Open {
            return Err(LedgerError::PeriodAlreadyClosed {
                period_id: id,
                status: period.status,
            });
        }

        let retained_earnings = match input
            .retained_earnings_code
            .or_else(|| self.retained_earnings_code.clone())
        {
            Some(code) => Some(self.retained_earnings_account(tenant, code.trim()).await?),
            None => None,
        };

        let pro_forma = self
            .trial_balance(tenant, period.start_date, period.end_date, true)
            .await?;
        if !pro_forma.is_balanced() {
            warn!(
                tenant_id = %tenant,
                period_id = %id,
                debit = %pro_forma.totals.total_debit,
                credit = %pro_forma.totals.total_credit,
                "Period close blocked by unbalanced trial balance"
            );
            return Err(LedgerError::UnbalancedPeriod {
                period_id: id,
                debit: pro_forma.totals.total_debit,
                credit: pro_forma.totals.total_credit,
            });
        }

        period.transition(PeriodStatus::Closed, closed_by, None);
        let closing_entry = match retained_earnings {
            Some(account) => {
                self.post_closing_entry(tenant, &period, &account, closed_by)
                    .await?
            }
            None => None,
        };
        if closing_entry.is_none() {
            self.store.save_period(tenant, period.clone()).await?;
        }

        info!(
            tenant_id = %tenant,
            period_id = %id,
            closed_by = %closed_by,
            closing_entry = ?closing_entry.as_ref().map(|e| e.entry_number.as_str()),
            "Accounting period closed"
        );

        Ok(CloseOutcome {
            period,
            trial_balance: pro_forma,
            closing_entry,
        })
    }

    /// Reopens a closed period. Locked periods are never reopened.
    ///
    /// # Errors
    ///
    /// - `PeriodNotFound` if the id is unknown
    /// - `PeriodNotClosed` unless the period is closed
    pub async fn reopen_period(
        &self,
        tenant: TenantId,
        id: PeriodId,
        authorized_by: UserId,
        note: Option<String>,
    ) -> LedgerResult<AccountingPeriod> {
        let period = self
            .transition(tenant, id, PeriodStatus::Open, authorized_by, note)
            .await?;
        warn!(
            tenant_id = %tenant,
            period_id = %id,
            authorized_by = %authorized_by,
            "Accounting period reopened"
        );
        Ok(period)
    }

    /// Locks a closed period permanently.
    ///
    /// # Errors
    ///
    /// - `PeriodNotFound` if the id is unknown
    /// - `PeriodNotClosed` unless the period is closed
    pub async fn lock_period(
        &self,
        tenant: TenantId,
        id: PeriodId,
        locked_by: UserId,
    ) -> LedgerResult<AccountingPeriod> {
        let period = self
            .transition(tenant, id, PeriodStatus::Locked, locked_by, None)
            .await?;
        info!(
            tenant_id = %tenant,
            period_id = %id,
            locked_by = %locked_by,
            "Accounting period locked"
        );
        Ok(period)
    }

    /// Moves a closed period to `to` under the exclusive period gate.
    async fn transition(
        &self,
        tenant: TenantId,
        id: PeriodId,
        to: PeriodStatus,
        by: UserId,
        note: Option<String>,
    ) -> LedgerResult<AccountingPeriod> {
        let _period_gate = self.locks.period_exclusive(tenant, id).await;

        let mut period = self.get_period(tenant, id).await?;
        if period.status != PeriodStatus::Closed {
            return Err(LedgerError::PeriodNotClosed {
                period_id: id,
                status: period.status,
            });
        }

        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        period.transition(to, by, note);
        self.store.save_period(tenant, period.clone()).await?;
        Ok(period)
    }

    async fn trial_balance(
        &self,
        tenant: TenantId,
        from: NaiveDate,
        to: NaiveDate,
        include_drafts: bool,
    ) -> LedgerResult<TrialBalance> {
        let accounts = self
            .store
            .query_accounts(tenant, &AccountFilter::default())
            .await?;
        let activity = self
            .projector
            .activity(tenant, from, to, include_drafts)
            .await?;
        TrialBalance::build(
            from,
            to,
            &accounts,
            &activity,
            include_drafts,
            self.tolerance,
        )
    }

    async fn retained_earnings_account(&self, tenant: TenantId, code: &str) -> LedgerResult<Account> {
        let account = self
            .store
            .find_account(tenant, code)
            .await?
            .ok_or_else(|| LedgerError::InvalidRetainedEarnings(code.to_string()))?;
        if account.account_type != AccountType::Equity || !account.is_active {
            return Err(LedgerError::InvalidRetainedEarnings(account.code));
        }
        Ok(account)
    }

    /// Posts the entry zeroing income and expense balances at the period end,
    /// committing it in the same write as the closed `period`. Returns `None`
    /// without writing anything when there is nothing to close. The caller
    /// holds the period gate exclusively.
    async fn post_closing_entry(
        &self,
        tenant: TenantId,
        period: &AccountingPeriod,
        retained_earnings: &Account,
        closed_by: UserId,
    ) -> LedgerResult<Option<JournalEntry>> {
        let posted = self
            .trial_balance(tenant, period.start_date, period.end_date, false)
            .await?;
        let lines = closing_lines(&posted, &retained_earnings.code)?;
        if lines.is_empty() {
            return Ok(None);
        }

        let entry = self
            .journal
            .post_system_entry(
                tenant,
                period.end_date,
                format!("Closing entry: {}", period.name),
                lines,
                closed_by,
                period,
            )
            .await?;
        Ok(Some(entry))
    }
}
