//! The ledger facade wiring every component to one store.

use std::sync::Arc;

use bursar_shared::LedgerConfig;
use bursar_shared::types::TenantId;
use rust_decimal::Decimal;
use tracing::info;

use crate::accounts::ChartOfAccounts;
use crate::closing::ClosingCoordinator;
use crate::error::LedgerResult;
use crate::journal::JournalEngine;
use crate::locks::LockManager;
use crate::projection::LedgerProjector;
use crate::store::{InMemoryStore, LedgerStore};

/// Runtime settings of a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSettings {
    /// Largest accepted difference between debits and credits.
    pub balance_tolerance: Decimal,
    /// Default equity account for closing entries.
    pub retained_earnings_code: Option<String>,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            balance_tolerance: Decimal::new(1, 2),
            retained_earnings_code: None,
        }
    }
}

impl From<&LedgerConfig> for LedgerSettings {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            balance_tolerance: config.balance_tolerance,
            retained_earnings_code: config.retained_earnings_code.clone(),
        }
    }
}

/// A complete double-entry ledger over one store.
///
/// ```ignore
/// let ledger = Ledger::in_memory(LedgerSettings::default());
/// let draft = ledger.journal().create_draft(tenant, user, input).await?;
/// ledger.journal().post(tenant, draft.id, approver).await?;
/// ```
pub struct Ledger<S = InMemoryStore> {
    accounts: ChartOfAccounts<S>,
    journal: Arc<JournalEngine<S>>,
    projector: Arc<LedgerProjector<S>>,
    closing: ClosingCoordinator<S>,
    locks: Arc<LockManager>,
    settings: LedgerSettings,
}

impl<S: LedgerStore> Ledger<S> {
    /// Wires the registry, journal, projector and closing coordinator to `store`.
    #[must_use]
    pub fn new(store: S, settings: LedgerSettings) -> Self {
        let store = Arc::new(store);
        let locks = Arc::new(LockManager::new());
        let projector = Arc::new(LedgerProjector::new(Arc::clone(&store)));
        let journal = Arc::new(JournalEngine::new(
            Arc::clone(&store),
            Arc::clone(&projector),
            Arc::clone(&locks),
            settings.balance_tolerance,
        ));
        let accounts = ChartOfAccounts::new(
            Arc::clone(&store),
            Arc::clone(&projector),
            Arc::clone(&locks),
        );
        let closing = ClosingCoordinator::new(
            store,
            Arc::clone(&projector),
            Arc::clone(&journal),
            Arc::clone(&locks),
            settings.balance_tolerance,
            settings.retained_earnings_code.clone(),
        );

        Self {
            accounts,
            journal,
            projector,
            closing,
            locks,
            settings,
        }
    }

    /// The chart of accounts.
    #[must_use]
    pub fn accounts(&self) -> &ChartOfAccounts<S> {
        &self.accounts
    }

    /// The journal engine.
    #[must_use]
    pub fn journal(&self) -> &JournalEngine<S> {
        &self.journal
    }

    /// The ledger projection.
    #[must_use]
    pub fn projector(&self) -> &LedgerProjector<S> {
        &self.projector
    }

    /// The trial balance and period closing coordinator.
    #[must_use]
    pub fn closing(&self) -> &ClosingCoordinator<S> {
        &self.closing
    }

    /// The settings this ledger was built with.
    #[must_use]
    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Rebuilds a tenant's projection from the stored journal while holding
    /// the tenant gate exclusively.
    pub async fn rebuild_projection(&self, tenant: TenantId) -> LedgerResult<usize> {
        let _tenant_gate = self.locks.tenant_exclusive(tenant).await;
        let replayed = self.projector.rebuild(tenant).await?;
        info!(tenant_id = %tenant, entries = replayed, "Ledger projection rebuilt");
        Ok(replayed)
    }
}

impl Ledger<InMemoryStore> {
    /// A ledger backed by the in-memory store.
    #[must_use]
    pub fn in_memory(settings: LedgerSettings) -> Self {
        Self::new(InMemoryStore::new(), settings)
    }
}
