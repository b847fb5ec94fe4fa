//! Lock registry for ledger units of work.
//!
//! Locks are always taken in this order to stay deadlock-free:
//!
//! 1. tenant gate (shared; projection rebuilds take it exclusively)
//! 2. journal entry mutex
//! 3. period gate (shared for postings, exclusive for close/reopen/lock)
//! 4. account mutexes, sorted by code

use std::collections::BTreeSet;
use std::sync::Arc;

use bursar_shared::types::{JournalEntryId, PeriodId, TenantId};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// Hands out per-tenant, per-entry, per-period and per-account locks.
#[derive(Debug, Default)]
pub struct LockManager {
    tenants: DashMap<TenantId, Arc<RwLock<()>>>,
    entries: DashMap<(TenantId, JournalEntryId), Arc<Mutex<()>>>,
    periods: DashMap<(TenantId, PeriodId), Arc<RwLock<()>>>,
    accounts: DashMap<(TenantId, String), Arc<Mutex<()>>>,
}

/// Guards for a sorted set of account locks.
#[derive(Debug)]
pub struct AccountGuards {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl LockManager {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared access to a tenant's books.
    pub async fn tenant_shared(&self, tenant: TenantId) -> OwnedRwLockReadGuard<()> {
        let gate = Arc::clone(&self.tenants.entry(tenant).or_default());
        gate.read_owned().await
    }

    /// Exclusive access to a tenant's books.
    pub async fn tenant_exclusive(&self, tenant: TenantId) -> OwnedRwLockWriteGuard<()> {
        let gate = Arc::clone(&self.tenants.entry(tenant).or_default());
        gate.write_owned().await
    }

    /// Serializes operations on one journal entry.
    pub async fn entry(&self, tenant: TenantId, id: JournalEntryId) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(&self.entries.entry((tenant, id)).or_default());
        lock.lock_owned().await
    }

    /// Drops the registry slot of an entry that reached a terminal state.
    pub fn release_entry(&self, tenant: TenantId, id: JournalEntryId) {
        self.entries.remove(&(tenant, id));
    }

    /// Shared access to a period, held while posting into it.
    pub async fn period_shared(&self, tenant: TenantId, id: PeriodId) -> OwnedRwLockReadGuard<()> {
        let gate = Arc::clone(&self.periods.entry((tenant, id)).or_default());
        gate.read_owned().await
    }

    /// Exclusive access to a period, held while changing its status.
    pub async fn period_exclusive(
        &self,
        tenant: TenantId,
        id: PeriodId,
    ) -> OwnedRwLockWriteGuard<()> {
        let gate = Arc::clone(&self.periods.entry((tenant, id)).or_default());
        gate.write_owned().await
    }

    /// Locks every distinct account code in sorted order.
    pub async fn accounts<'a, I>(&self, tenant: TenantId, codes: I) -> AccountGuards
    where
        I: IntoIterator<Item = &'a str>,
    {
        let sorted: BTreeSet<&str> = codes.into_iter().collect();
        let mut guards = Vec::with_capacity(sorted.len());
        for code in sorted {
            let lock = Arc::clone(
                &self
                    .accounts
                    .entry((tenant, code.to_string()))
                    .or_default(),
            );
            guards.push(lock.lock_owned().await);
        }
        AccountGuards { _guards: guards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_account_locks_are_exclusive() {
        let locks = Arc::new(LockManager::new());
        let tenant = TenantId::new();

        let held = locks.accounts(tenant, ["4000", "1000"]).await;

        let contender = Arc::clone(&locks);
        let waiting = tokio::spawn(async move {
            let _guards = contender.accounts(tenant, ["1000"]).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(held);
        waiting.await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_codes_lock_once() {
        let locks = LockManager::new();
        let tenant = TenantId::new();
        // Locking the same code twice in one call must not self-deadlock.
        let _guards = locks.accounts(tenant, ["1000", "1000", "2000"]).await;
    }

    #[tokio::test]
    async fn test_period_gate_allows_shared_postings() {
        let locks = LockManager::new();
        let tenant = TenantId::new();
        let period = PeriodId::new();

        let first = locks.period_shared(tenant, period).await;
        let second = locks.period_shared(tenant, period).await;
        drop((first, second));

        let _exclusive = locks.period_exclusive(tenant, period).await;
    }

    #[tokio::test]
    async fn test_other_tenants_do_not_contend() {
        let locks = LockManager::new();
        let _a = locks.tenant_exclusive(TenantId::new()).await;
        let _b = locks.tenant_exclusive(TenantId::new()).await;
    }
}
