//! Chart of accounts registry service.

use std::sync::Arc;

use bursar_shared::types::TenantId;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use super::types::{Account, AccountFilter, AccountType, AccountUpdate, NewAccount};
use crate::error::{LedgerError, LedgerResult, ParentDefect};
use crate::locks::LockManager;
use crate::projection::LedgerProjector;
use crate::store::{LedgerStore, StoreError};

/// Registry of ledger accounts for every tenant.
pub struct ChartOfAccounts<S> {
    store: Arc<S>,
    projector: Arc<LedgerProjector<S>>,
    locks: Arc<LockManager>,
}

impl<S: LedgerStore> ChartOfAccounts<S> {
    /// Creates a registry over the given store and projection.
    #[must_use]
    pub fn new(store: Arc<S>, projector: Arc<LedgerProjector<S>>, locks: Arc<LockManager>) -> Self {
        Self {
            store,
            projector,
            locks,
        }
    }

    /// Registers a new active account.
    ///
    /// # Errors
    ///
    /// - `MalformedAccount` if the code or name is blank
    /// - `InvalidParent` if the parent is missing, inactive or of another type
    /// - `DuplicateCode` if the code is already registered
    pub async fn create_account(&self, tenant: TenantId, input: NewAccount) -> LedgerResult<Account> {
        let code = input.code.trim();
        if code.is_empty() {
            return Err(LedgerError::MalformedAccount(
                "account code cannot be empty".to_string(),
            ));
        }
        let name = input.name.trim();
        if name.is_empty() {
            return Err(LedgerError::MalformedAccount(
                "account name cannot be empty".to_string(),
            ));
        }

        let parent_code = input
            .parent_code
            .as_deref()
            .map(str::trim)
            .filter(|parent| !parent.is_empty())
            .map(str::to_string);

        let _tenant = self.locks.tenant_shared(tenant).await;
        // The parent lock keeps it from being deactivated while the child lands.
        let _accounts = self
            .locks
            .accounts(tenant, std::iter::once(code).chain(parent_code.as_deref()))
            .await;

        if let Some(parent) = parent_code.as_deref() {
            self.check_parent(tenant, code, parent, input.account_type)
                .await?;
        }

        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let account = Account::new(code, name, input.account_type, parent_code, description);

        match self.store.insert_account(tenant, account.clone()).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(LedgerError::DuplicateCode(code.to_string())),
            Err(e) => return Err(e.into()),
        }

        info!(
            tenant_id = %tenant,
            account_code = %account.code,
            account_type = %account.account_type,
            "Account created"
        );

        Ok(account)
    }

    /// Returns an account with its projected balances.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the code is not registered.
    pub async fn get_account(&self, tenant: TenantId, code: &str) -> LedgerResult<Account> {
        let account = self.load(tenant, code).await?;
        Ok(self.hydrate(tenant, account))
    }

    /// Lists accounts ordered by code, with projected balances.
    pub async fn list_accounts(
        &self,
        tenant: TenantId,
        filter: &AccountFilter,
    ) -> LedgerResult<Vec<Account>> {
        let accounts = self.store.query_accounts(tenant, filter).await?;
        Ok(accounts
            .into_iter()
            .map(|account| self.hydrate(tenant, account))
            .collect())
    }

    /// Changes an account's name, description or type.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the code is not registered
    /// - `MalformedAccount` if the new name is blank
    /// - `AccountTypeChangeNotAllowed` if the type changes on an account that
    ///   has postings or children, or no longer matches its parent
    pub async fn update_account(
        &self,
        tenant: TenantId,
        code: &str,
        update: AccountUpdate,
    ) -> LedgerResult<Account> {
        let _tenant = self.locks.tenant_shared(tenant).await;
        let _account = self.locks.accounts(tenant, [code]).await;

        let mut account = self.load(tenant, code).await?;

        if let Some(name) = update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(LedgerError::MalformedAccount(
                    "account name cannot be empty".to_string(),
                ));
            }
            account.name = name.to_string();
        }

        if let Some(description) = update.description {
            let description = description.trim();
            account.description = (!description.is_empty()).then(|| description.to_string());
        }

        if let Some(new_type) = update.account_type.filter(|t| *t != account.account_type) {
            self.check_type_change(tenant, &account).await?;
            if let Some(parent_code) = account.parent_code.as_deref() {
                let parent = self.load(tenant, parent_code).await?;
                if parent.account_type != new_type {
                    return Err(LedgerError::AccountTypeChangeNotAllowed(account.code));
                }
            }
            account.account_type = new_type;
        }

        account.updated_at = Utc::now();
        self.store.save_account(tenant, account.clone()).await?;

        info!(
            tenant_id = %tenant,
            account_code = %account.code,
            "Account updated"
        );

        Ok(self.hydrate(tenant, account))
    }

    /// Soft-deactivates an account. Deactivating an inactive account is a no-op.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the code is not registered
    /// - `AccountHasOpenBalance` if the projected balance is nonzero
    pub async fn deactivate_account(&self, tenant: TenantId, code: &str) -> LedgerResult<Account> {
        let _tenant = self.locks.tenant_shared(tenant).await;
        // Postings take the same lock, so the balance cannot move underneath us.
        let _account = self.locks.accounts(tenant, [code]).await;

        let account = self.hydrate(tenant, self.load(tenant, code).await?);
        if !account.is_active {
            return Ok(account);
        }
        if account.balance != Decimal::ZERO {
            return Err(LedgerError::AccountHasOpenBalance {
                code: account.code,
                balance: account.balance,
            });
        }

        let account = self.set_active(tenant, account, false).await?;
        info!(tenant_id = %tenant, account_code = %account.code, "Account deactivated");
        Ok(account)
    }

    /// Reactivates a deactivated account. Reactivating an active account is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the code is not registered.
    pub async fn reactivate_account(&self, tenant: TenantId, code: &str) -> LedgerResult<Account> {
        let _tenant = self.locks.tenant_shared(tenant).await;
        let _account = self.locks.accounts(tenant, [code]).await;

        let account = self.hydrate(tenant, self.load(tenant, code).await?);
        if account.is_active {
            return Ok(account);
        }

        let account = self.set_active(tenant, account, true).await?;
        info!(tenant_id = %tenant, account_code = %account.code, "Account reactivated");
        Ok(account)
    }

    async fn set_active(
        &self,
        tenant: TenantId,
        mut account: Account,
        is_active: bool,
    ) -> LedgerResult<Account> {
        account.is_active = is_active;
        account.updated_at = Utc::now();
        self.store.save_account(tenant, account.clone()).await?;
        Ok(account)
    }

    async fn load(&self, tenant: TenantId, code: &str) -> LedgerResult<Account> {
        self.store
            .find_account(tenant, code)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))
    }

    fn hydrate(&self, tenant: TenantId, account: Account) -> Account {
        let totals = self.projector.totals(tenant, &account.code);
        account.with_totals(&totals)
    }

    async fn check_parent(
        &self,
        tenant: TenantId,
        code: &str,
        parent_code: &str,
        account_type: AccountType,
    ) -> LedgerResult<()> {
        let invalid = |defect| LedgerError::InvalidParent {
            parent: parent_code.to_string(),
            defect,
        };

        if parent_code == code {
            return Err(invalid(ParentDefect::SelfReference));
        }
        let parent = self
            .store
            .find_account(tenant, parent_code)
            .await?
            .ok_or_else(|| invalid(ParentDefect::Missing))?;
        if !parent.is_active {
            return Err(invalid(ParentDefect::Inactive));
        }
        if parent.account_type != account_type {
            return Err(invalid(ParentDefect::TypeMismatch));
        }
        Ok(())
    }

    async fn check_type_change(&self, tenant: TenantId, account: &Account) -> LedgerResult<()> {
        if self.projector.has_postings(tenant, &account.code) {
            return Err(LedgerError::AccountTypeChangeNotAllowed(
                account.code.clone(),
            ));
        }
        let children = self
            .store
            .query_accounts(tenant, &AccountFilter::children_of(&account.code))
            .await?;
        if !children.is_empty() {
            return Err(LedgerError::AccountTypeChangeNotAllowed(
                account.code.clone(),
            ));
        }
        Ok(())
    }
}
