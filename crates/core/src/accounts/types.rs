//! Chart of accounts domain types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::projection::{AccountTotals, NormalSide};

/// Account classification.
///
/// - Assets and expenses are debit-normal.
/// - Liabilities, equity and income are credit-normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Residual interest, including retained earnings.
    Equity,
    /// Revenue such as tuition.
    Income,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// Every account type in chart order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Income,
        Self::Expense,
    ];

    /// Returns the lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Returns the side on which this account type increases.
    #[must_use]
    pub fn normal_side(self) -> NormalSide {
        match self {
            Self::Asset | Self::Expense => NormalSide::Debit,
            Self::Liability | Self::Equity | Self::Income => NormalSide::Credit,
        }
    }

    /// Returns true for accounts zeroed into equity when a period closes.
    #[must_use]
    pub fn is_temporary(self) -> bool {
        matches!(self, Self::Income | Self::Expense)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "income" | "revenue" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::MalformedAccount(format!(
                "unknown account type '{other}'"
            ))),
        }
    }
}

/// A ledger account in the chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique code within the tenant, e.g. "1000".
    pub code: String,
    /// Display name.
    pub name: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Account classification.
    pub account_type: AccountType,
    /// Code of the parent account, if any.
    pub parent_code: Option<String>,
    /// Inactive accounts accept no postings.
    pub is_active: bool,
    /// Sum of posted debits.
    pub debit_total: Decimal,
    /// Sum of posted credits.
    pub credit_total: Decimal,
    /// Net balance, positive on the type's normal side.
    pub balance: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates an active account with zero balances.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
        parent_code: Option<String>,
        description: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            code: code.into(),
            name: name.into(),
            description,
            account_type,
            parent_code,
            is_active: true,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fills the balance fields from projected totals.
    #[must_use]
    pub fn with_totals(mut self, totals: &AccountTotals) -> Self {
        self.debit_total = totals.debit_total;
        self.credit_total = totals.credit_total;
        self.balance = totals.balance(self.account_type.normal_side());
        self
    }
}

/// Input for registering an account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    /// Account code; surrounding whitespace is trimmed.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Optional parent account code.
    #[serde(default)]
    pub parent_code: Option<String>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update of an account. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdate {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New account type.
    #[serde(default)]
    pub account_type: Option<AccountType>,
    /// New description. An empty string clears it.
    #[serde(default)]
    pub description: Option<String>,
}

/// Filter for listing accounts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountFilter {
    /// Only accounts of this type.
    #[serde(default)]
    pub account_type: Option<AccountType>,
    /// Only active (true) or inactive (false) accounts.
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Only direct children of this account.
    #[serde(default)]
    pub parent_code: Option<String>,
}

impl AccountFilter {
    /// Returns a filter matching the direct children of `code`.
    #[must_use]
    pub fn children_of(code: &str) -> Self {
        Self {
            parent_code: Some(code.to_string()),
            ..Self::default()
        }
    }

    /// Returns true if the account passes every set criterion.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        self.account_type
            .is_none_or(|account_type| account.account_type == account_type)
            && self
                .is_active
                .is_none_or(|is_active| account.is_active == is_active)
            && self
                .parent_code
                .as_deref()
                .is_none_or(|parent| account.parent_code.as_deref() == Some(parent))
    }
}
