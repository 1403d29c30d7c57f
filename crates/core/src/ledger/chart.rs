//! Chart of accounts held as an arena indexed by id.
//!
//! Parents are stored as ids, never as references. Every parent assignment
//! goes through a walk up the ancestor chain, so the hierarchy is always a
//! forest.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use bahi_shared::types::AccountId;

use super::error::LedgerError;
use super::types::AccountType;

/// A chart of accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Human-readable code, unique among siblings.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Optional parent account.
    pub parent_id: Option<AccountId>,
    /// Whether the account accepts postings.
    pub is_active: bool,
    /// Whether any voucher entry references this account.
    pub has_postings: bool,
}

/// Input for creating an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    /// Human-readable code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Optional parent account.
    pub parent_id: Option<AccountId>,
}

/// In-memory chart of accounts.
#[derive(Debug, Clone, Default)]
pub struct ChartOfAccounts {
    accounts: HashMap<AccountId, Account>,
}

impl ChartOfAccounts {
    /// Creates an empty chart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chart from stored accounts, rejecting dangling parents and cycles.
    pub fn from_accounts(accounts: Vec<Account>) -> Result<Self, LedgerError> {
        let chart = Self {
            accounts: accounts.into_iter().map(|a| (a.id, a)).collect(),
        };

        for account in chart.accounts.values() {
            if let Some(parent_id) = account.parent_id {
                if !chart.accounts.contains_key(&parent_id) {
                    return Err(LedgerError::AccountNotFound(parent_id));
                }
                chart.check_no_cycle(account.id, parent_id)?;
            }
        }

        Ok(chart)
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if the chart has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Looks up an account.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// Looks up an account, failing with `AccountNotFound`.
    pub fn require(&self, id: AccountId) -> Result<&Account, LedgerError> {
        self.accounts.get(&id).ok_or(LedgerError::AccountNotFound(id))
    }

    /// Finds the single account carrying `code`.
    pub fn find_by_code(&self, code: &str) -> Result<&Account, LedgerError> {
        let code = code.trim();
        let mut matches = self.accounts.values().filter(|a| a.code == code);
        match (matches.next(), matches.next()) {
            (Some(account), None) => Ok(account),
            (Some(_), Some(_)) => Err(LedgerError::AmbiguousAccountCode(code.to_string())),
            (None, _) => Err(LedgerError::AccountCodeNotFound(code.to_string())),
        }
    }

    /// Lists accounts ordered by code, optionally only active ones.
    #[must_use]
    pub fn list(&self, active_only: bool) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self
            .accounts
            .values()
            .filter(|a| !active_only || a.is_active)
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code).then_with(|| a.id.cmp(&b.id)));
        accounts
    }

    /// Direct children ordered by code.
    #[must_use]
    pub fn children(&self, id: AccountId) -> Vec<&Account> {
        let mut children: Vec<&Account> = self
            .accounts
            .values()
            .filter(|a| a.parent_id == Some(id))
            .collect();
        children.sort_by(|a, b| a.code.cmp(&b.code));
        children
    }

    /// Ancestors from the immediate parent up to the root.
    #[must_use]
    pub fn ancestors(&self, id: AccountId) -> Vec<&Account> {
        let mut chain = Vec::new();
        let mut current = self.accounts.get(&id).and_then(|a| a.parent_id);
        while let Some(parent_id) = current {
            let Some(parent) = self.accounts.get(&parent_id) else {
                break;
            };
            // Guard against a corrupted store; from_accounts rejects cycles.
            if chain.len() > self.accounts.len() {
                break;
            }
            chain.push(parent);
            current = parent.parent_id;
        }
        chain
    }

    /// Validates an account before insertion.
    pub fn validate_new(&self, input: &NewAccount) -> Result<(), LedgerError> {
        if input.code.trim().is_empty() {
            return Err(LedgerError::BlankAccountField("code"));
        }
        if input.name.trim().is_empty() {
            return Err(LedgerError::BlankAccountField("name"));
        }

        if let Some(parent_id) = input.parent_id {
            let parent = self.require(parent_id)?;
            if parent.account_type != input.account_type {
                return Err(LedgerError::AccountTypeMismatch {
                    parent: parent.account_type,
                    child: input.account_type,
                });
            }
        }

        self.check_code_free(input.code.trim(), input.parent_id, None)
    }

    /// Validates and inserts an account, returning its new id.
    pub fn add(&mut self, input: NewAccount) -> Result<AccountId, LedgerError> {
        self.validate_new(&input)?;

        let account = Account {
            id: AccountId::new(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            account_type: input.account_type,
            parent_id: input.parent_id,
            is_active: true,
            has_postings: false,
        };
        let id = account.id;
        self.accounts.insert(id, account);
        Ok(id)
    }

    /// Validates a parent change without applying it.
    pub fn validate_parent_change(
        &self,
        id: AccountId,
        parent_id: Option<AccountId>,
    ) -> Result<(), LedgerError> {
        let account = self.require(id)?;

        if let Some(parent_id) = parent_id {
            let parent = self.require(parent_id)?;
            if parent.account_type != account.account_type {
                return Err(LedgerError::AccountTypeMismatch {
                    parent: parent.account_type,
                    child: account.account_type,
                });
            }
            self.check_no_cycle(id, parent_id)?;
        }

        self.check_code_free(&account.code, parent_id, Some(id))
    }

    /// Moves an account under a new parent (or to the root).
    pub fn set_parent(
        &mut self,
        id: AccountId,
        parent_id: Option<AccountId>,
    ) -> Result<(), LedgerError> {
        self.validate_parent_change(id, parent_id)?;
        if let Some(account) = self.accounts.get_mut(&id) {
            account.parent_id = parent_id;
        }
        Ok(())
    }

    /// Sets the active flag.
    pub fn set_active(&mut self, id: AccountId, is_active: bool) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        account.is_active = is_active;
        Ok(())
    }

    /// Validates a type change: refused once postings exist or when it would
    /// break type agreement with the parent or children.
    pub fn validate_type_change(
        &self,
        id: AccountId,
        account_type: AccountType,
    ) -> Result<(), LedgerError> {
        let account = self.require(id)?;
        if account.account_type == account_type {
            return Ok(());
        }
        if account.has_postings {
            return Err(LedgerError::AccountTypeChangeNotAllowed(id));
        }
        if let Some(parent) = account.parent_id.and_then(|p| self.accounts.get(&p)) {
            return Err(LedgerError::AccountTypeMismatch {
                parent: parent.account_type,
                child: account_type,
            });
        }
        if let Some(child) = self.children(id).first() {
            return Err(LedgerError::AccountTypeMismatch {
                parent: account_type,
                child: child.account_type,
            });
        }
        Ok(())
    }

    /// Changes an account's type.
    pub fn change_type(
        &mut self,
        id: AccountId,
        account_type: AccountType,
    ) -> Result<(), LedgerError> {
        self.validate_type_change(id, account_type)?;
        if let Some(account) = self.accounts.get_mut(&id) {
            account.account_type = account_type;
        }
        Ok(())
    }

    /// Marks an account as having postings.
    pub fn mark_posted(&mut self, id: AccountId) {
        if let Some(account) = self.accounts.get_mut(&id) {
            account.has_postings = true;
        }
    }

    fn check_code_free(
        &self,
        code: &str,
        parent_id: Option<AccountId>,
        exclude: Option<AccountId>,
    ) -> Result<(), LedgerError> {
        let taken = self.accounts.values().any(|a| {
            a.parent_id == parent_id && a.code == code && Some(a.id) != exclude
        });
        if taken {
            return Err(LedgerError::DuplicateAccountCode(code.to_string()));
        }
        Ok(())
    }

    /// Walks up from `parent_id`; reaching `id` means a cycle.
    fn check_no_cycle(&self, id: AccountId, parent_id: AccountId) -> Result<(), LedgerError> {
        let mut current = Some(parent_id);
        let mut steps = 0usize;
        while let Some(cursor) = current {
            if cursor == id || steps > self.accounts.len() {
                return Err(LedgerError::AccountCycle {
                    account: id,
                    parent: parent_id,
                });
            }
            steps += 1;
            current = self.accounts.get(&cursor).and_then(|a| a.parent_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(code: &str, account_type: AccountType, parent_id: Option<AccountId>) -> NewAccount {
        NewAccount {
            code: code.to_string(),
            name: format!("Account {code}"),
            account_type,
            parent_id,
        }
    }

    #[test]
    fn test_list_is_ordered_by_code() {
        let mut chart = ChartOfAccounts::new();
        chart.add(new_account("3000", AccountType::Equity, None)).unwrap();
        chart.add(new_account("1000", AccountType::Asset, None)).unwrap();
        let inactive = chart.add(new_account("2000", AccountType::Liability, None)).unwrap();
        chart.set_active(inactive, false).unwrap();

        let codes: Vec<&str> = chart.list(false).iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["1000", "2000", "3000"]);

        let active: Vec<&str> = chart.list(true).iter().map(|a| a.code.as_str()).collect();
        assert_eq!(active, vec!["1000", "3000"]);
    }

    #[test]
    fn test_code_unique_within_parent_only() {
        let mut chart = ChartOfAccounts::new();
        let assets = chart.add(new_account("1000", AccountType::Asset, None)).unwrap();
        let expenses = chart.add(new_account("5000", AccountType::Expense, None)).unwrap();

        chart.add(new_account("01", AccountType::Asset, Some(assets))).unwrap();
        chart.add(new_account("01", AccountType::Expense, Some(expenses))).unwrap();

        let dup = chart.add(new_account("01", AccountType::Asset, Some(assets)));
        assert!(matches!(dup, Err(LedgerError::DuplicateAccountCode(_))));

        assert!(matches!(
            chart.find_by_code("01"),
            Err(LedgerError::AmbiguousAccountCode(_))
        ));
        assert_eq!(chart.find_by_code("1000").unwrap().id, assets);
        assert!(matches!(
            chart.find_by_code("9999"),
            Err(LedgerError::AccountCodeNotFound(_))
        ));
    }

    #[test]
    fn test_child_must_match_parent_type() {
        let mut chart = ChartOfAccounts::new();
        let assets = chart.add(new_account("1000", AccountType::Asset, None)).unwrap();
        let result = chart.add(new_account("1100", AccountType::Expense, Some(assets)));
        assert!(matches!(result, Err(LedgerError::AccountTypeMismatch { .. })));
    }

    #[test]
    fn test_set_parent_rejects_self_and_descendant() {
        let mut chart = ChartOfAccounts::new();
        let root = chart.add(new_account("1000", AccountType::Asset, None)).unwrap();
        let child = chart.add(new_account("1100", AccountType::Asset, Some(root))).unwrap();
        let grandchild = chart.add(new_account("1110", AccountType::Asset, Some(child))).unwrap();

        assert!(matches!(
            chart.set_parent(root, Some(root)),
            Err(LedgerError::AccountCycle { .. })
        ));
        assert!(matches!(
            chart.set_parent(root, Some(grandchild)),
            Err(LedgerError::AccountCycle { .. })
        ));

        // Moving a leaf to the root is fine.
        chart.set_parent(grandchild, None).unwrap();
        assert!(chart.get(grandchild).unwrap().parent_id.is_none());
    }

    #[test]
    fn test_ancestors_and_children() {
        let mut chart = ChartOfAccounts::new();
        let root = chart.add(new_account("1000", AccountType::Asset, None)).unwrap();
        let child = chart.add(new_account("1100", AccountType::Asset, Some(root))).unwrap();
        let leaf = chart.add(new_account("1110", AccountType::Asset, Some(child))).unwrap();

        let ancestors: Vec<AccountId> = chart.ancestors(leaf).iter().map(|a| a.id).collect();
        assert_eq!(ancestors, vec![child, root]);
        assert_eq!(chart.children(root).len(), 1);
        assert!(chart.children(leaf).is_empty());
    }

    #[test]
    fn test_from_accounts_rejects_stored_cycle() {
        let a = AccountId::new();
        let b = AccountId::new();
        let make = |id, code: &str, parent| Account {
            id,
            code: code.to_string(),
            name: code.to_string(),
            account_type: AccountType::Asset,
            parent_id: Some(parent),
            is_active: true,
            has_postings: false,
        };
        let result = ChartOfAccounts::from_accounts(vec![make(a, "A", b), make(b, "B", a)]);
        assert!(matches!(result, Err(LedgerError::AccountCycle { .. })));
    }

    #[test]
    fn test_type_change_blocked_after_postings() {
        let mut chart = ChartOfAccounts::new();
        let id = chart.add(new_account("4000", AccountType::Revenue, None)).unwrap();
        chart.change_type(id, AccountType::Liability).unwrap();
        chart.mark_posted(id);
        assert!(matches!(
            chart.change_type(id, AccountType::Revenue),
            Err(LedgerError::AccountTypeChangeNotAllowed(_))
        ));
        // Same type is a no-op even with postings.
        assert!(chart.change_type(id, AccountType::Liability).is_ok());
    }

    #[test]
    fn test_blank_fields_rejected() {
        let chart = ChartOfAccounts::new();
        let mut input = new_account("  ", AccountType::Asset, None);
        assert!(matches!(
            chart.validate_new(&input),
            Err(LedgerError::BlankAccountField("code"))
        ));
        input.code = "1000".into();
        input.name = String::new();
        assert!(matches!(
            chart.validate_new(&input),
            Err(LedgerError::BlankAccountField("name"))
        ));
    }
}
