//! Ledger service for voucher validation.
//!
//! This module provides the core business logic for validating vouchers
//! before they are persisted to the database.

use rust_decimal::Decimal;

use bahi_shared::types::{AccountId, is_currency_scale};

use super::chart::{Account, ChartOfAccounts};
use super::error::LedgerError;
use super::types::{CreateVoucherInput, ResolvedEntry, VoucherTotals};

/// Ledger service for voucher validation.
///
/// This service contains pure business logic with no database dependencies.
pub struct LedgerService;

impl LedgerService {
    /// Validate a voucher before persisting.
    ///
    /// 1. Drops lines with no account or with both sides zero
    /// 2. Rejects an empty remainder
    /// 3. Validates each amount (non-negative, two decimal places)
    /// 4. Validates each account (exists, active)
    /// 5. Validates balance (debits = credits)
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails. Nothing is partially accepted.
    pub fn validate_voucher<A>(
        input: &CreateVoucherInput,
        account_lookup: A,
    ) -> Result<(Vec<ResolvedEntry>, VoucherTotals), LedgerError>
    where
        A: Fn(AccountId) -> Option<Account>,
    {
        let mut resolved = Vec::with_capacity(input.entries.len());

        for entry in input.entries.iter().filter(|e| !e.is_blank()) {
            let Some(account_id) = entry.account_id else {
                continue;
            };

            for amount in [entry.debit, entry.credit] {
                if amount.is_sign_negative() && !amount.is_zero() {
                    return Err(LedgerError::NegativeAmount);
                }
                if !is_currency_scale(amount) {
                    return Err(LedgerError::InvalidPrecision(amount));
                }
            }

            let account = account_lookup(account_id).ok_or(LedgerError::AccountNotFound(account_id))?;
            if !account.is_active {
                return Err(LedgerError::AccountInactive(account_id));
            }

            resolved.push(ResolvedEntry {
                account_id,
                debit: entry.debit,
                credit: entry.credit,
                description: entry.description.clone(),
            });
        }

        if resolved.is_empty() {
            return Err(LedgerError::EmptyVoucher);
        }

        let totals = Self::calculate_totals(&resolved);
        if !totals.is_balanced {
            return Err(LedgerError::ImbalancedVoucher {
                debit: totals.total_debit,
                credit: totals.total_credit,
            });
        }

        Ok((resolved, totals))
    }

    /// Validate a voucher against an in-memory chart.
    pub fn validate_against_chart(
        input: &CreateVoucherInput,
        chart: &ChartOfAccounts,
    ) -> Result<(Vec<ResolvedEntry>, VoucherTotals), LedgerError> {
        Self::validate_voucher(input, |id| chart.get(id).cloned())
    }

    /// Calculate voucher totals from resolved entries.
    #[must_use]
    pub fn calculate_totals(entries: &[ResolvedEntry]) -> VoucherTotals {
        let total_debit: Decimal = entries.iter().map(|e| e.debit).sum();
        let total_credit: Decimal = entries.iter().map(|e| e.credit).sum();

        VoucherTotals::new(total_debit, total_credit)
    }
}
