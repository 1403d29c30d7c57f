//! Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "ASSET")]
    Asset,
    #[sea_orm(string_value = "LIABILITY")]
    Liability,
    #[sea_orm(string_value = "EQUITY")]
    Equity,
    #[sea_orm(string_value = "REVENUE")]
    Revenue,
    #[sea_orm(string_value = "EXPENSE")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "voucher_type")]
pub enum VoucherType {
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "receipt")]
    Receipt,
    #[sea_orm(string_value = "sales")]
    Sales,
    #[sea_orm(string_value = "purchase")]
    Purchase,
    #[sea_orm(string_value = "journal")]
    Journal,
    #[sea_orm(string_value = "contra")]
    Contra,
    #[sea_orm(string_value = "debit_note")]
    DebitNote,
    #[sea_orm(string_value = "credit_note")]
    CreditNote,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "outstanding_type")]
pub enum OutstandingType {
    #[sea_orm(string_value = "INVOICE_RECEIVABLE")]
    InvoiceReceivable,
    #[sea_orm(string_value = "INVOICE_PAYABLE")]
    InvoicePayable,
    #[sea_orm(string_value = "PURCHASE_ORDER")]
    PurchaseOrder,
    #[sea_orm(string_value = "ADVANCE_PAYMENT")]
    AdvancePayment,
    #[sea_orm(string_value = "EXPENSE")]
    Expense,
    #[sea_orm(string_value = "LOAN")]
    Loan,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "outstanding_status")]
pub enum OutstandingStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "OVERDUE")]
    Overdue,
    #[sea_orm(string_value = "PARTIALLY_PAID")]
    PartiallyPaid,
    #[sea_orm(string_value = "SETTLED")]
    Settled,
    #[sea_orm(string_value = "DISPUTED")]
    Disputed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "outstanding_direction")]
pub enum OutstandingDirection {
    #[sea_orm(string_value = "RECEIVABLE")]
    Receivable,
    #[sea_orm(string_value = "PAYABLE")]
    Payable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "party_kind")]
pub enum PartyKind {
    #[sea_orm(string_value = "CUSTOMER")]
    Customer,
    #[sea_orm(string_value = "SUPPLIER")]
    Supplier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "party_ledger_status")]
pub enum PartyLedgerStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "INACTIVE")]
    Inactive,
    #[sea_orm(string_value = "SUSPENDED")]
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "party_entry_kind")]
pub enum PartyEntryKind {
    #[sea_orm(string_value = "INVOICE")]
    Invoice,
    #[sea_orm(string_value = "PAYMENT")]
    Payment,
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
}
