//! Initial database migration.
//!
//! Creates the enums, ledger tables, receivable/payable tables, party ledgers,
//! document sequences and the voucher balance trigger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS & VOUCHERS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(VOUCHERS_SQL).await?;
        db.execute_unprepared(VOUCHER_ENTRIES_SQL).await?;
        db.execute_unprepared(DOCUMENT_SEQUENCES_SQL).await?;

        // ============================================================
        // PART 3: OUTSTANDINGS & ADVANCES
        // ============================================================
        db.execute_unprepared(OUTSTANDINGS_SQL).await?;
        db.execute_unprepared(ADVANCE_CREDITS_SQL).await?;

        // ============================================================
        // PART 4: PARTY LEDGERS
        // ============================================================
        db.execute_unprepared(PARTY_LEDGERS_SQL).await?;
        db.execute_unprepared(PARTY_LEDGER_ENTRIES_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM (
    'ASSET',
    'LIABILITY',
    'EQUITY',
    'REVENUE',
    'EXPENSE'
);

CREATE TYPE voucher_type AS ENUM (
    'payment',
    'receipt',
    'sales',
    'purchase',
    'journal',
    'contra',
    'debit_note',
    'credit_note',
    'adjustment'
);

CREATE TYPE outstanding_type AS ENUM (
    'INVOICE_RECEIVABLE',
    'INVOICE_PAYABLE',
    'PURCHASE_ORDER',
    'ADVANCE_PAYMENT',
    'EXPENSE',
    'LOAN',
    'OTHER'
);

CREATE TYPE outstanding_status AS ENUM (
    'PENDING',
    'OVERDUE',
    'PARTIALLY_PAID',
    'SETTLED',
    'DISPUTED',
    'CANCELLED'
);

CREATE TYPE outstanding_direction AS ENUM ('RECEIVABLE', 'PAYABLE');

CREATE TYPE party_kind AS ENUM ('CUSTOMER', 'SUPPLIER');

CREATE TYPE party_ledger_status AS ENUM ('ACTIVE', 'INACTIVE', 'SUSPENDED');

CREATE TYPE party_entry_kind AS ENUM ('INVOICE', 'PAYMENT', 'ADJUSTMENT');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    parent_id UUID REFERENCES accounts(id) ON DELETE RESTRICT,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_account_not_own_parent CHECK (parent_id IS NULL OR parent_id <> id)
);

CREATE UNIQUE INDEX idx_accounts_parent_code ON accounts (
    COALESCE(parent_id, '00000000-0000-0000-0000-000000000000'::uuid),
    code
);
CREATE INDEX idx_accounts_code ON accounts(code);
CREATE INDEX idx_accounts_parent ON accounts(parent_id) WHERE parent_id IS NOT NULL;
";

const VOUCHERS_SQL: &str = r"
CREATE TABLE vouchers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    voucher_number VARCHAR(50) NOT NULL UNIQUE,
    voucher_type voucher_type NOT NULL,
    voucher_date DATE NOT NULL,
    narration TEXT NOT NULL,
    total_amount NUMERIC(19, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_voucher_total_positive CHECK (total_amount > 0)
);

CREATE INDEX idx_vouchers_date ON vouchers(voucher_date);
CREATE INDEX idx_vouchers_type_date ON vouchers(voucher_type, voucher_date);
";

const VOUCHER_ENTRIES_SQL: &str = r"
CREATE TABLE voucher_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    voucher_id UUID NOT NULL REFERENCES vouchers(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    line_no INTEGER NOT NULL,
    debit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    description VARCHAR(500),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_entry_non_negative CHECK (debit >= 0 AND credit >= 0),
    CONSTRAINT chk_entry_not_blank CHECK (debit > 0 OR credit > 0),
    UNIQUE (voucher_id, line_no)
);

CREATE INDEX idx_ve_account ON voucher_entries(account_id);
";

const DOCUMENT_SEQUENCES_SQL: &str = r"
CREATE TABLE document_sequences (
    prefix VARCHAR(20) NOT NULL,
    year INTEGER NOT NULL,
    last_value BIGINT NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (prefix, year),
    CONSTRAINT chk_sequence_positive CHECK (last_value >= 0)
);
";

const OUTSTANDINGS_SQL: &str = r"
CREATE TABLE outstandings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    outstanding_type outstanding_type NOT NULL,
    direction outstanding_direction NOT NULL,
    reference_type VARCHAR(50) NOT NULL,
    reference_id VARCHAR(100) NOT NULL,
    reference_number VARCHAR(100) NOT NULL,
    original_amount NUMERIC(19, 2) NOT NULL,
    amount NUMERIC(19, 2) NOT NULL,
    due_date DATE NOT NULL,
    days_overdue BIGINT NOT NULL DEFAULT 0,
    status outstanding_status NOT NULL DEFAULT 'PENDING',
    party_name VARCHAR(255) NOT NULL,
    party_contact VARCHAR(50),
    party_key VARCHAR(255) NOT NULL,
    payment_method VARCHAR(50),
    payment_reference VARCHAR(100),
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    version BIGINT NOT NULL DEFAULT 0,
    CONSTRAINT chk_outstanding_amount CHECK (amount >= 0 AND amount <= original_amount),
    CONSTRAINT chk_outstanding_original_positive CHECK (original_amount > 0),
    CONSTRAINT chk_outstanding_days_overdue CHECK (days_overdue >= 0),
    UNIQUE (reference_type, reference_id)
);

CREATE INDEX idx_outstandings_party ON outstandings(direction, party_key, status);
CREATE INDEX idx_outstandings_due ON outstandings(due_date);
CREATE INDEX idx_outstandings_status ON outstandings(status);
";

const ADVANCE_CREDITS_SQL: &str = r"
CREATE TABLE advance_credits (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    direction outstanding_direction NOT NULL,
    party_key VARCHAR(255) NOT NULL,
    party_name VARCHAR(255) NOT NULL,
    original_amount NUMERIC(19, 2) NOT NULL,
    remaining_amount NUMERIC(19, 2) NOT NULL,
    source_reference VARCHAR(100),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_advance_remaining CHECK (
        remaining_amount >= 0 AND remaining_amount <= original_amount
    )
);

CREATE INDEX idx_advance_credits_party ON advance_credits(direction, party_key)
    WHERE remaining_amount > 0;
";

const PARTY_LEDGERS_SQL: &str = r"
CREATE TABLE party_ledgers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    kind party_kind NOT NULL,
    party_name VARCHAR(255) NOT NULL,
    phone VARCHAR(20) NOT NULL,
    email VARCHAR(255),
    address_line1 VARCHAR(255),
    address_line2 VARCHAR(255),
    city VARCHAR(100),
    state VARCHAR(100),
    postal_code VARCHAR(20),
    opening_balance NUMERIC(19, 2) NOT NULL DEFAULT 0,
    current_balance NUMERIC(19, 2) NOT NULL DEFAULT 0,
    total_debits NUMERIC(19, 2) NOT NULL DEFAULT 0,
    total_credits NUMERIC(19, 2) NOT NULL DEFAULT 0,
    status party_ledger_status NOT NULL DEFAULT 'ACTIVE',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_party_balance CHECK (
        current_balance = opening_balance + total_debits - total_credits
    ),
    UNIQUE (kind, phone)
);
";

const PARTY_LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE party_ledger_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    ledger_id UUID NOT NULL REFERENCES party_ledgers(id) ON DELETE CASCADE,
    entry_kind party_entry_kind NOT NULL,
    entry_date DATE NOT NULL,
    debit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    balance_after NUMERIC(19, 2) NOT NULL,
    reference_type VARCHAR(50),
    reference_id VARCHAR(100),
    reference_number VARCHAR(100),
    description VARCHAR(500) NOT NULL,
    payment_method VARCHAR(50),
    payment_reference VARCHAR(100),
    notes TEXT,
    voucher_id UUID REFERENCES vouchers(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_party_entry_one_side CHECK (
        (debit > 0 AND credit = 0) OR (debit = 0 AND credit > 0)
    )
);

CREATE INDEX idx_ple_ledger_date ON party_ledger_entries(ledger_id, entry_date, created_at);
CREATE UNIQUE INDEX idx_ple_invoice_reference ON party_ledger_entries(
    ledger_id, reference_type, reference_id
) WHERE entry_kind = 'INVOICE';
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_voucher_balance
-- Ensures double-entry balance (debit = credit) once a voucher commits
-- ============================================================
CREATE OR REPLACE FUNCTION check_voucher_balance()
RETURNS TRIGGER AS $$
DECLARE
    target_voucher UUID;
    total_debit NUMERIC(19, 2);
    total_credit NUMERIC(19, 2);
BEGIN
    target_voucher := COALESCE(NEW.voucher_id, OLD.voucher_id);

    IF NOT EXISTS (SELECT 1 FROM vouchers WHERE id = target_voucher) THEN
        RETURN NULL;
    END IF;

    SELECT COALESCE(SUM(debit), 0), COALESCE(SUM(credit), 0)
    INTO total_debit, total_credit
    FROM voucher_entries
    WHERE voucher_id = target_voucher;

    IF total_debit <> total_credit THEN
        RAISE EXCEPTION 'Voucher % is unbalanced: debit=%, credit=%',
            target_voucher, total_debit, total_credit;
    END IF;

    RETURN NULL;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_voucher_balance
    AFTER INSERT OR UPDATE OR DELETE ON voucher_entries
    DEFERRABLE INITIALLY DEFERRED
    FOR EACH ROW
    EXECUTE FUNCTION check_voucher_balance();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_check_voucher_balance ON voucher_entries;
DROP FUNCTION IF EXISTS check_voucher_balance();

DROP TABLE IF EXISTS party_ledger_entries CASCADE;
DROP TABLE IF EXISTS party_ledgers CASCADE;
DROP TABLE IF EXISTS advance_credits CASCADE;
DROP TABLE IF EXISTS outstandings CASCADE;
DROP TABLE IF EXISTS document_sequences CASCADE;
DROP TABLE IF EXISTS voucher_entries CASCADE;
DROP TABLE IF EXISTS vouchers CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;

DROP TYPE IF EXISTS party_entry_kind;
DROP TYPE IF EXISTS party_ledger_status;
DROP TYPE IF EXISTS party_kind;
DROP TYPE IF EXISTS outstanding_direction;
DROP TYPE IF EXISTS outstanding_status;
DROP TYPE IF EXISTS outstanding_type;
DROP TYPE IF EXISTS voucher_type;
DROP TYPE IF EXISTS account_type;
";
