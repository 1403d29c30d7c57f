//! `SeaORM` Entity for party_ledgers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{PartyKind, PartyLedgerStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "party_ledgers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: PartyKind,
    pub party_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub opening_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub current_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub total_debits: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub total_credits: Decimal,
    pub status: PartyLedgerStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::party_ledger_entries::Entity")]
    PartyLedgerEntries,
}

impl Related<super::party_ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartyLedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
