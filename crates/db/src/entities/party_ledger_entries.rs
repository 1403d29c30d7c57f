//! `SeaORM` Entity for party_ledger_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PartyEntryKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "party_ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ledger_id: Uuid,
    pub entry_kind: PartyEntryKind,
    pub entry_date: Date,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub credit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub balance_after: Decimal,
    pub reference_type: Option<String>,
    pub reference_id: Option<String>,
    pub reference_number: Option<String>,
    pub description: String,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub voucher_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::party_ledgers::Entity",
        from = "Column::LedgerId",
        to = "super::party_ledgers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    PartyLedgers,
}

impl Related<super::party_ledgers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartyLedgers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
