//! `SeaORM` Entity for vouchers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::VoucherType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "vouchers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub voucher_number: String,
    pub voucher_type: VoucherType,
    pub voucher_date: Date,
    pub narration: String,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub total_amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::voucher_entries::Entity")]
    VoucherEntries,
}

impl Related<super::voucher_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoucherEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
