//! `SeaORM` Entity for advance_credits table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::OutstandingDirection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "advance_credits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub direction: OutstandingDirection,
    pub party_key: String,
    pub party_name: String,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub original_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub remaining_amount: Decimal,
    pub source_reference: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
