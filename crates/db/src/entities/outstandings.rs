//! `SeaORM` Entity for outstandings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{OutstandingDirection, OutstandingStatus, OutstandingType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "outstandings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub outstanding_type: OutstandingType,
    pub direction: OutstandingDirection,
    pub reference_type: String,
    pub reference_id: String,
    pub reference_number: String,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub original_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub amount: Decimal,
    pub due_date: Date,
    pub days_overdue: i64,
    pub status: OutstandingStatus,
    pub party_name: String,
    pub party_contact: Option<String>,
    pub party_key: String,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
