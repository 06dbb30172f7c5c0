use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog vehicle. Only the fields the sales core touches live here; the
/// stored `status` is a legacy availability flag used solely as a fallback
/// when no inventory record exists for the vehicle.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub model_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_record::Entity")]
    InventoryRecord,
}

impl Related<super::inventory_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
