use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A time-bounded discount identified by a human-entered code. There is no
/// stored "active" flag: activity is derived from the window at read time,
/// with inclusive bounds on both ends.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promotions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub promotion_code: String,
    pub option_name: String,
    pub option_value: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// Inclusive on both ends: a promotion starting and ending "now" is active.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now <= self.end_date
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
