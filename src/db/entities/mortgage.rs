//! Mortgage entity
//!
//! A pledge of (part of) a farm's land by its owner to another farmer.
//! `mortgage_to_id` is the receiving farmer (the lender).

use sea_orm::entity::prelude::*;

/// Closed set of mortgage statuses. Stored as TEXT.
pub const STATUS_ACTIVE: &str = "Active";
pub const STATUS_PAID_OFF: &str = "PaidOff";
pub const STATUS_DEFAULTED: &str = "Defaulted";

pub const STATUSES: [&str; 3] = [STATUS_ACTIVE, STATUS_PAID_OFF, STATUS_DEFAULTED];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "mortgages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub farm_id: i32,
    pub mortgage_to_id: i32,
    pub status: String,
    /// Square meters pledged; may duplicate the farm's size.
    pub size: f64,
    pub coordinates: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Model {
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::farm::Entity",
        from = "Column::FarmId",
        to = "super::farm::Column::Id"
    )]
    Farm,
    #[sea_orm(
        belongs_to = "super::farmer::Entity",
        from = "Column::MortgageToId",
        to = "super::farmer::Column::Id"
    )]
    MortgageTo,
}

impl Related<super::farm::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farm.def()
    }
}

impl Related<super::farmer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MortgageTo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
