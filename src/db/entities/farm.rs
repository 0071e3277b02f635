//! Farm entity
//!
//! `crops` and `coordinates` are JSON text columns; parsing lives at the
//! handler boundary. Archived farms stay in the table but are excluded from
//! every size sum.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "farms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_id: i32,
    pub title_number: String,
    /// Square meters.
    pub size: f64,
    pub is_archived: bool,
    pub crops: String,
    pub coordinates: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::farmer::Entity",
        from = "Column::OwnerId",
        to = "super::farmer::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::mortgage::Entity")]
    Mortgages,
}

impl Related<super::farmer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::mortgage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mortgages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
