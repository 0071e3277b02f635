//! Farmer entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "farmers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub middle_initial: Option<String>,
    pub street_address: String,
    pub city_or_province: String,
    pub municipality: String,
    pub barangay: String,
    pub zipcode: String,
    pub phone_number: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::farm::Entity")]
    Farms,
    #[sea_orm(has_many = "super::mortgage::Entity")]
    MortgagesIn,
    #[sea_orm(has_many = "super::disbursement::Entity")]
    Disbursements,
}

impl Related<super::farm::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farms.def()
    }
}

impl Related<super::mortgage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MortgagesIn.def()
    }
}

impl Related<super::disbursement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Disbursements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Display name used in denormalized responses and map popups.
    pub fn full_name(&self) -> String {
        match &self.middle_initial {
            Some(mi) if !mi.is_empty() => {
                format!("{} {}. {}", self.firstname, mi, self.lastname)
            }
            _ => format!("{} {}", self.firstname, self.lastname),
        }
    }
}
