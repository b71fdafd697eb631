use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "watch_list")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Catalog id of the saved movie or show
    #[sea_orm(unique)]
    pub media_id: i64,

    pub image_path: Option<String>,

    pub title: String,

    pub release_date: Option<String>,

    pub rating: f64,

    /// RFC 3339 timestamp
    pub added_on: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
