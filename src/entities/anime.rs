use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "anime")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// MyAnimeList id from the Jikan seeding step
    #[sea_orm(unique)]
    pub jikan_id: i32,

    pub title: String,

    pub image_url: Option<String>,

    pub episodes: i32,

    pub status: String,

    pub score: f32,

    #[sea_orm(column_type = "Text")]
    pub synopsis: String,

    /// Comma-separated genre names, e.g. "Action, Adventure"
    #[sea_orm(column_type = "Text")]
    pub genres: String,

    /// Comma-separated demographic names, e.g. "Shounen"
    #[sea_orm(column_type = "Text")]
    pub demographics: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::watchlist_entries::Entity")]
    WatchlistEntries,
}

impl Related<super::watchlist_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WatchlistEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
