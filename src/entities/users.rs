use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// User names are immutable and double as the login identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,

    #[sea_orm(unique)]
    pub mail: String,

    /// Password record: either a legacy unsalted SHA-256 hex digest or an
    /// Argon2id PHC string (distinguished by the `$argon2` prefix).
    pub passwd: String,

    /// Single-use password recovery key (30-char alphanumeric).
    pub recover_key: Option<String>,

    /// Feed access token (12-char alphanumeric). Never empty.
    pub token: String,

    /// Look-back window in days for the episode list.
    pub days_back: i32,

    /// Display-only date adjustment applied when rendering feed dates.
    pub date_offset: i32,

    /// Per-user episode link template (##SHOW##, ##SEASON## etc).
    pub link_format: String,

    pub site_news: bool,

    /// Id of the newest site news item the user has read. A stale or
    /// missing id simply means everything is unread.
    pub latest_news_read: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::subscriptions::Entity")]
    Subscriptions,
}

impl Related<super::subscriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
    }
}

impl Related<super::shows::Entity> for Entity {
    fn to() -> RelationDef {
        super::subscriptions::Relation::Shows.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::subscriptions::Relation::Users.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
