//! `SeaORM` entities for the three benchmark tables.

pub use questions::Entity as QuestionEntity;
pub use user_settings::Entity as UserSettingsEntity;
pub use users::Entity as UserEntity;

/// User entity for the `users` table.
pub mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        #[sea_orm(unique)]
        pub email: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::questions::Entity")]
        Questions,
        #[sea_orm(has_one = "super::user_settings::Entity")]
        UserSettings,
    }

    impl Related<super::questions::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Questions.def()
        }
    }

    impl Related<super::user_settings::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::UserSettings.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Settings entity for the `user_settings` table, keyed by its user.
pub mod user_settings {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "user_settings")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub user_id: i32,
        pub default_visibility: Option<String>,
        pub profile_handle: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::users::Entity",
            from = "Column::UserId",
            to = "super::users::Column::Id",
            on_delete = "Cascade"
        )]
        User,
    }

    impl Related<super::users::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::User.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Question entity for the `questions` table.
pub mod questions {
    use sea_orm::FromQueryResult;
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "questions")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(column_type = "Text")]
        pub question: String,
        #[sea_orm(column_type = "Text", nullable)]
        pub answer: Option<String>,
        /// NULL means the owner's default visibility applies.
        pub visibility: Option<String>,
        pub user_id: Option<i32>,
        pub created_at: Option<DateTimeUtc>,
        pub updated_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::users::Entity",
            from = "Column::UserId",
            to = "super::users::Column::Id",
            on_delete = "SetNull"
        )]
        User,
    }

    impl Related<super::users::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::User.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    /// Projection read by the benchmark queries; timestamps are not fetched.
    #[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
    pub struct Row {
        pub id: i32,
        pub question: String,
        pub answer: Option<String>,
        pub visibility: Option<String>,
        pub user_id: Option<i32>,
    }

    impl Row {
        pub const COLUMNS: [Column; 5] = [
            Column::Id,
            Column::Question,
            Column::Answer,
            Column::Visibility,
            Column::UserId,
        ];
    }
}
