use std::fmt;

use sea_orm::sea_query::Condition;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, JoinType, QueryFilter, QuerySelect, RelationTrait,
};

use super::error::BenchError;
use crate::domain::model::{Question, Visibility};
use crate::infra::storage::entity::{questions, user_settings, users};

/// How the visible questions of a user are fetched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryStrategy {
    /// User by email, then settings by id, then filtered questions.
    ThreeQueries,
    /// Questions joined with users and settings in a single statement.
    OneQuery,
}

impl QueryStrategy {
    pub const ALL: [QueryStrategy; 2] = [QueryStrategy::ThreeQueries, QueryStrategy::OneQuery];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            QueryStrategy::ThreeQueries => "threeQueries",
            QueryStrategy::OneQuery => "oneQuery",
        }
    }

    /// Questions of the user owning `email` that are visible on their
    /// profile: explicitly public ones, plus unset ones when the user's
    /// default is public. Row order is unspecified.
    ///
    /// # Errors
    /// `ThreeQueries` returns `BenchError::UserNotFound` or
    /// `BenchError::SettingsNotFound` when a lookup comes back empty;
    /// `OneQuery` yields an empty list instead. Backend failures surface as
    /// `BenchError::Db`.
    pub async fn execute<C>(self, db: &C, email: &str) -> Result<Vec<Question>, BenchError>
    where
        C: ConnectionTrait,
    {
        let rows = match self {
            QueryStrategy::ThreeQueries => three_queries(db, email).await?,
            QueryStrategy::OneQuery => one_query(db, email).await?,
        };
        rows.into_iter()
            .map(|row| Question::try_from(row).map_err(BenchError::from))
            .collect()
    }
}

impl fmt::Display for QueryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const PUBLIC: &str = Visibility::Public.as_str();

async fn three_queries<C>(db: &C, email: &str) -> Result<Vec<questions::Row>, BenchError>
where
    C: ConnectionTrait,
{
    let user = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await?
        .ok_or_else(|| BenchError::UserNotFound {
            email: email.to_owned(),
        })?;

    let settings = user_settings::Entity::find_by_id(user.id)
        .one(db)
        .await?
        .ok_or(BenchError::SettingsNotFound { user_id: user.id })?;

    let visible = if settings.default_visibility.as_deref() == Some(PUBLIC) {
        Condition::any()
            .add(questions::Column::Visibility.eq(PUBLIC))
            .add(questions::Column::Visibility.is_null())
    } else {
        Condition::all().add(questions::Column::Visibility.eq(PUBLIC))
    };

    let rows = questions::Entity::find()
        .select_only()
        .columns(questions::Row::COLUMNS)
        .filter(questions::Column::UserId.eq(user.id))
        .filter(visible)
        .into_model::<questions::Row>()
        .all(db)
        .await?;
    Ok(rows)
}

async fn one_query<C>(db: &C, email: &str) -> Result<Vec<questions::Row>, BenchError>
where
    C: ConnectionTrait,
{
    let rows = questions::Entity::find()
        .select_only()
        .columns(questions::Row::COLUMNS)
        .join(JoinType::InnerJoin, questions::Relation::User.def())
        .join(JoinType::InnerJoin, users::Relation::UserSettings.def())
        .filter(users::Column::Email.eq(email))
        .filter(
            Condition::any()
                .add(questions::Column::Visibility.eq(PUBLIC))
                .add(
                    Condition::all()
                        .add(user_settings::Column::DefaultVisibility.eq(PUBLIC))
                        .add(questions::Column::Visibility.is_null()),
                ),
        )
        .into_model::<questions::Row>()
        .all(db)
        .await?;
    Ok(rows)
}
