//! Domain rows to active models and back.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;

use super::entity::{questions, user_settings, users};
use crate::domain::model::{
    NewQuestion, NewUser, NewUserSettings, Question, UnknownVisibility, Visibility,
};

pub fn new_user_to_active_model(user: &NewUser) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(user.id),
        name: Set(user.name.clone()),
        email: Set(user.email.clone()),
    }
}

pub fn new_settings_to_active_model(settings: &NewUserSettings) -> user_settings::ActiveModel {
    user_settings::ActiveModel {
        user_id: Set(settings.user_id),
        default_visibility: Set(Some(settings.default_visibility.as_str().to_owned())),
        profile_handle: Set(Some(settings.profile_handle.clone())),
    }
}

/// The unset variant is written as an explicit NULL, never left to a column default.
pub fn new_question_to_active_model(
    question: &NewQuestion,
    now: DateTime<Utc>,
) -> questions::ActiveModel {
    questions::ActiveModel {
        id: Set(question.id),
        question: Set(question.question.clone()),
        answer: Set(question.answer.clone()),
        visibility: Set(question.visibility.map(|v| v.as_str().to_owned())),
        user_id: Set(Some(question.user_id)),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
    }
}

impl TryFrom<questions::Row> for Question {
    type Error = UnknownVisibility;

    fn try_from(row: questions::Row) -> Result<Self, Self::Error> {
        let visibility = row
            .visibility
            .as_deref()
            .map(str::parse::<Visibility>)
            .transpose()?;
        Ok(Self {
            id: row.id,
            question: row.question,
            answer: row.answer,
            visibility,
            user_id: row.user_id,
        })
    }
}

