use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Explicit visibility of a question, or a user's default for unset questions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub const ALL: [Visibility; 2] = [Visibility::Public, Visibility::Private];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown visibility '{0}'")]
pub struct UnknownVisibility(pub String);

impl FromStr for Visibility {
    type Err = UnknownVisibility;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(UnknownVisibility(other.to_owned())),
        }
    }
}

/// Question variants written for every seeded user, in write order.
/// `None` leaves the column NULL so the owner's default applies.
pub const QUESTION_VARIANTS: [Option<Visibility>; 3] =
    [Some(Visibility::Public), Some(Visibility::Private), None];

/// Bound columns per inserted row, used to size statements against backend limits.
pub const USER_FIELDS: usize = 3;
pub const SETTINGS_FIELDS: usize = 3;
pub const QUESTION_FIELDS: usize = 7;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub id: i32,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUserSettings {
    pub user_id: i32,
    pub default_visibility: Visibility,
    pub profile_handle: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewQuestion {
    pub id: i32,
    pub question: String,
    pub answer: Option<String>,
    pub visibility: Option<Visibility>,
    pub user_id: i32,
}

/// A question as read back by the benchmark strategies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub id: i32,
    pub question: String,
    pub answer: Option<String>,
    pub visibility: Option<Visibility>,
    pub user_id: Option<i32>,
}
