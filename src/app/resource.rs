use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{datatype::birthdate, entity::User};

/// Request body of create and update.
///
/// Every field is optional so a missing one is reported as a field violation
/// instead of an unreadable body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "birthdate::option::deserialize")]
    pub birthdate: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    #[serde(with = "crate::domain::datatype::birthdate")]
    pub birthdate: NaiveDate,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            birthdate: user.birthdate,
        }
    }
}
