use sqlx::{sqlite::SqliteRow, Row};

use super::{
    datatype::birthdate,
    entity::{NewUser, StoredUser, User},
};
use crate::{error::process::ProcessError, message::key};

impl From<&User> for StoredUser {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.name.clone(), birthdate::format(&user.birthdate))
    }
}

/// The id is left at zero, the store assigns it on insert.
impl From<&NewUser> for StoredUser {
    fn from(user: &NewUser) -> Self {
        Self::new(0, user.name.clone(), birthdate::format(&user.birthdate))
    }
}

impl TryFrom<StoredUser> for User {
    type Error = ProcessError;

    fn try_from(stored: StoredUser) -> Result<Self, Self::Error> {
        let date = birthdate::parse(&stored.birthdate).map_err(|err| {
            ProcessError::internal(key::CONVERSION)
                .with_args(["String", "NaiveDate"])
                .caused_by(err)
        })?;

        Ok(Self::new(stored.id, stored.name, date))
    }
}

impl TryFrom<&SqliteRow> for StoredUser {
    type Error = sqlx::Error;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            birthdate: row.try_get("birthdate")?,
        })
    }
}
