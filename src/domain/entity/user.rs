use chrono::NaiveDate;

/// User as exposed through the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub birthdate: NaiveDate,
}

/// Validated data for a user that has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub birthdate: NaiveDate,
}

/// Row of the `users` table, the birth date kept as its `dd-MM-yyyy` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: i64,
    pub name: String,
    pub birthdate: String,
}

impl User {
    pub fn new(id: i64, name: String, birthdate: NaiveDate) -> Self {
        Self {
            id,
            name,
            birthdate,
        }
    }
}

impl StoredUser {
    pub fn new(id: i64, name: String, birthdate: String) -> Self {
        Self {
            id,
            name,
            birthdate,
        }
    }
}
