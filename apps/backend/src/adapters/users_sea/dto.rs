//! DTOs for users_sea adapter.

use time::Date;

/// DTO for inserting a user row.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<Date>,
}

impl UserCreate {
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            email: email.into(),
            birthday: None,
        }
    }

    pub fn with_birthday(mut self, birthday: Option<Date>) -> Self {
        self.birthday = birthday;
        self
    }
}

/// DTO for a partial update of a user row. Unset fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<Date>,
}
