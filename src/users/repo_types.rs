use std::fmt;

use serde_json::Value;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

/// Row as stored in `users`; roles/preferences are JSON text.
#[derive(Clone, FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<Date>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub profile_picture_url: Option<String>,
    pub roles: Option<String>,
    pub preferences: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Column values for a single insert. The password is already a digest here.
#[derive(Clone)]
pub struct InsertAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<Date>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub profile_picture_url: Option<String>,
    pub roles: Option<String>,
    pub preferences: Option<String>,
}

/// Decoded account record.
#[derive(Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<Date>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub profile_picture_url: Option<String>,
    pub roles: Option<Value>,
    pub preferences: Option<Value>,
    pub created_at: OffsetDateTime,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for AccountRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRow")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

fn parse_json(text: Option<String>) -> Result<Option<Value>, serde_json::Error> {
    text.as_deref().map(serde_json::from_str).transpose()
}

impl TryFrom<AccountRow> for Account {
    type Error = serde_json::Error;

    fn try_from(r: AccountRow) -> Result<Self, Self::Error> {
        let roles = parse_json(r.roles)?;
        let preferences = parse_json(r.preferences)?;
        Ok(Self {
            id: r.id,
            username: r.username,
            email: r.email,
            password_hash: r.password,
            first_name: r.first_name,
            last_name: r.last_name,
            date_of_birth: r.date_of_birth,
            gender: r.gender,
            phone_number: r.phone_number,
            street: r.street,
            city: r.city,
            state: r.state,
            postal_code: r.postal_code,
            country: r.country,
            profile_picture_url: r.profile_picture_url,
            roles,
            preferences,
            created_at: r.created_at,
        })
    }
}

#[cfg(test)]
pub(crate) fn row_fixture(id: i64, username: &str, email: &str) -> AccountRow {
    AccountRow {
        id,
        username: username.into(),
        email: email.into(),
        password: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdHNhbHQ$aGFzaA".into(),
        first_name: None,
        last_name: None,
        date_of_birth: None,
        gender: None,
        phone_number: None,
        street: None,
        city: None,
        state: None,
        postal_code: None,
        country: None,
        profile_picture_url: None,
        roles: None,
        preferences: None,
        created_at: OffsetDateTime::UNIX_EPOCH,
    }
}
