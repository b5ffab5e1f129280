use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, OffsetDateTime};

use crate::users::repo_types::Account;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Registration input.
#[derive(Clone, Default, Deserialize)]
pub struct NewAccount {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub date_of_birth: Option<Date>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub roles: Option<Value>,
    #[serde(default)]
    pub preferences: Option<Value>,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Login body. Missing fields decode as empty and are rejected by validation.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    #[serde(default, alias = "name")]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// What registration hands back: never more than this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredAccount {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthenticatedAccount {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<Account> for AuthenticatedAccount {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            username: a.username,
            email: a.email,
            first_name: a.first_name,
            last_name: a.last_name,
        }
    }
}

/// Full account view with the digest stripped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicAccount {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(with = "iso_date::option")]
    pub date_of_birth: Option<Date>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub address: Address,
    pub profile_picture_url: Option<String>,
    pub roles: Option<Value>,
    pub preferences: Option<Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Account> for PublicAccount {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            username: a.username,
            email: a.email,
            first_name: a.first_name,
            last_name: a.last_name,
            date_of_birth: a.date_of_birth,
            gender: a.gender,
            phone_number: a.phone_number,
            address: Address {
                street: a.street,
                city: a.city,
                state: a.state,
                postal_code: a.postal_code,
                country: a.country,
            },
            profile_picture_url: a.profile_picture_url,
            roles: a.roles,
            preferences: a.preferences,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope<T> {
    pub message: &'static str,
    pub user: T,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::row_fixture;
    use time::macros::date;

    #[test]
    fn new_account_decodes_nested_address_and_date() {
        let body = serde_json::json!({
            "username": "alice",
            "email": "a@x.com",
            "password": "p1",
            "confirm_password": "p1",
            "date_of_birth": "1990-04-12",
            "address": { "city": "Lisbon", "country": "PT" },
            "roles": ["admin", "user"]
        });
        let input: NewAccount = serde_json::from_value(body).unwrap();
        assert_eq!(input.date_of_birth, Some(date!(1990 - 04 - 12)));
        let address = input.address.unwrap();
        assert_eq!(address.city.as_deref(), Some("Lisbon"));
        assert_eq!(address.street, None);
        assert!(input.preferences.is_none());
    }

    #[test]
    fn update_request_accepts_legacy_name_field() {
        let req: UpdateAccountRequest =
            serde_json::from_str(r#"{"name":"neo","email":"n@x.com"}"#).unwrap();
        assert_eq!(req.username, "neo");
    }

    #[test]
    fn public_account_never_serializes_digest() {
        let row = row_fixture(3, "carol", "c@x.com");
        let digest = row.password.clone();
        let public = PublicAccount::from(Account::try_from(row).unwrap());
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains(&digest));
        assert!(!json.contains("password"));
        assert!(json.contains("carol"));
    }

    #[test]
    fn debug_of_registration_input_hides_passwords() {
        let input = NewAccount {
            username: "alice".into(),
            email: "a@x.com".into(),
            password: "s3cret-value".into(),
            confirm_password: "s3cret-value".into(),
            ..Default::default()
        };
        assert!(!format!("{input:?}").contains("s3cret-value"));
    }
}
