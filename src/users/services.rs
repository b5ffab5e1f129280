use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::error::AccountError;
use crate::users::{
    dto::{AuthenticatedAccount, NewAccount, PublicAccount, RegisteredAccount},
    password::CredentialHasher,
    repo::{AccountRepository, RepoError},
    repo_types::InsertAccount,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn has_control(s: &str) -> bool {
    s.chars().any(char::is_control)
}

fn validate_identity(username: &str, email: &str) -> Result<(), AccountError> {
    if username.is_empty() {
        return Err(AccountError::validation("Username is required"));
    }
    if email.is_empty() {
        return Err(AccountError::validation("Email is required"));
    }
    if has_control(username) {
        return Err(AccountError::validation("Username contains invalid characters"));
    }
    if has_control(email) {
        return Err(AccountError::validation("Email contains invalid characters"));
    }
    if !is_valid_email(email) {
        return Err(AccountError::validation("Invalid email"));
    }
    Ok(())
}

/// Postgres TEXT cannot hold NUL; other characters in free-form profile fields are kept as sent.
fn validate_profile_text(input: &NewAccount) -> Result<(), AccountError> {
    let address = input.address.as_ref();
    let fields = [
        input.first_name.as_deref(),
        input.last_name.as_deref(),
        input.gender.as_deref(),
        input.phone_number.as_deref(),
        input.profile_picture_url.as_deref(),
        address.and_then(|a| a.street.as_deref()),
        address.and_then(|a| a.city.as_deref()),
        address.and_then(|a| a.state.as_deref()),
        address.and_then(|a| a.postal_code.as_deref()),
        address.and_then(|a| a.country.as_deref()),
    ];
    if fields.into_iter().flatten().any(|f| f.contains('\0')) {
        return Err(AccountError::validation("Profile fields contain invalid characters"));
    }
    Ok(())
}

fn to_json_text(value: Option<&serde_json::Value>) -> Result<Option<String>, AccountError> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(AccountError::internal)
}

/// Account lifecycle: validation, hashing and repository orchestration.
#[derive(Clone)]
pub struct AccountService {
    repo: Arc<dyn AccountRepository>,
    hasher: CredentialHasher,
}

impl AccountService {
    pub fn new(repo: Arc<dyn AccountRepository>, hasher: CredentialHasher) -> Self {
        Self { repo, hasher }
    }

    async fn hash_password(&self, plain: String) -> Result<String, AccountError> {
        let hasher = self.hasher.clone();
        let digest = tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(AccountError::internal)??;
        Ok(digest)
    }

    async fn verify_password(&self, plain: String, digest: String) -> Result<bool, AccountError> {
        let hasher = self.hasher.clone();
        let ok = tokio::task::spawn_blocking(move || hasher.verify(&plain, &digest))
            .await
            .map_err(AccountError::internal)??;
        Ok(ok)
    }

    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: NewAccount) -> Result<RegisteredAccount, AccountError> {
        if input.password != input.confirm_password {
            warn!(email = %input.email, "passwords do not match");
            return Err(AccountError::validation("Passwords do not match"));
        }
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_string();
        validate_identity(&username, &email)?;
        if input.password.is_empty() {
            return Err(AccountError::validation("Password is required"));
        }
        if has_control(&input.password) {
            return Err(AccountError::validation("Password contains invalid characters"));
        }
        validate_profile_text(&input)?;

        let roles = to_json_text(input.roles.as_ref())?;
        let preferences = to_json_text(input.preferences.as_ref())?;
        let password_hash = self.hash_password(input.password).await?;
        let address = input.address.unwrap_or_default();

        let row = InsertAccount {
            username,
            email,
            password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            date_of_birth: input.date_of_birth,
            gender: input.gender,
            phone_number: input.phone_number,
            street: address.street,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
            profile_picture_url: input.profile_picture_url,
            roles,
            preferences,
        };

        let id = match self.repo.insert(&row).await {
            Ok(id) => id,
            Err(RepoError::AlreadyExists) => {
                warn!(email = %row.email, "user already exists");
                return Err(AccountError::Conflict);
            }
            Err(e) => return Err(e.into()),
        };

        info!(user_id = id, email = %row.email, "user registered");
        Ok(RegisteredAccount {
            id,
            username: row.username,
            email: row.email,
        })
    }

    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AuthenticatedAccount, AccountError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(AccountError::validation(
                "Email or Username and password are required",
            ));
        }
        if has_control(identifier) {
            return Err(AccountError::validation("Email or Username contains invalid characters"));
        }

        let account = match self.repo.find_by_identifier(identifier).await {
            Ok(a) => a,
            Err(RepoError::NotFound) => {
                warn!("login unknown identifier");
                return Err(AccountError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        let ok = self
            .verify_password(password.to_string(), account.password_hash.clone())
            .await?;
        if !ok {
            warn!(user_id = account.id, "login invalid password");
            return Err(AccountError::InvalidCredentials);
        }

        info!(user_id = account.id, "user logged in");
        Ok(AuthenticatedAccount::from(account))
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<PublicAccount>, AccountError> {
        let accounts = self.repo.list_all().await?;
        Ok(accounts.into_iter().map(PublicAccount::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<PublicAccount, AccountError> {
        Ok(PublicAccount::from(self.repo.find_by_id(id).await?))
    }

    /// Username/email change. A clash with another account is a conflict.
    #[instrument(skip(self))]
    pub async fn update(&self, id: i64, username: &str, email: &str) -> Result<(), AccountError> {
        let (username, email) = (username.trim(), email.trim());
        validate_identity(username, email)?;
        self.repo.update(id, username, email).await?;
        info!(user_id = id, "user updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: i64) -> Result<(), AccountError> {
        self.repo.delete(id).await?;
        info!(user_id = id, "user deleted");
        Ok(())
    }
}
