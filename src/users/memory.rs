use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::users::repo::{AccountRepository, RepoError};
use crate::users::repo_types::{Account, AccountRow, InsertAccount};

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, AccountRow>,
}

impl Table {
    fn taken(&self, username: &str, email: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .filter(|r| Some(r.id) != except)
            .any(|r| r.username == username || r.email == email)
    }
}

/// In-process stand-in for the `users` table, with the same uniqueness rules.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    table: Mutex<Table>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw row access, for planting records the service could never write.
    pub fn put_row(&self, row: AccountRow) {
        let mut t = self.table.lock().expect("table lock");
        t.next_id = t.next_id.max(row.id);
        t.rows.insert(row.id, row);
    }

    pub fn row(&self, id: i64) -> Option<AccountRow> {
        self.table.lock().expect("table lock").rows.get(&id).cloned()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, a: &InsertAccount) -> Result<i64, RepoError> {
        let mut t = self.table.lock().expect("table lock");
        if t.taken(&a.username, &a.email, None) {
            return Err(RepoError::AlreadyExists);
        }
        t.next_id += 1;
        let id = t.next_id;
        t.rows.insert(
            id,
            AccountRow {
                id,
                username: a.username.clone(),
                email: a.email.clone(),
                password: a.password_hash.clone(),
                first_name: a.first_name.clone(),
                last_name: a.last_name.clone(),
                date_of_birth: a.date_of_birth,
                gender: a.gender.clone(),
                phone_number: a.phone_number.clone(),
                street: a.street.clone(),
                city: a.city.clone(),
                state: a.state.clone(),
                postal_code: a.postal_code.clone(),
                country: a.country.clone(),
                profile_picture_url: a.profile_picture_url.clone(),
                roles: a.roles.clone(),
                preferences: a.preferences.clone(),
                created_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Account, RepoError> {
        let row = self.row(id).ok_or(RepoError::NotFound)?;
        Ok(Account::try_from(row)?)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Account, RepoError> {
        let row = {
            let t = self.table.lock().expect("table lock");
            t.rows
                .values()
                .find(|r| r.email == identifier || r.username == identifier)
                .cloned()
        };
        Ok(Account::try_from(row.ok_or(RepoError::NotFound)?)?)
    }

    async fn update(&self, id: i64, username: &str, email: &str) -> Result<(), RepoError> {
        let mut t = self.table.lock().expect("table lock");
        if !t.rows.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        if t.taken(username, email, Some(id)) {
            return Err(RepoError::AlreadyExists);
        }
        if let Some(row) = t.rows.get_mut(&id) {
            row.username = username.to_string();
            row.email = email.to_string();
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut t = self.table.lock().expect("table lock");
        t.rows.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }

    async fn list_all(&self) -> Result<Vec<Account>, RepoError> {
        let rows: Vec<AccountRow> = {
            let t = self.table.lock().expect("table lock");
            t.rows.values().cloned().collect()
        };
        rows.into_iter()
            .map(|r| Account::try_from(r).map_err(RepoError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::row_fixture;

    fn insert_for(username: &str, email: &str) -> InsertAccount {
        let row = row_fixture(0, username, email);
        InsertAccount {
            username: row.username,
            email: row.email,
            password_hash: row.password,
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
        }
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let repo = InMemoryAccountRepository::new();
        let first = repo.insert(&insert_for("a", "a@x.com")).await.unwrap();
        repo.delete(first).await.unwrap();
        let second = repo.insert(&insert_for("a", "a@x.com")).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn update_to_taken_email_is_rejected() {
        let repo = InMemoryAccountRepository::new();
        repo.insert(&insert_for("a", "a@x.com")).await.unwrap();
        let b = repo.insert(&insert_for("b", "b@x.com")).await.unwrap();
        let err = repo.update(b, "b", "a@x.com").await.unwrap_err();
        assert!(matches!(err, RepoError::AlreadyExists));
        repo.update(b, "b", "b@x.com").await.unwrap();
    }
}
