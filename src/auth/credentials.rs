use std::sync::Arc;

use uuid::Uuid;

use super::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::models::User;
use crate::store::{NewUser, UserStore};

/// Account registry: creates users, looks them up and checks their passwords.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn UserStore>,
    bcrypt_cost: u32,
}

/// Emails are compared case-insensitively and without surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Credentials {
    pub fn new(store: Arc<dyn UserStore>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    /// Registers a new account.
    ///
    /// The email is checked before the insert. Two concurrent registrations can both pass
    /// that check; the store's own uniqueness guarantee then decides the loser, which also
    /// surfaces as `AppError::DuplicateEmail`.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let email = normalize_email(email);
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = hash_password(password, self.bcrypt_cost)?;
        let user = self
            .store
            .insert_user(NewUser {
                name: name.trim().to_string(),
                email,
                password_hash,
            })
            .await?;

        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.store.find_user_by_email(&normalize_email(email)).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.store.find_user_by_id(id).await
    }

    pub fn verify_password(&self, user: &User, plaintext: &str) -> Result<bool, AppError> {
        verify_password(plaintext, &user.password_hash)
    }

    /// Login check. Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.verify_password(&user, password)? {
            log::debug!("Password mismatch for user {}", user.id);
            return Err(AppError::InvalidCredentials);
        }
        Ok(user)
    }
}
