//! Account registration, login and token validation.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    Block, Collection, CollectionKind, CollectionRepository, DomainError, DomainResult, PasswordHasher,
    TokenProvider, User, UserRepository,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{non_blank, FIRST_PAGE_TITLE};

const BAD_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone, Copy)]
pub struct AuthOptions {
    /// Create a "My First Page" OtherPage for every new account
    pub provision_first_page: bool,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self { provision_first_page: true }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A user together with a freshly signed token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    collections: Arc<dyn CollectionRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenProvider>,
    options: AuthOptions,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        collections: Arc<dyn CollectionRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenProvider>,
        options: AuthOptions,
    ) -> Self {
        Self { users, collections, hasher, tokens, options }
    }

    pub async fn register(&self, input: RegisterInput) -> DomainResult<AuthSession> {
        let (Some(username), Some(email), Some(password)) = (
            non_blank(input.username),
            non_blank(input.email).map(|e| e.to_lowercase()),
            input.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(DomainError::ValidationError(
                "Please provide username, email and password".into(),
            ));
        };
        if !email.contains('@') {
            return Err(DomainError::ValidationError("Invalid email address".into()));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("User already exists".into()));
        }

        let user = User {
            id: Uuid::now_v7(),
            username,
            email,
            password_hash: self.hasher.hash(&password)?,
            created_at: Utc::now(),
        };
        // A concurrent registration can still win the race; the unique index
        // turns that into the same conflict.
        self.users.create(&user).await.map_err(|err| match err {
            DomainError::Conflict(_) => DomainError::Conflict("User already exists".into()),
            other => other,
        })?;
        info!(user_id = %user.id, "registered user");

        if self.options.provision_first_page {
            self.provision_first_page(user.id).await;
        }

        let token = self.tokens.issue(user.id)?;
        Ok(AuthSession { user, token })
    }

    async fn provision_first_page(&self, owner: Uuid) {
        let mut page = Collection::new(FIRST_PAGE_TITLE, owner);
        let block = Block::default_text(page.id);
        page.pages.push(block.id);
        if let Err(err) = self.collections.insert(CollectionKind::OtherPage, &page, &[block]).await {
            warn!(user_id = %owner, error = %err, "could not provision first page");
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthSession> {
        let email = email.trim().to_lowercase();
        let user = match self.users.find_by_email(&email).await? {
            Some(user) if self.hasher.verify(password, &user.password_hash) => user,
            _ => {
                warn!("rejected login attempt");
                return Err(DomainError::Unauthorized(BAD_CREDENTIALS.into()));
            }
        };
        let token = self.tokens.issue(user.id)?;
        Ok(AuthSession { user, token })
    }

    /// Decodes a bearer token without touching the store.
    pub fn authenticate(&self, token: &str) -> DomainResult<Uuid> {
        self.tokens.verify(token)
    }

    pub async fn profile(&self, user_id: Uuid) -> DomainResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))
    }

    /// A token is valid while it decodes and its user still exists.
    pub async fn validate_token(&self, token: &str) -> DomainResult<User> {
        let user_id = self.authenticate(token)?;
        self.profile(user_id).await
    }
}
