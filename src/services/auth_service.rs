//! Authentication service - login, token verification and principal
//! resolution for the HTTP layer.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and issue a JWT for an active account
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Issue a JWT for an already-authenticated user
    fn issue_token(&self, user: &User) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Resolve a bearer token to the non-deleted user it names
    async fn resolve_current_user(&self, token: &str) -> AppResult<User>;
}

/// Hash verified when the email is unknown, so both paths cost one Argon2 run.
fn dummy_password() -> &'static Password {
    static DUMMY: OnceLock<Password> = OnceLock::new();
    DUMMY.get_or_init(|| {
        Password::new("timing-equalizer").unwrap_or_else(|_| Password::from_hash(String::new()))
    })
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        // Stored emails are trimmed and lowercased
        let email = email.trim().to_lowercase();
        let user = self.uow.users().find_by_email(&email).await?;

        let password_valid = match &user {
            Some(user) => Password::from_hash(user.password_hash.clone()).verify(&password),
            None => {
                dummy_password().verify(&password);
                false
            }
        };

        let user = match user {
            Some(user) if password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        if !user.is_active() {
            return Err(AppError::AccountInactive);
        }

        tracing::debug!(user_id = %user.id, "Login succeeded");
        self.issue_token(&user)
    }

    fn issue_token(&self, user: &User) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.jwt_expiration_hours);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret_bytes()),
        )?;

        Ok(TokenResponse {
            access_token: token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.jwt_expiration_hours * SECONDS_PER_HOUR,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn resolve_current_user(&self, token: &str) -> AppResult<User> {
        let claims = self.verify_token(token)?;

        // A token outlives soft deletion; the row lookup is authoritative
        self.uow
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::{MockUserRepository, TransactionContext, TxFuture, UserRepository};
    use mockall::predicate::eq;

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    struct TestUnitOfWork {
        user_repo: Arc<MockUserRepository>,
    }

    #[async_trait]
    impl UnitOfWork for TestUnitOfWork {
        fn users(&self) -> Arc<dyn UserRepository> {
            self.user_repo.clone()
        }

        async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
        where
            F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
            T: Send,
        {
            Err(AppError::internal("Transactions not supported in test mock"))
        }
    }

    fn authenticator(repo: MockUserRepository) -> Authenticator<TestUnitOfWork> {
        let uow = Arc::new(TestUnitOfWork {
            user_repo: Arc::new(repo),
        });
        Authenticator::new(uow, Config::new("sqlite::memory:", SECRET))
    }

    fn stored_user(password: &str) -> User {
        User::new(
            Uuid::new_v4(),
            "login@example.com".to_string(),
            Password::new(password).unwrap().into_string(),
            "Login User".to_string(),
            UserRole::User,
        )
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let user = stored_user("secret");
        let id = user.id;
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .with(eq("login@example.com"))
            .returning(move |_| Ok(Some(user.clone())));

        let auth = authenticator(repo);
        let token = auth
            .login("login@example.com".to_string(), "secret".to_string())
            .await
            .unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 24 * 3600);
        let claims = auth.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, "user");
    }

    #[tokio::test]
    async fn test_login_normalises_email_before_lookup() {
        let user = stored_user("secret");
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .with(eq("login@example.com"))
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let result = authenticator(repo)
            .login(" Login@Example.COM ".to_string(), "secret".to_string())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let user = stored_user("secret");
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let result = authenticator(repo)
            .login("login@example.com".to_string(), "wrong".to_string())
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let result = authenticator(repo)
            .login("ghost@example.com".to_string(), "secret".to_string())
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_inactive_account() {
        let mut user = stored_user("secret");
        user.status = crate::domain::UserStatus::Inactive;
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let result = authenticator(repo)
            .login("login@example.com".to_string(), "secret".to_string())
            .await;

        assert!(matches!(result, Err(AppError::AccountInactive)));
    }

    #[tokio::test]
    async fn test_resolve_current_user_requires_stored_row() {
        let user = stored_user("secret");
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let auth = authenticator(repo);
        let token = auth.issue_token(&user).unwrap();
        let result = auth.resolve_current_user(&token.access_token).await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_verify_token_rejects_foreign_signature() {
        let user = stored_user("secret");
        let other = Authenticator::new(
            Arc::new(TestUnitOfWork {
                user_repo: Arc::new(MockUserRepository::new()),
            }),
            Config::new("sqlite::memory:", "another-secret-key-that-is-32-chars!"),
        );
        let token = other.issue_token(&user).unwrap();

        let result = authenticator(MockUserRepository::new()).verify_token(&token.access_token);

        assert!(matches!(result, Err(AppError::Jwt(_))));
    }
}
