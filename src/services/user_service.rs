//! User service - account lifecycle use cases.
//!
//! Covers profile reads, deactivation with a single-use reactivation
//! token, password changes and soft deletion.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::REACTIVATION_PATH;
use crate::domain::{Deactivation, Password, User, UserResponse};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::with_transaction;

/// User service trait for dependency injection.
///
/// Lookups exclude soft-deleted users unless the method says otherwise.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Public view of the already-resolved principal
    fn get_current_user(&self, principal: &User) -> UserResponse;

    /// Get a user by ID including soft-deleted (audit)
    async fn get_user_for_audit(&self, id: Uuid) -> AppResult<User>;

    /// Deactivate the principal and return its reactivation link
    async fn deactivate(&self, principal: &User, request: Deactivation) -> AppResult<String>;

    /// Consume a reactivation token and mark its owner active again
    async fn reactivate(&self, token: &str) -> AppResult<()>;

    /// Replace the principal's password after verifying the old one
    async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
        principal: &User,
    ) -> AppResult<()>;

    /// Soft delete user (status `deleted`, row retained)
    async fn soft_delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    app_base_url: String,
}

impl<U: UnitOfWork> UserManager<U> {
    /// `app_base_url` prefixes the reactivation links handed to clients.
    pub fn new(uow: Arc<U>, app_base_url: impl Into<String>) -> Self {
        Self {
            uow,
            app_base_url: app_base_url.into(),
        }
    }

    fn reactivation_link(&self, token: &str) -> String {
        format!("{}{}?token={}", self.app_base_url, REACTIVATION_PATH, token)
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    fn get_current_user(&self, principal: &User) -> UserResponse {
        UserResponse::from(principal)
    }

    async fn get_user_for_audit(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id_with_deleted(id)
            .await?
            .ok_or_not_found("User")
    }

    async fn deactivate(&self, principal: &User, request: Deactivation) -> AppResult<String> {
        if !request.confirmation {
            return Err(AppError::validation(
                "Confirmation required to deactivate account",
            ));
        }
        if !principal.is_active() {
            return Err(AppError::validation("User has already been deactivated"));
        }

        let token = Uuid::new_v4().simple().to_string();

        self.uow
            .users()
            .deactivate(principal.id, token.clone())
            .await
            .map_err(|e| match e {
                // Lost a race with another deactivation of the same account
                AppError::NotFound(_) => AppError::validation("User has already been deactivated"),
                other => other,
            })?;

        tracing::info!(
            user_id = %principal.id,
            reason = request.reason.as_deref().unwrap_or("-"),
            "Account deactivated"
        );

        Ok(self.reactivation_link(&token))
    }

    async fn reactivate(&self, token: &str) -> AppResult<()> {
        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(AppError::validation("Reactivation token is required"));
        }

        let user = with_transaction!(self.uow, |ctx| {
            let users = ctx.users();
            let user = users
                .find_by_reactivation_token(&token)
                .await?
                .ok_or_not_found("Reactivation token")?;
            users.activate(user.id, &token).await?;
            Ok(user)
        })?;

        tracing::info!(user_id = %user.id, "Account reactivated");
        Ok(())
    }

    async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
        principal: &User,
    ) -> AppResult<()> {
        let stored = Password::from_hash(principal.password_hash.clone());
        if !stored.verify(old_password) {
            return Err(AppError::validation("Incorrect old password"));
        }

        let new_hash = Password::new(new_password)?.into_string();
        self.uow
            .users()
            .update_password(principal.id, new_hash)
            .await?;

        tracing::info!(user_id = %principal.id, "Password changed");
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        self.uow.users().delete(id).await?;

        tracing::info!(user_id = %id, "User soft-deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserRole, UserStatus};
    use crate::infra::{MockUserRepository, TransactionContext, TxFuture, UserRepository};
    use mockall::predicate::{always, eq};

    const BASE_URL: &str = "https://accounts.example.com";

    fn test_user(password: &str) -> User {
        User::new(
            Uuid::new_v4(),
            "test@example.com".to_string(),
            Password::new(password).unwrap().into_string(),
            "Test User".to_string(),
            UserRole::User,
        )
    }

    /// Unit of work over a mock repository; transactions are not available.
    struct TestUnitOfWork {
        user_repo: Arc<MockUserRepository>,
    }

    impl TestUnitOfWork {
        fn new(user_repo: MockUserRepository) -> Arc<Self> {
            Arc::new(Self {
                user_repo: Arc::new(user_repo),
            })
        }
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

    fn service(repo: MockUserRepository) -> UserManager<TestUnitOfWork> {
        UserManager::new(TestUnitOfWork::new(repo), BASE_URL)
    }

    #[test]
    fn test_get_current_user_builds_public_view() {
        let user = test_user("pw");
        let view = service(MockUserRepository::new()).get_current_user(&user);

        assert_eq!(view.id, user.id);
        assert!(view.is_active);
    }

    #[tokio::test]
    async fn test_get_user_for_audit_includes_deleted() {
        let mut deleted = test_user("pw");
        deleted.status = UserStatus::Deleted;
        let id = deleted.id;

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id_with_deleted()
            .with(eq(id))
            .returning(move |_| Ok(Some(deleted.clone())));

        let user = service(repo).get_user_for_audit(id).await.unwrap();

        assert!(user.is_deleted());
    }

    #[tokio::test]
    async fn test_deactivate_returns_link_with_stored_token() {
        let user = test_user("pw");
        let stored = Arc::new(std::sync::Mutex::new(String::new()));
        let captured = stored.clone();

        let mut repo = MockUserRepository::new();
        repo.expect_deactivate()
            .with(eq(user.id), always())
            .times(1)
            .returning(move |_, token| {
                *captured.lock().unwrap() = token;
                Ok(())
            });

        let link = service(repo)
            .deactivate(
                &user,
                Deactivation {
                    reason: Some("taking a break".to_string()),
                    confirmation: true,
                },
            )
            .await
            .unwrap();

        let token = stored.lock().unwrap().clone();
        assert_eq!(token.len(), 32);
        assert_eq!(
            link,
            format!("{}/users/reactivation?token={}", BASE_URL, token)
        );
    }

    #[tokio::test]
    async fn test_deactivate_requires_confirmation() {
        let mut repo = MockUserRepository::new();
        repo.expect_deactivate().never();

        let result = service(repo)
            .deactivate(&test_user("pw"), Deactivation::default())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_deactivate_inactive_user_rejected() {
        let mut user = test_user("pw");
        user.status = UserStatus::Inactive;

        let mut repo = MockUserRepository::new();
        repo.expect_deactivate().never();

        let result = service(repo)
            .deactivate(
                &user,
                Deactivation {
                    reason: None,
                    confirmation: true,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("already")));
    }

    #[tokio::test]
    async fn test_reactivate_blank_token_rejected_before_storage() {
        let result = service(MockUserRepository::new()).reactivate("   ").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_change_password_wrong_old_password() {
        let user = test_user("oldpw");

        let mut repo = MockUserRepository::new();
        repo.expect_update_password().never();

        let result = service(repo)
            .change_password("not-it", "newpw", &user)
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Incorrect old password"));
    }

    #[tokio::test]
    async fn test_change_password_stores_new_hash() {
        let user = test_user("oldpw");

        let mut repo = MockUserRepository::new();
        repo.expect_update_password()
            .with(eq(user.id), always())
            .times(1)
            .returning(|_, hash| {
                let stored = Password::from_hash(hash);
                assert!(stored.verify("newpw"));
                assert!(!stored.verify("oldpw"));
                Ok(())
            });

        service(repo)
            .change_password("oldpw", "newpw", &user)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_change_password_empty_new_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_update_password().never();

        let result = service(repo)
            .change_password("oldpw", "", &test_user("oldpw"))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_soft_delete_propagates_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete()
            .returning(|_| Err(AppError::NotFound("User")));

        let result = service(repo).soft_delete(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_soft_delete_success() {
        let id = Uuid::new_v4();

        let mut repo = MockUserRepository::new();
        repo.expect_delete().with(eq(id)).times(1).returning(|_| Ok(()));

        assert!(service(repo).soft_delete(id).await.is_ok());
    }
}
