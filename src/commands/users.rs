//! Create-user command - seeds accounts, including the first super admin.

use uuid::Uuid;
use validator::ValidateEmail;

use crate::cli::args::CreateUserArgs;
use crate::config::Config;
use crate::domain::{Password, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, NewUser, UserRepository, UserStore};

/// Execute the create-user command
pub async fn execute(args: CreateUserArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let id = create_user(&UserStore::new(db.get_connection()), args).await?;

    println!("Created user {}", id);
    Ok(())
}

/// Insert a user unless the email is already taken, deleted accounts
/// included.
pub async fn create_user<R: UserRepository + ?Sized>(
    repo: &R,
    args: CreateUserArgs,
) -> AppResult<Uuid> {
    let email = args.email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(AppError::validation("Invalid email format"));
    }
    if args.name.trim().is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    if repo.find_by_email_with_deleted(&email).await?.is_some() {
        return Err(AppError::validation("Email already registered"));
    }

    let password = Password::new(&args.password)?;
    let role = if args.super_admin {
        UserRole::SuperAdmin
    } else {
        UserRole::User
    };

    let user = repo
        .create(NewUser {
            email,
            password_hash: password.into_string(),
            name: args.name.trim().to_string(),
            role,
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User created");
    Ok(user.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::infra::MockUserRepository;
    use mockall::predicate::*;

    fn args(email: &str, super_admin: bool) -> CreateUserArgs {
        CreateUserArgs {
            email: email.to_string(),
            name: "Admin".to_string(),
            password: "secret".to_string(),
            super_admin,
        }
    }

    #[tokio::test]
    async fn test_create_super_admin() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email_with_deleted()
            .with(eq("admin@example.com"))
            .returning(|_| Ok(None));
        repo.expect_create()
            .withf(|u| u.role == UserRole::SuperAdmin && u.password_hash != "secret")
            .returning(|u| {
                Ok(User::new(Uuid::new_v4(), u.email, u.password_hash, u.name, u.role))
            });

        let result = create_user(&repo, args(" Admin@Example.com ", true)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_user_rejects_taken_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email_with_deleted().returning(|email| {
            Ok(Some(User::new(
                Uuid::new_v4(),
                email.to_string(),
                "hash".to_string(),
                "Existing".to_string(),
                UserRole::User,
            )))
        });
        repo.expect_create().never();

        let result = create_user(&repo, args("taken@example.com", false)).await;
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Email already registered"));
    }

    #[tokio::test]
    async fn test_create_user_rejects_bad_email() {
        for email in ["not-an-email", "@example.com", "user@", ""] {
            let mut repo = MockUserRepository::new();
            repo.expect_find_by_email_with_deleted().never();
            repo.expect_create().never();

            let result = create_user(&repo, args(email, false)).await;
            assert!(
                matches!(result, Err(AppError::Validation(ref msg)) if msg == "Invalid email format"),
                "{email} accepted"
            );
        }
    }
}
