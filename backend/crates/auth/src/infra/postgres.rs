//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entity::{
    linked_account::{LinkedAccount, ProviderTokens},
    user::User,
};
use crate::domain::repository::{LinkedAccountRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    ids::{LinkedAccountId, UserId},
    profile::{DisplayName, ProfileImageUrl},
    provider::Provider,
    user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// Unique index on `users.email`
const USERS_EMAIL_KEY: &str = "users_email_key";

const USER_COLUMNS: &str = r#"
    user_id,
    email,
    name,
    password_hash,
    profile_image_url,
    is_active,
    is_verified,
    created_at,
    updated_at
"#;

const LINKED_ACCOUNT_COLUMNS: &str = r#"
    linked_account_id,
    user_id,
    provider,
    provider_account_id,
    access_token,
    refresh_token,
    expires_at,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_user(
        tx: &mut Transaction<'_, Postgres>,
        user: &User,
    ) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (
                user_id,
                email,
                name,
                password_hash,
                profile_image_url,
                is_active,
                is_verified,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.name.as_ref().map(DisplayName::as_str))
        .bind(user.password.as_ref().map(UserPassword::as_phc_string))
        .bind(user.profile_image_url.as_ref().map(ProfileImageUrl::as_str))
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_unique_violation)?;

        Ok(row.into_user())
    }

    async fn insert_linked_account(
        tx: &mut Transaction<'_, Postgres>,
        account: &LinkedAccount,
    ) -> AuthResult<LinkedAccount> {
        let row = sqlx::query_as::<_, LinkedAccountRow>(&format!(
            r#"
            INSERT INTO linked_accounts (
                linked_account_id,
                user_id,
                provider,
                provider_account_id,
                access_token,
                refresh_token,
                expires_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id, provider) DO UPDATE SET
                provider_account_id = EXCLUDED.provider_account_id,
                access_token = COALESCE(EXCLUDED.access_token, linked_accounts.access_token),
                refresh_token = COALESCE(EXCLUDED.refresh_token, linked_accounts.refresh_token),
                expires_at = COALESCE(EXCLUDED.expires_at, linked_accounts.expires_at),
                updated_at = EXCLUDED.updated_at
            RETURNING {LINKED_ACCOUNT_COLUMNS}
            "#
        ))
        .bind(account.linked_account_id.as_uuid())
        .bind(account.user_id.as_uuid())
        .bind(account.provider.as_str())
        .bind(&account.provider_account_id)
        .bind(account.tokens.access_token.as_deref())
        .bind(account.tokens.refresh_token.as_deref())
        .bind(account.tokens.expires_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_unique_violation)?;

        Ok(row.into_linked_account())
    }
}

/// Unique violations become domain conflicts; everything else stays a
/// database error.
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(USERS_EMAIL_KEY) => AuthError::EmailTaken,
                _ => AuthError::Duplicate,
            };
        }
    }
    AuthError::Database(err)
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn get_by_email(&self, email: &Email) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.ok_or(AuthError::UserNotFound)?.into_user())
    }

    async fn get_by_id(&self, user_id: &UserId) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.ok_or(AuthError::UserNotFound)?.into_user())
    }

    async fn create(&self, user: &User) -> AuthResult<User> {
        let mut tx = self.pool.begin().await?;
        let created = Self::insert_user(&mut tx, user).await?;
        tx.commit().await?;

        Ok(created)
    }

    async fn update(&self, user: &User) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                name = $2,
                profile_image_url = $3,
                is_active = $4,
                is_verified = $5,
                updated_at = $6
            WHERE user_id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.user_id.as_uuid())
        .bind(user.name.as_ref().map(DisplayName::as_str))
        .bind(user.profile_image_url.as_ref().map(ProfileImageUrl::as_str))
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.ok_or(AuthError::UserNotFound)?.into_user())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        // linked_accounts rows go with ON DELETE CASCADE
        let deleted = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }
}

// ============================================================================
// Linked Account Repository Implementation
// ============================================================================

impl LinkedAccountRepository for PgAuthRepository {
    async fn find_linked_account(
        &self,
        user_id: &UserId,
        provider: &Provider,
    ) -> AuthResult<Option<LinkedAccount>> {
        let row = sqlx::query_as::<_, LinkedAccountRow>(&format!(
            "SELECT {LINKED_ACCOUNT_COLUMNS} FROM linked_accounts WHERE user_id = $1 AND provider = $2"
        ))
        .bind(user_id.as_uuid())
        .bind(provider.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LinkedAccountRow::into_linked_account))
    }

    async fn find_linked_account_by_subject(
        &self,
        provider: &Provider,
        provider_account_id: &str,
    ) -> AuthResult<Option<LinkedAccount>> {
        let row = sqlx::query_as::<_, LinkedAccountRow>(&format!(
            "SELECT {LINKED_ACCOUNT_COLUMNS} FROM linked_accounts WHERE provider = $1 AND provider_account_id = $2"
        ))
        .bind(provider.as_str())
        .bind(provider_account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LinkedAccountRow::into_linked_account))
    }

    async fn upsert_linked_account(&self, account: &LinkedAccount) -> AuthResult<LinkedAccount> {
        let mut tx = self.pool.begin().await?;
        let stored = Self::insert_linked_account(&mut tx, account).await?;
        tx.commit().await?;

        Ok(stored)
    }

    async fn create_with_linked_account(
        &self,
        user: &User,
        account: &LinkedAccount,
    ) -> AuthResult<(User, LinkedAccount)> {
        let mut tx = self.pool.begin().await?;
        // Dropping `tx` on error rolls back
        let user = Self::insert_user(&mut tx, user).await?;
        let account = Self::insert_linked_account(&mut tx, account).await?;
        tx.commit().await?;

        Ok((user, account))
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    name: Option<String>,
    password_hash: Option<String>,
    profile_image_url: Option<String>,
    is_active: bool,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            user_id: UserId::from_uuid(self.user_id),
            email: Email::from_db(self.email),
            name: self.name.map(DisplayName::from_db),
            password: self.password_hash.map(UserPassword::from_db),
            profile_image_url: self.profile_image_url.map(ProfileImageUrl::from_db),
            is_active: self.is_active,
            is_verified: self.is_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LinkedAccountRow {
    linked_account_id: Uuid,
    user_id: Uuid,
    provider: String,
    provider_account_id: String,
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LinkedAccountRow {
    fn into_linked_account(self) -> LinkedAccount {
        LinkedAccount {
            linked_account_id: LinkedAccountId::from_uuid(self.linked_account_id),
            user_id: UserId::from_uuid(self.user_id),
            provider: Provider::from_db(self.provider),
            provider_account_id: self.provider_account_id,
            tokens: ProviderTokens {
                access_token: self.access_token,
                refresh_token: self.refresh_token,
                expires_at: self.expires_at,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
