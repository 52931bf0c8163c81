use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::record_id::RecordId;
use crate::models::user::{Role, User};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, Salt, SaltString};
use std::sync::LazyLock;

/// A real Argon2 hash generated once at startup, used as a timing decoy
/// so that login requests for non-existent or password-less accounts take
/// the same time as requests for existing ones.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"dummy-never-matches", Salt::from(&salt))
        .expect("failed to generate dummy hash")
        .to_string()
});

#[async_trait::async_trait]
pub trait UserRepository {
    async fn create_user(&self, name: &str, email: &str, password: &str, role: Role) -> Result<User, AppError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn upsert_oauth_user(&self, name: &str, email: &str, oauth_id: &str) -> Result<User, AppError>;
    async fn any_users_exist(&self) -> Result<bool, AppError>;
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: RecordId,
    name: String,
    email: String,
    password_hash: Option<String>,
    role: String,
    oauth_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: role_from_db(&row.role),
            oauth_id: row.oauth_id,
            created_at: row.created_at,
        }
    }
}

#[async_trait::async_trait]
impl UserRepository for PostgresRepository {
    async fn create_user(&self, name: &str, email: &str, password: &str, role: Role) -> Result<User, AppError> {
        let (salt, password_hash) = hash_password(password)?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, salt, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6::text::user_role)
            RETURNING id, name, email, password_hash, role::text as role, oauth_id, created_at
            "#,
        )
        .bind(RecordId::generate())
        .bind(name)
        .bind(email)
        .bind(&salt)
        .bind(&password_hash)
        .bind(role_to_db(role))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                AppError::DuplicateEmail(email.to_string())
            } else {
                AppError::db("Failed to create user", e)
            }
        })?;

        Ok(row.into())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, role::text as role, oauth_id, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn upsert_oauth_user(&self, name: &str, email: &str, oauth_id: &str) -> Result<User, AppError> {
        // Creates the account on first OAuth login; on later logins links the
        // OAuth id if it was missing and leaves the stored role untouched.
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, role, oauth_id)
            VALUES ($1, $2, $3, 'USER', $4)
            ON CONFLICT (email) DO UPDATE
            SET oauth_id = COALESCE(users.oauth_id, EXCLUDED.oauth_id)
            RETURNING id, name, email, password_hash, role::text as role, oauth_id, created_at
            "#,
        )
        .bind(RecordId::generate())
        .bind(name)
        .bind(email)
        .bind(oauth_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn any_users_exist(&self) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users)").fetch_one(&self.pool).await?;
        Ok(exists)
    }
}

pub(crate) fn hash_password(password: &str) -> Result<(String, String), AppError> {
    let salt_string = SaltString::generate(&mut OsRng);
    let salt = Salt::from(&salt_string);
    let password_hash = PasswordHash::generate(Argon2::default(), password.as_bytes(), salt)?;

    Ok((salt.to_string(), password_hash.to_string()))
}

pub(crate) fn verify_against_hash(stored_hash: &str, password: &str) -> Result<(), AppError> {
    let password_hash = PasswordHash::new(stored_hash).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &password_hash)
        .map_err(|_| AppError::InvalidCredentials)?;

    Ok(())
}

/// Perform a throwaway Argon2 verification to equalize response timing
/// regardless of whether the target account exists or has a password.
pub(crate) fn dummy_verify(password: &str) {
    let hash = PasswordHash::new(&DUMMY_HASH).expect("invalid dummy hash");
    let _ = Argon2::default().verify_password(password.as_bytes(), &hash);
}

pub fn role_from_db<T: AsRef<str>>(value: T) -> Role {
    match value.as_ref() {
        "USER" => Role::User,
        "ADMIN" => Role::Admin,
        other => panic!("Unknown role: {}", other),
    }
}

pub fn role_to_db(role: Role) -> &'static str {
    match role {
        Role::User => "USER",
        Role::Admin => "ADMIN",
    }
}
