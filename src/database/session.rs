use crate::database::postgres_repository::PostgresRepository;
use crate::database::user::{role_from_db, role_to_db};
use crate::error::app_error::AppError;
use crate::models::session::SessionUser;
use crate::models::user::Identity;
use uuid::Uuid;

/// Server-side session store. Sessions are keyed by an opaque id carried in
/// a private cookie; the stored role is what the Authorization Guard reads.
#[async_trait::async_trait]
pub trait SessionRepository {
    /// Upserts a session row for the identity. Passing an existing session
    /// id overwrites its email and role, so a privilege change takes effect
    /// on the next login without destroying the session.
    async fn establish_session(&self, session_id: Option<Uuid>, identity: &Identity, ttl_seconds: i64, user_agent: Option<&str>) -> Result<Uuid, AppError>;

    /// Returns the session's user projection while sliding its expiry
    /// forward, or None when the session is missing or expired.
    async fn current_session_user(&self, session_id: &Uuid, ttl_seconds: i64) -> Result<Option<SessionUser>, AppError>;

    /// Deletes the session row. Deleting a session with no backing record
    /// succeeds; store errors propagate unretried.
    async fn destroy_session(&self, session_id: &Uuid) -> Result<(), AppError>;

    /// Increments the per-session visit counter; the first call yields 1.
    async fn record_visit(&self, session_id: &Uuid) -> Result<Option<i64>, AppError>;
}

#[derive(Debug, sqlx::FromRow)]
struct SessionUserRow {
    email: String,
    role: String,
}

#[async_trait::async_trait]
impl SessionRepository for PostgresRepository {
    async fn establish_session(&self, session_id: Option<Uuid>, identity: &Identity, ttl_seconds: i64, user_agent: Option<&str>) -> Result<Uuid, AppError> {
        self.delete_expired_sessions_for_email(&identity.email).await?;

        let id = session_id.unwrap_or_else(Uuid::new_v4);
        let established: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO sessions (id, email, role, expires_at, user_agent)
            VALUES ($1, $2, $3::text::user_role, now() + $4 * interval '1 second', $5)
            ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email,
                role = EXCLUDED.role,
                expires_at = EXCLUDED.expires_at
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&identity.email)
        .bind(role_to_db(identity.role))
        .bind(ttl_seconds)
        .bind(user_agent)
        .fetch_one(&self.pool)
        .await?;

        Ok(established)
    }

    async fn current_session_user(&self, session_id: &Uuid, ttl_seconds: i64) -> Result<Option<SessionUser>, AppError> {
        let row = sqlx::query_as::<_, SessionUserRow>(
            r#"
            UPDATE sessions
            SET expires_at = now() + $2 * interval '1 second'
            WHERE id = $1
              AND expires_at > now()
            RETURNING email, role::text as role
            "#,
        )
        .bind(session_id)
        .bind(ttl_seconds)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| SessionUser {
            email: row.email,
            role: role_from_db(&row.role),
        }))
    }

    async fn destroy_session(&self, session_id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::db("Failed to destroy session", e))?;

        Ok(())
    }

    async fn record_visit(&self, session_id: &Uuid) -> Result<Option<i64>, AppError> {
        let visits: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE sessions
            SET visit_count = visit_count + 1
            WHERE id = $1
              AND expires_at > now()
            RETURNING visit_count
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(visits)
    }
}

impl PostgresRepository {
    async fn delete_expired_sessions_for_email(&self, email: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE email = $1 AND expires_at <= now()")
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::test_utils::MockRepository;

    #[tokio::test]
    async fn establish_then_current_round_trips() {
        let repo = MockRepository::new();
        let identity = Identity {
            email: "a@x.com".to_string(),
            role: Role::User,
        };

        let session_id = repo.establish_session(None, &identity, 60, None).await.unwrap();
        let user = repo.current_session_user(&session_id, 60).await.unwrap().expect("live session");

        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn re_establish_overwrites_role() {
        let repo = MockRepository::new();
        let identity = Identity {
            email: "a@x.com".to_string(),
            role: Role::User,
        };
        let session_id = repo.establish_session(None, &identity, 60, None).await.unwrap();

        let promoted = Identity {
            email: "a@x.com".to_string(),
            role: Role::Admin,
        };
        let same_id = repo.establish_session(Some(session_id), &promoted, 60, None).await.unwrap();
        assert_eq!(same_id, session_id);

        let user = repo.current_session_user(&session_id, 60).await.unwrap().expect("live session");
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn destroy_without_backing_record_succeeds() {
        let repo = MockRepository::new();
        let unknown = Uuid::new_v4();
        assert!(repo.destroy_session(&unknown).await.is_ok());
    }

    #[tokio::test]
    async fn destroyed_session_is_unauthenticated() {
        let repo = MockRepository::new();
        let identity = Identity {
            email: "a@x.com".to_string(),
            role: Role::User,
        };
        let session_id = repo.establish_session(None, &identity, 60, None).await.unwrap();

        repo.destroy_session(&session_id).await.unwrap();
        assert!(repo.current_session_user(&session_id, 60).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn visit_counter_initializes_to_one_and_increments() {
        let repo = MockRepository::new();
        let identity = Identity {
            email: "a@x.com".to_string(),
            role: Role::User,
        };
        let session_id = repo.establish_session(None, &identity, 60, None).await.unwrap();

        assert_eq!(repo.record_visit(&session_id).await.unwrap(), Some(1));
        assert_eq!(repo.record_visit(&session_id).await.unwrap(), Some(2));
        assert_eq!(repo.record_visit(&Uuid::new_v4()).await.unwrap(), None);
    }
}
