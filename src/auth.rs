use crate::config::Config;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::session::SessionRepository;
use crate::error::app_error::AppError;
use crate::models::session::SessionUser;
use crate::models::user::Role;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use uuid::Uuid;

/// Name of the private cookie carrying the opaque session id.
pub const SESSION_COOKIE: &str = "session";

/// Identity resolved from a live session; absence of a valid session cookie
/// means unauthenticated (401).
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub session_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Guard for admin-only handlers; wraps `CurrentUser` behind the
/// three-outcome check of `authorize_admin`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

pub(crate) fn parse_session_cookie_value(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value).ok()
}

/// The authorization state machine: no session continues as 401, a session
/// without the ADMIN role as 403, an admin session passes through. Only the
/// session projection's role is consulted; a role downgrade in the
/// credential store is not reflected until re-authentication.
pub(crate) fn authorize_admin(user: Option<&SessionUser>) -> Result<(), AppError> {
    match user {
        None => Err(AppError::Unauthenticated),
        Some(user) if user.role != Role::Admin => Err(AppError::Forbidden),
        Some(_) => Ok(()),
    }
}

async fn load_session_user(req: &Request<'_>) -> Result<Option<CurrentUser>, (Status, AppError)> {
    let Some(cookie) = req.cookies().get_private(SESSION_COOKIE) else {
        return Ok(None);
    };
    let Some(session_id) = parse_session_cookie_value(cookie.value()) else {
        return Ok(None);
    };

    let (Some(pool), Some(config)) = (req.rocket().state::<sqlx::PgPool>(), req.rocket().state::<Config>()) else {
        return Err((Status::InternalServerError, AppError::Unauthenticated));
    };

    let repo = PostgresRepository { pool: pool.clone() };
    match repo.current_session_user(&session_id, config.session.ttl_seconds).await {
        Ok(Some(user)) => Ok(Some(CurrentUser {
            session_id,
            email: user.email,
            role: user.role,
        })),
        Ok(None) => Ok(None),
        Err(err) => Err((Status::InternalServerError, err)),
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        match load_session_user(req).await {
            Ok(Some(current_user)) => {
                req.local_cache(|| Some(current_user.clone()));
                Outcome::Success(current_user)
            }
            Ok(None) => Outcome::Error((Status::Unauthorized, AppError::Unauthenticated)),
            Err((status, err)) => Outcome::Error((status, err)),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let current_user = match load_session_user(req).await {
            Ok(user) => user,
            Err((status, err)) => return Outcome::Error((status, err)),
        };

        let session_user = current_user.as_ref().map(|u| SessionUser {
            email: u.email.clone(),
            role: u.role,
        });

        if let Err(err) = authorize_admin(session_user.as_ref()) {
            let status = Status::from(&err);
            return Outcome::Error((status, err));
        }

        // authorize_admin only passes when a session user exists
        let Some(current_user) = current_user else {
            return Outcome::Error((Status::Unauthorized, AppError::Unauthenticated));
        };
        req.local_cache(|| Some(current_user.clone()));
        Outcome::Success(AdminUser(current_user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_user(role: Role) -> SessionUser {
        SessionUser {
            email: "a@x.com".to_string(),
            role,
        }
    }

    #[test]
    fn no_session_is_unauthenticated() {
        let outcome = authorize_admin(None);
        assert!(matches!(outcome, Err(AppError::Unauthenticated)));
        assert_eq!(Status::from(&outcome.unwrap_err()), Status::Unauthorized);
    }

    #[test]
    fn non_admin_session_is_forbidden() {
        let outcome = authorize_admin(Some(&session_user(Role::User)));
        assert!(matches!(outcome, Err(AppError::Forbidden)));
        assert_eq!(Status::from(&outcome.unwrap_err()), Status::Forbidden);
    }

    #[test]
    fn admin_session_passes_through() {
        assert!(authorize_admin(Some(&session_user(Role::Admin))).is_ok());
    }

    #[test]
    fn parse_session_cookie_value_valid() {
        let session_id = Uuid::new_v4();
        assert_eq!(parse_session_cookie_value(&session_id.to_string()), Some(session_id));
    }

    #[test]
    fn parse_session_cookie_value_invalid() {
        assert!(parse_session_cookie_value("not-a-uuid").is_none());
        assert!(parse_session_cookie_value("").is_none());
    }
}
