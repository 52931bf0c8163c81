use serde::Serialize;

use crate::models::user::Role;

/// Projection of the session row the Authorization Guard reads. The role
/// here is authoritative; it is not re-derived from the users table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub email: String,
    pub role: Role,
}

#[derive(Serialize, Debug)]
pub struct CurrentSessionResponse {
    pub user: SessionUser,
    /// Requests served for this session so far; pure bookkeeping.
    pub visits: i64,
}
