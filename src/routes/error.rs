use rocket::serde::json::Json;
use rocket::{Request, catch};
use serde::Serialize;

/// Error envelope emitted by catchers, matching the shape produced by the
/// `AppError` responder.
#[derive(Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub error: &'static str,
}

fn err(error: &'static str) -> Json<ErrorBody> {
    Json(ErrorBody { status: "ERR", error })
}

#[catch(400)]
pub fn bad_request(_: &Request) -> Json<ErrorBody> {
    err("Bad request")
}

#[catch(401)]
pub fn unauthorized(_: &Request) -> Json<ErrorBody> {
    err("Not authenticated")
}

#[catch(403)]
pub fn forbidden(_: &Request) -> Json<ErrorBody> {
    err("Admin role required")
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<ErrorBody> {
    err("Not found")
}

#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> Json<ErrorBody> {
    err("Malformed request body")
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<ErrorBody> {
    err("Internal server error")
}
