use serde::Serialize;

/// Success envelope shared by every endpoint: `{"status":"OK","data":...}`.
/// The matching error envelope (`{"status":"ERR","error":...}`) is produced
/// by the `AppError` responder and the catchers.
#[derive(Serialize, Debug)]
pub struct ApiBody<T: Serialize> {
    pub status: &'static str,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> ApiBody<T> {
    ApiBody { status: "OK", data }
}
