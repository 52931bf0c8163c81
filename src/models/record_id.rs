use crate::error::app_error::AppError;
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static RECORD_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("valid record id pattern"));

/// Document-store style record identifier: 24 hex characters encoding a
/// 4-byte creation timestamp followed by 8 random bytes.
///
/// Path parameters are validated against this grammar before being used as
/// lookup keys, so a malformed id never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&(Utc::now().timestamp() as u32).to_be_bytes());
        let random: [u8; 8] = rand::random();
        bytes[4..].copy_from_slice(&random);
        RecordId(hex::encode(bytes))
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        if RECORD_ID_RE.is_match(value) {
            Ok(RecordId(value.to_lowercase()))
        } else {
            Err(AppError::InvalidId(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
