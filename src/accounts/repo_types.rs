use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::accounts::codes::CodeSlot;

/// User record in the database. One row per email; rows are never deleted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub fullname: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub verified: bool,
    #[serde(skip_serializing)]
    pub verification_code: Option<String>,
    #[serde(skip_serializing)]
    pub verification_expires: Option<OffsetDateTime>,
    #[serde(skip_serializing)]
    pub reset_code: Option<String>,
    #[serde(skip_serializing)]
    pub reset_expires: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn verification_slot(&self) -> CodeSlot {
        CodeSlot::from_columns(
            self.verification_code.clone(),
            self.verification_expires,
        )
    }

    pub fn reset_slot(&self) -> CodeSlot {
        CodeSlot::from_columns(self.reset_code.clone(), self.reset_expires)
    }
}
