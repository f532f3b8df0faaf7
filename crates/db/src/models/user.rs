//! Read-only view of the users table.

use hostwatch_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// The contact columns the alert pipeline needs from a user row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserContact {
    pub id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub fcm_token: Option<String>,
}
