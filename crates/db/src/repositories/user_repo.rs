//! Read access to user contact details.

use hostwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::UserContact;

pub struct UserRepo;

impl UserRepo {
    /// Find the contact columns for a user by id.
    pub async fn find_contact(pool: &PgPool, id: DbId) -> Result<Option<UserContact>, sqlx::Error> {
        sqlx::query_as::<_, UserContact>(
            "SELECT id, name, email, phone, fcm_token FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
