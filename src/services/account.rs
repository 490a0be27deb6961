//! User and credential persistence for email + password accounts.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::auth::User;

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        email_verified: row.get("email_verified"),
        image: row.get("image"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Fields for a new account. `email` must already be normalized.
pub struct NewAccount<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub image: Option<&'a str>,
    pub password_hash: &'a str,
}

/// Insert a user and its password credential in one transaction.
///
/// Returns `Ok(None)` if the email is already registered.
pub async fn create_account(pool: &PgPool, account: &NewAccount<'_>) -> Result<Option<User>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query(
        r"INSERT INTO users (email, name, image)
          VALUES ($1, $2, $3)
          ON CONFLICT (email) DO NOTHING
          RETURNING id, email, name, email_verified, image, created_at, updated_at",
    )
    .bind(account.email)
    .bind(account.name)
    .bind(account.image)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = row else {
        tx.rollback().await?;
        return Ok(None);
    };
    let user = user_from_row(&row);

    sqlx::query("INSERT INTO accounts (user_id, password_hash) VALUES ($1, $2)")
        .bind(user.id)
        .bind(account.password_hash)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Some(user))
}

/// Look up a user and their password hash by normalized email.
pub async fn find_credentials(pool: &PgPool, email: &str) -> Result<Option<(User, String)>, sqlx::Error> {
    let row = sqlx::query(
        r"SELECT u.id, u.email, u.name, u.email_verified, u.image, u.created_at, u.updated_at,
                 a.password_hash
          FROM users u
          JOIN accounts a ON a.user_id = u.id
          WHERE u.email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| (user_from_row(&r), r.get("password_hash"))))
}

#[cfg(all(test, feature = "live-db-tests"))]
#[path = "account_test.rs"]
mod tests;
