use sqlx::PgPool;

use crate::accounts::codes::IssuedCode;
use crate::accounts::repo_types::User;

const USER_COLUMNS: &str = "id, email, fullname, password_hash, verified, \
     verification_code, verification_expires, reset_code, reset_expires, created_at";

impl User {
    /// Find a user by email. Exact match, case-sensitive as stored.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Insert a new unverified user with a pending verification code.
    pub async fn create(
        db: &PgPool,
        fullname: &str,
        email: &str,
        password_hash: &str,
        code: &IssuedCode,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (fullname, email, password_hash, verified, verification_code, verification_expires)
            VALUES ($1, $2, $3, FALSE, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(fullname)
        .bind(email)
        .bind(password_hash)
        .bind(&code.code)
        .bind(code.expires_at)
        .fetch_one(db)
        .await
    }

    /// Consume the verification code: flip the flag and clear both columns
    /// in a single statement.
    pub async fn mark_verified(db: &PgPool, email: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET verified = TRUE, verification_code = NULL, verification_expires = NULL
            WHERE email = $1
            "#,
        )
        .bind(email)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Overwrite the verification slot with a fresh code; any prior code
    /// becomes invalid immediately.
    pub async fn set_verification_code(
        db: &PgPool,
        email: &str,
        code: &IssuedCode,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET verification_code = $1, verification_expires = $2
            WHERE email = $3
            "#,
        )
        .bind(&code.code)
        .bind(code.expires_at)
        .bind(email)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Overwrite the reset slot with a fresh code, independent of the
    /// verification slot.
    pub async fn set_reset_code(
        db: &PgPool,
        email: &str,
        code: &IssuedCode,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_code = $1, reset_expires = $2
            WHERE email = $3
            "#,
        )
        .bind(&code.code)
        .bind(code.expires_at)
        .bind(email)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Write the new password hash and clear both reset columns in a single
    /// statement. The old hash is irrecoverably overwritten.
    pub async fn reset_password(
        db: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, reset_code = NULL, reset_expires = NULL
            WHERE email = $2
            "#,
        )
        .bind(password_hash)
        .bind(email)
        .execute(db)
        .await?;
        Ok(())
    }
}
