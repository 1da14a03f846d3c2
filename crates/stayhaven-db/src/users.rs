//! User repository.
//!
//! Emails are stored lower-case; callers normalize before lookups.

use sqlx::PgPool;
use stayhaven_common::Role;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::{
    contains_pattern, BankDetails, BankUpdate, NewUser, User, UserProfileUpdate, UserSummary, USER_SUMMARY_COLUMNS,
};

/// Repository for user operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Insert a user. A taken email surfaces as `DbError::Duplicate`.
    pub async fn create(&self, new: &NewUser) -> Result<User> {
        let role = new.role.unwrap_or(Role::Partner);
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (name, email, password_hash, role, phone, country, dob, company_name, email_verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(role.as_str())
        .bind(&new.phone)
        .bind(&new.country)
        .bind(new.dob)
        .bind(&new.company_name)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %user.id, role = %role, "user created");
        Ok(user)
    }

    /// Replace the password hash. Returns false when no user has that email.
    pub async fn set_password(&self, email: &str, password_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = now() WHERE email = $2",
        )
        .bind(password_hash)
        .bind(email)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store payout bank details and mark them verified.
    pub async fn update_bank(&self, id: Uuid, bank: &BankUpdate) -> Result<Option<BankDetails>> {
        let details = sqlx::query_as::<_, BankDetails>(
            r#"
            UPDATE users SET
                bank_name           = $2,
                bank_branch_code    = COALESCE($3, bank_branch_code),
                bank_account_number = $4,
                bank_account_name   = $5,
                bank_currency       = COALESCE($6, bank_currency),
                bank_verified       = TRUE,
                updated_at          = now()
            WHERE id = $1
            RETURNING id, email, name, bank_name, bank_branch_code, bank_account_number,
                      bank_account_name, bank_currency, bank_verified
            "#,
        )
        .bind(id)
        .bind(&bank.bank_name)
        .bind(&bank.bank_branch_code)
        .bind(&bank.bank_account_number)
        .bind(&bank.bank_account_name)
        .bind(&bank.bank_currency)
        .fetch_optional(&self.pool)
        .await?;
        Ok(details)
    }

    /// Apply an admin profile edit. Returns `None` when the user does not exist.
    pub async fn update_profile(&self, id: Uuid, update: &UserProfileUpdate) -> Result<Option<UserSummary>> {
        let sql = format!(
            r#"
            UPDATE users SET
                name          = COALESCE($2, name),
                phone         = COALESCE($3, phone),
                country       = COALESCE($4, country),
                dob           = COALESCE($5, dob),
                company_name  = COALESCE($6, company_name),
                password_hash = COALESCE($7, password_hash),
                updated_at    = now()
            WHERE id = $1
            RETURNING {USER_SUMMARY_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, UserSummary>(&sql)
            .bind(id)
            .bind(&update.name)
            .bind(&update.phone)
            .bind(&update.country)
            .bind(update.dob)
            .bind(&update.company_name)
            .bind(&update.password_hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn role_of(&self, id: Uuid) -> Result<Option<Role>> {
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        role.map(|r| Role::try_from(r).map_err(|e| DbError::InvalidValue(e.to_string())))
            .transpose()
    }

    /// Delete a user and, through the foreign key, their properties.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Case-insensitive search over name, email and company, newest first.
    pub async fn search(&self, q: &str, role: Option<Role>, limit: i64) -> Result<Vec<UserSummary>> {
        let q = q.trim();
        let pattern = (!q.is_empty()).then(|| contains_pattern(q));
        let sql = format!(
            r#"
            SELECT {USER_SUMMARY_COLUMNS}
            FROM users
            WHERE ($1::text IS NULL
                   OR name ILIKE $1
                   OR email ILIKE $1
                   OR company_name ILIKE $1)
              AND ($2::text IS NULL OR role = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#
        );
        let users = sqlx::query_as::<_, UserSummary>(&sql)
            .bind(pattern)
            .bind(role.map(|r| r.as_str()))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Create the superuser unless an account with that email exists.
    /// Returns true when a row was inserted.
    pub async fn ensure_superuser(&self, email: &str, password_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ('Superuser', $1, $2, 'SUPERUSER')
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
