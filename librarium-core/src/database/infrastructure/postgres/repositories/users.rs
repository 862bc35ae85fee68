use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use librarium_model::{Gender, User, UserId};

use crate::database::infrastructure::postgres::internal;
use crate::database::ports::users::{NewUser, UserChanges, UserStore};
use crate::error::{CatalogError, Result};

const USER_COLUMNS: &str = "pkid, name, email, birthdate, gender, height, status";

/// PostgreSQL-backed implementation of the `UserStore` port.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn user_from_row(row: &PgRow) -> Result<User> {
    let gender: String = row.get("gender");
    let gender = gender
        .parse::<Gender>()
        .map_err(|e| CatalogError::Internal(format!("corrupt user row: {e}")))?;
    Ok(User {
        pkid: UserId::new(row.get("pkid")),
        name: row.get("name"),
        email: row.get("email"),
        birthdate: row.get::<NaiveDate, _>("birthdate"),
        gender,
        height: row.get("height"),
        status: row.get("status"),
    })
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create(&self, draft: &NewUser) -> Result<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (name, email, birthdate, gender, height, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(draft.name.as_str())
        .bind(draft.email.as_str())
        .bind(draft.birthdate)
        .bind(draft.gender.as_str())
        .bind(draft.height)
        .bind(draft.status)
        .fetch_one(self.pool())
        .await
        .map_err(|e| internal(e, "failed to create user"))?;

        let user = user_from_row(&row)?;
        info!("created user {} ({})", user.name, user.pkid);
        Ok(user)
    }

    async fn find_by_pkid(&self, pkid: UserId) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE pkid = $1"))
            .bind(pkid.as_i64())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| internal(e, "failed to get user by pkid"))?;
        row.map(|r| user_from_row(&r)).transpose()
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY pkid"))
            .fetch_all(self.pool())
            .await
            .map_err(|e| internal(e, "failed to list users"))?;
        rows.iter().map(user_from_row).collect()
    }

    async fn update(&self, pkid: UserId, changes: &UserChanges) -> Result<User> {
        let mut sets: Vec<String> = Vec::new();
        if changes.name.is_some() {
            sets.push(format!("name = ${}", sets.len() + 1));
        }
        if changes.email.is_some() {
            sets.push(format!("email = ${}", sets.len() + 1));
        }
        if changes.birthdate.is_some() {
            sets.push(format!("birthdate = ${}", sets.len() + 1));
        }
        if changes.gender.is_some() {
            sets.push(format!("gender = ${}", sets.len() + 1));
        }
        if changes.height.is_some() {
            sets.push(format!("height = ${}", sets.len() + 1));
        }
        if changes.status.is_some() {
            sets.push(format!("status = ${}", sets.len() + 1));
        }
        if sets.is_empty() {
            return self
                .find_by_pkid(pkid)
                .await?
                .ok_or_else(|| CatalogError::not_found("User", pkid));
        }
        let sql = format!(
            "UPDATE users SET {} WHERE pkid = ${} RETURNING {USER_COLUMNS}",
            sets.join(", "),
            sets.len() + 1
        );

        let mut query = sqlx::query(&sql);
        if let Some(name) = &changes.name {
            query = query.bind(name.as_str());
        }
        if let Some(email) = &changes.email {
            query = query.bind(email.as_str());
        }
        if let Some(birthdate) = changes.birthdate {
            query = query.bind(birthdate);
        }
        if let Some(gender) = changes.gender {
            query = query.bind(gender.as_str());
        }
        if let Some(height) = changes.height {
            query = query.bind(height);
        }
        if let Some(status) = changes.status {
            query = query.bind(status);
        }
        let row = query
            .bind(pkid.as_i64())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| internal(e, "failed to update user"))?
            .ok_or_else(|| CatalogError::not_found("User", pkid))?;

        info!("updated user {}", pkid);
        user_from_row(&row)
    }

    async fn delete(&self, pkid: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE pkid = $1")
            .bind(pkid.as_i64())
            .execute(self.pool())
            .await
            .map_err(|e| internal(e, "failed to delete user"))?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }
        info!("deleted user {}", pkid);
        Ok(true)
    }
}
