//! SQLite-backed account store
//!
//! Writes go through [`AccountPersistenceExceptionConverter`], so duplicate
//! emails, phones, external IDs and Synapse user IDs surface as
//! `Error::EntityAlreadyExists` naming the account that already holds them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::models::{Account, AccountId, Enrollment, Phone};
use crate::persistence::{AccountLookup, AccountPersistenceExceptionConverter, PersistenceError};
use crate::{Error, Result};

const ACCOUNT_COLUMNS: &str =
    "a.id, a.app_id, a.email, a.phone, a.phone_region, a.synapse_user_id, a.version, a.created_on, a.modified_on";

/// Reported by SQLite when an account is enrolled in the same study twice
const DUPLICATE_ENROLLMENT_SIGNATURE: &str = "enrollments.study_id, enrollments.account_id";

#[derive(Clone)]
pub struct SqliteAccountStore {
    pool: SqlitePool,
}

impl SqliteAccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a new account with its enrollments
    ///
    /// An empty `id` is replaced with a generated one. Returns the stored
    /// account at version 1.
    pub async fn create_account(&self, account: &Account, context: &RequestContext) -> Result<Account> {
        let now = Utc::now();
        let mut saved = account.clone();
        if saved.id.is_empty() {
            saved.id = Uuid::new_v4().to_string();
        }
        saved.version = 1;
        saved.created_on = Some(now);
        saved.modified_on = Some(now);
        for enrollment in saved.enrollments.iter_mut() {
            enrollment.account_id = saved.id.clone();
            enrollment.app_id = saved.app_id.clone();
        }

        match self.insert(&saved).await {
            Ok(()) => {
                info!(app_id = %saved.app_id, user_id = %saved.id, "Created account");
                Ok(saved)
            }
            Err(failure) => Err(self.convert(failure, &saved, context).await),
        }
    }

    /// Update an existing account, replacing its enrollments
    ///
    /// `account.version` must match the stored version; the returned account
    /// carries the incremented version.
    pub async fn update_account(&self, account: &Account, context: &RequestContext) -> Result<Account> {
        let mut saved = account.clone();
        saved.modified_on = Some(Utc::now());
        for enrollment in saved.enrollments.iter_mut() {
            enrollment.account_id = saved.id.clone();
            enrollment.app_id = saved.app_id.clone();
        }

        match self.update(&saved).await {
            Ok(()) => {
                saved.version += 1;
                debug!(user_id = %saved.id, version = saved.version, "Updated account");
                Ok(saved)
            }
            Err(failure) => Err(self.convert(failure, &saved, context).await),
        }
    }

    async fn insert(&self, account: &Account) -> std::result::Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO accounts (id, app_id, email, phone, phone_region, synapse_user_id, version, created_on, modified_on)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.app_id)
        .bind(&account.email)
        .bind(account.phone.as_ref().map(|p| p.number.as_str()))
        .bind(account.phone.as_ref().map(|p| p.region_code.as_str()))
        .bind(&account.synapse_user_id)
        .bind(account.version)
        .bind(account.created_on)
        .bind(account.modified_on)
        .execute(&mut *tx)
        .await?;

        insert_enrollments(&mut tx, account).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, account: &Account) -> std::result::Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET email = ?, phone = ?, phone_region = ?, synapse_user_id = ?,
                version = version + 1, modified_on = ?
            WHERE app_id = ? AND id = ? AND version = ?
            "#,
        )
        .bind(&account.email)
        .bind(account.phone.as_ref().map(|p| p.number.as_str()))
        .bind(account.phone.as_ref().map(|p| p.region_code.as_str()))
        .bind(&account.synapse_user_id)
        .bind(account.modified_on)
        .bind(&account.app_id)
        .bind(&account.id)
        .bind(account.version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::OptimisticLock {
                entity: "Account".to_string(),
                version: account.version,
            });
        }

        sqlx::query("DELETE FROM enrollments WHERE account_id = ?")
            .bind(&account.id)
            .execute(&mut *tx)
            .await?;

        insert_enrollments(&mut tx, account).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn convert(&self, failure: PersistenceError, account: &Account, context: &RequestContext) -> Error {
        AccountPersistenceExceptionConverter::new(self.clone())
            .convert(failure, Some(account), context)
            .await
    }

    async fn load_enrollments(&self, account_id: &str) -> Result<Vec<Enrollment>> {
        let rows = sqlx::query(
            r#"
            SELECT app_id, study_id, account_id, external_id
            FROM enrollments
            WHERE account_id = ?
            ORDER BY enrollment_order ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Enrollment {
                app_id: row.get("app_id"),
                study_id: row.get("study_id"),
                account_id: row.get("account_id"),
                external_id: row.get("external_id"),
            })
            .collect())
    }
}

#[async_trait]
impl AccountLookup for SqliteAccountStore {
    async fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>> {
        let (condition, value) = match account_id {
            AccountId::Id { id, .. } => ("a.id = ?", id.as_str()),
            AccountId::Email { email, .. } => ("a.email = ?", email.as_str()),
            AccountId::Phone { phone, .. } => ("a.phone = ?", phone.number.as_str()),
            AccountId::SynapseUserId { synapse_user_id, .. } => {
                ("a.synapse_user_id = ?", synapse_user_id.as_str())
            }
            AccountId::ExternalId { external_id, .. } => (
                "a.id IN (SELECT account_id FROM enrollments WHERE external_id = ?)",
                external_id.as_str(),
            ),
        };
        let sql = format!(
            "SELECT {} FROM accounts a WHERE a.app_id = ? AND {} LIMIT 1",
            ACCOUNT_COLUMNS, condition
        );

        let row = sqlx::query(&sql)
            .bind(account_id.app_id())
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            debug!(key = %account_id, "No account found");
            return Ok(None);
        };
        let mut account = account_from_row(&row);
        account.enrollments = self.load_enrollments(&account.id).await?;
        Ok(Some(account))
    }
}

async fn insert_enrollments(
    tx: &mut Transaction<'_, Sqlite>,
    account: &Account,
) -> std::result::Result<(), PersistenceError> {
    for (order, enrollment) in account.enrollments.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO enrollments (app_id, study_id, account_id, external_id, enrollment_order)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&enrollment.app_id)
        .bind(&enrollment.study_id)
        .bind(&account.id)
        .bind(&enrollment.external_id)
        .bind(order as i64)
        .execute(&mut **tx)
        .await
        .map_err(classify_enrollment_error)?;
    }
    Ok(())
}

/// Enrolling the same account in a study twice is a duplicate object, not a key conflict
fn classify_enrollment_error(err: sqlx::Error) -> PersistenceError {
    match PersistenceError::from_sqlx(&err) {
        PersistenceError::ConstraintViolation { message, .. }
            if message.contains(DUPLICATE_ENROLLMENT_SIGNATURE) =>
        {
            PersistenceError::NonUniqueObject { message }
        }
        other => other,
    }
}

fn account_from_row(row: &SqliteRow) -> Account {
    let phone_number: Option<String> = row.get("phone");
    let phone_region: Option<String> = row.get("phone_region");
    Account {
        id: row.get("id"),
        app_id: row.get("app_id"),
        email: row.get("email"),
        phone: phone_number.map(|number| Phone::new(number, phone_region.unwrap_or_default())),
        synapse_user_id: row.get("synapse_user_id"),
        enrollments: Vec::new(),
        version: row.get("version"),
        created_on: row.get::<Option<DateTime<Utc>>, _>("created_on"),
        modified_on: row.get::<Option<DateTime<Utc>>, _>("modified_on"),
    }
}
