//! SQLite preference and user storage.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::warn;

use super::model::{
    ChannelMethod, FlightPreference, OwnerContact, PendingPreference, PreferenceExtras,
    PreferenceId, UserId,
};
use super::store::{PreferenceStore, UserStore};
use crate::Result;
use crate::error::StoreError;
use crate::request::{DATE_FORMAT, SearchRequest, SeatClass};

/// SQLite-backed store for users, channels and flight preferences.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new store with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT UNIQUE,
                telegram_handle TEXT UNIQUE,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS notification_preferences (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                method TEXT NOT NULL,
                enabled INTEGER NOT NULL DEFAULT 1,
                UNIQUE(user_id, method)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS flight_preferences (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                target_departure TEXT NOT NULL,
                return_date TEXT NOT NULL,
                departure_airport TEXT NOT NULL,
                arrival_airport TEXT NOT NULL,
                currency TEXT NOT NULL,
                seat_class TEXT NOT NULL,
                max_price REAL,
                preferred_airline TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Pending preferences are selected by date
        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_flight_preferences_departure
            ON flight_preferences(target_departure)
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for SqliteStore {
    async fn list_pending(
        &self,
        as_of: NaiveDate,
    ) -> std::result::Result<Vec<PendingPreference>, StoreError> {
        let rows = sqlx::query(
            r"
            SELECT f.id, f.user_id, f.target_departure, f.return_date,
                   f.departure_airport, f.arrival_airport, f.currency, f.seat_class,
                   f.max_price, f.preferred_airline,
                   u.email, u.telegram_handle,
                   (SELECT GROUP_CONCAT(n.method)
                    FROM notification_preferences n
                    WHERE n.user_id = f.user_id AND n.enabled = 1) AS methods
            FROM flight_preferences f
            JOIN users u ON u.id = f.user_id
            WHERE f.target_departure >= ?
            ORDER BY f.id ASC
            ",
        )
        .bind(as_of.format(DATE_FORMAT).to_string())
        .fetch_all(&self.pool)
        .await?;

        let pending = rows
            .iter()
            .filter_map(|row| match pending_from_row(row) {
                Ok(pending) => Some(pending),
                Err(reason) => {
                    warn!(%reason, "Skipping unreadable flight preference row");
                    None
                }
            })
            .collect();

        Ok(pending)
    }

    async fn delete(&self, id: PreferenceId) -> std::result::Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM flight_preferences WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("flight preference {id}")));
        }
        Ok(())
    }

    async fn create(
        &self,
        user_id: UserId,
        request: &SearchRequest,
        extras: &PreferenceExtras,
    ) -> std::result::Result<PreferenceId, StoreError> {
        let mut conn = self.pool.acquire().await?;
        insert_preference(&mut conn, user_id, request, extras).await
    }

    async fn purge_stale(&self, cutoff: NaiveDate) -> std::result::Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM flight_preferences WHERE target_departure < ?")
            .bind(cutoff.format(DATE_FORMAT).to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn find_or_create_user(
        &self,
        email: Option<&str>,
        telegram_handle: Option<&str>,
    ) -> std::result::Result<UserId, StoreError> {
        let mut tx = self.pool.begin().await?;
        let id = find_or_create_user(&mut tx, email, telegram_handle).await?;
        tx.commit().await?;
        Ok(id)
    }

    async fn set_channel_enabled(
        &self,
        user_id: UserId,
        method: ChannelMethod,
    ) -> std::result::Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        enable_channel(&mut conn, user_id, method).await
    }

    async fn save_submission(
        &self,
        email: Option<&str>,
        telegram_handle: Option<&str>,
        channels: &[ChannelMethod],
        request: &SearchRequest,
        extras: &PreferenceExtras,
    ) -> std::result::Result<(UserId, PreferenceId), StoreError> {
        let mut tx = self.pool.begin().await?;

        let user_id = find_or_create_user(&mut tx, email, telegram_handle).await?;
        for method in channels {
            enable_channel(&mut tx, user_id, *method).await?;
        }
        let id = insert_preference(&mut tx, user_id, request, extras).await?;

        tx.commit().await?;
        Ok((user_id, id))
    }
}

async fn find_or_create_user(
    conn: &mut SqliteConnection,
    email: Option<&str>,
    telegram_handle: Option<&str>,
) -> std::result::Result<UserId, StoreError> {
    if email.is_none() && telegram_handle.is_none() {
        return Err(StoreError::ConstraintViolation(
            "user needs an email or telegram handle".to_string(),
        ));
    }

    let mut existing: Option<i64> = None;
    if let Some(email) = email {
        existing = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?;
    }
    if existing.is_none()
        && let Some(handle) = telegram_handle
    {
        existing = sqlx::query_scalar("SELECT id FROM users WHERE telegram_handle = ?")
            .bind(handle)
            .fetch_optional(&mut *conn)
            .await?;
    }

    let id = if let Some(id) = existing {
        sqlx::query(
            r"
            UPDATE users SET
                email = COALESCE(email, ?),
                telegram_handle = COALESCE(telegram_handle, ?)
            WHERE id = ?
            ",
        )
        .bind(email)
        .bind(telegram_handle)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        id
    } else {
        sqlx::query("INSERT INTO users (email, telegram_handle, created_at) VALUES (?, ?, ?)")
            .bind(email)
            .bind(telegram_handle)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *conn)
            .await?
            .last_insert_rowid()
    };

    Ok(UserId::new(id))
}

async fn enable_channel(
    conn: &mut SqliteConnection,
    user_id: UserId,
    method: ChannelMethod,
) -> std::result::Result<(), StoreError> {
    sqlx::query(
        r"
        INSERT INTO notification_preferences (user_id, method, enabled)
        VALUES (?, ?, 1)
        ON CONFLICT(user_id, method) DO UPDATE SET enabled = 1
        ",
    )
    .bind(user_id.0)
    .bind(method.as_str())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_preference(
    conn: &mut SqliteConnection,
    user_id: UserId,
    request: &SearchRequest,
    extras: &PreferenceExtras,
) -> std::result::Result<PreferenceId, StoreError> {
    let result = sqlx::query(
        r"
        INSERT INTO flight_preferences
            (user_id, target_departure, return_date, departure_airport, arrival_airport,
             currency, seat_class, max_price, preferred_airline, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(user_id.0)
    .bind(request.target_departure().format(DATE_FORMAT).to_string())
    .bind(request.return_date().format(DATE_FORMAT).to_string())
    .bind(request.departure_airport())
    .bind(request.arrival_airport())
    .bind(request.currency())
    .bind(request.seat_class().as_str())
    .bind(extras.max_price)
    .bind(extras.preferred_airline.as_deref())
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(PreferenceId::new(result.last_insert_rowid()))
}

fn parse_stored_date(row: &SqliteRow, column: &str) -> std::result::Result<NaiveDate, String> {
    let value: String = row.try_get(column).map_err(|e| e.to_string())?;
    NaiveDate::parse_from_str(&value, DATE_FORMAT)
        .map_err(|e| format!("{column} '{value}': {e}"))
}

fn pending_from_row(row: &SqliteRow) -> std::result::Result<PendingPreference, String> {
    let get_text = |column: &str| row.try_get::<String, _>(column).map_err(|e| e.to_string());

    let id = PreferenceId::new(row.try_get("id").map_err(|e| e.to_string())?);
    let seat_name = get_text("seat_class")?;
    let seat_class = SeatClass::from_name(&seat_name)
        .ok_or_else(|| format!("preference {id}: unknown seat class '{seat_name}'"))?;

    let request = SearchRequest::from_parts(
        get_text("departure_airport")?,
        get_text("arrival_airport")?,
        parse_stored_date(row, "target_departure")?,
        parse_stored_date(row, "return_date")?,
        get_text("currency")?,
        seat_class,
    );

    let methods: Option<String> = row.try_get("methods").map_err(|e| e.to_string())?;
    let mut channels: Vec<ChannelMethod> = methods
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter_map(ChannelMethod::from_name)
        .collect();
    channels.sort();
    channels.dedup();

    Ok(PendingPreference {
        preference: FlightPreference {
            id,
            user_id: UserId::new(row.try_get("user_id").map_err(|e| e.to_string())?),
            request,
            max_price: row.try_get("max_price").map_err(|e| e.to_string())?,
            preferred_airline: row.try_get("preferred_airline").map_err(|e| e.to_string())?,
        },
        owner: OwnerContact {
            email: row.try_get("email").map_err(|e| e.to_string())?,
            telegram_handle: row.try_get("telegram_handle").map_err(|e| e.to_string())?,
            channels,
        },
    })
}
