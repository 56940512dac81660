//! SQLite-backed store for turns and profiles.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use time::OffsetDateTime;

use crate::identity::Identity;
use crate::observability;
use crate::store::{ProfileStore, StoredTurn, TurnStore};
use crate::types::{PlayerProfile, Turn, TurnRole, UserGame};
use crate::{Error, Result};

// collects migrations from the ./migrations folder at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// A [`TurnStore`] and [`ProfileStore`] backed by a local SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `path` and runs
    /// migrations.
    pub async fn connect(path: &str) -> Result<Self> {
        let connection_str = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite://{path}")
        };

        let options = SqliteConnectOptions::from_str(&connection_str)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| Error::database(format!("migration failed: {e}"), Some(Box::new(e))))?;

        Ok(Self { pool })
    }
}

fn timestamp_from_row(secs: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(secs)
        .map_err(|e| Error::database(format!("invalid stored timestamp {secs}: {e}"), None))
}

#[async_trait]
impl TurnStore for SqliteStore {
    async fn recent(&self, identity: Identity, limit: u32) -> Result<Vec<StoredTurn>> {
        observability::STORE_READS.click();
        let rows = sqlx::query(
            "SELECT role, content, created_at FROM chat_messages \
             WHERE user_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2",
        )
        .bind(identity.user_id().to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in rows {
            let role: String = row.try_get("role")?;
            let content: String = row.try_get("content")?;
            let created_at: i64 = row.try_get("created_at")?;
            turns.push(StoredTurn {
                role: role.parse::<TurnRole>()?,
                content,
                created_at: timestamp_from_row(created_at)?,
            });
        }
        // The query walks newest-first to apply the cap; callers want
        // ascending creation order.
        turns.reverse();
        Ok(turns)
    }

    async fn insert(&self, identity: Identity, turn: &Turn) -> Result<()> {
        observability::STORE_WRITES.click();
        sqlx::query(
            "INSERT INTO chat_messages (user_id, role, content, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(identity.user_id().to_string())
        .bind(turn.role.as_str())
        .bind(&turn.content)
        .bind(OffsetDateTime::now_utc().unix_timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    async fn profile(&self, identity: Identity) -> Result<Option<PlayerProfile>> {
        observability::STORE_READS.click();
        let row = sqlx::query(
            "SELECT username, bio, region, playstyle, main_role, setup_completed \
             FROM profiles WHERE user_id = ?1",
        )
        .bind(identity.user_id().to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let setup_completed: i64 = row.try_get("setup_completed")?;
        Ok(Some(PlayerProfile {
            username: row.try_get("username")?,
            bio: row.try_get("bio")?,
            region: row.try_get("region")?,
            playstyle: row.try_get("playstyle")?,
            main_role: row.try_get("main_role")?,
            setup_completed: setup_completed != 0,
        }))
    }

    async fn upsert_profile(&self, identity: Identity, profile: &PlayerProfile) -> Result<()> {
        observability::STORE_WRITES.click();
        sqlx::query(
            "INSERT INTO profiles (user_id, username, bio, region, playstyle, main_role, setup_completed) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT(user_id) DO UPDATE SET \
             username = excluded.username, bio = excluded.bio, region = excluded.region, \
             playstyle = excluded.playstyle, main_role = excluded.main_role, \
             setup_completed = excluded.setup_completed",
        )
        .bind(identity.user_id().to_string())
        .bind(&profile.username)
        .bind(&profile.bio)
        .bind(&profile.region)
        .bind(&profile.playstyle)
        .bind(&profile.main_role)
        .bind(i64::from(profile.setup_completed))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn games(&self, identity: Identity) -> Result<Vec<UserGame>> {
        observability::STORE_READS.click();
        let rows = sqlx::query(
            "SELECT game_name, rank, hours_played FROM user_games \
             WHERE user_id = ?1 ORDER BY id",
        )
        .bind(identity.user_id().to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut games = Vec::with_capacity(rows.len());
        for row in rows {
            let hours: i64 = row.try_get("hours_played")?;
            games.push(UserGame {
                game_name: row.try_get("game_name")?,
                rank: row.try_get("rank")?,
                hours_played: hours.max(0) as u32,
            });
        }
        Ok(games)
    }

    async fn add_game(&self, identity: Identity, game: &UserGame) -> Result<()> {
        observability::STORE_WRITES.click();
        sqlx::query(
            "INSERT INTO user_games (user_id, game_name, rank, hours_played) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(identity.user_id().to_string())
        .bind(&game.game_name)
        .bind(&game.rank)
        .bind(i64::from(game.hours_played))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_game(&self, identity: Identity, game_name: &str) -> Result<()> {
        observability::STORE_WRITES.click();
        sqlx::query("DELETE FROM user_games WHERE user_id = ?1 AND game_name = ?2")
            .bind(identity.user_id().to_string())
            .bind(game_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
