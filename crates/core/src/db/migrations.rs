use rusqlite::Connection;

use crate::{Error, Result};

const SCHEMA_VERSION: i32 = 4;

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    ensure_migration_table(conn)?;

    let current_version = get_schema_version(conn)?;

    if current_version > SCHEMA_VERSION {
        return Err(Error::Internal(format!(
            "Database schema version ({}) is newer than supported version ({}). Please update the \
             server.",
            current_version, SCHEMA_VERSION
        )));
    }

    for version in (current_version + 1)..=SCHEMA_VERSION {
        apply_migration(conn, version).map_err(|e| {
            Error::Internal(format!("Failed to apply migration {}: {}", version, e))
        })?;
        tracing::info!(version, "Applied schema migration");
    }

    Ok(())
}

fn ensure_migration_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migration (
            id INTEGER PRIMARY KEY
        )",
        [],
    )?;
    Ok(())
}

fn get_schema_version(conn: &Connection) -> Result<i32> {
    let version = conn.query_row("SELECT COALESCE(MAX(id), 0) FROM migration", [], |row| {
        row.get(0)
    })?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("INSERT INTO migration (id) VALUES (?1)", [version])?;
    Ok(())
}

fn apply_migration(conn: &mut Connection, version: i32) -> Result<()> {
    let tx = conn.transaction()?;

    match version {
        1 => migration_v1(&tx)?,
        2 => migration_v2(&tx)?,
        3 => migration_v3(&tx)?,
        4 => migration_v4(&tx)?,
        _ => {
            return Err(Error::Internal(format!(
                "Unknown migration version: {}",
                version
            )));
        }
    }

    set_schema_version(&tx, version)?;
    tx.commit()?;

    Ok(())
}

fn migration_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE users(
            user_id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn migration_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE gameplay_summary(
            user_id TEXT PRIMARY KEY,
            total_games_completed INTEGER NOT NULL DEFAULT 0,
            total_score INTEGER NOT NULL DEFAULT 0,
            best_score INTEGER NOT NULL DEFAULT 0,
            total_workout_time_seconds INTEGER NOT NULL DEFAULT 0,
            fastest_completion_seconds INTEGER,
            sessions_played INTEGER NOT NULL DEFAULT 0,
            last_played_at TEXT,
            last_workout_completed_at TEXT,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(user_id)
        );

        CREATE TABLE game_stats(
            user_id TEXT NOT NULL,
            game_id TEXT NOT NULL,
            game_name TEXT NOT NULL,
            score_unit TEXT NOT NULL,
            times_played INTEGER NOT NULL,
            total_score INTEGER NOT NULL,
            best_score INTEGER NOT NULL,
            average_score REAL NOT NULL,
            total_time_seconds INTEGER NOT NULL,
            best_time_seconds INTEGER NOT NULL,
            last_score INTEGER NOT NULL,
            last_duration_seconds INTEGER NOT NULL,
            last_played_at TEXT NOT NULL,
            PRIMARY KEY (user_id, game_id),
            FOREIGN KEY (user_id) REFERENCES users(user_id)
        );
        "#,
    )?;
    Ok(())
}

fn migration_v3(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE game_progress_events(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT NOT NULL UNIQUE,
            user_id TEXT NOT NULL,
            game_id TEXT NOT NULL,
            game_name TEXT NOT NULL,
            score INTEGER NOT NULL CHECK(score >= 0),
            score_unit TEXT NOT NULL,
            duration_seconds INTEGER NOT NULL CHECK(duration_seconds > 0),
            started_at TEXT NOT NULL,
            completed_at TEXT NOT NULL,
            session_id TEXT,
            stage INTEGER NOT NULL CHECK(stage > 0),
            total_stages INTEGER NOT NULL CHECK(total_stages >= stage),
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_events_user_completed
            ON game_progress_events(user_id, completed_at, id);
        "#,
    )?;
    Ok(())
}

fn migration_v4(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE goal_settings(
            user_id TEXT NOT NULL,
            period TEXT NOT NULL CHECK(period IN ('week', 'month', 'year')),
            days INTEGER NOT NULL CHECK(days > 0),
            times_per_day INTEGER NOT NULL CHECK(times_per_day BETWEEN 1 AND 10),
            updated_at TEXT NOT NULL,
            PRIMARY KEY (user_id, period),
            FOREIGN KEY (user_id) REFERENCES users(user_id)
        );
        "#,
    )?;
    Ok(())
}
