//! SQLite Database - 数据库连接和迁移

use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;

/// 数据库配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    pub database_url: String,
    /// 最大连接数
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/melo.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            database_url: format!("sqlite:{}?mode=rwc", path.as_ref().display()),
            max_connections: 5,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

/// 数据库连接池
pub type DbPool = Pool<Sqlite>;

/// 创建数据库连接池
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    // 启用 WAL 模式，允许并发读写
    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await?;

    // 设置 busy_timeout=5000ms，遇到锁时等待而不是立即失败
    sqlx::query("PRAGMA busy_timeout=5000")
        .execute(&pool)
        .await?;

    // 设置同步模式为 NORMAL（平衡性能和安全性）
    sqlx::query("PRAGMA synchronous=NORMAL")
        .execute(&pool)
        .await?;

    tracing::info!("SQLite pool created with WAL mode and busy_timeout=5000ms");

    Ok(pool)
}

/// 运行数据库迁移
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    // 创建 music_files 表（音乐库）
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS music_files (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            filename TEXT NOT NULL UNIQUE,
            format TEXT NOT NULL,
            duration_secs INTEGER NOT NULL DEFAULT 0,
            file_size INTEGER NOT NULL,
            owner TEXT,
            file_path TEXT NOT NULL,
            uploaded_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 playback_positions 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playback_positions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner TEXT NOT NULL,
            file_id TEXT NOT NULL,
            position REAL NOT NULL DEFAULT 0.0,
            last_played_at TEXT NOT NULL,
            UNIQUE (owner, file_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 voice_commands 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS voice_commands (
            id TEXT PRIMARY KEY,
            command TEXT NOT NULL,
            action TEXT NOT NULL,
            owner TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            UNIQUE (command, owner)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建索引
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_music_files_uploaded_at
        ON music_files(uploaded_at)
        "#,
    )
    .execute(pool)
    .await?;

    // 索引: playback_positions.owner (用于会话清理)
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_playback_positions_owner
        ON playback_positions(owner)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed");
    Ok(())
}
