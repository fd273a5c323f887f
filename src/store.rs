//! SQLite-backed catalog and progress storage.
//!
//! Reference data lives in normalized tables (tools, capabilities, use cases
//! and four junction tables); progress is one row per (user, use case).

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::catalog::CatalogQuery;
use crate::domain::{
  Complexity, Difficulty, ProgressRecord, ProgressUpdate, Tool, ToolCategory, UseCase,
};
use crate::error::AppError;

/// Stores enums as their lowercase names.
macro_rules! sql_text_enum {
  ($ty:ty, $what:literal) => {
    impl ToSql for $ty {
      fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
      }
    }

    impl FromSql for $ty {
      fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        <$ty>::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown {} '{}'", $what, s).into()))
      }
    }
  };
}

sql_text_enum!(ToolCategory, "tool category");
sql_text_enum!(Complexity, "complexity");
sql_text_enum!(Difficulty, "difficulty");

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS ai_tools (
  id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  description TEXT NOT NULL,
  category TEXT NOT NULL CHECK(category IN ('language', 'framework', 'tool', 'model')),
  icon TEXT,
  complexity TEXT NOT NULL CHECK(complexity IN ('beginner', 'intermediate', 'advanced'))
);

CREATE TABLE IF NOT EXISTS ai_tool_capabilities (
  tool_id TEXT NOT NULL REFERENCES ai_tools(id) ON DELETE CASCADE,
  capability TEXT NOT NULL,
  PRIMARY KEY (tool_id, capability)
);

CREATE TABLE IF NOT EXISTS ai_use_cases (
  id TEXT PRIMARY KEY,
  title TEXT NOT NULL,
  description TEXT NOT NULL,
  difficulty TEXT NOT NULL CHECK(difficulty IN ('easy', 'medium', 'hard'))
);

CREATE TABLE IF NOT EXISTS ai_use_case_required_tools (
  use_case_id TEXT NOT NULL REFERENCES ai_use_cases(id) ON DELETE CASCADE,
  tool_id TEXT NOT NULL,
  PRIMARY KEY (use_case_id, tool_id)
);

CREATE TABLE IF NOT EXISTS ai_use_case_optional_tools (
  use_case_id TEXT NOT NULL REFERENCES ai_use_cases(id) ON DELETE CASCADE,
  tool_id TEXT NOT NULL,
  PRIMARY KEY (use_case_id, tool_id)
);

CREATE TABLE IF NOT EXISTS ai_use_case_hints (
  use_case_id TEXT NOT NULL REFERENCES ai_use_cases(id) ON DELETE CASCADE,
  hint_order INTEGER NOT NULL,
  hint_text TEXT NOT NULL,
  PRIMARY KEY (use_case_id, hint_order)
);

CREATE TABLE IF NOT EXISTS ai_use_case_solution_tools (
  use_case_id TEXT NOT NULL REFERENCES ai_use_cases(id) ON DELETE CASCADE,
  solution_order INTEGER NOT NULL,
  tool_id TEXT NOT NULL,
  PRIMARY KEY (use_case_id, tool_id)
);

CREATE TABLE IF NOT EXISTS user_progress (
  user_id TEXT NOT NULL,
  use_case_id TEXT NOT NULL,
  score INTEGER NOT NULL DEFAULT 0,
  hints_used INTEGER NOT NULL DEFAULT 0,
  completed INTEGER NOT NULL DEFAULT 0,
  last_played TEXT NOT NULL,
  PRIMARY KEY (user_id, use_case_id)
);

CREATE INDEX IF NOT EXISTS idx_user_progress_last_played ON user_progress(user_id, last_played DESC);
"#;

/// Progress persistence seam, implemented by the store and the HTTP client.
pub trait ProgressStore: Send + Sync {
  /// Upsert: score keeps the best value ever seen, everything else is replaced.
  fn save_progress(&self, update: &ProgressUpdate) -> impl std::future::Future<Output = Result<(), AppError>> + Send;

  /// Newest first.
  fn load_progress(&self, user_id: &str) -> impl std::future::Future<Output = Result<Vec<ProgressRecord>, AppError>> + Send;
}

#[derive(Clone)]
pub struct Store {
  conn: Arc<Mutex<Connection>>,
}

impl Store {
  /// Open (or create) the database file and make sure the schema exists.
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
    let conn = Connection::open(path.as_ref())?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
    Self::from_connection(conn)
  }

  pub fn open_in_memory() -> Result<Self, AppError> {
    Self::from_connection(Connection::open_in_memory()?)
  }

  fn from_connection(conn: Connection) -> Result<Self, AppError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn: Arc::new(Mutex::new(conn)) })
  }

  /// Close the connection if this is the last handle; otherwise just drop it.
  pub fn close(self) -> Result<(), AppError> {
    match Arc::try_unwrap(self.conn) {
      Ok(mutex) => mutex.into_inner().close().map_err(|(_, e)| AppError::Storage(e)),
      Err(_) => Ok(()),
    }
  }

  /// Round-trip to the database; returns the database clock.
  #[instrument(level = "debug", skip(self))]
  pub async fn ping(&self) -> Result<String, AppError> {
    let conn = self.conn.lock().await;
    let now: String = conn.query_row("SELECT datetime('now')", [], |row| row.get(0))?;
    Ok(now)
  }

  pub async fn is_empty(&self) -> Result<bool, AppError> {
    let conn = self.conn.lock().await;
    let n: i64 = conn.query_row(
      "SELECT (SELECT COUNT(*) FROM ai_tools) + (SELECT COUNT(*) FROM ai_use_cases)",
      [],
      |row| row.get(0),
    )?;
    Ok(n == 0)
  }

  /// Replace all reference data in one transaction. Progress rows are kept.
  #[instrument(level = "info", skip_all, fields(tools = tools.len(), use_cases = use_cases.len()))]
  pub async fn replace_catalog(&self, tools: &[Tool], use_cases: &[UseCase]) -> Result<(), AppError> {
    let mut conn = self.conn.lock().await;
    let tx = conn.transaction()?;
    tx.execute_batch("DELETE FROM ai_use_cases; DELETE FROM ai_tools;")?;

    for t in tools {
      tx.execute(
        "INSERT INTO ai_tools (id, name, description, category, icon, complexity) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![t.id, t.name, t.description, t.category, t.icon, t.complexity],
      )?;
      for cap in &t.capabilities {
        tx.execute(
          "INSERT OR IGNORE INTO ai_tool_capabilities (tool_id, capability) VALUES (?1, ?2)",
          params![t.id, cap],
        )?;
      }
    }

    for uc in use_cases {
      tx.execute(
        "INSERT INTO ai_use_cases (id, title, description, difficulty) VALUES (?1, ?2, ?3, ?4)",
        params![uc.id, uc.title, uc.description, uc.difficulty],
      )?;
      for tool_id in &uc.required_tools {
        tx.execute(
          "INSERT OR IGNORE INTO ai_use_case_required_tools (use_case_id, tool_id) VALUES (?1, ?2)",
          params![uc.id, tool_id],
        )?;
      }
      for tool_id in &uc.optional_tools {
        tx.execute(
          "INSERT OR IGNORE INTO ai_use_case_optional_tools (use_case_id, tool_id) VALUES (?1, ?2)",
          params![uc.id, tool_id],
        )?;
      }
      for (i, hint) in uc.hints.iter().enumerate() {
        tx.execute(
          "INSERT INTO ai_use_case_hints (use_case_id, hint_order, hint_text) VALUES (?1, ?2, ?3)",
          params![uc.id, i as i64, hint],
        )?;
      }
      for (i, tool_id) in uc.solution.iter().enumerate() {
        tx.execute(
          "INSERT OR IGNORE INTO ai_use_case_solution_tools (use_case_id, solution_order, tool_id) VALUES (?1, ?2, ?3)",
          params![uc.id, i as i64, tool_id],
        )?;
      }
    }

    tx.commit()?;
    info!(target: "aipuzzle_backend", tools = tools.len(), use_cases = use_cases.len(), "Catalog replaced");
    Ok(())
  }

  async fn save_progress_at(&self, update: &ProgressUpdate, now: DateTime<Utc>) -> Result<(), AppError> {
    let mut conn = self.conn.lock().await;
    let tx = conn.transaction()?;
    let known = tx
      .query_row(
        "SELECT 1 FROM ai_use_cases WHERE id = ?1",
        params![update.use_case_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some();
    if !known {
      return Err(AppError::NotFound(update.use_case_id.clone()));
    }

    tx.execute(
      r#"INSERT INTO user_progress (user_id, use_case_id, score, hints_used, completed, last_played)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (user_id, use_case_id) DO UPDATE SET
           score = MAX(user_progress.score, excluded.score),
           hints_used = excluded.hints_used,
           completed = excluded.completed,
           last_played = excluded.last_played"#,
      params![
        update.user_id,
        update.use_case_id,
        update.score,
        update.hints_used,
        update.completed,
        now
      ],
    )?;
    tx.commit()?;
    debug!(target: "puzzle", user = %update.user_id, use_case = %update.use_case_id, score = update.score, "Progress upserted");
    Ok(())
  }
}

fn read_string_column(conn: &Connection, sql: &str, use_case_id: &str) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt.query_map(params![use_case_id], |row| row.get(0))?;
  rows.collect()
}

fn fill_use_case_links(conn: &Connection, uc: &mut UseCase) -> rusqlite::Result<()> {
  uc.required_tools = read_string_column(
    conn,
    "SELECT tool_id FROM ai_use_case_required_tools WHERE use_case_id = ?1 ORDER BY rowid",
    &uc.id,
  )?;
  uc.optional_tools = read_string_column(
    conn,
    "SELECT tool_id FROM ai_use_case_optional_tools WHERE use_case_id = ?1 ORDER BY rowid",
    &uc.id,
  )?;
  uc.hints = read_string_column(
    conn,
    "SELECT hint_text FROM ai_use_case_hints WHERE use_case_id = ?1 ORDER BY hint_order",
    &uc.id,
  )?;
  uc.solution = read_string_column(
    conn,
    "SELECT tool_id FROM ai_use_case_solution_tools WHERE use_case_id = ?1 ORDER BY solution_order",
    &uc.id,
  )?;
  Ok(())
}

fn use_case_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UseCase> {
  Ok(UseCase {
    id: row.get(0)?,
    title: row.get(1)?,
    description: row.get(2)?,
    difficulty: row.get(3)?,
    required_tools: vec![],
    optional_tools: vec![],
    hints: vec![],
    solution: vec![],
  })
}

impl CatalogQuery for Store {
  #[instrument(level = "debug", skip(self))]
  async fn list_tools(&self) -> Result<Vec<Tool>, AppError> {
    let conn = self.conn.lock().await;
    let mut stmt = conn.prepare(
      "SELECT id, name, description, category, icon, complexity FROM ai_tools ORDER BY name",
    )?;
    let rows = stmt.query_map([], |row| {
      Ok(Tool {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        icon: row.get(4)?,
        capabilities: vec![],
        complexity: row.get(5)?,
      })
    })?;
    let mut tools = rows.collect::<rusqlite::Result<Vec<_>>>()?;

    let mut caps = conn.prepare(
      "SELECT capability FROM ai_tool_capabilities WHERE tool_id = ?1 ORDER BY rowid",
    )?;
    for t in &mut tools {
      let rows = caps.query_map(params![t.id], |row| row.get(0))?;
      t.capabilities = rows.collect::<rusqlite::Result<Vec<String>>>()?;
    }
    Ok(tools)
  }

  #[instrument(level = "debug", skip(self))]
  async fn list_use_cases(&self) -> Result<Vec<UseCase>, AppError> {
    let conn = self.conn.lock().await;
    let mut stmt = conn.prepare(
      r#"SELECT id, title, description, difficulty FROM ai_use_cases
         ORDER BY CASE difficulty WHEN 'easy' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END, title"#,
    )?;
    let rows = stmt.query_map([], use_case_row)?;
    let mut use_cases = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    for uc in &mut use_cases {
      fill_use_case_links(&conn, uc)?;
    }
    Ok(use_cases)
  }

  #[instrument(level = "debug", skip(self))]
  async fn get_use_case(&self, id: &str) -> Result<Option<UseCase>, AppError> {
    let conn = self.conn.lock().await;
    let found = conn
      .query_row(
        "SELECT id, title, description, difficulty FROM ai_use_cases WHERE id = ?1",
        params![id],
        use_case_row,
      )
      .optional()?;
    match found {
      Some(mut uc) => {
        fill_use_case_links(&conn, &mut uc)?;
        Ok(Some(uc))
      }
      None => Ok(None),
    }
  }
}

impl ProgressStore for Store {
  async fn save_progress(&self, update: &ProgressUpdate) -> Result<(), AppError> {
    self.save_progress_at(update, Utc::now()).await
  }

  #[instrument(level = "debug", skip(self))]
  async fn load_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, AppError> {
    let conn = self.conn.lock().await;
    let mut stmt = conn.prepare(
      r#"SELECT up.user_id, up.use_case_id, uc.title, up.score, up.hints_used, up.completed, up.last_played
         FROM user_progress up
         JOIN ai_use_cases uc ON up.use_case_id = uc.id
         WHERE up.user_id = ?1
         ORDER BY up.last_played DESC"#,
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
      Ok(ProgressRecord {
        user_id: row.get(0)?,
        use_case_id: row.get(1)?,
        title: row.get(2)?,
        score: row.get(3)?,
        hints_used: row.get(4)?,
        completed: row.get(5)?,
        last_played: row.get(6)?,
      })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
  }
}
