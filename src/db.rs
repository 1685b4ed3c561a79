// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, ErrorCode, params};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::cycle::check_state;
use crate::error::StoreError;
use crate::models::{Cycle, CyclePolicy, State, Transaction, TransactionKind};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Paycycle", "paycycle"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("paycycle.sqlite"))
}

/// Where cycles live between runs.
///
/// Each call acquires and releases its own handle on the underlying file.
pub trait StateStore {
    /// Reads whatever is stored without checking cycle invariants.
    /// `Ok(None)` means nothing has been stored yet.
    fn load_raw(&self) -> Result<Option<State>, StoreError>;

    /// Like [`StateStore::load_raw`], but a state that breaks any cycle
    /// invariant is reported as corrupt.
    fn load_state(&self) -> Result<Option<State>, StoreError> {
        match self.load_raw()? {
            Some(state) => validated(state, self.location()).map(Some),
            None => Ok(None),
        }
    }

    fn save_state(&mut self, state: &State) -> Result<(), StoreError>;

    fn location(&self) -> &Path;

    /// Saves the very first state, refusing to touch a store that already
    /// holds data (or holds data it cannot read).
    fn initialize(&mut self, state: &State) -> Result<(), StoreError> {
        if self.load_state()?.is_some() {
            return Err(StoreError::AlreadyInitialized);
        }
        self.save_state(state)
    }
}

/// Picks the backend from the file name: `*.json` is a flat JSON file,
/// anything else is SQLite.
pub fn open_store(path: &Path) -> Box<dyn StateStore> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Box::new(JsonStore::new(path))
    } else {
        Box::new(SqliteStore::new(path))
    }
}

fn validated(state: State, location: &Path) -> Result<State, StoreError> {
    let issues = check_state(&state);
    if issues.is_empty() {
        return Ok(state);
    }
    let detail = issues
        .iter()
        .map(|i| format!("{} ({})", i.code, i.detail))
        .collect::<Vec<_>>()
        .join("; ");
    warn!(store = %location.display(), issues = issues.len(), "stored state fails validation");
    Err(StoreError::corrupt(format!("{}: {}", location.display(), detail)))
}

fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        ensure_parent(&self.path)?;
        let mut conn = Connection::open(&self.path).map_err(classify)?;
        init_schema(&mut conn).map_err(classify)?;
        Ok(conn)
    }

    fn corrupt(&self, what: String) -> StoreError {
        StoreError::corrupt(format!("{}: {}", self.path.display(), what))
    }

    fn parse_date(&self, s: &str, what: &str) -> Result<NaiveDate, StoreError> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| self.corrupt(format!("invalid {} '{}'", what, s)))
    }

    fn parse_decimal(&self, s: &str, what: &str) -> Result<Decimal, StoreError> {
        s.parse::<Decimal>()
            .map_err(|_| self.corrupt(format!("invalid {} '{}'", what, s)))
    }
}

/// Damaged files and unexpected column contents are corruption, everything
/// else is an ordinary SQLite failure.
fn classify(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(f, _)
            if matches!(f.code, ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt) =>
        {
            StoreError::corrupt(e.to_string())
        }
        rusqlite::Error::InvalidColumnType(..) | rusqlite::Error::FromSqlConversionFailure(..) => {
            StoreError::corrupt(e.to_string())
        }
        _ => StoreError::Sqlite(e),
    }
}

fn init_schema(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS cycles(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        seq INTEGER NOT NULL UNIQUE,
        policy TEXT NOT NULL,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        opening_balance TEXT NOT NULL,
        closing_balance TEXT,
        status TEXT NOT NULL CHECK(status IN ('open','closed'))
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        cycle_id INTEGER NOT NULL,
        position INTEGER NOT NULL,
        date TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('income','expense')),
        amount TEXT NOT NULL, -- exact decimal text, always the magnitude
        category TEXT,
        description TEXT,
        FOREIGN KEY(cycle_id) REFERENCES cycles(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_cycle ON transactions(cycle_id, position);
    "#,
    )
}

struct CycleRow {
    id: i64,
    policy: String,
    start_date: String,
    end_date: String,
    opening_balance: String,
    closing_balance: Option<String>,
    status: String,
}

impl SqliteStore {
    fn load_transactions(&self, conn: &Connection, cycle_id: i64) -> Result<Vec<Transaction>, StoreError> {
        let mut stmt = conn
            .prepare(
                "SELECT date, kind, amount, category, description FROM transactions
                 WHERE cycle_id=?1 ORDER BY position",
            )
            .map_err(classify)?;
        let rows = stmt
            .query_map(params![cycle_id], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, Option<String>>(3)?,
                    r.get::<_, Option<String>>(4)?,
                ))
            })
            .map_err(classify)?;
        let mut out = Vec::new();
        for row in rows {
            let (d, k, a, category, description) = row.map_err(classify)?;
            let kind = k
                .parse::<TransactionKind>()
                .map_err(|e| self.corrupt(e.to_string()))?;
            out.push(Transaction {
                date: self.parse_date(&d, "transaction date")?,
                kind,
                amount: self.parse_decimal(&a, "transaction amount")?,
                category,
                description,
            });
        }
        Ok(out)
    }

    fn build_cycle(&self, row: CycleRow, transactions: Vec<Transaction>) -> Result<Cycle, StoreError> {
        let policy = row
            .policy
            .parse::<CyclePolicy>()
            .map_err(|e| self.corrupt(e.to_string()))?;
        let closing = match row.closing_balance.as_deref() {
            Some(s) => Some(self.parse_decimal(s, "closing balance")?),
            None => None,
        };
        let status_ok = match row.status.as_str() {
            "open" => closing.is_none(),
            "closed" => closing.is_some(),
            _ => false,
        };
        if !status_ok {
            return Err(self.corrupt(format!(
                "cycle {} has status '{}' with closing balance {:?}",
                row.start_date, row.status, row.closing_balance
            )));
        }
        Ok(Cycle::from_parts(
            policy,
            self.parse_date(&row.start_date, "cycle start date")?,
            self.parse_date(&row.end_date, "cycle end date")?,
            self.parse_decimal(&row.opening_balance, "opening balance")?,
            closing,
            transactions,
        ))
    }
}

impl StateStore for SqliteStore {
    fn load_raw(&self) -> Result<Option<State>, StoreError> {
        if !self.path.exists() {
            debug!(store = %self.path.display(), "no store yet");
            return Ok(None);
        }
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, policy, start_date, end_date, opening_balance, closing_balance, status
                 FROM cycles ORDER BY seq",
            )
            .map_err(classify)?;
        let rows = stmt
            .query_map([], |r| {
                Ok(CycleRow {
                    id: r.get(0)?,
                    policy: r.get(1)?,
                    start_date: r.get(2)?,
                    end_date: r.get(3)?,
                    opening_balance: r.get(4)?,
                    closing_balance: r.get(5)?,
                    status: r.get(6)?,
                })
            })
            .map_err(classify)?;
        let mut cycles = Vec::new();
        for row in rows {
            let row = row.map_err(classify)?;
            let txs = self.load_transactions(&conn, row.id)?;
            cycles.push(self.build_cycle(row, txs)?);
        }
        let Some(current) = cycles.pop() else {
            debug!(store = %self.path.display(), "store holds no cycles");
            return Ok(None);
        };
        debug!(store = %self.path.display(), history = cycles.len(), "loaded state");
        Ok(Some(State {
            current,
            history: cycles,
        }))
    }

    fn save_state(&mut self, state: &State) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM transactions", [])?;
        tx.execute("DELETE FROM cycles", [])?;
        for (seq, cycle) in state.cycles().enumerate() {
            tx.execute(
                "INSERT INTO cycles(seq, policy, start_date, end_date, opening_balance, closing_balance, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    seq as i64,
                    cycle.policy().to_string(),
                    cycle.start_date().to_string(),
                    cycle.end_date().to_string(),
                    cycle.opening_balance().to_string(),
                    cycle.closing_balance().map(|d| d.to_string()),
                    cycle.status().as_str(),
                ],
            )?;
            let cycle_id = tx.last_insert_rowid();
            for (pos, t) in cycle.transactions().iter().enumerate() {
                tx.execute(
                    "INSERT INTO transactions(cycle_id, position, date, kind, amount, category, description)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        cycle_id,
                        pos as i64,
                        t.date.to_string(),
                        t.kind.as_str(),
                        t.amount.to_string(),
                        t.category,
                        t.description,
                    ],
                )?;
            }
        }
        tx.commit()?;
        debug!(store = %self.path.display(), cycles = state.history.len() + 1, "saved state");
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// The whole state as one pretty-printed JSON document.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for JsonStore {
    fn load_raw(&self) -> Result<Option<State>, StoreError> {
        if !self.path.exists() {
            debug!(store = %self.path.display(), "no store yet");
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            debug!(store = %self.path.display(), "store file is empty");
            return Ok(None);
        }
        let state: State = serde_json::from_str(&text).map_err(|e| {
            warn!(store = %self.path.display(), error = %e, "unparseable store file");
            StoreError::corrupt(format!("{}: {}", self.path.display(), e))
        })?;
        debug!(store = %self.path.display(), history = state.history.len(), "loaded state");
        Ok(Some(state))
    }

    fn save_state(&mut self, state: &State) -> Result<(), StoreError> {
        ensure_parent(&self.path)?;
        // Write beside the target and rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(state)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(store = %self.path.display(), cycles = state.history.len() + 1, "saved state");
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
