//! Access gate: user accounts, credential check and catalog handoff.
//!
//! Accounts live in their own SQLite file (`usuarios`). A successful login
//! produces a fresh 32-character hex token and hands the terminal over to
//! the catalog process with `<username> <token>`. The handoff is
//! fire-and-forget: the catalog is not awaited and reports nothing back.
//!
//! The catalog only checks the token's length. Nothing verifies its value
//! against this store.

use anyhow::Result;
use regex::Regex;
use sha2::{Digest, Sha256};
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Connection, Row};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::config::CONFIG_ENV;
use crate::db;
use crate::error::GateError;
use crate::migrate;
use crate::models::UserAccount;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Name of the catalog executable looked up next to the gate binary.
pub const CATALOG_BIN_NAME: &str = "ecu-catalog";

/// Input for [`Gate::register`]. Fields are trimmed before validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub login: String,
    pub password: String,
}

pub struct Gate {
    options: SqliteConnectOptions,
}

impl Gate {
    pub async fn open(path: &Path) -> Result<Self> {
        let options = db::connect_options(path)?;
        migrate::migrate_users(&options).await?;
        Ok(Self { options })
    }

    /// Create an account. Returns the new account id.
    pub async fn register(&self, reg: &Registration) -> Result<i64, GateError> {
        let name = reg.name.trim();
        let email = reg.email.trim();
        let login = reg.login.trim();
        let password = reg.password.trim();
        let address = reg
            .address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty());

        if name.is_empty() || email.is_empty() || login.is_empty() || password.is_empty() {
            return Err(GateError::Validation(
                "name, email, login and password are required".to_string(),
            ));
        }
        if !is_valid_email(email) {
            return Err(GateError::Validation(format!("invalid email: {}", email)));
        }

        let mut conn = db::open(&self.options).await?;
        let result = sqlx::query(
            "INSERT INTO usuarios (nome, email, endereco, usuario, senha_hash) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(address)
        .bind(login)
        .bind(hash_password(password))
        .execute(&mut conn)
        .await;
        conn.close().await?;

        match result {
            Ok(done) => {
                tracing::info!(login, "account registered");
                Ok(done.last_insert_rowid())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(GateError::DuplicateAccount)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check a login/password pair and return the matching account.
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<UserAccount, GateError> {
        let login = login.trim();
        let password = password.trim();
        if login.is_empty() || password.is_empty() {
            return Err(GateError::Validation(
                "login and password are required".to_string(),
            ));
        }

        let mut conn = db::open(&self.options).await?;
        let row = sqlx::query(
            "SELECT id, nome, email, endereco, usuario, senha_hash FROM usuarios \
             WHERE usuario = ? AND senha_hash = ?",
        )
        .bind(login)
        .bind(hash_password(password))
        .fetch_optional(&mut conn)
        .await;
        conn.close().await?;

        match row? {
            Some(row) => Ok(row_to_account(&row)),
            None => {
                tracing::warn!(login, "rejected login");
                Err(GateError::InvalidCredentials)
            }
        }
    }
}

fn row_to_account(row: &SqliteRow) -> UserAccount {
    UserAccount {
        id: row.get("id"),
        name: row.get("nome"),
        email: row.get("email"),
        address: row.get("endereco"),
        login: row.get("usuario"),
        password_hash: row.get("senha_hash"),
    }
}

/// Lowercase hex SHA-256 of the password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// A single-use handoff token: 32 lowercase hex characters.
pub fn issue_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// `ecu-catalog` in the same directory as the running executable.
pub fn default_catalog_bin() -> std::io::Result<PathBuf> {
    let mut path = std::env::current_exe()?;
    path.set_file_name(format!("{}{}", CATALOG_BIN_NAME, std::env::consts::EXE_SUFFIX));
    Ok(path)
}

/// Hand the session over to the catalog as `<username> <token>`.
///
/// The catalog takes over the gate's stdin, stdout and stderr and is never
/// awaited. On Unix the gate process is replaced by the catalog, so this
/// only returns on failure. Elsewhere the catalog is spawned and left
/// running. `config` is forwarded through [`CONFIG_ENV`] so the catalog
/// opens the same database the gate was configured with.
pub fn launch_catalog(
    bin: &Path,
    username: &str,
    token: &str,
    config: Option<&Path>,
) -> Result<(), GateError> {
    let mut cmd = Command::new(bin);
    cmd.arg(username).arg(token);
    if let Some(path) = config {
        cmd.env(CONFIG_ENV, path);
    }

    tracing::info!(bin = %bin.display(), "launching catalog");
    hand_over(cmd)
}

#[cfg(unix)]
fn hand_over(mut cmd: Command) -> Result<(), GateError> {
    use std::os::unix::process::CommandExt;
    Err(GateError::Spawn(cmd.exec()))
}

#[cfg(not(unix))]
fn hand_over(mut cmd: Command) -> Result<(), GateError> {
    let child = cmd.spawn()?;
    tracing::info!(pid = child.id(), "catalog launched");
    Ok(())
}
