// src/auth/credentials.rs
use tracing::{debug, info};

use crate::auth::token::secrets_match;
use crate::errors::ServerError;
use crate::source::{SourceError, Table, TableSource};

const USER_COLUMN: &str = "user";
const PASSWORD_COLUMN: &str = "password";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub user: String,
    pub password: String,
}

/// Rows with both a user and a password; anything else is ignored.
pub fn credentials_from(table: &Table) -> Result<Vec<Credential>, SourceError> {
    let column = |name: &str| {
        table
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SourceError::MissingColumn(name.to_string()))
    };
    let user_idx = column(USER_COLUMN)?;
    let password_idx = column(PASSWORD_COLUMN)?;

    Ok(table
        .rows
        .iter()
        .filter_map(|row| {
            let user = row.get(user_idx)?;
            let password = row.get(password_idx)?;
            (!user.is_empty() && !password.is_empty()).then(|| Credential {
                user: user.clone(),
                password: password.clone(),
            })
        })
        .collect())
}

/// Login gate backed by a `user,password` sheet, re-read on every attempt so
/// edits to the sheet apply without a restart.
pub struct CredentialStore {
    source: Box<dyn TableSource>,
}

impl CredentialStore {
    pub fn new(source: Box<dyn TableSource>) -> Self {
        Self { source }
    }

    pub fn verify(&self, username: &str, password: &str) -> Result<bool, ServerError> {
        if username.is_empty() || password.is_empty() {
            return Err(ServerError::BadRequest(
                "Please enter both username and password".into(),
            ));
        }

        let table = self.source.fetch_table()?;
        let credentials = credentials_from(&table)?;
        debug!(count = credentials.len(), "credentials fetched");

        let ok = credentials
            .iter()
            .any(|c| c.user == username && secrets_match(password, &c.password));

        info!(username, ok, "login attempt");
        Ok(ok)
    }
}
