// src/auth/sessions.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::token::{hash_token, new_session_token};
use crate::errors::ServerError;

pub const DEFAULT_SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7;

/// Stores the hash of a new token and returns the raw token for the cookie.
pub fn create_session(
    conn: &Connection,
    username: &str,
    now: i64,
    ttl_secs: i64,
) -> Result<String, ServerError> {
    let raw_token = new_session_token();
    let hash = hash_token(&raw_token);

    conn.execute(
        r#"
        insert into sessions (username, token_hash, created_at, expires_at)
        values (?, ?, ?, ?)
        "#,
        params![username, hash.as_slice(), now, now + ttl_secs],
    )
    .map_err(|e| ServerError::DbError(format!("create session failed: {e}")))?;

    Ok(raw_token)
}

/// Username behind a live (unexpired, unrevoked) session token.
pub fn load_session_user(
    conn: &Connection,
    raw_token: &str,
    now: i64,
) -> Result<Option<String>, ServerError> {
    let hash = hash_token(raw_token);

    conn.query_row(
        r#"
        select username
        from sessions
        where token_hash = ?
          and expires_at > ?
          and revoked_at is null
        "#,
        params![hash.as_slice(), now],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("session lookup failed: {e}")))
}

pub fn revoke_session(conn: &Connection, raw_token: &str, now: i64) -> Result<(), ServerError> {
    let hash = hash_token(raw_token);

    conn.execute(
        "update sessions set revoked_at = ? where token_hash = ? and revoked_at is null",
        params![now, hash.as_slice()],
    )
    .map_err(|e| ServerError::DbError(format!("revoke session failed: {e}")))?;

    Ok(())
}
