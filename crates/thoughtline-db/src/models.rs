//! Database row types. These map directly to SQLite rows and stay
//! distinct from the thoughtline-types models.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use thoughtline_types::models::{Reaction, Thought, User};

use crate::{DbError, DbResult};

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl UserRow {
    pub const COLUMNS: &'static str = "id, username, email";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
        })
    }

    pub fn into_user(self, thoughts: Vec<Uuid>, friends: Vec<Uuid>) -> DbResult<User> {
        Ok(User::new(
            parse_id(&self.id)?,
            self.username,
            self.email,
            thoughts,
            friends,
        ))
    }
}

pub struct ThoughtRow {
    pub id: String,
    pub thought_text: String,
    pub username: String,
    pub user_id: String,
    pub created_at: String,
}

impl ThoughtRow {
    pub const COLUMNS: &'static str = "id, thought_text, username, user_id, created_at";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            thought_text: row.get(1)?,
            username: row.get(2)?,
            user_id: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    pub fn into_thought(self, reactions: Vec<Reaction>) -> DbResult<Thought> {
        Ok(Thought {
            id: parse_id(&self.id)?,
            thought_text: self.thought_text,
            created_at: parse_timestamp(&self.created_at)?,
            username: self.username,
            user_id: parse_id(&self.user_id)?,
            reactions,
        })
    }
}

pub struct ReactionRow {
    pub reaction_id: String,
    pub thought_id: String,
    pub reaction_body: String,
    pub username: String,
    pub created_at: String,
}

impl ReactionRow {
    pub const COLUMNS: &'static str = "reaction_id, thought_id, reaction_body, username, created_at";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            reaction_id: row.get(0)?,
            thought_id: row.get(1)?,
            reaction_body: row.get(2)?,
            username: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    pub fn into_reaction(self) -> DbResult<Reaction> {
        Ok(Reaction {
            reaction_id: parse_id(&self.reaction_id)?,
            reaction_body: self.reaction_body,
            username: self.username,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

pub fn parse_id(raw: &str) -> DbResult<Uuid> {
    raw.parse()
        .map_err(|e| DbError::Corrupt(format!("id '{}': {}", raw, e)))
}

/// Timestamps are written as RFC 3339. Rows that fell back to the column
/// default hold SQLite's "YYYY-MM-DD HH:MM:SS" (UTC, no zone).
pub fn parse_timestamp(raw: &str) -> DbResult<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| DbError::Corrupt(format!("timestamp '{}': {}", raw, e)))
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
