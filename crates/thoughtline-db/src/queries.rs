use std::collections::HashMap;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;
use uuid::Uuid;

use thoughtline_types::models::{Reaction, Thought, User, UserDetail};
use thoughtline_types::validate::{NewReaction, NewThought, NewUser, ThoughtChanges, UserChanges};

use crate::models::{ReactionRow, ThoughtRow, UserRow, format_timestamp, parse_id};
use crate::{Database, DbError, DbResult};

impl Database {
    // -- Users --

    /// All users, oldest first, with thoughts and friends populated.
    pub fn list_users(&self) -> DbResult<Vec<UserDetail>> {
        self.with_conn(|conn| {
            let users = query_all_users(conn)?;
            let thoughts = query_all_thoughts(conn)?;

            let thoughts_by_id: HashMap<Uuid, &Thought> =
                thoughts.iter().map(|t| (t.id, t)).collect();
            let users_by_id: HashMap<Uuid, &User> = users.iter().map(|u| (u.id, u)).collect();

            Ok(users
                .iter()
                .map(|u| populate(u, &thoughts_by_id, &users_by_id))
                .collect())
        })
    }

    pub fn get_user(&self, id: Uuid) -> DbResult<UserDetail> {
        self.with_conn(|conn| {
            let user = query_user(conn, &id.to_string())?.ok_or(DbError::NotFound("user"))?;

            // References that no longer resolve are skipped, like a populate step would.
            let mut thoughts = Vec::with_capacity(user.thoughts.len());
            for thought_id in &user.thoughts {
                if let Some(thought) = query_thought(conn, &thought_id.to_string())? {
                    thoughts.push(thought);
                }
            }

            let mut friends = Vec::with_capacity(user.friends.len());
            for friend_id in &user.friends {
                if let Some(friend) = query_user(conn, &friend_id.to_string())? {
                    friends.push(friend);
                }
            }

            Ok(UserDetail::new(user, thoughts, friends))
        })
    }

    pub fn create_user(&self, new: &NewUser) -> DbResult<User> {
        let id = Uuid::new_v4().to_string();

        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO users (id, username, email, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, new.username, new.email, format_timestamp(&Utc::now())],
            )?;
            query_user(tx, &id)?.ok_or(DbError::NotFound("user"))
        })
    }

    pub fn update_user(&self, id: Uuid, changes: &UserChanges) -> DbResult<User> {
        let key = id.to_string();

        self.with_tx(|tx| {
            if let Some(username) = &changes.username {
                tx.execute(
                    "UPDATE users SET username = ?1 WHERE id = ?2",
                    params![username, key],
                )?;
            }
            if let Some(email) = &changes.email {
                tx.execute("UPDATE users SET email = ?1 WHERE id = ?2", params![email, key])?;
            }
            query_user(tx, &key)?.ok_or(DbError::NotFound("user"))
        })
    }

    /// Deletes the user and every thought written under its username or id.
    /// Returns how many thoughts went with it.
    pub fn delete_user(&self, id: Uuid) -> DbResult<usize> {
        let key = id.to_string();

        self.with_tx(|tx| {
            let username: String = tx
                .query_row("SELECT username FROM users WHERE id = ?1", [&key], |r| r.get(0))
                .optional()?
                .ok_or(DbError::NotFound("user"))?;

            let removed = tx.execute(
                "DELETE FROM thoughts WHERE username = ?1 OR user_id = ?2",
                params![username, key],
            )?;
            tx.execute("DELETE FROM users WHERE id = ?1", [&key])?;

            debug!("Deleted user {} ({}) and {} thoughts", key, username, removed);
            Ok(removed)
        })
    }

    // -- Friends --

    /// Adds `friend_id` to the user's friends. Adding an existing friend is a no-op.
    pub fn add_friend(&self, user_id: Uuid, friend_id: Uuid) -> DbResult<User> {
        let key = user_id.to_string();
        let friend_key = friend_id.to_string();

        self.with_tx(|tx| {
            if !row_exists(tx, "SELECT 1 FROM users WHERE id = ?1", &key)? {
                return Err(DbError::NotFound("user"));
            }
            if !row_exists(tx, "SELECT 1 FROM users WHERE id = ?1", &friend_key)? {
                return Err(DbError::NotFound("friend"));
            }

            tx.execute(
                "INSERT OR IGNORE INTO user_friends (user_id, friend_id) VALUES (?1, ?2)",
                params![key, friend_key],
            )?;
            query_user(tx, &key)?.ok_or(DbError::NotFound("user"))
        })
    }

    /// Removes `friend_id` from the user's friends. Removing an absent friend is a no-op.
    pub fn remove_friend(&self, user_id: Uuid, friend_id: Uuid) -> DbResult<User> {
        let key = user_id.to_string();

        self.with_tx(|tx| {
            if !row_exists(tx, "SELECT 1 FROM users WHERE id = ?1", &key)? {
                return Err(DbError::NotFound("user"));
            }

            tx.execute(
                "DELETE FROM user_friends WHERE user_id = ?1 AND friend_id = ?2",
                params![key, friend_id.to_string()],
            )?;
            query_user(tx, &key)?.ok_or(DbError::NotFound("user"))
        })
    }

    // -- Thoughts --

    pub fn list_thoughts(&self) -> DbResult<Vec<Thought>> {
        self.with_conn(query_all_thoughts)
    }

    pub fn get_thought(&self, id: Uuid) -> DbResult<Thought> {
        self.with_conn(|conn| {
            query_thought(conn, &id.to_string())?.ok_or(DbError::NotFound("thought"))
        })
    }

    /// Inserts the thought and appends it to its owner's thought list in one
    /// transaction. Fails with `NotFound("user")` and writes nothing if the
    /// owner does not exist.
    pub fn create_thought(&self, new: &NewThought) -> DbResult<Thought> {
        let id = Uuid::new_v4().to_string();
        let owner = new.user_id.to_string();

        self.with_tx(|tx| {
            if !row_exists(tx, "SELECT 1 FROM users WHERE id = ?1", &owner)? {
                return Err(DbError::NotFound("user"));
            }

            tx.execute(
                "INSERT INTO thoughts (id, thought_text, username, user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id,
                    new.thought_text,
                    new.username,
                    owner,
                    format_timestamp(&Utc::now())
                ],
            )?;
            tx.execute(
                "INSERT INTO user_thoughts (user_id, thought_id) VALUES (?1, ?2)",
                params![owner, id],
            )?;

            query_thought(tx, &id)?.ok_or(DbError::NotFound("thought"))
        })
    }

    pub fn update_thought(&self, id: Uuid, changes: &ThoughtChanges) -> DbResult<Thought> {
        let key = id.to_string();

        self.with_tx(|tx| {
            if let Some(text) = &changes.thought_text {
                tx.execute(
                    "UPDATE thoughts SET thought_text = ?1 WHERE id = ?2",
                    params![text, key],
                )?;
            }
            if let Some(username) = &changes.username {
                tx.execute(
                    "UPDATE thoughts SET username = ?1 WHERE id = ?2",
                    params![username, key],
                )?;
            }
            query_thought(tx, &key)?.ok_or(DbError::NotFound("thought"))
        })
    }

    /// Deletes a thought. Its reactions and its entry in the owner's list cascade.
    pub fn delete_thought(&self, id: Uuid) -> DbResult<()> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM thoughts WHERE id = ?1", [id.to_string()])?;
            if removed == 0 {
                return Err(DbError::NotFound("thought"));
            }
            Ok(())
        })
    }

    // -- Reactions --

    /// Adds a reaction with a fresh id. A reaction with the same body and
    /// author as an existing one is not added again.
    pub fn add_reaction(&self, thought_id: Uuid, new: &NewReaction) -> DbResult<Thought> {
        let key = thought_id.to_string();
        let reaction_id = Uuid::new_v4().to_string();

        self.with_tx(|tx| {
            if !row_exists(tx, "SELECT 1 FROM thoughts WHERE id = ?1", &key)? {
                return Err(DbError::NotFound("thought"));
            }

            let inserted = tx.execute(
                "INSERT OR IGNORE INTO reactions (reaction_id, thought_id, reaction_body, username, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    reaction_id,
                    key,
                    new.reaction_body,
                    new.username,
                    format_timestamp(&Utc::now())
                ],
            )?;
            if inserted == 0 {
                debug!("Duplicate reaction on thought {} ignored", key);
            }

            query_thought(tx, &key)?.ok_or(DbError::NotFound("thought"))
        })
    }

    /// Removes every reaction on the thought with the given id. An unknown
    /// reaction id leaves the thought unchanged.
    pub fn remove_reaction(&self, thought_id: Uuid, reaction_id: &str) -> DbResult<Thought> {
        let key = thought_id.to_string();

        self.with_tx(|tx| {
            if !row_exists(tx, "SELECT 1 FROM thoughts WHERE id = ?1", &key)? {
                return Err(DbError::NotFound("thought"));
            }

            tx.execute(
                "DELETE FROM reactions WHERE thought_id = ?1 AND reaction_id = ?2",
                params![key, reaction_id],
            )?;
            query_thought(tx, &key)?.ok_or(DbError::NotFound("thought"))
        })
    }
}

fn populate(
    user: &User,
    thoughts: &HashMap<Uuid, &Thought>,
    users: &HashMap<Uuid, &User>,
) -> UserDetail {
    let populated_thoughts = user
        .thoughts
        .iter()
        .filter_map(|id| thoughts.get(id).map(|t| (*t).clone()))
        .collect();
    let populated_friends = user
        .friends
        .iter()
        .filter_map(|id| users.get(id).map(|u| (*u).clone()))
        .collect();

    UserDetail::new(user.clone(), populated_thoughts, populated_friends)
}

fn row_exists(conn: &Connection, sql: &str, id: &str) -> DbResult<bool> {
    Ok(conn.query_row(sql, [id], |_| Ok(())).optional()?.is_some())
}

fn query_user(conn: &Connection, id: &str) -> DbResult<Option<User>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", UserRow::COLUMNS),
            [id],
            UserRow::from_row,
        )
        .optional()?;

    let Some(row) = row else {
        return Ok(None);
    };

    let thoughts = query_ids(
        conn,
        "SELECT thought_id FROM user_thoughts WHERE user_id = ?1 ORDER BY seq",
        id,
    )?;
    let friends = query_ids(
        conn,
        "SELECT friend_id FROM user_friends WHERE user_id = ?1 ORDER BY seq",
        id,
    )?;

    row.into_user(thoughts, friends).map(Some)
}

fn query_all_users(conn: &Connection) -> DbResult<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users ORDER BY rowid",
        UserRow::COLUMNS
    ))?;
    let rows = stmt
        .query_map([], UserRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    // Batch-fetch both link tables instead of two queries per user.
    let mut thoughts = query_links(
        conn,
        "SELECT user_id, thought_id FROM user_thoughts ORDER BY seq",
    )?;
    let mut friends = query_links(
        conn,
        "SELECT user_id, friend_id FROM user_friends ORDER BY seq",
    )?;

    rows.into_iter()
        .map(|row| {
            let t = thoughts.remove(&row.id).unwrap_or_default();
            let f = friends.remove(&row.id).unwrap_or_default();
            row.into_user(t, f)
        })
        .collect()
}

fn query_ids(conn: &Connection, sql: &str, owner: &str) -> DbResult<Vec<Uuid>> {
    let mut stmt = conn.prepare(sql)?;
    let raw = stmt
        .query_map([owner], |r| r.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    raw.iter().map(|id| parse_id(id)).collect()
}

/// Reads `(owner, target)` pairs into owner -> ordered targets.
fn query_links(conn: &Connection, sql: &str) -> DbResult<HashMap<String, Vec<Uuid>>> {
    let mut stmt = conn.prepare(sql)?;
    let pairs = stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut links: HashMap<String, Vec<Uuid>> = HashMap::new();
    for (owner, target) in pairs {
        links.entry(owner).or_default().push(parse_id(&target)?);
    }
    Ok(links)
}

fn query_thought(conn: &Connection, id: &str) -> DbResult<Option<Thought>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM thoughts WHERE id = ?1", ThoughtRow::COLUMNS),
            [id],
            ThoughtRow::from_row,
        )
        .optional()?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM reactions WHERE thought_id = ?1 ORDER BY seq",
        ReactionRow::COLUMNS
    ))?;
    let reactions = stmt
        .query_map([id], ReactionRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?
        .into_iter()
        .map(ReactionRow::into_reaction)
        .collect::<DbResult<Vec<_>>>()?;

    row.into_thought(reactions).map(Some)
}

fn query_all_thoughts(conn: &Connection) -> DbResult<Vec<Thought>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM thoughts ORDER BY rowid",
        ThoughtRow::COLUMNS
    ))?;
    let rows = stmt
        .query_map([], ThoughtRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    // Group all reactions by thought in one pass (avoids N+1)
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM reactions ORDER BY seq",
        ReactionRow::COLUMNS
    ))?;
    let reaction_rows = stmt
        .query_map([], ReactionRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut reactions: HashMap<String, Vec<Reaction>> = HashMap::new();
    for r in reaction_rows {
        let thought_id = r.thought_id.clone();
        reactions.entry(thought_id).or_default().push(r.into_reaction()?);
    }

    rows.into_iter()
        .map(|row| {
            let r = reactions.remove(&row.id).unwrap_or_default();
            row.into_thought(r)
        })
        .collect()
}
