use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user with `thoughts` and `friends` held as plain ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub thoughts: Vec<Uuid>,
    pub friends: Vec<Uuid>,
    /// Always `friends.len()`. Not stored.
    pub friend_count: usize,
}

impl User {
    pub fn new(
        id: Uuid,
        username: String,
        email: String,
        thoughts: Vec<Uuid>,
        friends: Vec<Uuid>,
    ) -> Self {
        let friend_count = friends.len();
        Self {
            id,
            username,
            email,
            thoughts,
            friends,
            friend_count,
        }
    }
}

/// A user with its references populated: full thoughts and full friend records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub thoughts: Vec<Thought>,
    pub friends: Vec<User>,
    pub friend_count: usize,
}

impl UserDetail {
    pub fn new(user: User, thoughts: Vec<Thought>, friends: Vec<User>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            thoughts,
            friend_count: friends.len(),
            friends,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thought {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub thought_text: String,
    pub created_at: DateTime<Utc>,
    /// Author's username at the time the thought was written.
    pub username: String,
    pub user_id: Uuid,
    pub reactions: Vec<Reaction>,
}

/// Reactions live inside a thought and have no collection of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub reaction_id: Uuid,
    pub reaction_body: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}
