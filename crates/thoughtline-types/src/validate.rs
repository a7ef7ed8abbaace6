//! Field constraints for users, thoughts and reactions.
//!
//! Raw request payloads are turned into the `New*` / `*Changes` structs below;
//! the persistence layer only accepts those, so every stored value has passed
//! through here.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

pub const MAX_THOUGHT_LEN: usize = 280;
pub const MAX_REACTION_LEN: usize = 280;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+@.+\..+").expect("email pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// Trimmed, non-empty username.
pub fn username(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required("username"));
    }
    Ok(trimmed.to_string())
}

pub fn email(raw: &str) -> Result<String, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::Required("email"));
    }
    if !EMAIL_RE.is_match(raw) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(raw.to_string())
}

/// Trimmed text of 1 to 280 characters.
pub fn thought_text(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required("thoughtText"));
    }
    if trimmed.chars().count() > MAX_THOUGHT_LEN {
        return Err(ValidationError::TooLong {
            field: "thoughtText",
            max: MAX_THOUGHT_LEN,
        });
    }
    Ok(trimmed.to_string())
}

pub fn reaction_body(raw: &str) -> Result<String, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::Required("reactionBody"));
    }
    if raw.chars().count() > MAX_REACTION_LEN {
        return Err(ValidationError::TooLong {
            field: "reactionBody",
            max: MAX_REACTION_LEN,
        });
    }
    Ok(raw.to_string())
}

fn author(raw: &str) -> Result<String, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::Required("username"));
    }
    Ok(raw.to_string())
}

fn present<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ValidationError> {
    value.ok_or(ValidationError::Required(field))
}

// -- Users --

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

impl NewUser {
    pub fn new(username: Option<&str>, email: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Self {
            username: self::username(present(username, "username")?)?,
            email: self::email(present(email, "email")?)?,
        })
    }
}

/// Partial user update. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    pub fn new(username: Option<&str>, email: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Self {
            username: username.map(self::username).transpose()?,
            email: email.map(self::email).transpose()?,
        })
    }
}

// -- Thoughts --

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewThought {
    pub user_id: Uuid,
    pub thought_text: String,
    pub username: String,
}

impl NewThought {
    pub fn new(user_id: Uuid, thought_text: &str, username: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            user_id,
            thought_text: self::thought_text(thought_text)?,
            username: author(username)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThoughtChanges {
    pub thought_text: Option<String>,
    pub username: Option<String>,
}

impl ThoughtChanges {
    pub fn new(thought_text: Option<&str>, username: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Self {
            thought_text: thought_text.map(self::thought_text).transpose()?,
            username: username.map(author).transpose()?,
        })
    }
}

// -- Reactions --

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReaction {
    pub reaction_body: String,
    pub username: String,
}

impl NewReaction {
    pub fn new(reaction_body: Option<&str>, username: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Self {
            reaction_body: self::reaction_body(present(reaction_body, "reactionBody")?)?,
            username: author(present(username, "username")?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_trimmed() {
        assert_eq!(username("  ann ").unwrap(), "ann");
        assert_eq!(username("   "), Err(ValidationError::Required("username")));
    }

    #[test]
    fn email_must_look_like_an_address() {
        assert!(email("ann@example.com").is_ok());
        assert_eq!(email("ann@example"), Err(ValidationError::InvalidEmail));
        assert_eq!(email("not-an-email"), Err(ValidationError::InvalidEmail));
        assert_eq!(email(""), Err(ValidationError::Required("email")));
    }

    #[test]
    fn thought_text_bounds() {
        assert_eq!(thought_text("  hi  ").unwrap(), "hi");
        assert!(thought_text(" ").is_err());

        let max = "x".repeat(MAX_THOUGHT_LEN);
        assert!(thought_text(&max).is_ok());

        let over = "x".repeat(MAX_THOUGHT_LEN + 1);
        assert_eq!(
            thought_text(&over),
            Err(ValidationError::TooLong { field: "thoughtText", max: MAX_THOUGHT_LEN })
        );
    }

    #[test]
    fn thought_text_counts_characters_not_bytes() {
        let accented = "é".repeat(MAX_THOUGHT_LEN);
        assert!(thought_text(&accented).is_ok());
    }

    #[test]
    fn new_user_requires_both_fields() {
        assert_eq!(
            NewUser::new(None, Some("a@b.co")),
            Err(ValidationError::Required("username"))
        );
        assert_eq!(
            NewUser::new(Some("ann"), None),
            Err(ValidationError::Required("email"))
        );
        let user = NewUser::new(Some(" ann "), Some("a@b.co")).unwrap();
        assert_eq!(user.username, "ann");
    }

    #[test]
    fn changes_only_validate_supplied_fields() {
        let changes = UserChanges::new(None, Some("new@b.co")).unwrap();
        assert_eq!(changes.username, None);
        assert_eq!(changes.email.as_deref(), Some("new@b.co"));

        assert!(UserChanges::new(None, Some("bad")).is_err());
        assert!(ThoughtChanges::new(Some(""), None).is_err());
    }

    #[test]
    fn reaction_body_limit() {
        assert!(NewReaction::new(Some("nice"), Some("bob")).is_ok());
        assert_eq!(
            NewReaction::new(None, Some("bob")),
            Err(ValidationError::Required("reactionBody"))
        );
        let over = "x".repeat(MAX_REACTION_LEN + 1);
        assert!(NewReaction::new(Some(over.as_str()), Some("bob")).is_err());
    }
}
