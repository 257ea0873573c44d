use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const JOIN_CODE_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: String,
    pub last_accessed: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub join_code: String,
    #[serde(default)]
    pub members: Vec<Membership>,
}

impl Group {
    pub fn new(name: &str, owner: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            join_code: new_join_code(),
            members: vec![Membership {
                user_id: owner.to_string(),
                last_accessed: now,
            }],
        }
    }

    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    pub fn last_accessed_by(&self, user_id: &str) -> Option<DateTime<Utc>> {
        self.members
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.last_accessed)
    }

    pub fn matches_code(&self, code: &str) -> bool {
        self.join_code.eq_ignore_ascii_case(&normalize_join_code(code))
    }
}

/// Who is looking at the planner and which group they are looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSession {
    pub user_id: String,
    pub group_id: String,
}

/// Drop all whitespace and uppercase, so pasted codes like `ab12 cd34` match.
pub fn normalize_join_code(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Join codes are exactly eight ASCII letters or digits, ignoring whitespace.
pub fn is_valid_join_code(code: &str) -> bool {
    let code = normalize_join_code(code);
    code.len() == JOIN_CODE_LEN && code.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn new_join_code() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(JOIN_CODE_LEN)
        .collect::<String>()
        .to_ascii_uppercase()
}
