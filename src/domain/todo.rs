use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the canonical hyphenated UUID form, the only form accepted from callers.
pub const TODO_ID_LEN: usize = 36;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TodoId(pub Uuid);

impl TodoId {
    pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for TodoId {
    fn default() -> Self { Self::new() }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0.hyphenated()) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a valid todo id")]
pub struct InvalidTodoId(pub String);

impl FromStr for TodoId {
    type Err = InvalidTodoId;

    // Only the hyphenated form; simple, braced and urn forms are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < TODO_ID_LEN {
            return Err(InvalidTodoId(s.to_string()));
        }
        match Uuid::try_parse(s) {
            Ok(uuid) if s.len() == TODO_ID_LEN => Ok(Self(uuid)),
            _ => Err(InvalidTodoId(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Todo {
    pub id: TodoId,
    pub content: String,
    pub date: DateTime<Utc>,
    pub done: bool,
}

impl Todo {
    /// A fresh, not-done record stamped with the current time at the
    /// microsecond precision every store persists.
    pub fn new(content: impl Into<String>) -> Self {
        Self { id: TodoId::new(), content: content.into(), date: Utc::now().trunc_subsecs(6), done: false }
    }
}

/// Fixed-width RFC 3339 rendering used wherever dates are persisted as text,
/// so lexical order matches chronological order.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Micros, true)
}
