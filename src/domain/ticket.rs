use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized (uppercase) ticket key, e.g. `ABC-123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketId(String);

impl TicketId {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issue record as returned by the tracker. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub fields: Option<TicketFields>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketFields {
    #[serde(default)]
    pub issuetype: Option<IssueType>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TicketFields {
    pub fn is_empty(&self) -> bool {
        self.issuetype.is_none() && self.summary.is_none() && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueType {
    pub name: String,
}

impl Ticket {
    pub fn issue_type_name(&self) -> &str {
        self.fields
            .as_ref()
            .and_then(|fields| fields.issuetype.as_ref())
            .map(|issue_type| issue_type.name.as_str())
            .unwrap_or("")
    }

    pub fn summary(&self) -> &str {
        self.fields
            .as_ref()
            .and_then(|fields| fields.summary.as_deref())
            .unwrap_or("")
    }
}
