//! Record store data model
//!
//! Datasets and groups follow the shape of a CKAN `package_show` /
//! `group_show` payload, so exported catalogue dumps load unchanged.

use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

// ============================================================================
// Record State
// ============================================================================

/// Lifecycle state of a dataset or group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    #[default]
    Active,
    Draft,
    Deleted,
}

// ============================================================================
// Dataset
// ============================================================================

/// A harvestable record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Stable identifier
    pub id: String,
    /// URL slug
    pub name: String,
    /// Title, plain or a JSON object of translations
    #[serde(default)]
    pub title: Option<String>,
    /// Description, plain or a JSON object of translations
    #[serde(default)]
    pub notes: Option<String>,
    /// Record type; only `dataset` records are listed
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub state: RecordState,
    #[serde(default)]
    pub private: bool,
    /// Id or name of the owning organization
    #[serde(default)]
    pub owner_org: Option<String>,
    /// Ids or names of additional groups
    #[serde(default)]
    pub groups: Vec<String>,
    pub metadata_created: Timestamp,
    pub metadata_modified: Timestamp,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// People and organizations with a role (`author`, `distributor`, ...)
    #[serde(default, rename = "agent")]
    pub agents: Vec<Agent>,
    #[serde(default, rename = "contact")]
    pub contacts: Vec<Agent>,
    /// Persistent identifiers (DOI, Handle, ...)
    #[serde(default)]
    pub pids: Vec<Pid>,
    /// Comma-separated language codes
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub license_title: Option<String>,
    #[serde(default)]
    pub temporal_coverage_begin: Option<String>,
    #[serde(default)]
    pub temporal_coverage_end: Option<String>,
    /// Comma-separated place names
    #[serde(default)]
    pub geographic_coverage: Option<String>,
}

fn default_kind() -> String {
    "dataset".to_string()
}

impl Dataset {
    /// Create an active, public dataset
    pub fn new(id: impl Into<String>, name: impl Into<String>, created: Timestamp) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: None,
            notes: None,
            kind: default_kind(),
            state: RecordState::Active,
            private: false,
            owner_org: None,
            groups: Vec::new(),
            metadata_created: created,
            metadata_modified: created,
            tags: Vec::new(),
            agents: Vec::new(),
            contacts: Vec::new(),
            pids: Vec::new(),
            language: None,
            license_title: None,
            temporal_coverage_begin: None,
            temporal_coverage_end: None,
            geographic_coverage: None,
        }
    }

    /// Active, public, top-level dataset
    pub fn is_harvestable(&self) -> bool {
        self.state == RecordState::Active && !self.private && self.kind == "dataset"
    }

    /// Whether the dataset is owned by or a member of the group
    pub fn belongs_to(&self, group: &Group) -> bool {
        let matches = |key: &str| key == group.id || key == group.name;
        self.owner_org.as_deref().is_some_and(matches) || self.groups.iter().any(|g| matches(g))
    }

    /// Agents with the given role
    pub fn agents_with_role<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a Agent> + 'a {
        self.agents
            .iter()
            .filter(move |a| a.role.as_deref() == Some(role))
    }
}

/// A tag attached to a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Tag {
    /// Label shown to users
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// A person or organization related to a dataset
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Agent {
    /// Create a named agent with a role
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            role: Some(role.into()),
            email: None,
        }
    }
}

/// A persistent identifier
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pid {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

// ============================================================================
// Group
// ============================================================================

/// An organization or group; exposed to harvesters as a set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: RecordState,
}

impl Group {
    /// Create an active group
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: None,
            description: None,
            state: RecordState::Active,
        }
    }

    /// Whether the group is active
    pub fn is_active(&self) -> bool {
        self.state == RecordState::Active
    }
}

// ============================================================================
// Date Range
// ============================================================================

/// Bounds on `metadata_modified` for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    /// No bound
    #[default]
    Unbounded,
    /// Strictly after the instant
    After(Timestamp),
    /// Strictly before the instant
    Before(Timestamp),
    /// Inclusive range
    Between(Timestamp, Timestamp),
}

impl DateRange {
    /// Compose a range from optional `from` / `until` bounds
    pub fn from_bounds(from: Option<Timestamp>, until: Option<Timestamp>) -> Self {
        match (from, until) {
            (None, None) => Self::Unbounded,
            (Some(from), None) => Self::After(from),
            (None, Some(until)) => Self::Before(until),
            (Some(from), Some(until)) => Self::Between(from, until),
        }
    }

    /// Check whether a timestamp falls inside the range
    pub fn contains(&self, ts: &Timestamp) -> bool {
        match self {
            Self::Unbounded => true,
            Self::After(from) => ts > from,
            Self::Before(until) => ts < until,
            Self::Between(from, until) => ts >= from && ts <= until,
        }
    }
}
