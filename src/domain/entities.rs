//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/DTO types here; adapters map wire shapes into these.

use crate::domain::{DomainError, duration_minutes};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anything a store can cache and address by id.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Server id. `None` for drafts that were never persisted.
    fn id(&self) -> Option<&str>;

    /// True when both entities carry the same server id. Drafts never match.
    fn same_id(&self, other: &Self) -> bool {
        matches!((self.id(), other.id()), (Some(a), Some(b)) if a == b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryModel {
    pub id: String,
    pub title: String,
}

impl Entity for CategoryModel {
    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantModel {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub image_url: String,
}

impl ParticipantModel {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

impl Entity for ParticipantModel {
    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParticipant {
    pub firstname: String,
    pub lastname: String,
    pub image_url: String,
}

/// A time-boxed activity. `id == None` is a draft that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventModel {
    pub id: Option<String>,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category: CategoryModel,
    pub participant: ParticipantModel,
}

impl EventModel {
    /// Build a draft event. Fails when `start > end`.
    pub fn draft(
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        category: CategoryModel,
        participant: ParticipantModel,
    ) -> Result<Self, DomainError> {
        let event = Self {
            id: None,
            title: title.into(),
            start,
            end,
            category,
            participant,
        };
        event.validate()?;
        Ok(event)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.start > self.end {
            return Err(DomainError::InvalidInput(format!(
                "event '{}' ends before it starts",
                self.title
            )));
        }
        Ok(())
    }

    pub fn duration_minutes(&self) -> i64 {
        duration_minutes(self.start, self.end)
    }
}

impl Entity for EventModel {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Visitor,
}

/// Workspace descriptor. At most one token field is populated, matching `role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantModel {
    pub role: Role,
    pub tag: String,
    pub admin_token: Option<String>,
    pub editor_token: Option<String>,
    pub visitor_token: Option<String>,
}

impl TenantModel {
    /// The credential this tenant grants (admin first, then editor, then visitor).
    pub fn token(&self) -> Option<&str> {
        self.admin_token
            .as_deref()
            .or(self.editor_token.as_deref())
            .or(self.visitor_token.as_deref())
    }
}

/// Persisted `{tag, token}` pair used to reopen a workspace across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedWorkspace {
    pub tag: String,
    pub token: String,
}
