//! Wire DTOs for the remote API (camelCase JSON) and their mapping to domain entities.

use crate::domain::{
    CategoryModel, EventModel, NewCategory, NewParticipant, ParticipantModel, Role, TenantModel,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CategoryReadDto {
    pub id: String,
    pub title: String,
}

/// Body of both `POST /categories/` and `PATCH /categories/{id}`.
#[derive(Debug, Serialize)]
pub struct CategoryWriteDto<'a> {
    pub title: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantReadDto {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantWriteDto<'a> {
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub image_url: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct EventReadDto {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category: CategoryReadDto,
    pub participant: ParticipantReadDto,
}

/// Body of both `POST /events` and `PATCH /events/{id}`. Timestamps are RFC 3339.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWriteDto<'a> {
    pub title: &'a str,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category_id: &'a str,
    pub participant_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantReadDto {
    pub role: Role,
    /// Older backends omit the tag; those workspaces are shown as "Home".
    #[serde(default = "default_tag")]
    pub tag: String,
    pub admin_token: Option<String>,
    pub editor_token: Option<String>,
    pub visitor_token: Option<String>,
}

fn default_tag() -> String {
    "Home".to_string()
}

impl From<CategoryReadDto> for CategoryModel {
    fn from(dto: CategoryReadDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
        }
    }
}

impl<'a> From<&'a NewCategory> for CategoryWriteDto<'a> {
    fn from(draft: &'a NewCategory) -> Self {
        Self {
            title: &draft.title,
        }
    }
}

impl<'a> From<&'a CategoryModel> for CategoryWriteDto<'a> {
    fn from(category: &'a CategoryModel) -> Self {
        Self {
            title: &category.title,
        }
    }
}

impl From<ParticipantReadDto> for ParticipantModel {
    fn from(dto: ParticipantReadDto) -> Self {
        Self {
            id: dto.id,
            firstname: dto.firstname,
            lastname: dto.lastname,
            image_url: dto.image_url,
        }
    }
}

impl<'a> From<&'a NewParticipant> for ParticipantWriteDto<'a> {
    fn from(draft: &'a NewParticipant) -> Self {
        Self {
            firstname: &draft.firstname,
            lastname: &draft.lastname,
            image_url: &draft.image_url,
        }
    }
}

impl<'a> From<&'a ParticipantModel> for ParticipantWriteDto<'a> {
    fn from(p: &'a ParticipantModel) -> Self {
        Self {
            firstname: &p.firstname,
            lastname: &p.lastname,
            image_url: &p.image_url,
        }
    }
}

impl From<EventReadDto> for EventModel {
    fn from(dto: EventReadDto) -> Self {
        Self {
            id: Some(dto.id),
            title: dto.title,
            start: dto.start,
            end: dto.end,
            category: dto.category.into(),
            participant: dto.participant.into(),
        }
    }
}

impl<'a> From<&'a EventModel> for EventWriteDto<'a> {
    fn from(event: &'a EventModel) -> Self {
        Self {
            title: &event.title,
            start: event.start,
            end: event.end,
            category_id: &event.category.id,
            participant_id: &event.participant.id,
        }
    }
}

impl From<TenantReadDto> for TenantModel {
    fn from(dto: TenantReadDto) -> Self {
        Self {
            role: dto.role,
            tag: dto.tag,
            admin_token: dto.admin_token,
            editor_token: dto.editor_token,
            visitor_token: dto.visitor_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_read_maps_nested_entities() {
        let json = r#"{
            "id": "9",
            "title": "Gym",
            "start": "2025-10-21T01:00:00.000Z",
            "end": "2025-10-21T02:30:00.000Z",
            "category": {"id": "1", "title": "Personal Development"},
            "participant": {"id": "2", "firstname": "Mahsa", "lastname": "Aghajani", "imageUrl": "x.png"}
        }"#;
        let event: EventModel = serde_json::from_str::<EventReadDto>(json).unwrap().into();
        assert_eq!(event.id.as_deref(), Some("9"));
        assert_eq!(event.duration_minutes(), 90);
        assert_eq!(event.category.title, "Personal Development");
        assert_eq!(event.participant.image_url, "x.png");
    }

    #[test]
    fn test_event_write_uses_ids_and_rfc3339() {
        let start = Utc.with_ymd_and_hms(2025, 10, 22, 1, 0, 0).unwrap();
        let event = EventModel {
            id: None,
            title: "Baking Bread".into(),
            start,
            end: start,
            category: CategoryModel {
                id: "2".into(),
                title: "Chores".into(),
            },
            participant: ParticipantModel {
                id: "1".into(),
                firstname: "Hesam".into(),
                lastname: "Eskandari".into(),
                image_url: String::new(),
            },
        };
        let body = serde_json::to_value(EventWriteDto::from(&event)).unwrap();
        assert_eq!(body["categoryId"], "2");
        assert_eq!(body["participantId"], "1");
        assert_eq!(body["start"], "2025-10-22T01:00:00Z");
    }

    #[test]
    fn test_tenant_without_tag_defaults_to_home() {
        let json = r#"{"role": "visitor", "adminToken": null, "editorToken": null, "visitorToken": "v1"}"#;
        let tenant: TenantModel = serde_json::from_str::<TenantReadDto>(json).unwrap().into();
        assert_eq!(tenant.tag, "Home");
        assert_eq!(tenant.role, Role::Visitor);
        assert_eq!(tenant.token(), Some("v1"));
    }
}
