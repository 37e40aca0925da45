//! Community Event Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An exhibition, fair or meetup announced to the community.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityEvent {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCommunityEvent {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub date: DateTime<Utc>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub image: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommunityEventUpdate {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Location must not be empty"))]
    pub location: Option<String>,
    pub date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,
    pub image: Option<String>,
}

impl CommunityEvent {
    pub fn schedule(new: NewCommunityEvent) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: new.title.trim().to_string(),
            location: new.location.trim().to_string(),
            date: new.date,
            description: new.description,
            image: new.image.filter(|i| !i.trim().is_empty()),
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, update: CommunityEventUpdate) {
        if let Some(v) = update.title { self.title = v.trim().to_string(); }
        if let Some(v) = update.location { self.location = v.trim().to_string(); }
        if let Some(v) = update.date { self.date = v; }
        if let Some(v) = update.description { self.description = v; }
        if let Some(v) = update.image { self.image = Some(v); }
    }
}
