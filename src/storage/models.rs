use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sub-scores of a review. Every score is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rating {
    pub overall: Option<f64>,
    pub taste: Option<f64>,
    pub texture: Option<f64>,
    pub bun: Option<f64>,
    pub toppings: Option<f64>,
    pub service: Option<f64>,
}

/// A stored review document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub image_location: String,
    #[serde(default)]
    pub rating: Rating,
    /// Id of the linked [`Course`]
    pub course: Uuid,
}

/// A stored course document. Its id is the owning review's course reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub url: String,
}

/// Review fields supplied by the author; ids are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub image_location: String,
    pub rating: Rating,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub name: String,
    pub location: String,
    pub url: String,
}

impl NewReview {
    pub(crate) fn into_review(self, course: Uuid) -> Review {
        Review {
            id: Uuid::new_v4(),
            title: self.title,
            content: self.content,
            date: self.date,
            image_location: self.image_location,
            rating: self.rating,
            course,
        }
    }
}

impl NewCourse {
    pub(crate) fn into_course(self, id: Uuid) -> Course {
        Course {
            id,
            name: self.name,
            location: self.location,
            url: self.url,
        }
    }
}
