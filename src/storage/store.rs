use super::jsonl::JsonlCollection;
use super::models::{Course, NewCourse, NewReview, Review};
use super::StoreError;
use regex::Regex;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

pub const REVIEWS_FILE: &str = "reviews.jsonl";
pub const COURSES_FILE: &str = "courses.jsonl";

struct Collections {
    reviews: JsonlCollection<Review>,
    courses: JsonlCollection<Course>,
}

/// Review and course documents.
///
/// Both collections sit behind one lock so that a review and its course are
/// written as a single unit.
pub struct ReviewStore {
    inner: RwLock<Collections>,
}

impl ReviewStore {
    /// Open the store under `data_dir`, creating empty collections if needed.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let reviews = JsonlCollection::open(data_dir.join(REVIEWS_FILE))?;
        let courses = JsonlCollection::open(data_dir.join(COURSES_FILE))?;

        Ok(Self {
            inner: RwLock::new(Collections { reviews, courses }),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(Collections {
                reviews: JsonlCollection::in_memory(),
                courses: JsonlCollection::in_memory(),
            }),
        }
    }

    /// All courses in stored order
    pub async fn list_courses(&self) -> Vec<Course> {
        self.inner.read().await.courses.all().to_vec()
    }

    /// All reviews, newest first. Reviews with equal dates keep stored order.
    pub async fn list_reviews_newest_first(&self) -> Vec<Review> {
        let mut reviews = self.inner.read().await.reviews.all().to_vec();
        reviews.sort_by(|a, b| b.date.cmp(&a.date));
        reviews
    }

    pub async fn find_review(&self, id: Uuid) -> Option<Review> {
        let inner = self.inner.read().await;
        inner.reviews.all().iter().find(|r| r.id == id).cloned()
    }

    pub async fn find_course(&self, id: Uuid) -> Option<Course> {
        let inner = self.inner.read().await;
        inner.courses.all().iter().find(|c| c.id == id).cloned()
    }

    /// First review, in stored order, whose title matches `pattern`.
    pub async fn find_by_title(&self, pattern: &Regex) -> Option<Review> {
        let inner = self.inner.read().await;
        inner
            .reviews
            .all()
            .iter()
            .find(|r| pattern.is_match(&r.title))
            .cloned()
    }

    pub async fn count_reviews(&self) -> usize {
        self.inner.read().await.reviews.len()
    }

    pub async fn count_courses(&self) -> usize {
        self.inner.read().await.courses.len()
    }

    /// A review picked uniformly at random, or `None` when there are none.
    pub async fn random_review(&self) -> Option<Review> {
        let inner = self.inner.read().await;
        if inner.reviews.is_empty() {
            return None;
        }
        let offset = random_offset(inner.reviews.len());
        inner.reviews.get(offset).cloned()
    }

    /// Persist a review and its course as one operation.
    ///
    /// The course takes the review's freshly generated course reference as
    /// its id. Both collections are checkpointed first and rolled back if
    /// either write fails, so either both documents exist afterwards or
    /// neither does.
    pub async fn create_review_with_course(
        &self,
        review: NewReview,
        course: NewCourse,
    ) -> Result<(Review, Course), StoreError> {
        let course_id = Uuid::new_v4();
        let review = review.into_review(course_id);
        let course = course.into_course(course_id);

        let mut inner = self.inner.write().await;
        let reviews_at = inner.reviews.checkpoint()?;
        let courses_at = inner.courses.checkpoint()?;

        if let Err(e) = write_pair(&mut inner, &review, &course) {
            error!(review_id = %review.id, error = %e, "Write failed, rolling back review and course");

            // Both rollbacks run; the first failure is reported.
            let courses_undone = inner.courses.rollback(courses_at);
            let reviews_undone = inner.reviews.rollback(reviews_at);
            if let Err(rollback) = courses_undone.and(reviews_undone) {
                error!(review_id = %review.id, error = %rollback, "Rollback failed");
                return Err(StoreError::Rollback {
                    cause: Box::new(e),
                    rollback: Box::new(rollback),
                });
            }
            return Err(e);
        }

        info!(review_id = %review.id, course_id = %course.id, "Stored review and course");

        Ok((review, course))
    }
}

fn write_pair(inner: &mut Collections, review: &Review, course: &Course) -> Result<(), StoreError> {
    inner.reviews.append(review.clone())?;
    inner.courses.append(course.clone())?;
    Ok(())
}

/// Offset in `0..len` from the 62 random low bits of a v4 UUID. The modulo
/// bias is at most `len / 2^62`.
fn random_offset(len: usize) -> usize {
    let bits = Uuid::new_v4().as_u64_pair().1 & ((1 << 62) - 1);
    (bits % len as u64) as usize
}
