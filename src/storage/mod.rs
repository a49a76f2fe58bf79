pub mod jsonl;
pub mod models;
pub mod store;

pub use models::{Course, NewCourse, NewReview, Rating, Review};
pub use store::ReviewStore;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("corrupt document at {}:{line}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    #[error("write failed ({cause}) and could not be rolled back ({rollback})")]
    Rollback {
        cause: Box<StoreError>,
        rollback: Box<StoreError>,
    },
}
