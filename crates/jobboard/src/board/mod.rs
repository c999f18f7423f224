//! Job board: accounts and sessions, job postings, and resume applications over flat files.

pub mod auth;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;
pub mod uploads;

use std::sync::Arc;

use crate::config::StorageConfig;

#[cfg(test)]
mod tests;

pub use auth::{AuthError, Session, SessionStore};
pub use domain::{
    ApplicationForm, ApplicationRecord, JobDetails, JobId, JobPosting, KeywordSet, LoginRequest,
    NewJob, ResumeUpload, Role, SignupRequest, UserAccount, UserProfile,
};
pub use repository::{ApplicationRepository, JobRepository, RepositoryError, UserRepository};
pub use router::{bearer_token, error_response, job_board_router};
pub use service::{JobApplicants, JobBoardError, JobBoardService};
pub use store::{JsonLinesApplicationStore, JsonLinesJobStore, JsonUserStore};
pub use uploads::{secure_filename, UploadDir};

/// Service wired to the flat-file stores and the PDF extractor.
pub type FileBackedJobBoard =
    JobBoardService<JsonUserStore, JsonLinesJobStore, JsonLinesApplicationStore>;

/// Build the flat-file service described by `storage`, creating its directories first.
pub fn open_file_backed(storage: &StorageConfig) -> std::io::Result<FileBackedJobBoard> {
    storage.ensure_dirs()?;
    Ok(JobBoardService::new(
        Arc::new(JsonUserStore::new(storage.users_file())),
        Arc::new(JsonLinesJobStore::new(storage.jobs_file())),
        Arc::new(JsonLinesApplicationStore::new(storage.applications_file())),
        UploadDir::new(&storage.upload_dir),
    ))
}
