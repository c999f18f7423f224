use super::domain::{ApplicationRecord, JobDetails, JobId, JobPosting, UserAccount};

/// Account storage keyed by username.
pub trait UserRepository: Send + Sync {
    fn fetch(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError>;
    /// Fails with [`RepositoryError::Conflict`] when the username is taken.
    fn insert(&self, account: UserAccount) -> Result<(), RepositoryError>;
}

/// Job storage. Ids are positional, so removing a job renumbers later ones.
pub trait JobRepository: Send + Sync {
    fn list(&self) -> Result<Vec<JobPosting>, RepositoryError>;
    fn append(&self, details: JobDetails) -> Result<JobPosting, RepositoryError>;
    /// Returns `false` when `id` is out of range.
    fn remove(&self, id: JobId) -> Result<bool, RepositoryError>;

    fn fetch(&self, id: JobId) -> Result<Option<JobPosting>, RepositoryError> {
        Ok(self.list()?.into_iter().find(|job| job.id == id))
    }
}

/// Append-only application log.
pub trait ApplicationRepository: Send + Sync {
    fn append(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError>;

    fn for_job(&self, job_id: JobId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|record| record.job_id == job_id)
            .collect())
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("storage io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
