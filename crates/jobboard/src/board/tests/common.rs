use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;
use tempfile::TempDir;

use crate::board::auth::Session;
use crate::board::domain::{
    ApplicationForm, ApplicationRecord, JobDetails, JobId, JobPosting, LoginRequest, NewJob,
    ResumeUpload, Role, SignupRequest, UserAccount,
};
use crate::board::repository::{
    ApplicationRepository, JobRepository, RepositoryError, UserRepository,
};
use crate::board::service::JobBoardService;
use crate::board::uploads::UploadDir;
use crate::screening::{ExtractionError, PageTextSource, TextExtractor};

pub(super) type TestService =
    JobBoardService<MemoryUsers, MemoryJobs, MemoryApplications, PlainTextPages>;

/// Reads uploads as UTF-8 text so tests can script resume contents without real PDFs.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct PlainTextPages;

impl PageTextSource for PlainTextPages {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        let text = std::fs::read_to_string(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(text.split('\u{c}').map(str::to_string).collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryUsers {
    accounts: Mutex<BTreeMap<String, UserAccount>>,
}

impl UserRepository for MemoryUsers {
    fn fetch(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError> {
        let guard = self.accounts.lock().expect("users mutex poisoned");
        Ok(guard.get(username).cloned())
    }

    fn insert(&self, account: UserAccount) -> Result<(), RepositoryError> {
        let mut guard = self.accounts.lock().expect("users mutex poisoned");
        if guard.contains_key(&account.username) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(account.username.clone(), account);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryJobs {
    jobs: Mutex<Vec<JobDetails>>,
}

impl JobRepository for MemoryJobs {
    fn list(&self) -> Result<Vec<JobPosting>, RepositoryError> {
        let guard = self.jobs.lock().expect("jobs mutex poisoned");
        Ok(guard
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, details)| JobPosting {
                id: JobId(index),
                details,
            })
            .collect())
    }

    fn append(&self, details: JobDetails) -> Result<JobPosting, RepositoryError> {
        let mut guard = self.jobs.lock().expect("jobs mutex poisoned");
        guard.push(details.clone());
        Ok(JobPosting {
            id: JobId(guard.len() - 1),
            details,
        })
    }

    fn remove(&self, id: JobId) -> Result<bool, RepositoryError> {
        let mut guard = self.jobs.lock().expect("jobs mutex poisoned");
        if id.0 < guard.len() {
            guard.remove(id.0);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[derive(Default)]
pub(super) struct MemoryApplications {
    records: Mutex<Vec<ApplicationRecord>>,
}

impl ApplicationRepository for MemoryApplications {
    fn append(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        self.records
            .lock()
            .expect("applications mutex poisoned")
            .push(record);
        Ok(())
    }

    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("applications mutex poisoned")
            .clone())
    }
}

pub(super) struct UnavailableJobs;

impl JobRepository for UnavailableJobs {
    fn list(&self) -> Result<Vec<JobPosting>, RepositoryError> {
        Err(RepositoryError::Unavailable("jobs offline".to_string()))
    }

    fn append(&self, _details: JobDetails) -> Result<JobPosting, RepositoryError> {
        Err(RepositoryError::Unavailable("jobs offline".to_string()))
    }

    fn remove(&self, _id: JobId) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("jobs offline".to_string()))
    }
}

pub(super) struct Harness {
    pub(super) service: Arc<TestService>,
    pub(super) applications: Arc<MemoryApplications>,
    pub(super) uploads: TempDir,
}

pub(super) fn build_service() -> Harness {
    let uploads = tempfile::tempdir().expect("upload tempdir");
    let applications = Arc::new(MemoryApplications::default());
    let service = Arc::new(JobBoardService::with_extractor(
        Arc::new(MemoryUsers::default()),
        Arc::new(MemoryJobs::default()),
        applications.clone(),
        UploadDir::new(uploads.path()),
        TextExtractor::new(PlainTextPages),
    ));
    Harness {
        service,
        applications,
        uploads,
    }
}

pub(super) fn sign_in(service: &TestService, username: &str, role: Role) -> Session {
    service
        .signup(
            role,
            SignupRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "correct horse".to_string(),
            },
        )
        .expect("signup succeeds");
    service
        .login(
            role,
            LoginRequest {
                username: username.to_string(),
                password: "correct horse".to_string(),
            },
        )
        .expect("login succeeds")
}

pub(super) fn backend_job() -> NewJob {
    NewJob {
        title: "Backend Engineer".to_string(),
        description: "Build services".to_string(),
        keywords: "Python, Java, Go, Rust".to_string(),
    }
}

pub(super) fn form() -> ApplicationForm {
    ApplicationForm {
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: "555-0100".to_string(),
    }
}

pub(super) fn resume(filename: &str, contents: &str) -> ResumeUpload {
    ResumeUpload {
        filename: Some(filename.to_string()),
        content_type: Some(mime::APPLICATION_PDF),
        bytes: contents.as_bytes().to_vec(),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
