use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use super::auth::{hash_password, verify_password, AuthError, Session, SessionStore};
use super::domain::{
    ApplicationForm, ApplicationRecord, JobDetails, JobId, JobPosting, KeywordSet, LoginRequest,
    NewJob, ResumeUpload, Role, SignupRequest, UserAccount, UserProfile,
};
use super::repository::{ApplicationRepository, JobRepository, RepositoryError, UserRepository};
use super::uploads::{is_pdf_filename, secure_filename, UploadDir};
use crate::screening::{screen_resume, PageTextSource, PdfTextSource, TextExtractor};

pub const INVALID_RESUME_MESSAGE: &str = "Please upload a valid PDF file.";

/// Service composing account, job, and application storage with resume screening.
pub struct JobBoardService<U, J, A, S = PdfTextSource> {
    users: Arc<U>,
    jobs: Arc<J>,
    applications: Arc<A>,
    sessions: SessionStore,
    extractor: TextExtractor<S>,
    uploads: UploadDir,
}

/// A job together with everyone who applied to it.
#[derive(Debug, Clone, Serialize)]
pub struct JobApplicants {
    pub job: JobPosting,
    pub applications: Vec<ApplicationRecord>,
}

impl<U, J, A> JobBoardService<U, J, A, PdfTextSource>
where
    U: UserRepository + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    pub fn new(users: Arc<U>, jobs: Arc<J>, applications: Arc<A>, uploads: UploadDir) -> Self {
        Self::with_extractor(users, jobs, applications, uploads, TextExtractor::pdf())
    }
}

impl<U, J, A, S> JobBoardService<U, J, A, S>
where
    U: UserRepository + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: PageTextSource + 'static,
{
    pub fn with_extractor(
        users: Arc<U>,
        jobs: Arc<J>,
        applications: Arc<A>,
        uploads: UploadDir,
        extractor: TextExtractor<S>,
    ) -> Self {
        Self {
            users,
            jobs,
            applications,
            sessions: SessionStore::default(),
            extractor,
            uploads,
        }
    }

    /// Create an account for `role`. Usernames are unique across both roles.
    pub fn signup(
        &self,
        role: Role,
        request: SignupRequest,
    ) -> Result<UserProfile, JobBoardError> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(JobBoardError::Validation("username is required".to_string()));
        }
        if request.password.is_empty() {
            return Err(JobBoardError::Validation("password is required".to_string()));
        }

        let account = UserAccount {
            username: username.to_string(),
            email: request.email.trim().to_string(),
            password_hash: hash_password(&request.password),
            role,
        };
        let profile = account.profile();
        self.users.insert(account)?;

        info!(username = %profile.username, %role, "account created");
        Ok(profile)
    }

    /// Sign in as `role`. The account must exist with that role and the password must match.
    pub fn login(&self, role: Role, request: LoginRequest) -> Result<Session, JobBoardError> {
        let account = self
            .users
            .fetch(request.username.trim())?
            .filter(|account| account.role == role)
            .filter(|account| verify_password(&request.password, &account.password_hash))
            .ok_or(AuthError::InvalidCredentials)?;

        let session = self.sessions.open(&account.username, role)?;
        info!(username = %session.username, %role, "signed in");
        Ok(session)
    }

    pub fn logout(&self, token: &str) -> Result<bool, JobBoardError> {
        Ok(self.sessions.close(token)?)
    }

    /// Resolve a bearer token to its session.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Session, JobBoardError> {
        let token = token.ok_or(AuthError::Unauthenticated)?;
        let session = self
            .sessions
            .get(token)?
            .ok_or(AuthError::Unauthenticated)?;
        Ok(session)
    }

    pub fn post_job(&self, session: &Session, job: NewJob) -> Result<JobPosting, JobBoardError> {
        require_role(session, Role::Hr)?;

        let title = job.title.trim();
        if title.is_empty() {
            return Err(JobBoardError::Validation("title is required".to_string()));
        }

        let posting = self.jobs.append(JobDetails {
            title: title.to_string(),
            description: job.description,
            keywords: KeywordSet::parse(&job.keywords),
            posted_by: Some(session.username.clone()),
            posted_at: Some(Utc::now()),
        })?;

        info!(
            job_id = %posting.id,
            keywords = posting.details.keywords.len(),
            posted_by = %session.username,
            "job posted"
        );
        Ok(posting)
    }

    pub fn list_jobs(&self, _session: &Session) -> Result<Vec<JobPosting>, JobBoardError> {
        Ok(self.jobs.list()?)
    }

    pub fn job(&self, _session: &Session, id: JobId) -> Result<JobPosting, JobBoardError> {
        self.jobs.fetch(id)?.ok_or(JobBoardError::JobNotFound(id))
    }

    /// Delete a job. Unknown ids are ignored and report `false`.
    pub fn delete_job(&self, session: &Session, id: JobId) -> Result<bool, JobBoardError> {
        require_role(session, Role::Hr)?;
        let removed = self.jobs.remove(id)?;
        if removed {
            info!(job_id = %id, deleted_by = %session.username, "job deleted");
        }
        Ok(removed)
    }

    pub fn applicants_for(
        &self,
        session: &Session,
        id: JobId,
    ) -> Result<JobApplicants, JobBoardError> {
        require_role(session, Role::Hr)?;
        let job = self.jobs.fetch(id)?.ok_or(JobBoardError::JobNotFound(id))?;
        let applications = self.applications.for_job(id)?;
        Ok(JobApplicants { job, applications })
    }

    /// Store the resume, score it against the job's keywords, and record the application.
    ///
    /// Extraction is blocking; async callers should run this on a blocking thread.
    pub fn apply(
        &self,
        session: &Session,
        id: JobId,
        form: ApplicationForm,
        upload: ResumeUpload,
    ) -> Result<ApplicationRecord, JobBoardError> {
        require_role(session, Role::Applicant)?;
        let job = self.jobs.fetch(id)?.ok_or(JobBoardError::JobNotFound(id))?;

        let submitted = upload
            .filename
            .as_deref()
            .filter(|name| is_pdf_filename(name))
            .ok_or_else(|| JobBoardError::InvalidResume(INVALID_RESUME_MESSAGE.to_string()))?;
        if let Some(content_type) = &upload.content_type {
            if *content_type != mime::APPLICATION_PDF {
                debug!(
                    %content_type,
                    filename = submitted,
                    "pdf upload with unexpected content type"
                );
            }
        }

        let filename = secure_filename(submitted);
        if !is_pdf_filename(&filename) {
            return Err(JobBoardError::InvalidResume(
                INVALID_RESUME_MESSAGE.to_string(),
            ));
        }
        let path = self.uploads.save(&filename, &upload.bytes)?;

        let result = screen_resume(&self.extractor, &path, job.details.keywords.as_slice());

        let record = ApplicationRecord {
            job_id: id,
            applicant: session.username.clone(),
            full_name: form.full_name,
            email: form.email,
            phone: form.phone,
            resume_filename: filename,
            ats_score: result.score,
            mistakes: result.warnings,
            submitted_at: Some(Utc::now()),
        };
        self.applications.append(record.clone())?;

        info!(
            job_id = %id,
            applicant = %record.applicant,
            ats_score = record.ats_score,
            warnings = record.mistakes.len(),
            "application submitted"
        );
        Ok(record)
    }

    /// Locate a stored resume for download.
    pub fn resume_path(&self, _session: &Session, filename: &str) -> Result<PathBuf, JobBoardError> {
        self.uploads
            .resolve(filename)
            .ok_or_else(|| JobBoardError::UploadNotFound(filename.to_string()))
    }
}

fn require_role(session: &Session, required: Role) -> Result<(), AuthError> {
    if session.role == required {
        Ok(())
    } else {
        Err(AuthError::Forbidden { required })
    }
}

/// Error raised by the job board service.
#[derive(Debug, thiserror::Error)]
pub enum JobBoardError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("{0}")]
    Validation(String),
    #[error("job {0} not found")]
    JobNotFound(JobId),
    #[error("{0}")]
    InvalidResume(String),
    #[error("upload {0} not found")]
    UploadNotFound(String),
    #[error("upload storage failure: {0}")]
    Io(#[from] std::io::Error),
}
