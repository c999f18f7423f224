//! Flat-file repositories: a JSON object for users and JSON-lines logs for jobs and
//! applications. Writes are serialised per store with a process-local mutex; nothing
//! coordinates separate processes sharing the same files.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::domain::{ApplicationRecord, JobDetails, JobId, JobPosting, UserAccount};
use super::repository::{
    ApplicationRepository, JobRepository, RepositoryError, UserRepository,
};

fn acquire(lock: &Mutex<()>) -> Result<MutexGuard<'_, ()>, RepositoryError> {
    lock.lock()
        .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
}

fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, RepositoryError> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

fn append_line<T: Serialize>(path: &Path, record: &T) -> Result<(), RepositoryError> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

/// Replace `path` by writing a sibling temp file and renaming it into place.
fn replace_file(path: &Path, contents: &[u8]) -> Result<(), RepositoryError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Users stored as one JSON object keyed by username.
#[derive(Debug)]
pub struct JsonUserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, UserAccount>, RepositoryError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl UserRepository for JsonUserStore {
    fn fetch(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError> {
        let _guard = acquire(&self.lock)?;
        Ok(self.load()?.remove(username))
    }

    fn insert(&self, account: UserAccount) -> Result<(), RepositoryError> {
        let _guard = acquire(&self.lock)?;
        let mut users = self.load()?;
        if users.contains_key(&account.username) {
            return Err(RepositoryError::Conflict);
        }
        users.insert(account.username.clone(), account);
        replace_file(&self.path, &serde_json::to_vec(&users)?)
    }
}

/// Jobs stored one JSON object per line; a job's id is its line index.
#[derive(Debug)]
pub struct JsonLinesJobStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesJobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<Vec<JobPosting>, RepositoryError> {
        let details: Vec<JobDetails> = read_lines(&self.path)?;
        Ok(details
            .into_iter()
            .enumerate()
            .map(|(index, details)| JobPosting {
                id: JobId(index),
                details,
            })
            .collect())
    }
}

impl JobRepository for JsonLinesJobStore {
    fn list(&self) -> Result<Vec<JobPosting>, RepositoryError> {
        let _guard = acquire(&self.lock)?;
        self.load()
    }

    fn append(&self, details: JobDetails) -> Result<JobPosting, RepositoryError> {
        let _guard = acquire(&self.lock)?;
        let id = JobId(self.load()?.len());
        append_line(&self.path, &details)?;
        Ok(JobPosting { id, details })
    }

    fn remove(&self, id: JobId) -> Result<bool, RepositoryError> {
        let _guard = acquire(&self.lock)?;
        let mut jobs = self.load()?;
        if id.0 >= jobs.len() {
            return Ok(false);
        }
        jobs.remove(id.0);

        let mut contents = String::new();
        for job in &jobs {
            contents.push_str(&serde_json::to_string(&job.details)?);
            contents.push('\n');
        }
        replace_file(&self.path, contents.as_bytes())?;
        debug!(job_id = %id, remaining = jobs.len(), "rewrote jobs file");
        Ok(true)
    }
}

/// Applications appended one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesApplicationStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesApplicationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

impl ApplicationRepository for JsonLinesApplicationStore {
    fn append(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let _guard = acquire(&self.lock)?;
        append_line(&self.path, &record)
    }

    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let _guard = acquire(&self.lock)?;
        read_lines(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::domain::{KeywordSet, Role};

    fn details(title: &str) -> JobDetails {
        JobDetails {
            title: title.to_string(),
            description: format!("{title} role"),
            keywords: KeywordSet::parse("rust, sql"),
            posted_by: Some("hr-lead".to_string()),
            posted_at: None,
        }
    }

    fn account(username: &str) -> UserAccount {
        UserAccount {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "sha256$1$salt$digest".to_string(),
            role: Role::Hr,
        }
    }

    #[test]
    fn missing_files_read_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let jobs = JsonLinesJobStore::new(dir.path().join("jobs.jsonl"));
        let apps = JsonLinesApplicationStore::new(dir.path().join("applications.jsonl"));
        let users = JsonUserStore::new(dir.path().join("users.json"));

        assert!(jobs.list().expect("list jobs").is_empty());
        assert!(apps.list().expect("list apps").is_empty());
        assert!(users.fetch("nobody").expect("fetch").is_none());
    }

    #[test]
    fn user_store_rejects_duplicate_usernames() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonUserStore::new(dir.path().join("users.json"));

        store.insert(account("dana")).expect("first insert");
        assert!(matches!(
            store.insert(account("dana")),
            Err(RepositoryError::Conflict)
        ));

        let reopened = JsonUserStore::new(dir.path().join("users.json"));
        let stored = reopened.fetch("dana").expect("fetch").expect("present");
        assert_eq!(stored.email, "dana@example.com");
    }

    #[test]
    fn job_ids_follow_line_positions_and_shift_on_removal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonLinesJobStore::new(dir.path().join("jobs.jsonl"));

        assert_eq!(store.append(details("first")).expect("append").id, JobId(0));
        assert_eq!(store.append(details("second")).expect("append").id, JobId(1));
        assert_eq!(store.append(details("third")).expect("append").id, JobId(2));

        assert!(store.remove(JobId(0)).expect("remove"));
        assert!(!store.remove(JobId(7)).expect("out of range is a no-op"));

        let jobs = store.list().expect("list");
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, JobId(0));
        assert_eq!(jobs[0].details.title, "second");
        assert_eq!(store.fetch(JobId(1)).expect("fetch").expect("present").details.title, "third");
    }

    #[test]
    fn applications_are_filtered_by_job() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonLinesApplicationStore::new(dir.path().join("applications.jsonl"));
        for (job, name) in [(0, "ana"), (1, "ben"), (0, "cy")] {
            store
                .append(ApplicationRecord {
                    job_id: JobId(job),
                    applicant: name.to_string(),
                    full_name: name.to_uppercase(),
                    email: format!("{name}@example.com"),
                    phone: "555-0100".to_string(),
                    resume_filename: format!("{name}.pdf"),
                    ats_score: 50,
                    mistakes: Vec::new(),
                    submitted_at: None,
                })
                .expect("append");
        }

        let for_first: Vec<String> = store
            .for_job(JobId(0))
            .expect("filter")
            .into_iter()
            .map(|record| record.applicant)
            .collect();
        assert_eq!(for_first, vec!["ana".to_string(), "cy".to_string()]);
    }

    #[test]
    fn corrupt_lines_surface_as_serialization_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("jobs.jsonl");
        fs::write(&path, "{not json}\n").expect("write");
        let store = JsonLinesJobStore::new(path);
        assert!(matches!(
            store.list(),
            Err(RepositoryError::Serialization(_))
        ));
    }
}
