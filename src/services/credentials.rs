use std::{
    fs::File,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tempfile::NamedTempFile;

use crate::{
    error::{AppError, AppResult},
    models::{PasswordHash, UserAccount},
};

/// Header row of the persisted store
const STORE_HEADER: [&str; 2] = ["username", "password"];

/// CSV-backed store of registered accounts
///
/// Every `create` rewrites the whole file. The rewrite goes through a
/// temporary file in the same directory and an atomic rename, and writers in
/// this process are serialized by `write_lock`. Separate processes sharing
/// one file can still lose each other's signups.
pub struct CredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every persisted account in insertion order
    ///
    /// A missing file is an empty store. A file that cannot be parsed is an
    /// integrity error.
    pub fn load(&self) -> AppResult<Vec<UserAccount>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut reader = csv::Reader::from_reader(file);

        let headers = reader.headers().map_err(|e| self.corrupt(e))?;
        if !headers.iter().eq(STORE_HEADER.iter().copied()) {
            return Err(AppError::Integrity(format!(
                "credential store {} has unexpected header {:?}",
                self.path.display(),
                headers
            )));
        }

        let accounts = reader
            .deserialize::<UserAccount>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.corrupt(e))?;

        tracing::debug!(
            path = %self.path.display(),
            accounts = accounts.len(),
            "Credential store loaded"
        );

        Ok(accounts)
    }

    /// Registers a new account
    ///
    /// Returns `false` without touching the store when the username is taken.
    pub fn create(&self, username: &str, password: &str) -> AppResult<bool> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppError::Internal("credential store lock poisoned".to_string()))?;

        let mut accounts = self.load()?;
        if accounts.iter().any(|account| account.username == username) {
            tracing::info!(username = %username, "Signup rejected, username already exists");
            return Ok(false);
        }

        accounts.push(UserAccount::new(username, password));
        self.write_all(&accounts)?;

        tracing::info!(
            username = %username,
            accounts = accounts.len(),
            "Account created"
        );

        Ok(true)
    }

    /// Checks a username/password pair against the store
    pub fn verify(&self, username: &str, password: &str) -> AppResult<bool> {
        let hash = PasswordHash::from_password(password);
        let accounts = self.load()?;
        Ok(accounts.iter().any(|account| account.matches(username, &hash)))
    }

    fn write_all(&self, accounts: &[UserAccount]) -> AppResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            for account in accounts {
                writer.serialize(account).map_err(std::io::Error::from)?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| AppError::Io(e.error))?;

        Ok(())
    }

    fn corrupt(&self, e: csv::Error) -> AppError {
        AppError::Integrity(format!(
            "credential store {} is corrupt: {}",
            self.path.display(),
            e
        ))
    }
}
