use std::sync::Arc;

use crate::error::StoreError;
use crate::model::{Submission, User};
use crate::store::{KeyValueStore, SUBMISSION_KEY, USER_KEY, get_json, set_json};

/// Access to the logged-in user of a session
pub trait SessionRepository: Send + Sync {
    fn load_user(&self, session_id: &str) -> Result<Option<User>, StoreError>;

    fn save_user(&self, session_id: &str, user: &User) -> Result<(), StoreError>;

    /// Drop the user and everything stored alongside it
    fn clear(&self, session_id: &str) -> Result<(), StoreError>;
}

/// Access to the single submission of a session
pub trait SubmissionRepository: Send + Sync {
    fn load_submission(&self, session_id: &str) -> Result<Option<Submission>, StoreError>;

    /// Store the submission unless one already exists
    ///
    /// # Errors
    /// * `StoreError::AlreadyExists` if the session already submitted
    fn create_submission(&self, session_id: &str, submission: &Submission)
    -> Result<(), StoreError>;
}

/// Both repositories backed by one key-value store
///
/// The session id is used as the store scope, so every browser session sees
/// its own `user` and `submission` keys.
#[derive(Clone)]
pub struct StoreRepository {
    store: Arc<dyn KeyValueStore>,
}

impl StoreRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        StoreRepository { store }
    }
}

impl SessionRepository for StoreRepository {
    fn load_user(&self, session_id: &str) -> Result<Option<User>, StoreError> {
        get_json(self.store.as_ref(), session_id, USER_KEY)
    }

    fn save_user(&self, session_id: &str, user: &User) -> Result<(), StoreError> {
        set_json(self.store.as_ref(), session_id, USER_KEY, user)
    }

    fn clear(&self, session_id: &str) -> Result<(), StoreError> {
        self.store.remove(session_id, USER_KEY)?;
        self.store.remove(session_id, SUBMISSION_KEY)
    }
}

impl SubmissionRepository for StoreRepository {
    fn load_submission(&self, session_id: &str) -> Result<Option<Submission>, StoreError> {
        get_json(self.store.as_ref(), session_id, SUBMISSION_KEY)
    }

    fn create_submission(
        &self,
        session_id: &str,
        submission: &Submission,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(submission)?;
        if self.store.set_if_absent(session_id, SUBMISSION_KEY, json)? {
            Ok(())
        } else {
            Err(StoreError::AlreadyExists(SUBMISSION_KEY.to_string()))
        }
    }
}
