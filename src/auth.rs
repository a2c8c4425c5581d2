use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{AuthError, StoreError};
use crate::model::{Account, RegisterForm, User};
use crate::store::{load_json_file, save_json_file};

/// Account service used by the login and registration pages
pub trait Authenticator: Send + Sync {
    /// Resolve credentials to a user profile
    ///
    /// # Arguments
    /// * `identifier` - College email or roll number
    /// * `password` - Plaintext password
    fn authenticate(&self, identifier: &str, password: &str) -> Result<User, AuthError>;

    /// Create an account from an already validated registration form
    fn register(&self, form: &RegisterForm) -> Result<Account, AuthError>;
}

/// Profile handed out by [`DemoAuthenticator`] for every login
pub fn demo_user() -> User {
    User {
        name: "Ganesh Kumar".to_string(),
        roll_number: "21CS101".to_string(),
        email: "ganesh@raghuenggcollege.in".to_string(),
        branch: "Computer Science Engineering".to_string(),
        year: "3rd Year".to_string(),
        phone: "9876543210".to_string(),
    }
}

/// Accepts any non-empty credentials and stores nothing
///
/// Stands in for a real account service until one exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoAuthenticator;

impl Authenticator for DemoAuthenticator {
    fn authenticate(&self, identifier: &str, password: &str) -> Result<User, AuthError> {
        if identifier.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        Ok(demo_user())
    }

    fn register(&self, form: &RegisterForm) -> Result<Account, AuthError> {
        Ok(Account {
            user: form.to_user(),
            password_hash: String::new(),
        })
    }
}

/// Accounts kept in a JSON file keyed by roll number
///
/// Passwords are stored as Argon2id hashes.
#[derive(Debug)]
pub struct AccountAuthenticator {
    path: PathBuf,
    accounts: RwLock<HashMap<String, Account>>,
}

impl AccountAuthenticator {
    /// Open the accounts file, creating it (and its directory) when missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let accounts: HashMap<String, Account> = load_json_file(&path)?;

        Ok(AccountAuthenticator {
            path,
            accounts: RwLock::new(accounts),
        })
    }

    pub fn account_count(&self) -> usize {
        self.accounts.read().map(|a| a.len()).unwrap_or(0)
    }
}

impl Authenticator for AccountAuthenticator {
    fn authenticate(&self, identifier: &str, password: &str) -> Result<User, AuthError> {
        if identifier.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        let identifier = identifier.trim();

        let accounts = self.accounts.read().map_err(|_| StoreError::Poisoned)?;
        let account = accounts
            .get(identifier)
            .or_else(|| {
                accounts
                    .values()
                    .find(|a| a.user.email.eq_ignore_ascii_case(identifier))
            })
            .ok_or(AuthError::InvalidCredentials)?;

        if verify_password(password, &account.password_hash)? {
            Ok(account.user.clone())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    fn register(&self, form: &RegisterForm) -> Result<Account, AuthError> {
        let user = form.to_user();
        let mut accounts = self.accounts.write().map_err(|_| StoreError::Poisoned)?;

        if accounts.contains_key(&user.roll_number) {
            return Err(AuthError::AlreadyRegistered(user.roll_number));
        }
        if accounts
            .values()
            .any(|a| a.user.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AuthError::AlreadyRegistered(user.email));
        }

        let account = Account {
            password_hash: hash_password(&form.password)?,
            user,
        };
        accounts.insert(account.user.roll_number.clone(), account.clone());
        save_json_file(&self.path, &*accounts)?;

        Ok(account)
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::Hashing)
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::Hashing)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(_) => Ok(false), // Password didn't match
    }
}
