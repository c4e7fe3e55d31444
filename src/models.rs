use chrono::{DateTime, NaiveDate, Utc};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Record;
use crate::errors::AppError;

const NAME_LEN: (usize, usize) = (1, 20);
const PASSWORD_LEN: (usize, usize) = (8, 64);
/// bcrypt only looks at the first 72 bytes of its input.
const PASSWORD_MAX_BYTES: usize = 72;
const CONTENT_LEN: (usize, usize) = (1, 256);

/// A user as persisted in the Users document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    pub password_hash: String,
}

impl Record for User {
    fn key(&self) -> Uuid {
        self.user_id
    }
}

/// What callers get to see of a user: everything but the credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            birth_date: user.birth_date,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            birth_date: user.birth_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegistration {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    pub password: String,
}

impl UserRegistration {
    pub fn validate(&self) -> Result<(), AppError> {
        check_email(&self.email)?;
        check_len("first_name", &self.first_name, NAME_LEN)?;
        check_len("last_name", &self.last_name, NAME_LEN)?;
        check_password(&self.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLogin {
    pub user_id: Uuid,
    pub email: String,
    pub password: String,
}

impl UserLogin {
    pub fn validate(&self) -> Result<(), AppError> {
        check_email(&self.email)?;
        check_password(&self.password)
    }
}

/// The mutable part of a user. Extra fields in the body, such as `user_id`,
/// are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        check_email(&self.email)?;
        check_len("first_name", &self.first_name, NAME_LEN)?;
        check_len("last_name", &self.last_name, NAME_LEN)
    }

    pub fn apply_to(self, user: User) -> User {
        User {
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            ..user
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    pub tweet_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Snapshot of the author taken when the tweet was posted.
    pub by: UserProfile,
}

impl Record for Tweet {
    fn key(&self) -> Uuid {
        self.tweet_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTweet {
    pub content: String,
}

impl NewTweet {
    pub fn validate(&self) -> Result<(), AppError> {
        check_len("content", &self.content, CONTENT_LEN)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetUpdate {
    pub content: String,
}

impl TweetUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        check_len("content", &self.content, CONTENT_LEN)
    }
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

fn check_len(field: &str, value: &str, (min, max): (usize, usize)) -> Result<(), AppError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::Validation(format!(
            "{} must be between {} and {} characters, got {}",
            field, min, max, len
        )));
    }
    Ok(())
}

fn check_password(password: &str) -> Result<(), AppError> {
    check_len("password", password, PASSWORD_LEN)?;
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(AppError::Validation(format!(
            "password must be at most {} bytes when UTF-8 encoded, got {}",
            PASSWORD_MAX_BYTES,
            password.len()
        )));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), AppError> {
    if !EmailAddress::is_valid(email) {
        return Err(AppError::Validation(format!(
            "{:?} is not a valid email address",
            email
        )));
    }
    Ok(())
}
