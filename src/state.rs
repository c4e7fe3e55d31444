use std::path::Path;
use std::sync::Arc;

use crate::db::JsonFileStore;
use crate::errors::StoreError;
use crate::models::{Tweet, User};
use crate::services::{TweetService, UserService};

pub const USERS_DOCUMENT: &str = "users.json";
pub const TWEETS_DOCUMENT: &str = "tweets.json";

/// Shared by every actix worker; each service owns an `Arc` to its document.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub tweets: TweetService,
}

impl AppState {
    pub async fn open(data_dir: impl AsRef<Path>, bcrypt_cost: u32) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        let users = JsonFileStore::<User>::open(data_dir.join(USERS_DOCUMENT)).await?;
        let tweets = JsonFileStore::<Tweet>::open(data_dir.join(TWEETS_DOCUMENT)).await?;

        Ok(Self {
            users: UserService::new(Arc::new(users), bcrypt_cost),
            tweets: TweetService::new(Arc::new(tweets)),
        })
    }
}
