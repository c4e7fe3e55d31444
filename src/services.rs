use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::db::Store;
use crate::errors::{AppError, Result};
use crate::models::{
    NewTweet, Tweet, TweetUpdate, User, UserLogin, UserProfile, UserRegistration, UserUpdate,
};

/// Registration, authentication and profile management on top of the Users
/// document.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store<User>>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(store: Arc<dyn Store<User>>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    pub async fn register(&self, input: UserRegistration) -> Result<UserProfile> {
        input.validate()?;

        let password = input.password;
        let cost = self.bcrypt_cost;
        let password_hash = task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))??;

        let user = User {
            user_id: input.user_id,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            birth_date: input.birth_date,
            password_hash,
        };
        let user = self.store.append(user).await?;

        info!("User registered: {}", user.user_id);
        Ok(user.into())
    }

    pub async fn login(&self, credentials: UserLogin) -> Result<UserProfile> {
        credentials.validate()?;
        let user = self.find(credentials.user_id).await?;

        let hash = user.password_hash.clone();
        let password = credentials.password;
        let password_ok = task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("verification task failed: {}", e)))??;

        if !password_ok || user.email != credentials.email {
            return Err(AppError::Unauthorized("Wrong email or password".to_string()));
        }

        info!("User logged in: {}", user.user_id);
        Ok(user.into())
    }

    pub async fn list_all(&self) -> Result<Vec<UserProfile>> {
        let users = self.store.load().await?;
        debug!("Listing {} users", users.len());
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    pub async fn get_by_id(&self, user_id: Uuid) -> Result<UserProfile> {
        Ok(self.find(user_id).await?.into())
    }

    pub async fn delete_by_id(&self, user_id: Uuid) -> Result<()> {
        if !self.store.delete_all(&|u: &User| u.user_id == user_id).await? {
            return Err(user_not_found(user_id));
        }
        info!("User deleted: {}", user_id);
        Ok(())
    }

    pub async fn update_by_id(&self, user_id: Uuid, update: UserUpdate) -> Result<UserProfile> {
        update.validate()?;
        let updated = self
            .store
            .replace_first(
                &|u: &User| u.user_id == user_id,
                Box::new(move |user: User| update.apply_to(user)),
            )
            .await?
            .ok_or_else(|| user_not_found(user_id))?;

        info!("User updated: {}", user_id);
        Ok(updated.into())
    }

    async fn find(&self, user_id: Uuid) -> Result<User> {
        self.store
            .find(&|u: &User| u.user_id == user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))
    }
}

/// Posting and editing tweets on top of the Tweets document.
#[derive(Clone)]
pub struct TweetService {
    store: Arc<dyn Store<Tweet>>,
}

impl TweetService {
    pub fn new(store: Arc<dyn Store<Tweet>>) -> Self {
        Self { store }
    }

    pub async fn post(&self, input: NewTweet, author: &UserProfile) -> Result<Tweet> {
        input.validate()?;
        let tweet = Tweet {
            tweet_id: Uuid::new_v4(),
            content: input.content,
            created_at: Utc::now(),
            updated_at: None,
            by: author.clone(),
        };
        let tweet = self.store.append(tweet).await?;

        info!("Tweet created successfully: {}", tweet.tweet_id);
        Ok(tweet)
    }

    pub async fn list_all(&self) -> Result<Vec<Tweet>> {
        let tweets = self.store.load().await?;
        debug!("Listing {} tweets", tweets.len());
        Ok(tweets)
    }

    pub async fn list_by_author(&self, user_id: Uuid) -> Result<Vec<Tweet>> {
        let tweets = self
            .store
            .filter(&|t: &Tweet| t.by.user_id == user_id)
            .await?;
        debug!("Found {} tweets for user {}", tweets.len(), user_id);
        Ok(tweets)
    }

    pub async fn get_by_id(&self, tweet_id: Uuid) -> Result<Tweet> {
        self.store
            .find(&|t: &Tweet| t.tweet_id == tweet_id)
            .await?
            .ok_or_else(|| tweet_not_found(tweet_id))
    }

    pub async fn delete_by_id(&self, tweet_id: Uuid) -> Result<()> {
        if !self
            .store
            .delete_all(&|t: &Tweet| t.tweet_id == tweet_id)
            .await?
        {
            return Err(tweet_not_found(tweet_id));
        }
        info!("Tweet deleted: {}", tweet_id);
        Ok(())
    }

    pub async fn update_by_id(&self, tweet_id: Uuid, update: TweetUpdate) -> Result<Tweet> {
        update.validate()?;
        let updated = self
            .store
            .replace_first(
                &|t: &Tweet| t.tweet_id == tweet_id,
                Box::new(move |tweet: Tweet| Tweet {
                    content: update.content,
                    updated_at: Some(Utc::now()),
                    ..tweet
                }),
            )
            .await?
            .ok_or_else(|| tweet_not_found(tweet_id))?;

        info!("Tweet updated: {}", tweet_id);
        Ok(updated)
    }
}

fn user_not_found(user_id: Uuid) -> AppError {
    AppError::NotFound(format!("User {} doesn't exist", user_id))
}

fn tweet_not_found(tweet_id: Uuid) -> AppError {
    AppError::NotFound(format!("Tweet {} doesn't exist", tweet_id))
}
