use env_logger::{Builder, Env};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use futures::future::try_join_all;
use log::info;
use std::error::Error;
use uuid::Uuid;

use twitter_api::config::AppConfig;
use twitter_api::models::{NewTweet, UserProfile, UserRegistration};
use twitter_api::state::AppState;

const NUM_USERS: usize = 100;
const TWEETS_PER_USER: usize = 20;
const SEED_PASSWORD: &str = "password123";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    info!("Starting data seeding...");
    let config = AppConfig::from_env()?;
    let state = AppState::open(&config.data_dir, config.bcrypt_cost).await?;

    let users = seed_users(&state, NUM_USERS).await?;
    seed_tweets(&state, &users, TWEETS_PER_USER).await?;

    info!("Seeding completed! Every user's password is {:?}", SEED_PASSWORD);
    Ok(())
}

async fn seed_users(state: &AppState, count: usize) -> Result<Vec<UserProfile>, Box<dyn Error>> {
    info!("Creating {} users...", count);
    let mut users = Vec::with_capacity(count);

    for i in 0..count {
        let registration = UserRegistration {
            user_id: Uuid::new_v4(),
            email: SafeEmail().fake(),
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            birth_date: None,
            password: SEED_PASSWORD.to_string(),
        };
        let user = state.users.register(registration).await?;

        info!(
            "Created user {}/{}: {} {} ({})",
            i + 1,
            count,
            user.first_name,
            user.last_name,
            user.user_id
        );
        users.push(user);
    }

    Ok(users)
}

async fn seed_tweets(
    state: &AppState,
    users: &[UserProfile],
    tweets_per_user: usize,
) -> Result<(), Box<dyn Error>> {
    info!("Creating {} tweets per user...", tweets_per_user);
    let total_tweets = users.len() * tweets_per_user;
    let mut current_tweet = 0;

    for user in users {
        let posts = (0..tweets_per_user).map(|_| {
            let content: String = Sentence(3..10).fake();
            state.tweets.post(NewTweet { content }, user)
        });
        current_tweet += try_join_all(posts).await?.len();
        info!("Created {}/{} tweets", current_tweet, total_tweets);
    }

    Ok(())
}
