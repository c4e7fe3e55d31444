use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{NewTweet, TweetUpdate, UserIdQuery, UserLogin, UserRegistration, UserUpdate};
use crate::state::AppState;

// Users

#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    user_data: web::Json<UserRegistration>,
) -> Result<HttpResponse> {
    let user = state.users.register(user_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    credentials: web::Json<UserLogin>,
) -> Result<HttpResponse> {
    let user = state.users.login(credentials.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/users")]
pub async fn show_all_users(state: web::Data<AppState>) -> Result<HttpResponse> {
    let users = state.users.list_all().await?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/users/{user_id}")]
pub async fn show_user(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user = state.users.get_by_id(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[delete("/users/{user_id}/delete")]
pub async fn delete_user(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.users.delete_by_id(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({"message": "User deleted successfully."})))
}

#[put("/users/{user_id}/update")]
pub async fn update_user(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
    user_update: web::Json<UserUpdate>,
) -> Result<HttpResponse> {
    let user = state
        .users
        .update_by_id(user_id.into_inner(), user_update.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/users/{user_id}/tweets")]
pub async fn get_user_tweets(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let tweets = state.tweets.list_by_author(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tweets))
}

// Tweets

#[get("/home")]
pub async fn home(state: web::Data<AppState>) -> Result<HttpResponse> {
    let tweets = state.tweets.list_all().await?;
    Ok(HttpResponse::Ok().json(tweets))
}

#[get("/tweets/{tweet_id}")]
pub async fn show_tweet(
    state: web::Data<AppState>,
    tweet_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let tweet = state.tweets.get_by_id(tweet_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tweet))
}

/// The author comes from `?user_id=` and is resolved against the Users
/// document, so the embedded snapshot always reflects a registered user.
#[post("/post")]
pub async fn post_tweet(
    state: web::Data<AppState>,
    tweet_data: web::Json<NewTweet>,
    query: web::Query<UserIdQuery>,
) -> Result<HttpResponse> {
    let author = state.users.get_by_id(query.user_id).await?;
    let tweet = state.tweets.post(tweet_data.into_inner(), &author).await?;
    Ok(HttpResponse::Created().json(tweet))
}

#[delete("/tweets/{tweet_id}/delete")]
pub async fn delete_tweet(
    state: web::Data<AppState>,
    tweet_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.tweets.delete_by_id(tweet_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({"message": "Tweet deleted successfully."})))
}

#[put("/tweets/{tweet_id}/update")]
pub async fn update_tweet(
    state: web::Data<AppState>,
    tweet_id: web::Path<Uuid>,
    tweet_update: web::Json<TweetUpdate>,
) -> Result<HttpResponse> {
    let tweet = state
        .tweets
        .update_by_id(tweet_id.into_inner(), tweet_update.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(tweet))
}

/// Routes plus extractor configs that answer malformed bodies, paths and
/// queries with the same `{"error": ...}` shape as every other failure.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid request body: {}", err)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid path: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid query: {}", err)).into()
    }));

    cfg.service(signup)
        .service(login)
        .service(show_all_users)
        .service(get_user_tweets)
        .service(show_user)
        .service(delete_user)
        .service(update_user)
        .service(home)
        .service(show_tweet)
        .service(post_tweet)
        .service(delete_tweet)
        .service(update_tweet);
}
