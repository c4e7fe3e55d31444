use chrono::NaiveDate;
use tempfile::TempDir;
use uuid::Uuid;

use crate::models::UserRegistration;
use crate::state::AppState;

/// Lowest cost bcrypt accepts; keeps hashing fast in tests.
const TEST_BCRYPT_COST: u32 = 4;

/// State over a fresh temporary data directory. Keep the `TempDir` alive for
/// as long as the state is used.
pub async fn test_state() -> (TempDir, AppState) {
    let dir = TempDir::new().unwrap();
    let state = AppState::open(dir.path(), TEST_BCRYPT_COST).await.unwrap();
    (dir, state)
}

pub fn registration(first_name: &str) -> UserRegistration {
    UserRegistration {
        user_id: Uuid::new_v4(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 5, 17),
        password: "correct-horse".to_string(),
    }
}
