use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered user.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub name: String,
    pub age: u32,
    #[serde(rename = "created")]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub password_hash: String,
}

impl User {
    pub fn new(name: &str, age: u32) -> Self {
        User {
            name: name.to_string(),
            age,
            created_at: Utc::now(),
            password_hash: String::new(),
        }
    }
}

#[derive(Serialize)]
pub struct UserList {
    pub users: Vec<User>,
    pub total: u64,
}

#[derive(Serialize)]
pub struct Status {
    pub ok: bool,
    pub uptime_secs: u64,
}
