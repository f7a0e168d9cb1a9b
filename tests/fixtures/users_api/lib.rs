//! User service resources.

pub mod models;

use crate::models::{Status, User, UserList};
use rest::{json, Request};

const AGE_PARAM: &str = "age";

/// Manages users.
///
/// +route /user/{age}
pub struct UserResource;

impl UserResource {
    /// Lists the users of one age.
    pub fn get(&self, req: &Request) -> rest::Response {
        let age = match req.param(AGE_PARAM).parse::<u32>() {
            Ok(age) => age,
            Err(_) => return rest::json_error(400, "age must be a number"),
        };
        let users = vec![User::new("ada", age)];
        json(UserList { total: users.len() as u64, users })
    }

    /// Creates a user.
    pub fn post(&self, req: &Request) -> rest::Response {
        let name = req.form("name");
        if name.is_empty() {
            return rest::json_errorf(422, "missing {}", "name");
        }
        rest::json_success()
    }

    fn audit(&self) -> bool {
        true
    }
}

/// Reports service health.
pub struct Health;

impl Health {
    pub fn get(&self) -> rest::Response {
        json(Status { ok: true, uptime_secs: 12 })
    }
}
