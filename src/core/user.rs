// User domain record.
//
// Purpose
// - Minimal read model of the user entity that event handlers re-read through the
//   UserService port. The CRUD side that writes it lives outside this worker.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
