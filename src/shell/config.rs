// Worker settings read from the environment.
//
// Purpose
// - Collect the queue addresses and the supervisor restart backoff at startup.
//
// Boundaries
// - Read once in main; the rest of the worker never touches the environment.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub queue_url_user_created: String,
    pub queue_url_user_updated: String,
    pub queue_url_user_deleted: String,
    pub restart_backoff: Duration,
}

impl WorkerSettings {
    /// Load `.env` then `.env.local`, the latter overriding the former. Both are
    /// optional.
    pub fn read_env_files() {
        dotenvy::from_filename(".env").ok();
        dotenvy::from_filename_override(".env.local").ok();
    }

    pub fn from_env() -> Self {
        Self {
            queue_url_user_created: env_or(
                "EVENTS_QUEUE_URL_USER_CREATED",
                "queue://users/created",
            ),
            queue_url_user_updated: env_or(
                "EVENTS_QUEUE_URL_USER_UPDATED",
                "queue://users/updated",
            ),
            queue_url_user_deleted: env_or(
                "EVENTS_QUEUE_URL_USER_DELETED",
                "queue://users/deleted",
            ),
            restart_backoff: Duration::from_millis(env_parse(
                "SUPERVISOR_RESTART_BACKOFF_MS",
                5000,
            )),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod worker_settings_tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn it_should_fall_back_to_defaults() {
        let settings = WorkerSettings::from_env();
        assert_eq!(settings.queue_url_user_created, "queue://users/created");
        assert_eq!(settings.restart_backoff, Duration::from_millis(5000));
    }

    #[rstest]
    fn it_should_ignore_an_unparsable_backoff() {
        // SAFETY: test process environment, no concurrent readers of this key.
        unsafe { std::env::set_var("SUPERVISOR_RESTART_BACKOFF_MS_TEST", "not-a-number") };
        assert_eq!(env_parse("SUPERVISOR_RESTART_BACKOFF_MS_TEST", 5000u64), 5000);
    }
}
