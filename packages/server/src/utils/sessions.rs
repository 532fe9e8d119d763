//! Pairs login and logout events into sessions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::system_log;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Session {
    pub email: String,
    pub login_at: DateTime<Utc>,
    /// `None` while the session is still open.
    pub logout_at: Option<DateTime<Utc>>,
    /// Seconds between login and logout.
    pub duration_seconds: Option<i64>,
}

/// Build sessions from `login`/`logout` events, newest login first.
///
/// Each login is closed by the next logout of the same email. A second login
/// before any logout leaves the first session open. Logouts with no open
/// session are ignored.
pub fn pair_sessions(events: &[system_log::Model]) -> Vec<Session> {
    let mut by_email: BTreeMap<&str, Vec<&system_log::Model>> = BTreeMap::new();
    for event in events {
        by_email.entry(event.email.as_str()).or_default().push(event);
    }

    let mut sessions = Vec::new();
    for (email, mut events) in by_email {
        events.sort_by_key(|e| (e.created_at, e.id));
        let mut open: Option<DateTime<Utc>> = None;
        for event in events {
            match event.action.as_str() {
                system_log::LOGIN => {
                    if let Some(login_at) = open.replace(event.created_at) {
                        sessions.push(open_session(email, login_at));
                    }
                }
                system_log::LOGOUT => {
                    if let Some(login_at) = open.take() {
                        sessions.push(Session {
                            email: email.to_string(),
                            login_at,
                            logout_at: Some(event.created_at),
                            duration_seconds: Some((event.created_at - login_at).num_seconds()),
                        });
                    }
                }
                _ => {}
            }
        }
        if let Some(login_at) = open {
            sessions.push(open_session(email, login_at));
        }
    }

    sessions.sort_by(|a, b| b.login_at.cmp(&a.login_at));
    sessions
}

fn open_session(email: &str, login_at: DateTime<Utc>) -> Session {
    Session {
        email: email.to_string(),
        login_at,
        logout_at: None,
        duration_seconds: None,
    }
}
