//! Profile types
//!
//! A [`Profile`] is the diagnostic snapshot of a single request. Profiles
//! link to a parent by token and list their immediate children by token;
//! the full tree is only materialized on read.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A request profile
///
/// Each profile has:
/// - A unique token (primary key)
/// - An optional parent token
/// - The tokens of its immediate children
/// - Request metadata (ip, method, url, time)
/// - An opaque collector payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique token
    pub token: String,
    /// Token of the parent profile (if nested)
    pub parent: Option<String>,
    /// Tokens of immediate children, in order
    pub children: Vec<String>,
    /// Client IP address
    pub ip: String,
    /// HTTP method
    pub method: String,
    /// Request URL
    pub url: String,
    /// Creation time (seconds since epoch)
    pub time: i64,
    /// Collector payload, stored as-is
    pub collector_data: Value,
}

impl Profile {
    /// Create a profile with the given token, stamped with the current time
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            parent: None,
            children: Vec::new(),
            ip: String::new(),
            method: String::new(),
            url: String::new(),
            time: Self::now(),
            collector_data: Value::Null,
        }
    }

    /// Generate a fresh six hex character token
    pub fn generate_token() -> String {
        let mut token = Uuid::new_v4().simple().to_string();
        token.truncate(6);
        token
    }

    /// Current time in seconds since epoch
    pub fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    /// Set the parent token
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Append a child token
    pub fn with_child(mut self, child: impl Into<String>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Set the client IP
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }

    /// Set the HTTP method
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set the request URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the creation time
    pub fn with_time(mut self, time: i64) -> Self {
        self.time = time;
        self
    }

    /// Set the collector payload
    pub fn with_collector_data(mut self, data: Value) -> Self {
        self.collector_data = data;
        self
    }

    /// The parent token, treating an empty string as absent
    pub fn parent_token(&self) -> Option<&str> {
        self.parent.as_deref().filter(|p| !p.is_empty())
    }
}

/// One entry of the profile index
///
/// Returned by `find`. Mirrors the six fields of an index line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Profile token
    pub token: String,
    /// Client IP address
    pub ip: String,
    /// HTTP method
    pub method: String,
    /// Request URL
    pub url: String,
    /// Creation time (seconds since epoch)
    pub time: i64,
    /// Parent token, if any
    pub parent: Option<String>,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        ProfileSummary {
            token: profile.token.clone(),
            ip: profile.ip.clone(),
            method: profile.method.clone(),
            url: profile.url.clone(),
            time: profile.time,
            parent: profile.parent_token().map(str::to_string),
        }
    }
}
