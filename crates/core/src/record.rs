//! Stored profile records
//!
//! A record holds one profile's metadata, its collector payload, its parent
//! token and the tokens of its immediate children. Deeper structure is not
//! stored; it is rebuilt on read by following tokens.
//!
//! Records are encoded with MessagePack using named fields, so the stored
//! value is a map keyed by `token`, `parent`, `children`, `data`, `ip`,
//! `method`, `url` and `time`.

use crate::error::{Error, Result};
use crate::profile::Profile;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serialized form of a [`Profile`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Profile token
    pub token: String,
    /// Parent token, if any
    pub parent: Option<String>,
    /// Immediate child tokens
    pub children: Vec<String>,
    /// Collector payload
    pub data: Value,
    /// Client IP address
    pub ip: String,
    /// HTTP method
    pub method: String,
    /// Request URL
    pub url: String,
    /// Creation time (seconds since epoch)
    pub time: i64,
}

impl ProfileRecord {
    /// Build the record for a profile
    pub fn encode(profile: &Profile) -> Self {
        ProfileRecord {
            token: profile.token.clone(),
            parent: profile.parent_token().map(str::to_string),
            children: profile.children.clone(),
            data: profile.collector_data.clone(),
            ip: profile.ip.clone(),
            method: profile.method.clone(),
            url: profile.url.clone(),
            time: profile.time,
        }
    }

    /// Rebuild a profile from this record under the given token
    ///
    /// The token argument wins over the token stored inside the record;
    /// the key a record was fetched under is authoritative.
    pub fn decode(&self, token: &str) -> Profile {
        Profile {
            token: token.to_string(),
            parent: self.parent_token().map(str::to_string),
            children: self.children.clone(),
            ip: self.ip.clone(),
            method: self.method.clone(),
            url: self.url.clone(),
            time: self.time,
            collector_data: self.data.clone(),
        }
    }

    /// The parent token, treating an empty string as absent
    pub fn parent_token(&self) -> Option<&str> {
        self.parent.as_deref().filter(|p| !p.is_empty())
    }

    /// Serialize for storage
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from storage
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))
    }
}
