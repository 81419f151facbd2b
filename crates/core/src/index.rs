//! Index log line codec and filtering
//!
//! The index is a text blob with one line per write:
//!
//! ```text
//! token \t ip \t method \t url \t time \t parent \n
//! ```
//!
//! Lines are split with a fixed bound of six fields, so stray tabs after the
//! fifth separator stay inside the last field instead of producing extra
//! columns. Separators inside a field are replaced by a space when a line is
//! formatted, which keeps one write equal to one well-formed line.

use crate::profile::{Profile, ProfileSummary};

/// Number of fields on an index line
pub const FIELD_COUNT: usize = 6;

const FIELD_SEPARATOR: char = '\t';
const LINE_SEPARATOR: char = '\n';

/// Codec for a single index line
pub struct IndexLine;

impl IndexLine {
    /// Format the index line for a profile, including the trailing newline
    pub fn format(profile: &Profile) -> String {
        Self::format_summary(&ProfileSummary::from(profile))
    }

    /// Format the index line for a summary, including the trailing newline
    pub fn format_summary(summary: &ProfileSummary) -> String {
        let time = summary.time.to_string();
        let fields = [
            summary.token.as_str(),
            summary.ip.as_str(),
            summary.method.as_str(),
            summary.url.as_str(),
            time.as_str(),
            summary.parent.as_deref().unwrap_or(""),
        ];

        let mut line = String::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                line.push(FIELD_SEPARATOR);
            }
            line.extend(field.chars().map(|c| match c {
                '\t' | '\n' | '\r' => ' ',
                c => c,
            }));
        }
        line.push(LINE_SEPARATOR);
        line
    }

    /// Parse one line (without its newline)
    ///
    /// Returns `None` for malformed lines: fewer than six fields or a time
    /// that is not an integer.
    pub fn parse(line: &str) -> Option<ProfileSummary> {
        let mut fields = line.splitn(FIELD_COUNT, FIELD_SEPARATOR);
        let token = fields.next()?;
        let ip = fields.next()?;
        let method = fields.next()?;
        let url = fields.next()?;
        let time = fields.next()?.parse::<i64>().ok()?;
        let parent = fields.next()?;

        Some(ProfileSummary {
            token: token.to_string(),
            ip: ip.to_string(),
            method: method.to_string(),
            url: url.to_string(),
            time,
            parent: if parent.is_empty() {
                None
            } else {
                Some(parent.to_string())
            },
        })
    }

    /// Iterate over the non-empty lines of an index blob
    pub fn lines(blob: &str) -> impl Iterator<Item = &str> {
        blob.split(LINE_SEPARATOR).filter(|line| !line.is_empty())
    }
}

/// Filter and limit for listing the index
///
/// String filters are substring matches; an empty filter matches every
/// line. The optional time window is inclusive on both ends. All
/// conditions are combined with AND.
///
/// # Example
///
/// ```
/// use profiler_core::FindQuery;
///
/// let query = FindQuery::new(10).ip("10.0.0.").method("GET");
/// assert_eq!(query.limit, 10);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindQuery {
    /// Substring the ip must contain
    pub ip: String,
    /// Substring the url must contain
    pub url: String,
    /// Substring the method must contain
    pub method: String,
    /// Maximum number of accepted lines
    pub limit: usize,
    /// Earliest accepted time (inclusive)
    pub start: Option<i64>,
    /// Latest accepted time (inclusive)
    pub end: Option<i64>,
}

impl FindQuery {
    /// Unfiltered query returning at most `limit` entries
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Require the ip to contain `ip`
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }

    /// Require the url to contain `url`
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Require the method to contain `method`
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Accept only entries at or after `start`
    pub fn start(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    /// Accept only entries at or before `end`
    pub fn end(mut self, end: i64) -> Self {
        self.end = Some(end);
        self
    }

    /// Check whether an entry passes every filter
    pub fn matches(&self, entry: &ProfileSummary) -> bool {
        fn contains(value: &str, filter: &str) -> bool {
            filter.is_empty() || value.contains(filter)
        }

        contains(&entry.ip, &self.ip)
            && contains(&entry.url, &self.url)
            && contains(&entry.method, &self.method)
            && self.start.map_or(true, |start| entry.time >= start)
            && self.end.map_or(true, |end| entry.time <= end)
    }
}
