//! Package references: `name/version[@user/channel]`.

use std::fmt;
use std::str::FromStr;

use crane_util::errors::{CraneError, CraneResult};
use serde::{Deserialize, Serialize};

/// Longest accepted name, user or channel component.
const MAX_COMPONENT_LEN: usize = 51;

/// The four-part identity of a package.
///
/// The version is either a concrete token (`0.1`, `sha1`, `latest`) or a
/// bracketed range expression (`[~0.1]`). Equality and hashing are
/// structural over all four fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference {
    name: String,
    version: String,
    user: Option<String>,
    channel: Option<String>,
}

impl Reference {
    /// Parse `name/version[@user/channel]`.
    pub fn parse(text: &str) -> CraneResult<Self> {
        let text = text.trim();
        let malformed = |reason: &str| CraneError::MalformedReference {
            reference: text.to_string(),
            reason: reason.to_string(),
        };

        let (name, rest) = text
            .split_once('/')
            .ok_or_else(|| malformed("expected name/version"))?;

        let (version, tail) = if rest.starts_with('[') {
            let end = rest
                .find(']')
                .ok_or_else(|| malformed("unterminated version range"))?;
            (&rest[..=end], &rest[end + 1..])
        } else {
            match rest.find('@') {
                Some(at) => (&rest[..at], &rest[at..]),
                None => (rest, ""),
            }
        };

        let (user, channel) = if tail.is_empty() {
            (None, None)
        } else {
            let user_channel = tail
                .strip_prefix('@')
                .ok_or_else(|| malformed("unexpected characters after version"))?;
            let (user, channel) = user_channel
                .split_once('/')
                .ok_or_else(|| malformed("expected @user/channel"))?;
            (placeholder(user), placeholder(channel))
        };

        validate_component(name, "name").map_err(|r| malformed(&r))?;
        validate_version(version).map_err(|r| malformed(&r))?;
        if let Some(ref user) = user {
            validate_component(user, "user").map_err(|r| malformed(&r))?;
        }
        if let Some(ref channel) = channel {
            validate_component(channel, "channel").map_err(|r| malformed(&r))?;
        }

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            user,
            channel,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    /// Whether the version is a range expression rather than a concrete version.
    pub fn is_range(&self) -> bool {
        self.version.starts_with('[') && self.version.ends_with(']')
    }

    /// The range expression without its brackets, if this is a range reference.
    pub fn range_expression(&self) -> Option<&str> {
        if self.is_range() {
            Some(&self.version[1..self.version.len() - 1])
        } else {
            None
        }
    }

    /// Whether `other` lives in the same `user/channel` namespace.
    pub fn same_namespace(&self, other: &Reference) -> bool {
        self.user == other.user && self.channel == other.channel
    }

    fn user_channel_suffix(&self) -> Option<String> {
        match (&self.user, &self.channel) {
            (None, None) => None,
            (user, channel) => Some(format!(
                "@{}/{}",
                user.as_deref().unwrap_or("_"),
                channel.as_deref().unwrap_or("_")
            )),
        }
    }
}

fn placeholder(component: &str) -> Option<String> {
    if component == "_" {
        None
    } else {
        Some(component.to_string())
    }
}

fn is_component_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '.' | '-')
}

fn validate_component(value: &str, what: &str) -> Result<(), String> {
    let mut chars = value.chars();
    let first = chars.next().ok_or_else(|| format!("empty {what}"))?;
    if !(first.is_ascii_alphanumeric() || first == '_') {
        return Err(format!("{what} must start with a letter, digit or '_'"));
    }
    if value.len() < 2 || value.len() > MAX_COMPONENT_LEN {
        return Err(format!(
            "{what} must be between 2 and {MAX_COMPONENT_LEN} characters"
        ));
    }
    if let Some(bad) = value.chars().find(|c| !is_component_char(*c)) {
        return Err(format!("invalid character '{bad}' in {what}"));
    }
    Ok(())
}

fn validate_version(version: &str) -> Result<(), String> {
    if let Some(inner) = version.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        if inner.trim().is_empty() {
            return Err("empty version range".to_string());
        }
        if inner.contains(['[', ']', '@', '/']) {
            return Err("invalid character in version range".to_string());
        }
        return Ok(());
    }
    let first = version.chars().next().ok_or("empty version")?;
    if !(first.is_ascii_alphanumeric() || first == '_') {
        return Err("version must start with a letter, digit or '_'".to_string());
    }
    if version.len() > MAX_COMPONENT_LEN {
        return Err("version is too long".to_string());
    }
    if let Some(bad) = version.chars().find(|c| !is_component_char(*c)) {
        return Err(format!("invalid character '{bad}' in version"));
    }
    Ok(())
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)?;
        if let Some(suffix) = self.user_channel_suffix() {
            f.write_str(&suffix)?;
        }
        Ok(())
    }
}

impl FromStr for Reference {
    type Err = CraneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Reference {
    type Error = CraneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Reference> for String {
    fn from(reference: Reference) -> Self {
        reference.to_string()
    }
}
