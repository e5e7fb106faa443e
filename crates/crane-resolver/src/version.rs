//! Version parsing and range matching.
//!
//! Range expressions are written between brackets in a reference
//! (`LibC/[~0.1]@user/testing`) and follow the usual npm-style grammar:
//! - alternatives are separated by `||`
//! - comparators inside an alternative are separated by spaces or commas
//! - `~1.2` means `>=1.2.0 <1.3.0`, `^1.2` means `>=1.2.0 <2.0.0`
//! - a bare version (`1.2`) pins the components it names (`=1.2`, any `1.2.x`)
//! - `1.0 - 2.0` is an inclusive hyphen range
//!
//! Candidate versions are parsed leniently: `0.1` is `0.1.0`. Versions that
//! are not numeric (`sha1`, `latest`) never satisfy a range.

use std::fmt;

use crane_core::reference::Reference;
use crane_util::errors::{CraneError, CraneResult};
use semver::{Version, VersionReq};

/// Parse a version leniently, padding missing minor/patch components.
pub fn parse_version(text: &str) -> Option<Version> {
    let text = text.trim();
    let text = text.strip_prefix('v').unwrap_or(text);
    if let Ok(v) = Version::parse(text) {
        return Some(v);
    }

    let split_at = text.find(['-', '+']).unwrap_or(text.len());
    let (core, suffix) = text.split_at(split_at);
    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    if parts
        .iter()
        .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }
    let mut padded = parts.join(".");
    for _ in parts.len()..3 {
        padded.push_str(".0");
    }
    Version::parse(&format!("{padded}{suffix}")).ok()
}

/// A parsed range expression.
#[derive(Debug, Clone)]
pub struct VersionRange {
    expression: String,
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    /// Parse a range expression, with or without the surrounding brackets.
    pub fn parse(expression: &str) -> CraneResult<Self> {
        let trimmed = expression.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(trimmed)
            .trim();
        let malformed = |reason: String| CraneError::MalformedReference {
            reference: expression.to_string(),
            reason,
        };
        if inner.is_empty() {
            return Err(malformed("empty version range".to_string()));
        }

        let mut alternatives = Vec::new();
        for alternative in inner.split("||") {
            let comparators = normalize_comparators(alternative).map_err(malformed)?;
            let req = VersionReq::parse(&comparators.join(", "))
                .map_err(|e| malformed(format!("invalid range '{}': {e}", alternative.trim())))?;
            alternatives.push(req);
        }

        Ok(Self {
            expression: inner.to_string(),
            alternatives,
        })
    }

    /// The range carried by a reference, if it has one.
    pub fn from_reference(reference: &Reference) -> CraneResult<Option<Self>> {
        reference.range_expression().map(Self::parse).transpose()
    }

    /// Whether a concrete version string satisfies the range.
    pub fn matches(&self, version: &str) -> bool {
        match parse_version(version) {
            Some(v) => self.alternatives.iter().any(|req| req.matches(&v)),
            None => false,
        }
    }

    /// The highest candidate whose version satisfies the range.
    ///
    /// Candidates that parse to the same version keep the first one seen.
    pub fn best_match<'a, I>(&self, candidates: I) -> Option<&'a Reference>
    where
        I: IntoIterator<Item = &'a Reference>,
    {
        let mut best: Option<(Version, &'a Reference)> = None;
        for candidate in candidates {
            if !self.matches(candidate.version()) {
                continue;
            }
            let Some(version) = parse_version(candidate.version()) else {
                continue;
            };
            let better = match &best {
                Some((current, _)) => version > *current,
                None => true,
            };
            if better {
                best = Some((version, candidate));
            }
        }
        best.map(|(_, r)| r)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.expression)
    }
}

/// Turn one alternative into comparators the `semver` crate understands.
fn normalize_comparators(alternative: &str) -> Result<Vec<String>, String> {
    let tokens: Vec<&str> = alternative
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return Err("empty range alternative".to_string());
    }

    let mut out = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        // `1.0 - 2.0`
        if tokens.get(i + 1) == Some(&"-") {
            let upper = tokens
                .get(i + 2)
                .ok_or_else(|| format!("incomplete hyphen range after '{token}'"))?;
            out.push(format!(">={token}"));
            out.push(format!("<={upper}"));
            i += 3;
            continue;
        }
        // `>= 1.0`: operator separated from its version
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^')) {
            let version = tokens
                .get(i + 1)
                .ok_or_else(|| format!("operator '{token}' without a version"))?;
            out.push(format!("{token}{version}"));
            i += 2;
            continue;
        }
        out.push(normalize_single(token));
        i += 1;
    }
    Ok(out)
}

fn normalize_single(token: &str) -> String {
    let starts_with_digit = token.chars().next().is_some_and(|c| c.is_ascii_digit());
    // pre-release and build tags may contain `x` without being wildcards
    let core = token.split(['-', '+']).next().unwrap_or(token);
    let is_wildcard = core.contains(['x', 'X', '*']);
    if starts_with_digit && !is_wildcard {
        // a bare version pins, it does not get semver's implicit caret
        format!("={token}")
    } else {
        token.to_string()
    }
}
