//! Registry version numbers.
//!
//! Plugin releases are published with rubygems-style version strings, which
//! are looser than SemVer: any number of dot-separated segments, letters
//! allowed anywhere after the first segment, and no build metadata. This
//! module parses and orders them the way the registry does.
//!
//! # Ordering rules
//!
//! - Segments are split on `.`, and each run of letters or digits becomes its
//!   own segment (`1.0.0.pre1` → `1`, `0`, `0`, `pre`, `1`).
//! - `-` is shorthand for a prerelease: `1.0.0-rc1` reads as `1.0.0.pre.rc1`.
//! - Missing segments compare as `0`, so `1.2` equals `1.2.0`.
//! - A letter segment sorts before any number, so `1.0.0.beta` < `1.0.0`.
//! - A version containing any letter segment is a prerelease.
//!
//! ```rust
//! use docket_cli::version::PluginVersion;
//!
//! let stable: PluginVersion = "9.0.0".parse().unwrap();
//! let beta: PluginVersion = "9.0.0.beta1".parse().unwrap();
//! assert!(beta < stable);
//! assert!(beta.is_prerelease());
//! assert_eq!(stable, "9.0".parse().unwrap());
//! ```

use crate::core::DocketError;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+(?:\.[0-9a-zA-Z]+)*(?:-[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?$")
        .expect("version pattern is valid")
});

static SEGMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+|[a-zA-Z]+").expect("segment pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Number(u64),
    Text(String),
}

impl Segment {
    fn compare(&self, other: &Segment) -> Ordering {
        match (self, other) {
            (Segment::Number(a), Segment::Number(b)) => a.cmp(b),
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
            (Segment::Text(_), Segment::Number(_)) => Ordering::Less,
            (Segment::Number(_), Segment::Text(_)) => Ordering::Greater,
        }
    }
}

/// A parsed registry version; displays as the string it was parsed from.
#[derive(Debug, Clone)]
pub struct PluginVersion {
    original: String,
    segments: Vec<Segment>,
}

impl PluginVersion {
    pub fn parse(input: &str) -> Result<Self, DocketError> {
        let trimmed = input.trim();
        if !VERSION_PATTERN.is_match(trimmed) {
            return Err(DocketError::InvalidVersion {
                version: input.to_string(),
            });
        }

        let normalized = trimmed.replace('-', ".pre.");
        let mut segments = Vec::new();
        for m in SEGMENT_PATTERN.find_iter(&normalized) {
            let raw = m.as_str();
            let segment = match raw.parse::<u64>() {
                Ok(n) => Segment::Number(n),
                Err(_) if raw.bytes().all(|b| b.is_ascii_digit()) => {
                    return Err(DocketError::InvalidVersion {
                        version: input.to_string(),
                    });
                }
                Err(_) => Segment::Text(raw.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            original: trimmed.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }

    pub fn is_prerelease(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Text(_)))
    }

    /// `major.minor` of the leading numeric segments, e.g. `8.15` for `8.15.3`.
    pub fn major_minor(&self) -> Option<String> {
        match self.segments.as_slice() {
            [Segment::Number(major), Segment::Number(minor), ..] => Some(format!("{major}.{minor}")),
            [Segment::Number(major)] => Some(format!("{major}.0")),
            _ => None,
        }
    }

    fn significant_segments(&self) -> &[Segment] {
        let mut end = self.segments.len();
        while end > 0 && self.segments[end - 1] == Segment::Number(0) {
            end -= 1;
        }
        &self.segments[..end]
    }
}

impl Ord for PluginVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let zero = Segment::Number(0);
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let lhs = self.segments.get(i).unwrap_or(&zero);
            let rhs = other.segments.get(i).unwrap_or(&zero);
            match lhs.compare(rhs) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for PluginVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PluginVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PluginVersion {}

impl Hash for PluginVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_segments().hash(state);
    }
}

impl FromStr for PluginVersion {
    type Err = DocketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
