//! Extracting index data from content.
//!
//! Content may start with a TOML front matter block, delimited by lines
//! containing only `+++`:
//!
//! ```text
//! +++
//! title = "On rivers"
//! tags = ["geography", "water"]
//! date = 2019-05-27T07:32:00Z
//! +++
//! Body of the document.
//! ```
//!
//! Only `tags` and `date` are used, other keys are ignored. `date` may be
//! either a TOML date-time or a string in RFC 3339 format.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use failure::Fail;
use itertools::Itertools;
use serde::Deserialize;
use toml::Value;

use crate::{
    ApiError,
    models::{NodeIndex, Version},
};

const DELIMITER: &str = "+++";

/// Data extracted from a front matter block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrontMatter {
    pub tags: Vec<String>,
    pub date: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
struct RawFrontMatter {
    #[serde(default)]
    tags: Vec<String>,
    date: Option<Value>,
}

/// Find and parse the front matter block of a document.
///
/// Returns `None` if the document has no front matter.
pub fn front_matter(content: &str) -> Result<Option<FrontMatter>, ProcessingError> {
    let mut lines = content.trim_start_matches('\u{feff}').lines();

    match lines.next() {
        Some(line) if line.trim_end() == DELIMITER => (),
        _ => return Ok(None),
    }

    let mut block = String::new();
    let mut terminated = false;

    for line in lines {
        if line.trim_end() == DELIMITER {
            terminated = true;
            break;
        }
        block.push_str(line);
        block.push('\n');
    }

    if !terminated {
        return Err(ProcessingError::Unterminated);
    }

    let raw: RawFrontMatter = toml::from_str(&block)
        .map_err(|e| ProcessingError::Syntax(e.to_string()))?;

    let date = match raw.date {
        None => None,
        Some(Value::String(s)) => Some(parse_date(&s)?),
        Some(Value::Datetime(d)) => Some(parse_date(&d.to_string())?),
        Some(other) => return Err(ProcessingError::Date(other.to_string())),
    };

    let tags = raw.tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .sorted()
        .dedup()
        .collect();

    Ok(Some(FrontMatter { tags, date }))
}

/// Compute index data of a node from its newest released version.
///
/// When the content doesn't specify a date, the time the version was last
/// changed is used.
pub fn index_version(version: &Version) -> Result<NodeIndex, ProcessingError> {
    let front = front_matter(&version.content)?.unwrap_or_default();

    Ok(NodeIndex {
        tags: front.tags,
        timestamp: Some(front.date.unwrap_or(version.changed)),
    })
}

fn parse_date(s: &str) -> Result<NaiveDateTime, ProcessingError> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Ok(date.naive_utc());
    }

    if let Ok(date) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(date);
    }

    if let Ok(date) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(date);
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|date| date.and_hms(0, 0, 0))
        .map_err(|_| ProcessingError::Date(s.to_string()))
}

#[derive(ApiError, Debug, Fail)]
pub enum ProcessingError {
    /// Front matter block was opened but never closed.
    #[fail(display = "Front matter block is not terminated")]
    #[api(code = "content:front-matter:unterminated", status = "UNPROCESSABLE_ENTITY")]
    Unterminated,
    /// Front matter is not valid TOML, or has keys of wrong types.
    #[fail(display = "Invalid front matter: {}", _0)]
    #[api(code = "content:front-matter:invalid", status = "UNPROCESSABLE_ENTITY")]
    Syntax(String),
    #[fail(display = "Invalid date in front matter: {}", _0)]
    #[api(code = "content:front-matter:date", status = "UNPROCESSABLE_ENTITY")]
    Date(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn no_front_matter() {
        assert_eq!(front_matter("Just text\n+++\n").unwrap(), None);
        assert_eq!(front_matter("").unwrap(), None);
    }

    #[test]
    fn tags_and_date() {
        let content = "+++\n\
            title = \"On rivers\"\n\
            tags = [\"water\", \"geography\", \"water\", \" \"]\n\
            date = 2019-05-27T07:32:00Z\n\
            +++\n\
            Body\n";

        let front = front_matter(content).unwrap().unwrap();
        assert_eq!(front.tags, vec!["geography", "water"]);
        assert_eq!(front.date, Some(datetime("2019-05-27 07:32:00")));
    }

    #[test]
    fn date_formats() {
        let front = front_matter("+++\ndate = \"2020-01-02T03:04:05+02:00\"\n+++\n")
            .unwrap().unwrap();
        assert_eq!(front.date, Some(datetime("2020-01-02 01:04:05")));

        let front = front_matter("+++\ndate = 2020-01-02\n+++\n").unwrap().unwrap();
        assert_eq!(front.date, Some(datetime("2020-01-02 00:00:00")));

        let front = front_matter("+++\ndate = 2020-01-02T10:00:00\n+++\n")
            .unwrap().unwrap();
        assert_eq!(front.date, Some(datetime("2020-01-02 10:00:00")));
    }

    #[test]
    fn malformed() {
        assert!(matches!(
            front_matter("+++\ntags = []\n"), Err(ProcessingError::Unterminated)));
        assert!(matches!(
            front_matter("+++\ntags = [\n+++\n"), Err(ProcessingError::Syntax(_))));
        assert!(matches!(
            front_matter("+++\ntags = [1, 2]\n+++\n"), Err(ProcessingError::Syntax(_))));
        assert!(matches!(
            front_matter("+++\ndate = \"yesterday\"\n+++\n"), Err(ProcessingError::Date(_))));
        assert!(matches!(
            front_matter("+++\ndate = 12\n+++\n"), Err(ProcessingError::Date(_))));
    }

    #[test]
    fn index_defaults_to_change_time() {
        let version = Version {
            node: 1,
            number: 1,
            changed: datetime("2021-06-01 12:00:00"),
            note: String::new(),
            content: "+++\ntags = [\"a\"]\n+++\n".to_string(),
            workflow_group: 0,
        };

        let index = index_version(&version).unwrap();
        assert_eq!(index.tags, vec!["a"]);
        assert_eq!(index.timestamp, Some(datetime("2021-06-01 12:00:00")));
    }
}
