//! Records exchanged with the GraphQL server.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};


/// The GraphQL `ID` scalar. Servers send it either as string or as integer,
/// we always send it as string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub(crate) struct Id(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for Id {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => Self(s),
            RawId::Number(n) => Self(n.to_string()),
        }
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Id {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}


/// General information about the whole site. There is only one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Site {
    pub(crate) name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Category {
    pub(crate) id: Id,
    pub(crate) name: String,
    pub(crate) slug: String,
}

/// The short category info that can be nested in an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ArticleCategory {
    pub(crate) slug: String,
    pub(crate) name: String,
}

/// An article. All fields except `category` are required: a response that
/// lacks one of them fails to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Article {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) is_published: bool,
    pub(crate) is_featured: bool,
    pub(crate) created_at: CreatedAt,
    pub(crate) category_id: Id,
    pub(crate) user_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) category: Option<ArticleCategory>,
}


/// Creation time of an article. Depending on the server (and its version),
/// this arrives as epoch number, as ISO date string or as some other text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum CreatedAt {
    Epoch(i64),
    /// Epoch with a fractional part, e.g. `1680352200.5`.
    FractionalEpoch(f64),
    Date(DateTime<Utc>),
    Text(String),
}

/// Epoch values above this are interpreted as milliseconds. In seconds, this
/// is the year 5138.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

impl CreatedAt {
    /// Returns the point in time, if it can be determined.
    pub(crate) fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Epoch(n) if n.unsigned_abs() > EPOCH_MILLIS_THRESHOLD as u64 => {
                Utc.timestamp_millis_opt(*n).single()
            }
            Self::Epoch(n) => Utc.timestamp_opt(*n, 0).single(),
            Self::FractionalEpoch(n) => fractional_to_datetime(*n),
            Self::Date(date) => Some(*date),
            Self::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|d| d.with_timezone(&Utc)),
        }
    }
}

fn fractional_to_datetime(n: f64) -> Option<DateTime<Utc>> {
    if !n.is_finite() {
        return None;
    }

    let secs = if n.abs() > EPOCH_MILLIS_THRESHOLD as f64 { n / 1000.0 } else { n };
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    Utc.timestamp_opt(whole as i64, nanos).single()
}

impl fmt::Display for CreatedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.to_datetime(), self) {
            (Some(date), _) => write!(f, "{}", date.format("%Y-%m-%d %H:%M")),
            (None, Self::Text(s)) => f.write_str(s),
            (None, Self::Epoch(n)) => write!(f, "{n}"),
            (None, Self::FractionalEpoch(n)) => write!(f, "{n}"),
            (None, Self::Date(d)) => write!(f, "{d}"),
        }
    }
}


#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone, Utc};
    use serde_json::json;

    use super::{Article, CreatedAt, Id};

    fn article_json() -> serde_json::Value {
        json!({
            "title": "Rust 2.0 released",
            "slug": "rust-2-0-released",
            "content": "Not really.",
            "isPublished": true,
            "isFeatured": false,
            "createdAt": "2023-04-01T12:30:00+00:00",
            "categoryId": 3,
            "userId": "7",
        })
    }

    #[test]
    fn article_deserializes_full_field_set() {
        let article: Article = serde_json::from_value(article_json()).unwrap();
        assert_eq!(article.slug, "rust-2-0-released");
        assert_eq!(article.category_id, Id::from("3"));
        assert_eq!(article.user_id, Id::from("7"));
        assert!(article.category.is_none());
        assert_eq!(
            article.created_at.to_datetime(),
            Some(Utc.with_ymd_and_hms(2023, 4, 1, 12, 30, 0).unwrap()),
        );
    }

    #[test]
    fn article_missing_field_is_rejected() {
        for field in [
            "title", "slug", "content", "isPublished", "isFeatured",
            "createdAt", "categoryId", "userId",
        ] {
            let mut json = article_json();
            json.as_object_mut().unwrap().remove(field);
            assert!(
                serde_json::from_value::<Article>(json).is_err(),
                "article without '{field}' was accepted",
            );
        }
    }

    #[test]
    fn created_at_union() {
        let parse = |v| serde_json::from_value::<CreatedAt>(v).unwrap();

        let secs = parse(json!(1_680_352_200));
        assert_eq!(secs, CreatedAt::Epoch(1_680_352_200));
        assert_eq!(secs.to_datetime().unwrap().year(), 2023);

        let millis = parse(json!(1_680_352_200_000i64));
        assert_eq!(millis.to_datetime(), secs.to_datetime());

        // Only values above the threshold are milliseconds.
        let edge = parse(json!(100_000_000_000i64));
        assert_eq!(edge.to_datetime().unwrap().year(), 5138);
        let above = parse(json!(100_000_000_001i64));
        assert_eq!(above.to_datetime().unwrap().year(), 1973);

        assert!(matches!(parse(json!("2023-04-01T12:30:00Z")), CreatedAt::Date(_)));

        let text = parse(json!("yesterday"));
        assert_eq!(text, CreatedAt::Text("yesterday".into()));
        assert_eq!(text.to_datetime(), None);
        assert_eq!(text.to_string(), "yesterday");
    }

    #[test]
    fn fractional_epoch() {
        let parse = |v| serde_json::from_value::<CreatedAt>(v).unwrap();

        let secs = parse(json!(1_680_352_200.5));
        assert_eq!(secs, CreatedAt::FractionalEpoch(1_680_352_200.5));
        assert_eq!(secs.to_datetime(), Utc.timestamp_opt(1_680_352_200, 500_000_000).single());
        assert_eq!(secs.to_string(), "2023-04-01 12:30");

        let millis = parse(json!(1_680_352_200_000.5));
        assert_eq!(millis.to_datetime().unwrap().timestamp(), 1_680_352_200);

        let mut json = article_json();
        json["createdAt"] = json!(1_680_352_200.5);
        let article: Article = serde_json::from_value(json).unwrap();
        assert_eq!(article.created_at, secs);
    }

    #[test]
    fn id_is_sent_as_string() {
        assert_eq!(serde_json::to_value(Id::from("c1")).unwrap(), json!("c1"));
        let id: Id = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(serde_json::to_value(id).unwrap(), json!("42"));
    }
}
