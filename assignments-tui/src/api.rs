//! Data sources: the eClass assignment endpoint and built-in samples
//!
//! Both run on background tasks spawned by the scheduler and report back
//! only through their `fetch` result.
//!
//! # The HTTP endpoint
//!
//! eClass itself has no JSON assignment API. [`HttpSource`] expects a
//! service of our own shape: a `GET` with basic auth that answers with a
//! JSON array like
//!
//! ```json
//! [{ "id": "A1", "title": "Lab 1", "deadline": "2024-03-01T12:00:00Z",
//!    "submitted": false,
//!    "course": { "id": "CS101", "name": "Databases", "url": "https://..." } }]
//! ```
//!
//! The default `https://<domain>/api/assignments` only works if such an
//! adapter is mounted there. In practice, point `source_url` (or
//! `--source-url`) at the adapter that scrapes eClass, or use `--demo`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use assignments_core::{Assignment, Course, DataSource, LoadError};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ConfigFile;

pub const HTTP_SOURCE: &str = "eclass";
pub const DEMO_SOURCE: &str = "demo";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The configuration cannot produce an HTTP source
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("missing {0}; set it under [credentials] or pass it on the command line")]
    MissingCredential(&'static str),
    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct AssignmentDto {
    id: String,
    title: String,
    deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    submitted: bool,
    course: CourseDto,
}

#[derive(Debug, Deserialize)]
struct CourseDto {
    id: String,
    name: String,
    #[serde(default)]
    url: String,
}

/// Decode a JSON array of assignments.
///
/// Records of the same course share one [`Course`].
pub fn parse_assignments(body: &str) -> Result<Vec<Assignment>, LoadError> {
    let records: Vec<AssignmentDto> =
        serde_json::from_str(body).map_err(|e| LoadError::Parse(e.to_string()))?;

    let mut courses: HashMap<String, Arc<Course>> = HashMap::new();
    Ok(records
        .into_iter()
        .map(|record| {
            let course = courses
                .entry(record.course.id.clone())
                .or_insert_with(|| {
                    Arc::new(Course::new(record.course.id, record.course.name, record.course.url))
                })
                .clone();
            Assignment {
                id: record.id,
                title: record.title,
                deadline: record.deadline,
                submitted: record.submitted,
                course,
            }
        })
        .collect())
}

/// Assignments from the eClass JSON endpoint, with basic auth
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
    username: String,
    password: String,
}

impl HttpSource {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, SetupError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            username: username.into(),
            password: password.into(),
        })
    }

    /// Build from `[credentials]` and `[options]`.
    ///
    /// Without an explicit `source_url` the endpoint is
    /// `https://<domain>/api/assignments`, which eClass does not serve on
    /// its own; see the module docs.
    pub fn from_config(config: &ConfigFile) -> Result<Self, SetupError> {
        let credentials = &config.credentials;
        let username = credentials
            .username
            .as_deref()
            .ok_or(SetupError::MissingCredential("username"))?;
        let password = credentials
            .password
            .as_deref()
            .ok_or(SetupError::MissingCredential("password"))?;
        let url = match (&config.options.source_url, &credentials.domain) {
            (Some(url), _) => url.clone(),
            (None, Some(domain)) => format!("https://{domain}/api/assignments"),
            (None, None) => return Err(SetupError::MissingCredential("domain")),
        };
        Self::new(url, username, password)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn classify_status(status: StatusCode) -> Option<LoadError> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Some(LoadError::Authentication(status.to_string()))
        }
        s if !s.is_success() => Some(LoadError::Network(format!("server responded {s}"))),
        _ => None,
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn name(&self) -> &str {
        HTTP_SOURCE
    }

    async fn fetch(&self) -> Result<Vec<Assignment>, LoadError> {
        tracing::debug!(url = %self.url, "requesting assignments");
        let response = self
            .client
            .get(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;

        if let Some(error) = classify_status(response.status()) {
            return Err(error);
        }

        let body = response
            .text()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;
        parse_assignments(&body)
    }
}

/// Fixed sample assignments, placed relative to the moment of the fetch
pub struct DemoSource {
    delay: Duration,
}

impl DemoSource {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(300),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn sample(now: DateTime<Utc>) -> Vec<Assignment> {
        let course = |id: &str, name: &str| {
            Arc::new(Course::new(
                id,
                name,
                format!("https://eclass.example.org/courses/{id}"),
            ))
        };
        let intro = course("CS101", "Introduction to Programming");
        let databases = course("CS302", "Databases");
        let networks = course("CS404", "Computer Networks");

        vec![
            Assignment {
                id: "A1".into(),
                title: "Recursion exercises".into(),
                deadline: Some(now - ChronoDuration::hours(1)),
                submitted: true,
                course: intro,
            },
            Assignment {
                id: "A2".into(),
                title: "Schema design".into(),
                deadline: Some(now + ChronoDuration::hours(1)),
                submitted: false,
                course: databases,
            },
            Assignment {
                id: "A3".into(),
                title: "Packet capture report".into(),
                deadline: Some(now - ChronoDuration::hours(1)),
                submitted: false,
                course: networks,
            },
        ]
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for DemoSource {
    fn name(&self) -> &str {
        DEMO_SOURCE
    }

    async fn fetch(&self) -> Result<Vec<Assignment>, LoadError> {
        tokio::time::sleep(self.delay).await;
        Ok(Self::sample(Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Credentials, Options};

    const BODY: &str = r#"[
        {"id": "A1", "title": "Lab 1", "deadline": "2024-03-01T11:00:00Z", "submitted": true,
         "course": {"id": "CS101", "name": "Intro", "url": "https://e/cs101"}},
        {"id": "A2", "title": "Lab 2", "deadline": null,
         "course": {"id": "CS101", "name": "Intro"}},
        {"id": "B1", "title": "Query", "deadline": "2024-03-02T09:30:00Z",
         "course": {"id": "CS302", "name": "Databases"}}
    ]"#;

    #[test]
    fn test_parse_assignments() {
        let items = parse_assignments(BODY).unwrap();

        assert_eq!(items.len(), 3);
        assert!(items[0].submitted);
        assert!(!items[1].submitted);
        assert_eq!(items[1].deadline, None);
        assert_eq!(items[0].course.url, "https://e/cs101");
        assert_eq!(items[2].course.name, "Databases");
    }

    #[test]
    fn test_parse_shares_courses() {
        let items = parse_assignments(BODY).unwrap();
        assert!(Arc::ptr_eq(&items[0].course, &items[1].course));
        assert!(!Arc::ptr_eq(&items[0].course, &items[2].course));
    }

    #[test]
    fn test_parse_rejects_bad_body() {
        assert!(matches!(
            parse_assignments("<html>login</html>"),
            Err(LoadError::Parse(_))
        ));
        assert!(matches!(
            parse_assignments(r#"[{"id": "A1"}]"#),
            Err(LoadError::Parse(_))
        ));
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED),
            Some(LoadError::Authentication(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN),
            Some(LoadError::Authentication(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY),
            Some(LoadError::Network(_))
        ));
        assert_eq!(classify_status(StatusCode::OK), None);
    }

    fn config(domain: Option<&str>, source_url: Option<&str>) -> ConfigFile {
        ConfigFile {
            credentials: Credentials {
                username: Some("student".into()),
                password: Some("secret".into()),
                domain: domain.map(String::from),
            },
            options: Options {
                source_url: source_url.map(String::from),
                ..Options::default()
            },
            ..ConfigFile::default()
        }
    }

    #[test]
    fn test_from_config_url() {
        let source = HttpSource::from_config(&config(Some("eclass.uniwa.gr"), None)).unwrap();
        assert_eq!(source.url(), "https://eclass.uniwa.gr/api/assignments");

        let source =
            HttpSource::from_config(&config(Some("ignored"), Some("http://localhost:8080/a")))
                .unwrap();
        assert_eq!(source.url(), "http://localhost:8080/a");
    }

    #[test]
    fn test_from_config_missing_credentials() {
        let err = HttpSource::from_config(&config(None, None)).err();
        assert!(matches!(err, Some(SetupError::MissingCredential("domain"))));

        let err = HttpSource::from_config(&ConfigFile::default()).err();
        assert!(matches!(err, Some(SetupError::MissingCredential("username"))));
    }

    #[tokio::test]
    async fn test_demo_source() {
        let source = DemoSource::new().with_delay(Duration::ZERO);
        let items = source.fetch().await.unwrap();
        let now = Utc::now();

        assert_eq!(source.name(), DEMO_SOURCE);
        let ids: Vec<_> = items.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "A2", "A3"]);
        assert!(!items[0].is_expired(now));
        assert!(items[2].is_expired(now));
    }
}
