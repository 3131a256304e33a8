//! Access log in common log format.

use std::fmt;
use std::net::SocketAddr;

use crate::utils::date::DateTimeUtc;

/// One served request.
#[derive(Debug, Clone)]
pub struct AccessEntry {
    pub client: Option<SocketAddr>,
    pub user: Option<String>,
    pub time: DateTimeUtc,
    pub method: String,
    pub url: String,
    pub version: String,
    pub status: u16,
}

impl fmt::Display for AccessEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ip = self
            .client
            .map_or_else(|| "-".to_string(), |addr| addr.ip().to_string());
        write!(
            f,
            "{} - {} [{}] {} {} HTTP/{} {} -",
            ip,
            self.user.as_deref().unwrap_or("-"),
            self.time.to_common_log(),
            self.method,
            self.url,
            self.version,
            self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_line() {
        let entry = AccessEntry {
            client: Some("192.168.1.5:51234".parse().unwrap()),
            user: Some("alice".into()),
            time: DateTimeUtc::from_unix(971_186_136),
            method: "GET".into(),
            url: "/docs/intro?x=1".into(),
            version: "1.1".into(),
            status: 200,
        };
        assert_eq!(
            entry.to_string(),
            "192.168.1.5 - alice [10/Oct/2000:13:55:36 +0000] GET /docs/intro?x=1 HTTP/1.1 200 -"
        );
    }

    #[test]
    fn test_anonymous_and_unknown_client() {
        let entry = AccessEntry {
            client: None,
            user: None,
            time: DateTimeUtc::from_unix(0),
            method: "HEAD".into(),
            url: "/".into(),
            version: "1.0".into(),
            status: 404,
        };
        assert_eq!(
            entry.to_string(),
            "- - - [01/Jan/1970:00:00:00 +0000] HEAD / HTTP/1.0 404 -"
        );
    }
}
