//! HTTP Basic authentication for pages with `requiredUsers`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::utils::password::PasswordDigest;

/// Entry in `requiredUsers` admitting every user of `site.users`.
pub const VALID_USER: &str = "valid-user";

/// `WWW-Authenticate` value sent with a 401.
pub const CHALLENGE: &str = r#"Basic realm="Restricted Area", charset="UTF-8""#;

/// Verified against when the user is unknown, so a miss costs the same as
/// a wrong password.
static DUMMY_DIGEST: LazyLock<PasswordDigest> =
    LazyLock::new(|| PasswordDigest::generate("pagewright"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// The page needs no login
    Public,
    /// Credentials checked out for this user
    Granted(String),
    Denied,
}

impl Access {
    pub fn user(&self) -> Option<&str> {
        match self {
            Self::Granted(user) => Some(user),
            _ => None,
        }
    }
}

/// Decide access to a page protected by `required` users.
///
/// `authorization` is the raw `Authorization` header; `users` maps user
/// names to password digests.
pub fn authorize(
    required: &[String],
    authorization: Option<&str>,
    users: &BTreeMap<String, String>,
) -> Access {
    if required.is_empty() {
        return Access::Public;
    }
    let Some((user, password)) = authorization.and_then(parse_basic) else {
        return Access::Denied;
    };

    let listed = required.iter().any(|r| r == VALID_USER || *r == user);
    let verified = match users.get(&user).and_then(|d| PasswordDigest::parse(d)) {
        Some(digest) => digest.verify(&password),
        None => {
            DUMMY_DIGEST.verify(&password);
            false
        }
    };

    if listed && verified {
        Access::Granted(user)
    } else {
        crate::debug!("auth"; "denied `{}`", user);
        Access::Denied
    }
}

/// `Basic <base64(user:password)>` → `(user, password)`
fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (user, password) = text.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}
