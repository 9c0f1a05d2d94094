//! JWT claims and authorization scopes.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Scope required to list blueprints.
pub const SCOPE_BLUEPRINTS_READ: &str = "blueprints.read";

/// Scope required to create blueprints.
pub const SCOPE_BLUEPRINTS_WRITE: &str = "blueprints.write";

/// An unordered set of authorization strings.
///
/// Serialized as a single space-delimited string. Deserializes from either
/// that form or a JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scopes(BTreeSet<String>);

impl Scopes {
    /// Scopes granted to every authenticated login.
    pub fn granted() -> Self {
        [SCOPE_BLUEPRINTS_READ, SCOPE_BLUEPRINTS_WRITE]
            .into_iter()
            .collect()
    }

    /// Parse a space-delimited scope string. Extra whitespace is ignored.
    pub fn parse(value: &str) -> Self {
        value.split_whitespace().collect()
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.0.contains(scope)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

}

impl<'a> FromIterator<&'a str> for Scopes {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Scopes(
            iter.into_iter()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl fmt::Display for Scopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.iter().collect::<Vec<_>>().join(" ");
        f.write_str(&joined)
    }
}

impl Serialize for Scopes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScopeRepr {
    Delimited(String),
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for Scopes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ScopeRepr::deserialize(deserializer)? {
            ScopeRepr::Delimited(value) => Scopes::parse(&value),
            ScopeRepr::List(values) => values
                .iter()
                .flat_map(|v| v.split_whitespace())
                .collect(),
        })
    }
}

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer.
    pub iss: String,

    /// Issued at (as Unix timestamp).
    pub iat: i64,

    /// Expiration time (as Unix timestamp).
    pub exp: i64,

    /// Subject (username).
    pub sub: String,

    /// Granted scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scopes>,

    /// Alternative scope claim, read only when `scope` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scp: Option<Scopes>,
}

impl Claims {
    /// Effective scopes: `scope` when present, otherwise `scp`.
    pub fn scopes(&self) -> Option<&Scopes> {
        self.scope.as_ref().or(self.scp.as_ref())
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes().is_some_and(|scopes| scopes.contains(scope))
    }

    /// Seconds between issuance and expiry.
    pub fn lifetime_seconds(&self) -> i64 {
        self.exp - self.iat
    }
}
