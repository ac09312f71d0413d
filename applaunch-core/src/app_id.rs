use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bus::name::is_well_known_name;
use crate::error::ResolveError;

/// Validated application identity, e.g. `org.gnome.Maps`.
///
/// The identity doubles as a bus name the application always owns, so it
/// must be a valid well-known bus name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppId(String);

impl AppId {
    pub fn parse(value: &str) -> Result<Self, ResolveError> {
        if is_well_known_name(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(ResolveError::InvalidAppId(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AppId {
    type Err = ResolveError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for AppId {
    type Error = ResolveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AppId> for String {
    fn from(app_id: AppId) -> Self {
        app_id.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reverse_dns_ids() {
        assert_eq!(AppId::parse("org.gnome.Maps").unwrap().as_str(), "org.gnome.Maps");
    }

    #[test]
    fn rejects_invalid_ids() {
        for value in ["", "Maps", ":1.5", "org.gnome.Maps.*", "org/gnome"] {
            assert!(
                matches!(AppId::parse(value), Err(ResolveError::InvalidAppId(_))),
                "{value:?}"
            );
        }
    }
}
