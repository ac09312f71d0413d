//! Compilation of bus proxy filter rules from manifest policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::name::is_well_known_name;
use crate::app_id::AppId;
use crate::policy_store::{PolicyStore, SESSION_BUS_POLICY_SECTION};

const WILDCARD_SUFFIX: &str = ".*";

/// Marker preceding the rule tokens of a filtered proxy endpoint.
pub const FILTER_MARKER: &str = "--filter";

/// What a sandboxed client may do with a bus name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyVerb {
    /// The name is visible.
    See,
    /// Messages may be exchanged with the name's owner.
    Talk,
    /// The name may be owned.
    Own,
}

impl PolicyVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::See => "see",
            Self::Talk => "talk",
            Self::Own => "own",
        }
    }
}

impl fmt::Display for PolicyVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized policy verb.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid bus policy verb: {0}")]
pub struct InvalidVerb(pub String);

impl FromStr for PolicyVerb {
    type Err = InvalidVerb;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "see" => Ok(Self::See),
            "talk" => Ok(Self::Talk),
            "own" => Ok(Self::Own),
            other => Err(InvalidVerb(other.to_string())),
        }
    }
}

/// A bus name, or every name below a prefix (`org.foo.*`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BusNamePattern(String);

/// Pattern that is neither a well-known bus name nor a valid wildcard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid bus name pattern: {0}")]
pub struct InvalidPattern(pub String);

impl BusNamePattern {
    /// Validate `pattern`.
    ///
    /// After stripping an optional trailing `.*`, the remainder must be a
    /// valid well-known bus name.
    pub fn parse(pattern: &str) -> Result<Self, InvalidPattern> {
        let name = pattern.strip_suffix(WILDCARD_SUFFIX).unwrap_or(pattern);
        if is_well_known_name(name) {
            Ok(Self(pattern.to_string()))
        } else {
            Err(InvalidPattern(pattern.to_string()))
        }
    }

    /// Exact-name pattern for an application id.
    pub fn exact(app_id: &AppId) -> Self {
        Self(app_id.as_str().to_string())
    }

    /// Wildcard pattern covering every name below an application id.
    pub fn subtree(app_id: &AppId) -> Self {
        Self(format!("{}{WILDCARD_SUFFIX}", app_id.as_str()))
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.ends_with(WILDCARD_SUFFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BusNamePattern {
    type Error = InvalidPattern;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BusNamePattern> for String {
    fn from(pattern: BusNamePattern) -> Self {
        pattern.0
    }
}

impl fmt::Display for BusNamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One authorization statement for the bus proxy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterRule {
    pub verb: PolicyVerb,
    pub name: BusNamePattern,
}

impl FilterRule {
    pub fn new(verb: PolicyVerb, name: BusNamePattern) -> Self {
        Self { verb, name }
    }

    /// Proxy command-line token, e.g. `--talk=org.foo.*`.
    pub fn to_arg(&self) -> String {
        format!("--{}={}", self.verb, self.name)
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.name)
    }
}

/// Render rules as proxy arguments, preceded by [`FILTER_MARKER`].
pub fn render_filter_args(rules: &[FilterRule]) -> Vec<String> {
    std::iter::once(FILTER_MARKER.to_string())
        .chain(rules.iter().map(FilterRule::to_arg))
        .collect()
}

/// Translates `Session Bus Policy` declarations into proxy filter rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilterRuleCompiler;

impl FilterRuleCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compile rules for `app_id` from `stores`, highest priority first.
    ///
    /// The application always owns its own id and every name below it; those
    /// two rules come first. Malformed entries are logged and skipped. Rules
    /// are not deduplicated; conflict resolution belongs to the proxy.
    pub fn compile(&self, app_id: &AppId, stores: &[&dyn PolicyStore]) -> Vec<FilterRule> {
        let mut rules = vec![
            FilterRule::new(PolicyVerb::Own, BusNamePattern::exact(app_id)),
            FilterRule::new(PolicyVerb::Own, BusNamePattern::subtree(app_id)),
        ];

        for store in stores {
            Self::append_store_rules(&mut rules, *store);
        }

        debug!(app_id = %app_id, rules = rules.len(), "Compiled session bus filter");
        rules
    }

    fn append_store_rules(rules: &mut Vec<FilterRule>, store: &dyn PolicyStore) {
        for key in store.keys(SESSION_BUS_POLICY_SECTION) {
            let name = match BusNamePattern::parse(key) {
                Ok(name) => name,
                Err(err) => {
                    warn!(entry = key, "Skipping bus policy entry: {err}");
                    continue;
                }
            };

            let raw_verb = store
                .get_str(SESSION_BUS_POLICY_SECTION, key)
                .unwrap_or_default();
            let verb = match raw_verb.parse::<PolicyVerb>() {
                Ok(verb) => verb,
                Err(err) => {
                    warn!(entry = key, "Skipping bus policy entry: {err}");
                    continue;
                }
            };

            rules.push(FilterRule::new(verb, name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy_store::ManifestStore;
    use pretty_assertions::assert_eq;

    fn app() -> AppId {
        AppId::parse("com.example.App").unwrap()
    }

    fn args(rules: &[FilterRule]) -> Vec<String> {
        rules.iter().map(FilterRule::to_arg).collect()
    }

    #[test]
    fn baseline_rules_only() {
        let rules = FilterRuleCompiler::new().compile(&app(), &[&ManifestStore::new()]);
        assert_eq!(
            args(&rules),
            vec!["--own=com.example.App", "--own=com.example.App.*"]
        );
        assert_eq!(rules[0].to_string(), "own com.example.App");
    }

    #[test]
    fn wildcard_entry_compiles() {
        let store = ManifestStore::new().with(SESSION_BUS_POLICY_SECTION, "org.foo.*", "talk");
        let rules = FilterRuleCompiler::new().compile(&app(), &[&store]);
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[2].to_string(), "talk org.foo.*");
        assert!(rules[2].name.is_wildcard());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let store = ManifestStore::new()
            .with(SESSION_BUS_POLICY_SECTION, "org.blocked", "block")
            .with(SESSION_BUS_POLICY_SECTION, ":1.42", "talk")
            .with(SESSION_BUS_POLICY_SECTION, "org.*.foo", "see")
            .with(SESSION_BUS_POLICY_SECTION, "org.numeric", 3_i64)
            .with(SESSION_BUS_POLICY_SECTION, "org.ok", "see");

        let rules = FilterRuleCompiler::new().compile(&app(), &[&store]);
        assert_eq!(
            args(&rules),
            vec![
                "--own=com.example.App",
                "--own=com.example.App.*",
                "--see=org.ok",
            ]
        );
    }

    #[test]
    fn runtime_store_precedes_application_store() {
        let runtime = ManifestStore::new()
            .with(SESSION_BUS_POLICY_SECTION, "org.freedesktop.portal.*", "talk");
        let application = ManifestStore::new()
            .with(SESSION_BUS_POLICY_SECTION, "org.freedesktop.Notifications", "talk")
            .with(SESSION_BUS_POLICY_SECTION, "org.freedesktop.portal.*", "see");

        let rules = FilterRuleCompiler::new().compile(&app(), &[&runtime, &application]);
        assert_eq!(
            args(&rules),
            vec![
                "--own=com.example.App",
                "--own=com.example.App.*",
                "--talk=org.freedesktop.portal.*",
                "--talk=org.freedesktop.Notifications",
                "--see=org.freedesktop.portal.*",
            ]
        );
    }

    #[test]
    fn renders_with_filter_marker() {
        let rules = FilterRuleCompiler::new().compile(&app(), &[]);
        assert_eq!(
            render_filter_args(&rules),
            vec![
                "--filter",
                "--own=com.example.App",
                "--own=com.example.App.*",
            ]
        );
    }

    #[test]
    fn pattern_validation() {
        assert!(BusNamePattern::parse("org.foo").is_ok());
        assert!(BusNamePattern::parse("org.foo.*").is_ok());
        assert!(BusNamePattern::parse("org.*").is_err());
        assert!(BusNamePattern::parse("*").is_err());
        assert!(BusNamePattern::parse(":1.2.*").is_err());
    }

    #[test]
    fn verbs_are_exact() {
        assert_eq!("own".parse::<PolicyVerb>(), Ok(PolicyVerb::Own));
        assert!("Own".parse::<PolicyVerb>().is_err());
        assert!("talk ".parse::<PolicyVerb>().is_err());
    }
}
