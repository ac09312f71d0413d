//! Sandbox launcher arguments contributed by resolution.

use std::path::Path;

use crate::capability::Capability;

/// Ordered, duplicate-free set of launcher option letters.
///
/// Holds at most [`FlagSet::CAPACITY`] letters, one per flag-only capability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    flags: Vec<char>,
}

impl FlagSet {
    /// Number of capabilities that map to an option letter.
    pub const CAPACITY: usize = Capability::FLAG_ONLY.len();

    pub fn new() -> Self {
        Self {
            flags: Vec::with_capacity(Self::CAPACITY),
        }
    }

    /// Record the option letter for `capability`.
    ///
    /// Returns `false` when the capability has no letter or is already present.
    pub fn insert(&mut self, capability: Capability) -> bool {
        let Some(flag) = capability.flag() else {
            return false;
        };
        if self.flags.contains(&flag) {
            return false;
        }
        self.flags.push(flag);
        debug_assert!(self.flags.len() <= Self::CAPACITY);
        true
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Combined short-option token, e.g. `-in`; `None` when no flag was set.
    pub fn to_token(&self) -> Option<String> {
        if self.flags.is_empty() {
            return None;
        }
        Some(std::iter::once('-').chain(self.flags.iter().copied()).collect())
    }
}

/// Launcher arguments: resource option/path pairs, then the combined flag token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LauncherArgs {
    resources: Vec<String>,
    flags: FlagSet,
}

impl LauncherArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_flag(&mut self, capability: Capability) -> bool {
        self.flags.insert(capability)
    }

    /// Append `<option> <path>` for a resource capability.
    ///
    /// Capabilities without a resource option are ignored.
    pub fn push_resource(&mut self, capability: Capability, path: &Path) {
        if let Some(option) = capability.resource_option() {
            self.resources.push(option.to_string());
            self.resources.push(path.display().to_string());
        }
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// Final ordered token list.
    pub fn to_vec(&self) -> Vec<String> {
        let mut args = self.resources.clone();
        args.extend(self.flags.to_token());
        args
    }
}
