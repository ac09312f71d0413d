//! Message bus plumbing: address parsing, name validation, proxy endpoint
//! allocation and filter rule compilation.

pub mod address;
pub mod filter;
pub mod name;
pub mod proxy;

pub use address::extract_local_path;
pub use filter::{BusNamePattern, FilterRule, FilterRuleCompiler, PolicyVerb, render_filter_args};
pub use proxy::{ProxySocketProvisioner, SESSION_BUS_TEMPLATE, SYSTEM_BUS_TEMPLATE};
