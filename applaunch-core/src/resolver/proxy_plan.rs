//! Instructions for the external bus proxy process.

use std::path::PathBuf;

use serde::Serialize;

use crate::bus::{FilterRule, render_filter_args};

/// One proxied bus: upstream address, local endpoint, optional filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyRequest {
    pub address: String,
    pub endpoint: PathBuf,
    /// `None` for an unfiltered proxy.
    pub filter: Option<Vec<FilterRule>>,
}

impl ProxyRequest {
    pub fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }

    /// `address endpoint [--filter rules...]`
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![self.address.clone(), self.endpoint.display().to_string()];
        if let Some(rules) = &self.filter {
            args.extend(render_filter_args(rules));
        }
        args
    }
}

/// Ordered proxy requests for a launch; empty when every bus is direct or absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BusProxyPlan {
    requests: Vec<ProxyRequest>,
}

impl BusProxyPlan {
    pub(crate) fn push(&mut self, request: ProxyRequest) {
        self.requests.push(request);
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn requests(&self) -> &[ProxyRequest] {
        &self.requests
    }

    /// Argument vector for a single proxy process serving every request.
    pub fn to_args(&self) -> Vec<String> {
        self.requests.iter().flat_map(ProxyRequest::to_args).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_id::AppId;
    use crate::bus::FilterRuleCompiler;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_filtered_and_unfiltered_requests() {
        let app = AppId::parse("org.example.Viewer").unwrap();
        let mut plan = BusProxyPlan::default();
        plan.push(ProxyRequest {
            address: "tcp:host=bus.example,port=1".into(),
            endpoint: PathBuf::from("/run/bus-proxy/system-bus-proxy-abc123"),
            filter: None,
        });
        plan.push(ProxyRequest {
            address: "unix:abstract=/tmp/dbus-x".into(),
            endpoint: PathBuf::from("/run/bus-proxy/session-bus-proxy-def456"),
            filter: Some(FilterRuleCompiler::new().compile(&app, &[])),
        });

        assert_eq!(
            plan.to_args(),
            vec![
                "tcp:host=bus.example,port=1",
                "/run/bus-proxy/system-bus-proxy-abc123",
                "unix:abstract=/tmp/dbus-x",
                "/run/bus-proxy/session-bus-proxy-def456",
                "--filter",
                "--own=org.example.Viewer",
                "--own=org.example.Viewer.*",
            ]
        );
        assert!(!plan.requests()[0].is_filtered());
        assert!(plan.requests()[1].is_filtered());
    }
}
