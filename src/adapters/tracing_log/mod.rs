// Tracing log adapter - Structured logging using tracing crate

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::ports::*;

/// Log handle forwarding to the globally installed tracing subscriber.
///
/// A scoped handle tags every record with the file or group it concerns.
#[derive(Debug, Default, Clone)]
pub struct TracingLogAdapter {
    scope: Option<String>,
}

impl TracingLogAdapter {
    pub fn new() -> Self {
        Self { scope: None }
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Child adapter with `scope` appended to this one's
    pub fn child(&self, scope: &str) -> Self {
        let scope = match &self.scope {
            Some(parent) => format!("{}/{}", parent, scope),
            None => scope.to_string(),
        };
        Self { scope: Some(scope) }
    }
}

impl LogPort for TracingLogAdapter {
    fn info(&self, message: &str) {
        match &self.scope {
            Some(scope) => info!(scope = %scope, "{}", message),
            None => info!("{}", message),
        }
    }

    fn warn(&self, message: &str) {
        match &self.scope {
            Some(scope) => warn!(scope = %scope, "{}", message),
            None => warn!("{}", message),
        }
    }

    fn error(&self, message: &str) {
        match &self.scope {
            Some(scope) => error!(scope = %scope, "{}", message),
            None => error!("{}", message),
        }
    }

    fn debug(&self, message: &str) {
        match &self.scope {
            Some(scope) => debug!(scope = %scope, "{}", message),
            None => debug!("{}", message),
        }
    }

    fn scoped(&self, scope: &str) -> Arc<dyn LogPort> {
        Arc::new(self.child(scope))
    }
}
