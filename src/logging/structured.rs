use std::collections::BTreeMap;
use tracing::{debug, error, info, trace, warn};

/// Fields attached to every line a component logs
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Emitting unit, e.g. `grid_poller` or `store`
    pub component: String,
    /// Orchestrator run id
    pub session_id: Option<String>,
    /// Extra key/value pairs, rendered in key order
    pub extra_fields: BTreeMap<String, String>,
}

impl LogContext {
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            session_id: None,
            extra_fields: BTreeMap::new(),
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.extra_fields.insert(key.to_string(), value.into());
        self
    }

    fn render(&self) -> String {
        let session = self
            .session_id
            .iter()
            .map(|id| format!("session_id={}", id));
        let extra = self
            .extra_fields
            .iter()
            .map(|(key, value)| format!("{}={}", key, value));
        std::iter::once(format!("component={}", self.component))
            .chain(session)
            .chain(extra)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Component logger; the context is rendered once, on construction
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    context: LogContext,
    fields: String,
}

impl StructuredLogger {
    pub fn new(context: LogContext) -> Self {
        let fields = context.render();
        Self { context, fields }
    }

    pub fn context(&self) -> &LogContext {
        &self.context
    }

    /// Rendered `key=value` list emitted as the `fields` attribute
    pub fn fields(&self) -> &str {
        &self.fields
    }

    pub fn info(&self, message: &str) {
        info!(fields = %self.fields, "{}", message);
    }

    pub fn warn(&self, message: &str) {
        warn!(fields = %self.fields, "{}", message);
    }

    pub fn error(&self, message: &str) {
        error!(fields = %self.fields, "{}", message);
    }

    pub fn debug(&self, message: &str) {
        debug!(fields = %self.fields, "{}", message);
    }

    pub fn trace(&self, message: &str) {
        trace!(fields = %self.fields, "{}", message);
    }
}

/// Logger tagged with the component name only
pub fn get_logger(component: &str) -> StructuredLogger {
    StructuredLogger::new(LogContext::new(component))
}

pub fn get_logger_with_context(context: LogContext) -> StructuredLogger {
    StructuredLogger::new(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context() {
        let context = LogContext::new("test")
            .with_session_id("run_123")
            .with_field("feed", "solar");

        assert_eq!(context.component, "test");
        assert_eq!(context.session_id.as_deref(), Some("run_123"));
        assert_eq!(
            context.extra_fields.get("feed").map(String::as_str),
            Some("solar")
        );
    }

    #[test]
    fn test_fields_are_ordered() {
        let logger = get_logger_with_context(
            LogContext::new("session")
                .with_session_id("r1")
                .with_field("z", "1")
                .with_field("a", "2"),
        );
        assert_eq!(logger.fields(), "component=session,session_id=r1,a=2,z=1");
    }

    #[test]
    fn test_get_logger() {
        let logger = get_logger("store");
        assert_eq!(logger.context().component, "store");
        assert_eq!(logger.fields(), "component=store");
    }
}
