//! # Error Types
//!
//! Error types for the Frontdoor exposure resolver using `thiserror`.

/// Custom result type for Frontdoor operations
pub type Result<T> = std::result::Result<T, FrontdoorError>;

/// Main error type for resolution, declaration loading and plan rendering
#[derive(thiserror::Error, Debug)]
pub enum FrontdoorError {
    /// An input combination is structurally invalid
    #[error("Configuration error: {message} (input: {input}, rule: {rule})")]
    Configuration {
        message: String,
        input: String,
        rule: String,
    },

    /// An operation was invoked against a descriptor in an incompatible mode
    #[error("Invalid state: {message} (operation: {operation}, mode: {mode})")]
    InvalidState {
        message: String,
        operation: String,
        mode: String,
    },

    /// Malformed declared input
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Declaration source could not be layered or deserialized
    #[error("Declaration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Plan rendering errors
    #[error("Serialization error: {context}: {message}")]
    Serialization { message: String, context: String },
}

impl FrontdoorError {
    /// Create a configuration error naming the offending input and the violated rule
    pub fn configuration<M, I, R>(message: M, input: I, rule: R) -> Self
    where
        M: Into<String>,
        I: Into<String>,
        R: Into<String>,
    {
        Self::Configuration { message: message.into(), input: input.into(), rule: rule.into() }
    }

    /// Create an invalid state error
    pub fn invalid_state<M, O, D>(message: M, operation: O, mode: D) -> Self
    where
        M: Into<String>,
        O: Into<String>,
        D: Into<String>,
    {
        Self::InvalidState {
            message: message.into(),
            operation: operation.into(),
            mode: mode.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a declaration loading error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a declaration loading error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a serialization error
    pub fn serialization<M: Into<String>, C: Into<String>>(message: M, context: C) -> Self {
        Self::Serialization { message: message.into(), context: context.into() }
    }

    /// Add context to an error (used by the `ErrorContext` trait)
    pub(crate) fn add_context(&mut self, context: String) {
        match self {
            FrontdoorError::Io { context: ref mut ctx, .. }
            | FrontdoorError::Serialization { context: ref mut ctx, .. } => {
                *ctx = format!("{}: {}", context, ctx);
            }
            FrontdoorError::Config { message: ref mut msg, .. } => {
                *msg = format!("{}: {}", context, msg);
            }
            _ => {}
        }
    }

    /// Process exit code the CLI reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            FrontdoorError::Configuration { .. } => 2,
            FrontdoorError::Validation { .. } => 2,
            FrontdoorError::InvalidState { .. } => 3,
            FrontdoorError::Serialization { .. } => 65,
            FrontdoorError::Io { .. } => 74,
            FrontdoorError::Config { .. } => 78,
        }
    }

    /// Whether the error comes from the declared inputs rather than the environment
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            FrontdoorError::Configuration { .. }
                | FrontdoorError::InvalidState { .. }
                | FrontdoorError::Validation { .. }
        )
    }
}

/// Attach human readable context to fallible results
pub trait ErrorContext<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<FrontdoorError>,
{
    fn context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            error.add_context(context.into());
            error
        })
    }
}

impl From<std::io::Error> for FrontdoorError {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<serde_json::Error> for FrontdoorError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string(), "JSON serialization failed")
    }
}

impl From<serde_yaml::Error> for FrontdoorError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::serialization(error.to_string(), "YAML serialization failed")
    }
}

impl From<config::ConfigError> for FrontdoorError {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Declaration loading failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for FrontdoorError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        collect_field_errors("", &errors, &mut fields);
        fields.sort();

        let first_field = fields.first().map(|(field, _)| field.clone());
        let message = fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages))
            .collect::<Vec<_>>()
            .join("; ");

        Self::Validation { message: format!("Validation failed: {}", message), field: first_field }
    }
}

fn collect_field_errors(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<(String, String)>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path =
            if prefix.is_empty() { field.to_string() } else { format!("{}.{}", prefix, field) };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or_else(|| e.code.to_string(), |m| m.to_string())
                    })
                    .collect();
                out.push((path, messages.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => collect_field_errors(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_field_errors(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}
