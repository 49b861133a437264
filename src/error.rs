use crate::domain::Stage;

/// Broad failure classes, so callers can branch without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Remote endpoint unreachable, or it rejected the country/indicator pair.
    Unreachable,
    /// Paging metadata or rows could not be interpreted.
    Fetch,
    /// A prerequisite stage has not completed yet.
    NotReady(Stage),
    /// The stage already ran on this pipeline instance.
    AlreadyCompleted(Stage),
    /// The forecaster could not produce a usable forecast.
    Model,
    Config,
    Io,
}

impl ErrorKind {
    fn default_exit_code(self) -> u8 {
        match self {
            ErrorKind::Config | ErrorKind::Io => 2,
            ErrorKind::Model => 3,
            ErrorKind::Unreachable | ErrorKind::Fetch => 4,
            ErrorKind::NotReady(_) | ErrorKind::AlreadyCompleted(_) => 5,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            exit_code: kind.default_exit_code(),
            message: message.into(),
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unreachable, message)
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch, message)
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Model, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    /// The stage is missing; the message names the call that produces it.
    pub fn not_ready(stage: Stage) -> Self {
        Self::new(
            ErrorKind::NotReady(stage),
            format!(
                "Pipeline stage '{}' has not completed. Call `{}` first.",
                stage.name(),
                stage.producer()
            ),
        )
    }

    pub fn already_completed(stage: Stage) -> Self {
        Self::new(
            ErrorKind::AlreadyCompleted(stage),
            format!(
                "Pipeline stage '{}' already completed; `{}` runs once per pipeline. Create a new pipeline to re-run it.",
                stage.name(),
                stage.producer()
            ),
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_ready_names_the_missing_call() {
        let err = AppError::not_ready(Stage::Loaded);
        assert_eq!(err.kind(), ErrorKind::NotReady(Stage::Loaded));
        assert_eq!(err.exit_code(), 5);
        assert!(err.to_string().contains("load()"), "{err}");

        let err = AppError::not_ready(Stage::Forecasted);
        assert!(err.to_string().contains("forecast()"), "{err}");
    }

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(AppError::config("x").exit_code(), 2);
        assert_eq!(AppError::model("x").exit_code(), 3);
        assert_eq!(AppError::unreachable("x").exit_code(), 4);
        assert_eq!(AppError::fetch("x").exit_code(), 4);
    }
}
