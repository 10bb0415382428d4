use std::path::PathBuf;

/// All domain errors for nsdiff.
///
/// Each variant provides enough context to act on the failure
/// without re-running the command in verbose mode.
#[derive(Debug, thiserror::Error)]
pub enum NsdiffError {
    #[error(
        "File not found: {path}\n\n  \
         Check that the path is correct and the file exists."
    )]
    FileNotFound { path: PathBuf },

    #[error(
        "Parse error in namespace '{namespace}' ({format}): {detail}\n\n  \
         The namespace content is not valid {format}.\n  \
         Fix it in the portal, or compare it as plain text."
    )]
    ParseError {
        namespace: String,
        format: String,
        detail: String,
    },

    #[error("Invalid selection: {detail}")]
    InvalidSelection { detail: String },

    #[error(
        "Portal request failed: {reason}\n\n  \
         Check that the portal is reachable and the URL is correct.\n  \
         Configure it in .nsdiff/config.toml or pass --portal <url>."
    )]
    Network { reason: String },

    #[error("Portal returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error(
        "Permission denied: you are not a master of app '{app_id}'\n\n  \
         Ask one of the app masters to perform the operation:\n    \
         → {master_users}"
    )]
    PermissionDenied {
        app_id: String,
        master_users: String,
    },

    #[error(
        "Permission denied: {operation} requires the portal root permission\n\n  \
         Ask a portal administrator to run it for you."
    )]
    RootRequired { operation: String },

    #[error(
        "Namespace '{namespace}' is still in use: {detail}\n\n  \
         Deleting it may break running clients.\n  \
         Re-run with --force once you are sure it can go."
    )]
    NamespaceInUse { namespace: String, detail: String },

    #[error(
        "User '{user_id}' not found\n\n  \
         Run 'nsdiff users list' to see existing users."
    )]
    UserNotFound { user_id: String },

    #[error("Invalid input: {detail}")]
    InvalidInput { detail: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error("Background task failed: {detail}")]
    TaskFailed { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NsdiffError>;

impl NsdiffError {
    /// Build a parse error for the given namespace and format label.
    pub fn parse(namespace: &str, format: &str, detail: impl std::fmt::Display) -> Self {
        NsdiffError::ParseError {
            namespace: namespace.to_string(),
            format: format.to_string(),
            detail: detail.to_string(),
        }
    }
}
