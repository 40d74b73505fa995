//! Error handling for docket
//!
//! Two layers, as everywhere else in the crate:
//! 1. [`DocketError`] - strongly-typed failure cases raised by the library
//! 2. [`ErrorContext`] - the user-facing wrapper with details and a suggestion
//!
//! Orchestration code works with [`anyhow::Result`]; the binary converts whatever
//! bubbles up through [`user_friendly_error`] before printing it.
//!
//! # Error classes
//!
//! - **Validation**: [`DocketError::InvalidPluginName`], [`DocketError::UnsupportedPluginType`].
//!   Raised at construction time, never retried.
//! - **Fatal startup**: [`DocketError::AliasDefinitionsUnavailable`],
//!   [`DocketError::SettingsError`], [`DocketError::GithubTokenRequired`].
//! - **Upstream**: [`DocketError::RegistryUnavailable`], [`DocketError::SourceRequest`],
//!   [`DocketError::GithubApi`]. Usually absorbed by the caller and logged.
//! - **Tooling**: [`DocketError::GitNotFound`], [`DocketError::GitCommandError`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use docket_cli::core::{DocketError, user_friendly_error};
//!
//! let error = DocketError::InvalidPluginName {
//!     name: "not-a-plugin".to_string(),
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for docket operations
#[derive(Error, Debug)]
pub enum DocketError {
    /// A package name does not follow the `<prefix>-<type>-<name>` pattern
    #[error("Invalid plugin name `{name}`")]
    InvalidPluginName {
        /// The offending package name
        name: String,
    },

    /// The plugin type is unknown, or not allowed for the requested plugin variant
    #[error("{desc} plugin type `{plugin_type}` not supported as {role}")]
    UnsupportedPluginType {
        /// Log-friendly description of the plugin being constructed
        desc: String,
        /// The rejected type
        plugin_type: String,
        /// The variant role, e.g. "a top-level plugin"
        role: String,
    },

    /// The alias registry document could not be loaded or was empty
    #[error("Alias definitions unavailable: {reason}")]
    AliasDefinitionsUnavailable {
        /// Why loading failed
        reason: String,
    },

    /// A registry version string could not be parsed
    #[error("Malformed version number `{version}`")]
    InvalidVersion {
        /// The rejected version string
        version: String,
    },

    /// The package registry could not serve a request
    #[error("Registry request for `{package}` failed: {reason}")]
    RegistryUnavailable {
        /// The package being looked up
        package: String,
        /// Status or transport failure
        reason: String,
    },

    /// A package has no published releases at all
    #[error("No releases published for `{package}`")]
    NoReleases {
        /// The package name
        package: String,
    },

    /// Reading from a source host failed for a reason other than "not found"
    #[error("Source request to {url} failed: {reason}")]
    SourceRequest {
        /// The requested URL
        url: String,
        /// Status or transport failure
        reason: String,
    },

    /// An operation needs an authenticated GitHub client
    #[error("GitHub token required for {operation}")]
    GithubTokenRequired {
        /// The operation that needed authentication
        operation: String,
    },

    /// A GitHub API call returned an unexpected response
    #[error("GitHub API call `{operation}` failed: {reason}")]
    GithubApi {
        /// The API operation
        operation: String,
        /// Status and body summary
        reason: String,
    },

    /// Git executable not found in PATH
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// Git operation failed during execution
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed (e.g., "commit", "push")
        operation: String,
        /// The error output from the git command
        stderr: String,
    },

    /// Settings document missing or malformed
    #[error("Invalid settings file {path}: {reason}")]
    SettingsError {
        /// Path of the settings document
        path: String,
        /// Parse or read failure
        reason: String,
    },

    /// Index template failed to render
    #[error("Template `{name}` failed to render: {reason}")]
    TemplateError {
        /// Template name
        name: String,
        /// Renderer message
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Anything else
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl Clone for DocketError {
    fn clone(&self) -> Self {
        match self {
            Self::InvalidPluginName {
                name,
            } => Self::InvalidPluginName {
                name: name.clone(),
            },
            Self::UnsupportedPluginType {
                desc,
                plugin_type,
                role,
            } => Self::UnsupportedPluginType {
                desc: desc.clone(),
                plugin_type: plugin_type.clone(),
                role: role.clone(),
            },
            Self::AliasDefinitionsUnavailable {
                reason,
            } => Self::AliasDefinitionsUnavailable {
                reason: reason.clone(),
            },
            Self::InvalidVersion {
                version,
            } => Self::InvalidVersion {
                version: version.clone(),
            },
            Self::RegistryUnavailable {
                package,
                reason,
            } => Self::RegistryUnavailable {
                package: package.clone(),
                reason: reason.clone(),
            },
            Self::NoReleases {
                package,
            } => Self::NoReleases {
                package: package.clone(),
            },
            Self::SourceRequest {
                url,
                reason,
            } => Self::SourceRequest {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::GithubTokenRequired {
                operation,
            } => Self::GithubTokenRequired {
                operation: operation.clone(),
            },
            Self::GithubApi {
                operation,
                reason,
            } => Self::GithubApi {
                operation: operation.clone(),
                reason: reason.clone(),
            },
            Self::GitNotFound => Self::GitNotFound,
            Self::GitCommandError {
                operation,
                stderr,
            } => Self::GitCommandError {
                operation: operation.clone(),
                stderr: stderr.clone(),
            },
            Self::SettingsError {
                path,
                reason,
            } => Self::SettingsError {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::TemplateError {
                name,
                reason,
            } => Self::TemplateError {
                name: name.clone(),
                reason: reason.clone(),
            },
            // io::Error is not Clone
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Displayed as the error in red, then optional details in yellow and an
/// optional suggestion in green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: DocketError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: DocketError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`]
///
/// Recognises [`DocketError`] (with tailored suggestions), IO errors and template
/// errors; anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(docket_error) = error.downcast_ref::<DocketError>() {
        return create_error_context(docket_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(DocketError::Other {
                    message: io_error.to_string(),
                })
                .with_suggestion("Check that the output directory is writable")
                .with_details("docket could not read or write a file");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(DocketError::Other {
                    message: io_error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(tera_error) = error.downcast_ref::<tera::Error>() {
        return ErrorContext::new(DocketError::TemplateError {
            name: "index".to_string(),
            reason: tera_error.to_string(),
        })
        .with_details("Index templates are bundled with the binary; this indicates a rendering bug");
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(DocketError::Other {
        message,
    })
}

fn create_error_context(error: DocketError) -> ErrorContext {
    match &error {
        DocketError::InvalidPluginName { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Plugin packages must be named `logstash-<type>-<name>`, e.g. `logstash-input-beats`")
            .with_details("Supported types are input, output, filter, codec and integration"),

        DocketError::AliasDefinitionsUnavailable { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check your network connection and that the alias registry document is reachable")
            .with_details("Documentation cannot be generated without the alias table; no work was started"),

        DocketError::GithubTokenRequired { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Export a GitHub token: `export GITHUB_TOKEN=...`")
            .with_details("Tag listing, repository enumeration and pull requests use the authenticated GitHub API"),

        DocketError::GitNotFound => ErrorContext::new(DocketError::GitNotFound)
            .with_suggestion("Install git from https://git-scm.com/ or your package manager")
            .with_details("docket uses the system git executable to commit and push generated docs"),

        DocketError::GitCommandError { operation, stderr } => ErrorContext::new(error.clone())
            .with_suggestion(match operation.as_str() {
                "push" => "Check that your credentials allow pushing to the docs repository",
                "clone" => "Check the repository URL and your access to it",
                _ => "Try running the git command manually in the output directory for more details",
            })
            .with_details(stderr.clone()),

        DocketError::SettingsError { path, .. } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Fix or recreate the settings file at {path}"))
            .with_details("Settings must contain a `skip` list of package names"),

        _ => ErrorContext::new(error.clone()),
    }
}
