//! Error types for loading and validating design documents

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::document::IdError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum DocumentError {
    /// The document is not valid TOML or does not match the schema
    #[error("document error: {message}")]
    Toml { message: String, span: Option<Span> },

    #[error("invalid node id '{id}': {source}")]
    InvalidId {
        id: String,
        #[source]
        source: IdError,
    },

    #[error("duplicate node id '{id}'")]
    DuplicateId { id: String },

    /// A child id that does not extend its parent's id by exactly one group
    #[error("node id '{id}' is not a child id of '{parent}'")]
    MisplacedId { id: String, parent: String },

    #[error("invalid constraint '{constraint_id}' on node '{node_id}': {reason}")]
    InvalidConstraint {
        node_id: String,
        constraint_id: String,
        reason: String,
    },

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for DocumentError {
    fn from(err: toml::de::Error) -> Self {
        DocumentError::Toml {
            message: err.message().to_string(),
            span: err.span(),
        }
    }
}

impl DocumentError {
    /// Get the source span if available
    pub fn span(&self) -> Option<&Span> {
        match self {
            DocumentError::Toml { span, .. } => span.as_ref(),
            _ => None,
        }
    }

    /// Format the error with source context using ariadne.
    ///
    /// Errors without a span fall back to their plain message.
    pub fn format(&self, source: &str, filename: &str) -> String {
        let Some(span) = self.span() else {
            return format!("Error: {}", self);
        };
        let message = self.to_string();

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span.clone()))
                    .with_message(&message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("Error: {}", message),
        }
    }
}
