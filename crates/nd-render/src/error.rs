//! Render engine error types.

use nd_notion::NotionError;

/// Error from the render pipeline.
///
/// Any variant reaching [`crate::DeferredRenderer::process`] aborts the run.
/// [`NotionError::NotFound`] is recovered from exactly once, at the mention
/// boundary, where a dangling reference becomes an inline placeholder
/// instead of an error.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Notion API failure.
    #[error(transparent)]
    Api(#[from] NotionError),

    /// A record lacks a property the configuration requires.
    #[error("page {url} is missing required property '{property}'")]
    MissingRequiredProperty {
        /// Property display name.
        property: String,
        /// URL of the offending record, for the error message.
        url: String,
    },

    /// A mentioned page can never have its own file.
    #[error("invalid mention target '{text}' ({id}): {reason}")]
    InvalidMentionTarget {
        /// Plain text of the mention span.
        text: String,
        /// Id of the mentioned record.
        id: String,
        /// Why the target cannot be linked.
        reason: String,
    },

    /// A view names a property the parse did not produce.
    #[error("view references unknown property '{name}' in {context}")]
    UnknownProperty {
        /// Property display name.
        name: String,
        /// Where the name was used (group-by or include).
        context: &'static str,
    },

    /// A queued render action panicked or was cancelled.
    #[error("render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// I/O error while writing output files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error while building frontmatter.
    #[error("frontmatter error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error while writing the index artifact.
    #[error("index error: {0}")]
    Json(#[from] serde_json::Error),
}
