use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state file {path} is missing and this store requires one to exist")]
    MissingRequired { path: String },

    #[error("state file {path} is empty and this store requires a populated file")]
    EmptyRequired { path: String },

    #[error("failed to read state file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("failed to parse state file {path}: {source}")]
    Parse { path: String, #[source] source: serde_json::Error },

    #[error("failed to write temp state file {path}: {source}")]
    Write { path: String, #[source] source: std::io::Error },

    #[error("failed to persist state file {path}: {source}")]
    Rename { path: String, #[source] source: std::io::Error },
}
