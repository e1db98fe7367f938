pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown chart archetype: {name}")]
    UnknownArchetype { name: String },

    #[error("Unknown theme: {name}")]
    UnknownTheme { name: String },

    #[error("Unknown product id: {id}")]
    UnknownProduct { id: String },

    #[error("Chart record not found: {id}")]
    ChartNotFound { id: String },

    #[error("Chart record {id} already exists")]
    DuplicateChart { id: String },

    #[error("Chart store error: {message}")]
    Store { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
