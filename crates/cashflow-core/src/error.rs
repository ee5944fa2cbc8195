pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid record ({id}): {message}")]
    InvalidRecord { id: String, message: String },

    #[error("Record totals overflow: {which} is {value}")]
    TotalOverflow { which: &'static str, value: f64 },

    #[error("Duplicate record id: {id}")]
    DuplicateId { id: String },

    #[error("Invalid layout config: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML input: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
