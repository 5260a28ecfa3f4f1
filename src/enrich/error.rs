use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Plan must be a JSON object, found {0}")]
    InvalidPlan(&'static str),

    #[error("Plan `segments` must be an array, found {0}")]
    InvalidSegments(&'static str),

    #[error("Plan `highlights` must be an array, found {0}")]
    InvalidHighlights(&'static str),

    #[error("Plan `meta` must be an object, found {0}")]
    InvalidMeta(&'static str),

    #[error("Failed to decode plan: {0}")]
    Json(#[from] serde_json::Error),
}

impl EnrichError {
    pub fn kind_name(value: &serde_json::Value) -> &'static str {
        match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "an array",
            serde_json::Value::Object(_) => "an object",
        }
    }
}
