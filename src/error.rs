use thiserror::Error;

/// Failures decoding a family graph. Layout itself never fails.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("graph is neither valid JSON ({json}) nor JSON5 ({json5})")]
    Decode { json: String, json5: String },
    #[error("failed to read graph input: {0}")]
    Io(#[from] std::io::Error),
}
