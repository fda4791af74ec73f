use thiserror::Error;

/// Failures a caller may want to tell apart from I/O or parse errors.
///
/// Everything else travels as `anyhow::Error` with file context attached.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The page range and selection left nothing to operate on
    #[error("No pages selected")]
    NothingSelected,

    #[error("{operation} needs at least {required} input files, got {given}")]
    NotEnoughInputs {
        operation: &'static str,
        required: usize,
        given: usize,
    },

    #[error("Nothing to convert: {0}")]
    EmptyInput(&'static str),

    #[error("Failed to decode {file}: {reason}")]
    Decode { file: String, reason: String },
}
