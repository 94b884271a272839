use crate::extract::ExtractionError;
use thiserror::Error;
use tts_client::TtsError;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("No chapters selected for conversion")]
    EmptySelection,

    #[error("Synthesis failed: {0}")]
    Synthesis(#[from] TtsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn job_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "Job",
            id: id.to_string(),
        }
    }

    pub fn document_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "Document",
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        assert_eq!(Error::job_not_found("abc").to_string(), "Job not found: abc");
        assert_eq!(
            Error::document_not_found("1234").to_string(),
            "Document not found: 1234"
        );
    }

    #[test]
    fn test_synthesis_message() {
        let err: Error = TtsError::RateLimited { retry_after: None }.into();
        assert_eq!(err.to_string(), "Synthesis failed: Rate limit exceeded");
    }
}
