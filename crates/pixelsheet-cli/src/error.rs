use std::path::PathBuf;

use pixelsheet_image::LoadError;
use pixelsheet_xlsx::XlsxWriteError;
use thiserror::Error;

/// Every way a conversion can fail. All of them are fatal and map to exit status 1.
#[derive(Debug, Error)]
pub enum CliError {
    /// Rejected before any file is touched.
    #[error("{0}")]
    InvalidArgument(String),
    #[error(transparent)]
    InputNotFound(LoadError),
    #[error(transparent)]
    ImageProcessing(LoadError),
    #[error("saving Excel file '{}': {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: XlsxWriteError,
    },
}

impl CliError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Process exit status for this error. Kinds are not distinguished.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        if err.is_not_found() {
            Self::InputNotFound(err)
        } else {
            Self::ImageProcessing(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn missing_input_keeps_the_path_in_the_message() {
        let err = CliError::from(LoadError::InputNotFound {
            path: Path::new("nope/cat.png").to_path_buf(),
        });
        assert!(matches!(err, CliError::InputNotFound(_)));
        assert_eq!(err.to_string(), "Input file 'nope/cat.png' not found.");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn other_load_failures_are_processing_errors() {
        let err = CliError::from(LoadError::InvalidDimensions {
            path: Path::new("flat.png").to_path_buf(),
            reason: "zero height".to_string(),
        });
        assert!(matches!(err, CliError::ImageProcessing(_)));
        assert!(err.to_string().contains("flat.png"), "{err}");
        assert_eq!(err.exit_code(), 1);
    }
}
