use std::path::Path;
use std::process::Command;

use tracing::{debug, error};

use crate::ocr::error::OcrEngineError;

/// Runs `exec_path` with `args` and blocks until it exits.
///
/// The arguments are passed to the process as-is; the space-joined form is
/// only used for logging. There is no timeout: a hung engine blocks the caller.
pub fn run_command(exec_path: &Path, args: &[String]) -> Result<(), OcrEngineError> {
    let params = args.join(" ");
    let command_line = format!("{} {}", exec_path.display(), params);
    debug!(command = %command_line, "running OCR engine");

    let output = match Command::new(exec_path).args(args).output() {
        Ok(output) => output,
        Err(err) => {
            error!("Command failed: {err}");
            return Err(OcrEngineError::TesseractFailed);
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(status = %output.status, stderr = %stderr.trim(), "Command failed: {command_line}");
        return Err(OcrEngineError::TesseractFailed);
    }

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn successful_process_is_ok() {
        assert!(run_command(Path::new("true"), &[]).is_ok());
    }

    #[test]
    fn failing_process_maps_to_engine_error() {
        let err = run_command(Path::new("false"), &["--flag".to_string()]).unwrap_err();
        assert_eq!(err.code(), OcrEngineError::TESSERACT_FAILED);
    }

    #[test]
    fn missing_executable_maps_to_engine_error() {
        let err = run_command(Path::new("/nonexistent/tesseract-binary"), &[]).unwrap_err();
        assert!(matches!(err, OcrEngineError::TesseractFailed));
    }
}
