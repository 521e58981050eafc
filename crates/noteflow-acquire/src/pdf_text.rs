//! PDF acquisition: extract text with `pdftotext` (poppler-utils).

use std::io::Write;

use tempfile::NamedTempFile;
use tokio::process::Command;

use noteflow_core::defaults::EXTRACTION_CMD_TIMEOUT_SECS;
use noteflow_core::{Error, Result};

/// Run an external command with a timeout, returning stdout as a string.
pub(crate) async fn run_cmd_with_timeout(cmd: &mut Command, timeout_secs: u64) -> Result<String> {
    let output = tokio::time::timeout(std::time::Duration::from_secs(timeout_secs), cmd.output())
        .await
        .map_err(|_| {
            Error::Extraction(format!(
                "external command timed out after {}s",
                timeout_secs
            ))
        })?
        .map_err(|e| Error::Extraction(format!("failed to execute command: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Extraction(format!(
            "command failed (exit {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Extract text from PDF bytes.
///
/// `pdftotext` reads from a file path, so the upload is staged through a
/// temporary file that is removed on drop.
pub async fn extract(data: &[u8], file_name: &str) -> Result<String> {
    if data.is_empty() {
        return Err(Error::UnsupportedInput("missing content".to_string()));
    }

    // Magic-byte check before anything touches the filesystem.
    if data.len() < 4 || &data[0..4] != b"%PDF" {
        return Err(Error::Extraction(format!(
            "file '{}' is not a valid PDF (missing %PDF header)",
            file_name
        )));
    }

    let mut tmpfile = NamedTempFile::new()
        .map_err(|e| Error::Extraction(format!("failed to create temp file: {}", e)))?;
    tmpfile
        .write_all(data)
        .map_err(|e| Error::Extraction(format!("failed to write temp file: {}", e)))?;
    let tmp_path = tmpfile.path().to_string_lossy().to_string();

    let text = run_cmd_with_timeout(
        Command::new("pdftotext").arg(&tmp_path).arg("-"),
        EXTRACTION_CMD_TIMEOUT_SECS,
    )
    .await?;

    if text.trim().is_empty() {
        return Err(Error::Extraction(format!(
            "no text recovered from '{}' (scanned PDF without a text layer?)",
            file_name
        )));
    }

    Ok(text)
}

/// Check whether `pdftotext` is on the PATH.
pub async fn health_check() -> bool {
    match Command::new("pdftotext").arg("-v").output().await {
        // pdftotext -v prints version to stderr and exits with 0 or 99
        // depending on the version. Both indicate the binary exists.
        Ok(output) => output.status.success() || output.status.code() == Some(99),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let err = extract(b"", "empty.pdf").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedInput(_)));
    }

    #[tokio::test]
    async fn test_invalid_magic_bytes_rejected() {
        let err = extract(b"not a pdf at all", "bad.pdf").await.unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
        assert!(err.to_string().contains("not a valid PDF"));
    }

    #[tokio::test]
    async fn test_extraction_from_minimal_pdf() {
        // Minimal valid PDF containing the text "Hello World".
        let pdf_bytes = b"%PDF-1.0
1 0 obj
<< /Type /Catalog /Pages 2 0 R >>
endobj

2 0 obj
<< /Type /Pages /Kids [3 0 R] /Count 1 >>
endobj

3 0 obj
<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792]
   /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>
endobj

4 0 obj
<< /Length 44 >>
stream
BT /F1 12 Tf 100 700 Td (Hello World) Tj ET
endstream
endobj

5 0 obj
<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>
endobj

xref
0 6
0000000000 65535 f
0000000009 00000 n
0000000058 00000 n
0000000115 00000 n
0000000266 00000 n
0000000360 00000 n

trailer
<< /Size 6 /Root 1 0 R >>
startxref
434
%%EOF";

        // Only run where pdftotext is installed.
        if !health_check().await {
            eprintln!("Skipping test_extraction_from_minimal_pdf: pdftotext not installed");
            return;
        }

        let text = extract(pdf_bytes, "hello.pdf").await.unwrap();
        assert!(
            text.contains("Hello World"),
            "expected 'Hello World' in: {}",
            text
        );
    }

    #[tokio::test]
    async fn test_command_failure_is_extraction_error() {
        let err = run_cmd_with_timeout(
            Command::new("pdftotext").arg("/nonexistent/path.pdf").arg("-"),
            EXTRACTION_CMD_TIMEOUT_SECS,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
