// src/workflow/validation.rs
use super::host::{Attachment, SubmissionInput};
use crate::error::{FileRejection, InputField, ValidationError};
use crate::utils::BYTES_PER_MB;

/// Largest CV accepted by the upload widget.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 200 * BYTES_PER_MB;

/// Check the picked file on its own, so the user hears about a bad file
/// before filling the rest of the form.
pub fn validate_selected_file(
    file: Option<&Attachment>,
    max_bytes: u64,
) -> Result<(), FileRejection> {
    let file = file.ok_or(FileRejection::NoFile)?;

    if file.size > max_bytes {
        return Err(FileRejection::TooLarge {
            size: file.size,
            limit_mb: max_bytes.div_ceil(BYTES_PER_MB),
        });
    }

    Ok(())
}

pub fn validate_submission(input: &SubmissionInput, max_bytes: u64) -> Result<(), ValidationError> {
    let mut missing = Vec::new();
    if input.file.is_none() {
        missing.push(InputField::CvFile);
    }
    if input.free_text.trim().is_empty() {
        missing.push(InputField::Interests);
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    validate_selected_file(input.file.as_ref(), max_bytes)?;
    Ok(())
}
