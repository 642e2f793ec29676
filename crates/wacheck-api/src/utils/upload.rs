//! Multipart upload helpers

use axum::extract::Multipart;
use wacheck_core::AppError;

/// Uploaded list file plus any plain text fields sent alongside it.
#[derive(Debug, Default)]
pub struct UploadedForm {
    pub file_name: String,
    pub content: String,
    pub fields: Vec<(String, String)>,
}

impl UploadedForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Extract the `file` field (UTF-8 text) and the remaining text fields.
/// Only one field named "file" is accepted; multiple file fields are rejected.
pub async fn extract_multipart_text(
    mut multipart: Multipart,
    max_size: usize,
) -> Result<UploadedForm, AppError> {
    let mut form = UploadedForm::default();
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "file" {
            if file_data.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            form.file_name = field
                .file_name()
                .map(|s: &str| s.to_string())
                .unwrap_or_else(|| "upload.txt".to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;
            file_data = Some(data.to_vec());
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read field {}: {}", field_name, e)))?;
            form.fields.push((field_name, value));
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;
    validate_file_size(file_data.len(), max_size)?;

    form.content = String::from_utf8(file_data)
        .map_err(|_| AppError::InvalidInput("File must be UTF-8 text".to_string()))?;

    Ok(form)
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wacheck_core::ErrorMetadata;

    #[test]
    fn test_validate_file_size() {
        assert!(validate_file_size(10, 10).is_ok());
        let err = validate_file_size(5 * 1024 * 1024 + 1, 5 * 1024 * 1024).unwrap_err();
        assert_eq!(err.http_status_code(), 413);
        assert!(err.client_message().contains("5 MB"));
    }

    #[test]
    fn test_form_field_lookup() {
        let form = UploadedForm {
            fields: vec![("chunkSize".to_string(), "100".to_string())],
            ..Default::default()
        };
        assert_eq!(form.field("chunkSize"), Some("100"));
        assert_eq!(form.field("prefix"), None);
    }
}
