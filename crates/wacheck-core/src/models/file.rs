use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A list file loaded for the file tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileData {
    pub name: String,
    pub content: String,
    pub lines: Vec<String>,
}

impl UploadedFileData {
    /// Non-blank, trimmed lines of `content`
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let lines = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            name: name.into(),
            content,
            lines,
        }
    }

    /// File name without its extension
    pub fn stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_skip_blanks() {
        let file = UploadedFileData::new("numbers.txt", " +1234567890 \n\n+9876543210\r\n");
        assert_eq!(file.lines, vec!["+1234567890", "+9876543210"]);
        assert_eq!(file.stem(), "numbers");
    }

    #[test]
    fn test_stem_without_extension() {
        assert_eq!(UploadedFileData::new("list", "").stem(), "list");
        assert_eq!(UploadedFileData::new(".hidden", "").stem(), ".hidden");
    }
}
