//! List file management: splitting into chunks, prefix editing, zipping.

use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::models::UploadedFileData;

/// One piece of a split list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileChunk {
    pub name: String,
    pub content: String,
    pub line_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrefixMode {
    Add,
    Remove,
}

impl FromStr for PrefixMode {
    type Err = AppError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "add" => Ok(PrefixMode::Add),
            "remove" => Ok(PrefixMode::Remove),
            other => Err(AppError::InvalidInput(format!(
                "Unsupported prefix mode: {} (expected add or remove)",
                other
            ))),
        }
    }
}

/// Sanitize a name for use inside an archive: base name only.
fn sanitize_archive_filename(filename: &str, fallback: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Split the file's non-blank lines into chunks of at most `chunk_size` lines.
/// Chunks are named `<stem>_part_<n>.txt`, numbered from 1.
pub fn split_lines(
    file: &UploadedFileData,
    chunk_size: usize,
) -> std::result::Result<Vec<FileChunk>, AppError> {
    if chunk_size == 0 {
        return Err(AppError::InvalidInput(
            "Chunk size must be greater than 0".to_string(),
        ));
    }
    if file.lines.is_empty() {
        return Err(AppError::InvalidInput("File is empty".to_string()));
    }

    let stem = sanitize_archive_filename(file.stem(), "numbers");
    let chunks: Vec<FileChunk> = file
        .lines
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, lines)| FileChunk {
            name: format!("{}_part_{}.txt", stem, index + 1),
            content: lines.join("\n"),
            line_count: lines.len(),
        })
        .collect();

    tracing::debug!(
        file = %file.name,
        lines = file.lines.len(),
        chunks = chunks.len(),
        "Split list file"
    );

    Ok(chunks)
}

/// Add or remove `prefix` on every line. Lines that already carry the prefix
/// are left alone when adding.
pub fn apply_prefix(lines: &[String], prefix: &str, mode: PrefixMode) -> Vec<String> {
    let prefix = prefix.trim();
    lines
        .iter()
        .map(|line| {
            let line = line.trim();
            match mode {
                PrefixMode::Add if prefix.is_empty() || line.starts_with(prefix) => line.to_string(),
                PrefixMode::Add => format!("{}{}", prefix, line),
                PrefixMode::Remove => line
                    .strip_prefix(prefix)
                    .filter(|_| !prefix.is_empty())
                    .unwrap_or(line)
                    .to_string(),
            }
        })
        .collect()
}

/// Zip the chunks into one archive.
pub fn zip_chunks(chunks: &[FileChunk]) -> Result<Vec<u8>> {
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for (index, chunk) in chunks.iter().enumerate() {
            let safe_filename =
                sanitize_archive_filename(&chunk.name, &format!("part_{}.txt", index + 1));

            zip.start_file(&safe_filename, options)
                .with_context(|| format!("Failed to add file to ZIP: {}", safe_filename))?;
            zip.write_all(chunk.content.as_bytes())
                .with_context(|| format!("Failed to write file data to ZIP: {}", safe_filename))?;
        }

        zip.finish().context("Failed to finalize ZIP archive")?;
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn file(lines: usize) -> UploadedFileData {
        let content: Vec<String> = (0..lines).map(|i| format!("+96279{:07}", i)).collect();
        UploadedFileData::new("batch.txt", content.join("\n"))
    }

    #[test]
    fn test_split_lines_into_chunks() {
        let chunks = split_lines(&file(5), 2).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].name, "batch_part_1.txt");
        assert_eq!(chunks[2].name, "batch_part_3.txt");
        assert_eq!(chunks[0].line_count, 2);
        assert_eq!(chunks[2].line_count, 1);
        assert_eq!(chunks[0].content, "+962790000000\n+962790000001");
    }

    #[test]
    fn test_split_rejects_zero_chunk_size() {
        assert!(split_lines(&file(3), 0).is_err());
        assert!(split_lines(&UploadedFileData::new("e.txt", "\n"), 10).is_err());
    }

    #[test]
    fn test_add_prefix_skips_already_prefixed() {
        let lines = vec!["791234567".to_string(), "+962781234567".to_string()];
        assert_eq!(
            apply_prefix(&lines, "+962", PrefixMode::Add),
            vec!["+962791234567", "+962781234567"]
        );
    }

    #[test]
    fn test_remove_prefix() {
        let lines = vec!["+962791234567".to_string(), "0791234567".to_string()];
        assert_eq!(
            apply_prefix(&lines, "+962", PrefixMode::Remove),
            vec!["791234567", "0791234567"]
        );
        assert_eq!(apply_prefix(&lines, "", PrefixMode::Remove), lines);
    }

    #[test]
    fn test_prefix_mode_from_str() {
        assert_eq!("ADD".parse::<PrefixMode>().unwrap(), PrefixMode::Add);
        assert_eq!("remove".parse::<PrefixMode>().unwrap(), PrefixMode::Remove);
        assert!("replace".parse::<PrefixMode>().is_err());
    }

    #[test]
    fn test_zip_chunks_contains_every_part() {
        let chunks = split_lines(&file(3), 2).unwrap();
        let bytes = zip_chunks(&chunks).unwrap();

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut second = String::new();
        archive
            .by_name("batch_part_2.txt")
            .unwrap()
            .read_to_string(&mut second)
            .unwrap();
        assert_eq!(second, "+962790000002");
    }

    #[test]
    fn test_sanitize_archive_filename() {
        assert_eq!(sanitize_archive_filename("../../etc/passwd", "x"), "passwd");
        assert_eq!(sanitize_archive_filename("..", "x"), "x");
    }
}
