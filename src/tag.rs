//! Tag readings and the reader seam.
//!
//! A reader is polled once per tick and must answer immediately: either no tag
//! is on the reader, or a tag identifier with whatever text the tag stores.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Stable identifier of a physical tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId(pub u64);

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

/// One poll result. `id == None` means no tag is currently detected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagReading {
    pub id: Option<TagId>,
    pub text: Option<String>,
}

impl TagReading {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn present(id: u64, text: Option<&str>) -> Self {
        Self {
            id: Some(TagId(id)),
            text: text.map(str::to_string),
        }
    }
}

pub trait TagReader {
    /// Poll the reader without waiting for a tag to appear.
    fn read_no_block(&mut self) -> TagReading;
}

/// Reads the current tag from a state file kept up to date by an external
/// card-reader helper.
///
/// The first line holds the hexadecimal identifier (an optional `0x` prefix is
/// accepted), everything after it is the text stored on the tag. A missing
/// file or a blank first line means no tag is present.
#[derive(Debug, Clone)]
pub struct FileTagReader {
    path: PathBuf,
}

impl FileTagReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TagReader for FileTagReader {
    fn read_no_block(&mut self) -> TagReading {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => parse_reading(&contents).unwrap_or_else(|raw| {
                tracing::warn!(
                    path = %self.path.display(),
                    id = %raw,
                    "Ignoring unparsable tag identifier"
                );
                TagReading::absent()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => TagReading::absent(),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read tag source"
                );
                TagReading::absent()
            }
        }
    }
}

/// Parse the reader state file. On a malformed identifier the offending text
/// is returned as the error.
fn parse_reading(contents: &str) -> Result<TagReading, String> {
    let (first, rest) = match contents.split_once('\n') {
        Some((first, rest)) => (first, Some(rest)),
        None => (contents, None),
    };
    let raw = first.trim();
    if raw.is_empty() {
        return Ok(TagReading::absent());
    }
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    let id = u64::from_str_radix(digits, 16).map_err(|_| raw.to_string())?;
    let text = rest.filter(|t| !t.is_empty());
    Ok(TagReading::present(id, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_id_renders_uppercase_hex_without_padding() {
        assert_eq!(TagId(0xA1B2).to_string(), "A1B2");
        assert_eq!(TagId(0x0f).to_string(), "F");
    }

    #[test]
    fn parses_identifier_and_text() {
        let reading = parse_reading("a1b2\nJazz Night \n").unwrap();
        assert_eq!(reading, TagReading::present(0xA1B2, Some("Jazz Night \n")));
    }

    #[test]
    fn identifier_only_has_no_text() {
        assert_eq!(
            parse_reading("0xDEADBEEF\n").unwrap(),
            TagReading::present(0xDEAD_BEEF, None)
        );
        assert_eq!(parse_reading("12").unwrap(), TagReading::present(0x12, None));
    }

    #[test]
    fn blank_contents_mean_no_tag() {
        assert_eq!(parse_reading("").unwrap(), TagReading::absent());
        assert_eq!(parse_reading("   \nleftover").unwrap(), TagReading::absent());
    }

    #[test]
    fn garbage_identifier_is_rejected() {
        assert_eq!(parse_reading("not-hex\ntext"), Err("not-hex".to_string()));
    }

    #[test]
    fn file_reader_treats_missing_file_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = FileTagReader::new(dir.path().join("current-tag"));
        assert_eq!(reader.read_no_block(), TagReading::absent());
    }

    #[test]
    fn file_reader_follows_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("current-tag");
        let mut reader = FileTagReader::new(&path);

        std::fs::write(&path, "04A1B2\nRoad Trip").unwrap();
        assert_eq!(
            reader.read_no_block(),
            TagReading::present(0x04A1B2, Some("Road Trip"))
        );

        std::fs::write(&path, "").unwrap();
        assert_eq!(reader.read_no_block(), TagReading::absent());

        std::fs::write(&path, "zz").unwrap();
        assert_eq!(reader.read_no_block(), TagReading::absent());
    }
}
