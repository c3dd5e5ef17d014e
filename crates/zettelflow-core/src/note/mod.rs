//! Note data structures for zettelflow
//!
//! A note is a single Markdown file: an optional `---` frontmatter header
//! followed by a body that the engine never rewrites.

pub mod frontmatter;
pub mod types;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, ZettelError};
use crate::vault::io::write_atomic;

pub use frontmatter::{build_document, parse_document, Frontmatter, FrontmatterValue};
pub use types::{NoteStatus, NoteType, Recommendation};

/// Well-known frontmatter keys
pub mod keys {
    pub const TYPE: &str = "type";
    pub const STATUS: &str = "status";
    pub const CREATED: &str = "created";
    pub const TAGS: &str = "tags";
    pub const QUALITY_SCORE: &str = "quality_score";
    pub const PROMOTED_DATE: &str = "promoted_date";
    pub const PROCESSED_DATE: &str = "processed_date";
    pub const AI_SUMMARY: &str = "ai_summary";
    pub const AI_PROCESSED: &str = "ai_processed";
    pub const TRIAGE_RECOMMENDATION: &str = "triage_recommendation";
}

/// Parsed state of the `ai_processed` flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiProcessed {
    Missing,
    Flag(bool),
    /// Present but not `true`/`false`
    Invalid(String),
}

/// A complete note (frontmatter + body) bound to its file
#[derive(Debug, Clone)]
pub struct Note {
    /// Location on disk
    pub path: PathBuf,
    /// Note frontmatter
    pub frontmatter: Frontmatter,
    /// Markdown content after the header, verbatim
    pub body: String,
}

impl Note {
    /// Parse a note from file content
    pub fn parse(content: &str, path: impl Into<PathBuf>) -> Self {
        let (frontmatter, body) = parse_document(content);
        Note {
            path: path.into(),
            frontmatter,
            body,
        }
    }

    /// Read and parse a note from disk
    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ZettelError::io_operation("read", display_name(path), e))?;
        if frontmatter::has_unclosed_header(&content) {
            tracing::warn!(path = %path.display(), "frontmatter header is never closed, treating file as body");
        }
        Ok(Self::parse(&content, path))
    }

    /// Serialize the note to Markdown
    pub fn to_markdown(&self) -> String {
        build_document(&self.frontmatter, &self.body)
    }

    /// Atomically write the note back to its path
    pub fn save(&self) -> Result<()> {
        write_atomic(&self.path, self.to_markdown().as_bytes())
    }

    /// File name including extension
    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }

    /// File name without the `.md` extension
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Declared note type; an unrecognised value is an error
    pub fn note_type(&self) -> Result<Option<NoteType>> {
        match self.frontmatter.get_str(keys::TYPE).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }

    /// Declared lifecycle status; an unrecognised value is an error
    pub fn status(&self) -> Result<Option<NoteStatus>> {
        match self.frontmatter.get_str(keys::STATUS).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }

    /// Raw `created` value, if any
    pub fn created(&self) -> Option<&str> {
        self.frontmatter
            .get_str(keys::CREATED)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Stored quality score; present but non-numeric or out of range is an error
    pub fn quality_score(&self) -> Result<Option<f64>> {
        let Some(raw) = self
            .frontmatter
            .get_str(keys::QUALITY_SCORE)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return Ok(None);
        };

        match raw.parse::<f64>() {
            Ok(score) if (0.0..=1.0).contains(&score) => Ok(Some(score)),
            _ => Err(ZettelError::invalid_value(
                keys::QUALITY_SCORE,
                format!("{} (expected a number between 0.0 and 1.0)", raw),
            )),
        }
    }

    /// Tags in header order, accepting list or comma/space separated scalar forms
    pub fn tags(&self) -> Vec<String> {
        let raw: Vec<String> = match self.frontmatter.get(keys::TAGS) {
            Some(FrontmatterValue::List(items)) => items.clone(),
            Some(FrontmatterValue::Scalar(s)) => s
                .split([',', ' '])
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        };

        let mut tags: Vec<String> = Vec::with_capacity(raw.len());
        for tag in raw {
            let tag = tag.trim().trim_start_matches('#').to_string();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    /// Parsed `ai_processed` flag
    pub fn ai_processed(&self) -> AiProcessed {
        match self.frontmatter.get(keys::AI_PROCESSED) {
            None => AiProcessed::Missing,
            Some(FrontmatterValue::Scalar(s)) => match s.trim() {
                "true" => AiProcessed::Flag(true),
                "false" => AiProcessed::Flag(false),
                other => AiProcessed::Invalid(other.to_string()),
            },
            Some(FrontmatterValue::List(items)) => AiProcessed::Invalid(format!("{:?}", items)),
        }
    }

    /// Stored triage recommendation, if present and recognised
    pub fn recommendation(&self) -> Option<Recommendation> {
        self.frontmatter
            .get_str(keys::TRIAGE_RECOMMENDATION)
            .and_then(|s| s.trim().parse().ok())
    }

    /// Targets of `[[wiki links]]` in the body (embeds excluded)
    pub fn wiki_links(&self) -> Vec<String> {
        extract_wiki_links(&self.body)
    }
}

/// File name of a path for messages
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

static WIKI_LINK_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Extract `[[target]]`, `[[target|label]]` and `[[target#heading]]` targets
pub fn extract_wiki_links(body: &str) -> Vec<String> {
    let re = match WIKI_LINK_RE.get_or_init(|| {
        Regex::new(r"(!?)\[\[([^\]|#]+)(?:#[^\]|]*)?(?:\|[^\]]*)?\]\]").ok()
    }) {
        Some(re) => re,
        None => {
            tracing::warn!("failed to compile wiki link regex");
            return Vec::new();
        }
    };

    let mut links = Vec::new();
    for cap in re.captures_iter(body) {
        if &cap[1] == "!" {
            continue;
        }
        let target = cap[2].trim().to_string();
        if !target.is_empty() && !links.contains(&target) {
            links.push(target);
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(text: &str) -> Note {
        Note::parse(text, "/vault/Inbox/idea.md")
    }

    #[test]
    fn test_typed_accessors() {
        let n = note("---\ntype: literature\nstatus: promoted\nquality_score: 0.85\n---\nBody\n");
        assert_eq!(n.note_type().unwrap(), Some(NoteType::Literature));
        assert_eq!(n.status().unwrap(), Some(NoteStatus::Promoted));
        assert_eq!(n.quality_score().unwrap(), Some(0.85));
        assert_eq!(n.file_name(), "idea.md");
        assert_eq!(n.stem(), "idea");
    }

    #[test]
    fn test_missing_fields_are_none() {
        let n = note("Body only\n");
        assert_eq!(n.note_type().unwrap(), None);
        assert_eq!(n.status().unwrap(), None);
        assert_eq!(n.quality_score().unwrap(), None);
        assert_eq!(n.created(), None);
    }

    #[test]
    fn test_invalid_quality_score_names_field() {
        let n = note("---\nquality_score: high\n---\n");
        let err = n.quality_score().unwrap_err();
        assert!(err.to_string().contains("quality_score"));

        let n = note("---\nquality_score: 1.2\n---\n");
        assert!(n.quality_score().is_err());
    }

    #[test]
    fn test_tags_from_various_shapes() {
        assert_eq!(
            note("---\ntags: [a, b, a]\n---\n").tags(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(
            note("---\ntags: \"#x, #y z\"\n---\n").tags(),
            vec!["x".to_string(), "y".to_string(), "z".to_string()]
        );
        assert!(note("---\ntype: fleeting\n---\n").tags().is_empty());
    }

    #[test]
    fn test_ai_processed_is_strict() {
        assert_eq!(note("---\n---\n").ai_processed(), AiProcessed::Missing);
        assert_eq!(
            note("---\nai_processed: true\n---\n").ai_processed(),
            AiProcessed::Flag(true)
        );
        assert_eq!(
            note("---\nai_processed: \"no\"\n---\n").ai_processed(),
            AiProcessed::Invalid("no".to_string())
        );
        assert_eq!(
            note("---\nai_processed: True\n---\n").ai_processed(),
            AiProcessed::Invalid("True".to_string())
        );
    }

    #[test]
    fn test_wiki_links_skip_embeds() {
        let body = "See [[Alpha]] and [[Beta|the beta]] plus [[Gamma#Part]].\n![[diagram.png]] ![x](Media/x.png) [[Alpha]]";
        assert_eq!(
            extract_wiki_links(body),
            vec!["Alpha".to_string(), "Beta".to_string(), "Gamma".to_string()]
        );
    }
}
