//! Post file codec: front matter + body <-> `PostRecord`, and filename slugs.
//!
//! The encoded layout is fixed by hand rather than produced by a YAML
//! serializer. Jekyll themes downstream are sensitive to quoting and array
//! style, so `encode` must stay byte-for-byte stable.

use crate::types::PostRecord;
use chrono::{Local, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use std::sync::LazyLock;

/// Front matter delimiter line.
pub const DELIMITER: &str = "---";

/// Canonical post date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Post file extension (without the dot).
pub const POST_EXTENSION: &str = "md";

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 50;

static CANONICAL_DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());
static SLUG_STRIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s-]").unwrap());
static SLUG_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s-]+").unwrap());

/// Errors produced while decoding a post file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Missing opening or closing `---` delimiter.
    MalformedFrontMatter,
    /// Front matter is not a valid YAML mapping.
    InvalidYaml(String),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::MalformedFrontMatter => write!(f, "missing front matter delimiters"),
            DecodeError::InvalidYaml(msg) => write!(f, "invalid front matter: {}", msg),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Raw front matter keys; everything else in the block is ignored.
#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    #[serde(default, deserialize_with = "scalar_text")]
    title: String,
    #[serde(default, deserialize_with = "scalar_text")]
    date: String,
    #[serde(default, deserialize_with = "scalar_text")]
    author: String,
    #[serde(default, deserialize_with = "category_list")]
    categories: Vec<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    excerpt: String,
}

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => value_text(tagged.value),
        _ => None,
    }
}

fn scalar_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(String::new()),
        Value::Sequence(_) | Value::Mapping(_) => Err(serde::de::Error::custom("expected a scalar value")),
        other => Ok(value_text(other).unwrap_or_default()),
    }
}

fn category_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => Ok(items
            .into_iter()
            .filter_map(value_text)
            .filter(|c| !c.is_empty())
            .collect()),
        Value::Mapping(_) => Err(serde::de::Error::custom("categories must be a list")),
        // Jekyll reads a bare string as space-separated categories
        other => Ok(value_text(other)
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_default()),
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Split a post into its front matter block and body.
fn split_front_matter(contents: &str) -> Result<(&str, &str), DecodeError> {
    let mut lines = contents.split_inclusive('\n');

    let first = lines.next().ok_or(DecodeError::MalformedFrontMatter)?;
    if !is_delimiter(first) {
        return Err(DecodeError::MalformedFrontMatter);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_delimiter(line) {
            return Ok((&contents[yaml_start..offset], &contents[offset + line.len()..]));
        }
        offset += line.len();
    }

    Err(DecodeError::MalformedFrontMatter)
}

/// Strip leading blank lines and trailing whitespace, keeping the first
/// line's indentation.
pub fn trim_blank_lines(text: &str) -> &str {
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        start += line.len();
    }
    text[start..].trim_end()
}

/// Decode a post file into a record. The returned `filename` is empty.
pub fn decode(contents: &str) -> Result<PostRecord, DecodeError> {
    let (yaml, body) = split_front_matter(contents)?;

    let value: Value = if yaml.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(yaml).map_err(|e| DecodeError::InvalidYaml(e.to_string()))?
    };
    let front_matter = match value {
        Value::Null => FrontMatter::default(),
        Value::Mapping(_) => {
            serde_yaml::from_value::<FrontMatter>(value).map_err(|e| DecodeError::InvalidYaml(e.to_string()))?
        }
        _ => return Err(DecodeError::InvalidYaml("front matter is not a mapping".to_string())),
    };

    Ok(PostRecord {
        title: front_matter.title,
        date: front_matter.date,
        author: front_matter.author,
        categories: front_matter.categories,
        excerpt: front_matter.excerpt,
        content: trim_blank_lines(body).to_string(),
        filename: String::new(),
    })
}

/// Render text as a YAML double-quoted scalar.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // Non-printable characters and line separators do not survive a YAML parse unescaped
            c if c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}' | '\u{fffe}' | '\u{ffff}') => {
                let code = c as u32;
                if code <= 0xff {
                    out.push_str(&format!("\\x{:02X}", code));
                } else {
                    out.push_str(&format!("\\u{:04X}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Encode a record in the fixed post file layout.
pub fn encode(record: &PostRecord) -> String {
    let categories: Vec<String> = record.categories.iter().map(|c| quote(c)).collect();

    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&format!("title: {}\n", quote(&record.title)));
    out.push_str(&format!("date: {}\n", record.date));
    out.push_str(&format!("author: {}\n", quote(&record.author)));
    out.push_str(&format!("categories: [{}]\n", categories.join(", ")));
    out.push_str(&format!("excerpt: {}\n", quote(&record.excerpt)));
    out.push_str(DELIMITER);
    out.push_str("\n\n");
    out.push_str(trim_blank_lines(&record.content));
    out.push('\n');
    out
}

/// Derive the filename slug for a title.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = SLUG_STRIP_RE.replace_all(&lowered, "");
    let joined = SLUG_SEPARATOR_RE.replace_all(&stripped, "-");
    joined.trim_matches('-').chars().take(MAX_SLUG_LEN).collect()
}

/// Canonicalize a date string, or `None` if it cannot be read as `YYYY-MM-DD`.
pub fn normalize_date(date: &str) -> Option<String> {
    let date = date.trim();
    if CANONICAL_DATE_RE.is_match(date) {
        return Some(date.to_string());
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .ok()
        .map(|d| d.format(DATE_FORMAT).to_string())
}

/// True if `date` is exactly `YYYY-MM-DD` and names a real calendar day.
pub fn is_canonical_date(date: &str) -> bool {
    CANONICAL_DATE_RE.is_match(date) && NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok()
}

/// Derive a post filename, falling back to `today` for unreadable dates.
pub fn derive_filename_on(title: &str, date: &str, today: NaiveDate) -> String {
    let date = normalize_date(date).unwrap_or_else(|| today.format(DATE_FORMAT).to_string());
    format!("{}-{}.{}", date, slugify(title), POST_EXTENSION)
}

/// Derive a post filename, falling back to the current local date.
pub fn derive_filename(title: &str, date: &str) -> String {
    derive_filename_on(title, date, Local::now().date_naive())
}
