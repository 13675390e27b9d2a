//! Minimal INI reader for `.submoduler.ini`.
use anyhow::{Result, bail};

/// A key-value section of an INI file.
///
/// Section names are lowercased on parse; values keep their original case.
///
/// # Examples
///
/// ```
/// use submoduler_child::config::ini::KvSection;
///
/// let section = KvSection {
///     name: "submoduler".to_string(),
///     entries: vec![("childname".to_string(), "core".to_string())],
/// };
/// assert_eq!(section.get("CHILDNAME"), Some("core"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvSection {
    /// The lowercased section name (e.g., `"submoduler"`).
    pub name: String,
    /// Key-value entries within this section, in file order.
    pub entries: Vec<(String, String)>,
}

impl KvSection {
    /// Look up `key` case-insensitively.  When a key repeats, the last value
    /// wins.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Parse key-value INI content from a string.
///
/// Format:
/// ```ini
/// [submoduler]
/// childname = core   # inline comments are stripped
/// ; full-line comments start with `;` or `#`
/// ```
///
/// # Examples
///
/// ```
/// use submoduler_child::config::ini::parse_kv_sections_from_str;
///
/// let sections = parse_kv_sections_from_str(
///     "[Submoduler]\nchildname = core\ntype = child # marker\n"
/// ).unwrap();
/// assert_eq!(sections[0].name, "submoduler");
/// assert_eq!(sections[0].get("type"), Some("child"));
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - A key-value pair is malformed (missing `=` or empty key)
/// - An entry appears outside of a section header
pub fn parse_kv_sections_from_str(content: &str) -> Result<Vec<KvSection>> {
    let mut sections = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let lineno = idx + 1;
        match Line::classify(raw) {
            Line::Ignored => {}
            Line::Header(name) => sections.push(KvSection {
                name,
                entries: Vec::new(),
            }),
            Line::Entry(key, value) => match sections.last_mut() {
                Some(section) => section.entries.push((key, value)),
                None => bail!("entry outside of section at line {lineno}: {}", raw.trim()),
            },
            Line::Malformed => {
                bail!("invalid key-value pair at line {lineno}: {}", raw.trim());
            }
        }
    }

    Ok(sections)
}

/// One physical line of INI text.
enum Line {
    /// Blank or comment.
    Ignored,
    /// `[name]`, lowercased.
    Header(String),
    /// `key = value` with any inline comment removed.
    Entry(String, String),
    /// Anything else.
    Malformed,
}

impl Line {
    fn classify(raw: &str) -> Self {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(['#', ';']) {
            return Self::Ignored;
        }
        if let Some(inner) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = inner.trim();
            return if name.is_empty() {
                Self::Malformed
            } else {
                Self::Header(name.to_lowercase())
            };
        }
        match line.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Self::Entry(
                key.trim().to_string(),
                without_comment(value.trim()).to_string(),
            ),
            _ => Self::Malformed,
        }
    }
}

/// Cut a value at the first whitespace-prefixed `#` or `;`.
///
/// `rspec#tag` is kept whole; `../../ # default` becomes `../../`.
fn without_comment(value: &str) -> &str {
    let cut = value
        .char_indices()
        .zip(value.chars().skip(1))
        .find(|((_, c), next)| c.is_whitespace() && matches!(next, '#' | ';'))
        .map(|((i, _), _)| i);
    cut.and_then(|i| value.get(..i)).map_or(value, str::trim_end)
}
