//! Frontmatter and heading extraction.
//!
//! A page may start with a YAML block fenced by `---` lines. The same schema
//! is used for directory config files (`config.yml`), where the whole file is
//! the YAML block.

use std::collections::HashMap;

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

/// Frontmatter error.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    /// YAML syntax or schema error.
    #[error("Invalid frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Opening `---` without a closing fence.
    #[error("Frontmatter block is not closed")]
    Unterminated,
}

/// Page or directory settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrontMatter {
    /// Title override.
    pub title: Option<String>,
    /// Promote into the top navbar and scope the sidebar when active.
    pub is_nav: bool,
    /// Navbar label when it differs from the title.
    pub nav_title: Option<String>,
    /// Navbar sort key.
    pub nav_order: Option<i64>,
    /// Hide from the sidebar while keeping the page routable.
    pub sidebar_ignore: bool,
    /// Landing page hero block.
    pub hero: Option<Hero>,
    /// Landing page feature list.
    pub features: Option<Vec<Feature>>,
    /// Replace this entry with a redirect to the given path.
    pub redirect: Option<String>,
    /// Reverse the sort order of a directory's children.
    pub reverse: bool,
    /// Named subsets of a directory's children.
    pub groups: Option<Vec<Group>>,
}

/// Landing page hero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hero {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<HeroAction>,
}

/// Call-to-action button of a hero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroAction {
    pub text: String,
    pub link: String,
}

/// Landing page feature card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feature {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A group of directory members shown under one label.
///
/// A group without a title is inlined into its parent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub title: Option<String>,
    /// File or directory names, as they appear on disk.
    pub members: Vec<String>,
}

/// An H2 heading with its anchor id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    pub title: String,
    pub id: String,
}

/// Headings found in a markdown body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headings {
    /// Text of the first H1.
    pub h1: Option<String>,
    /// Every H2, in document order.
    pub h2: Vec<Heading>,
}

/// Split a document into its YAML frontmatter and body.
///
/// # Errors
///
/// Returns [`FrontMatterError::Unterminated`] when the opening fence has no
/// closing fence.
pub fn split_frontmatter(text: &str) -> Result<(Option<&str>, &str), FrontMatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(rest) = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))
    else {
        return Ok((None, text));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((Some(yaml), body));
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated)
}

/// Parse a YAML frontmatter block or directory config file.
///
/// Empty input yields default settings.
///
/// # Errors
///
/// Returns [`FrontMatterError::Yaml`] if the YAML is malformed.
pub fn parse_front_matter(yaml: &str) -> Result<FrontMatter, FrontMatterError> {
    let trimmed = yaml.trim();
    if trimmed.is_empty() {
        return Ok(FrontMatter::default());
    }
    Ok(serde_yaml::from_str(trimmed)?)
}

/// Collect the first H1 and all H2 headings of a markdown body.
pub fn scan_headings(body: &str) -> Headings {
    let mut headings = Headings::default();
    let mut ids: HashMap<String, usize> = HashMap::new();
    let mut current: Option<(HeadingLevel, String)> = None;

    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Heading { level, .. })
                if matches!(level, HeadingLevel::H1 | HeadingLevel::H2) =>
            {
                current = Some((level, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                let Some((level, text)) = current.take() else {
                    continue;
                };
                let text = text.trim().to_owned();
                if level == HeadingLevel::H1 {
                    if headings.h1.is_none() && !text.is_empty() {
                        headings.h1 = Some(text);
                    }
                } else {
                    let id = unique_id(&mut ids, &text, headings.h2.len() + 1);
                    headings.h2.push(Heading { title: text, id });
                }
            }
            _ => {}
        }
    }

    headings
}

/// A parsed markdown page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentMeta<'a> {
    pub front_matter: FrontMatter,
    pub h1: Option<String>,
    pub headings: Vec<Heading>,
    pub body: &'a str,
}

/// Parse frontmatter and headings of a markdown page.
///
/// # Errors
///
/// Returns an error if the frontmatter block is unterminated or malformed.
pub fn parse_document(text: &str) -> Result<DocumentMeta<'_>, FrontMatterError> {
    let (yaml, body) = split_frontmatter(text)?;
    let front_matter = match yaml {
        Some(yaml) => parse_front_matter(yaml)?,
        None => FrontMatter::default(),
    };
    let Headings { h1, h2 } = scan_headings(body);
    Ok(DocumentMeta {
        front_matter,
        h1,
        headings: h2,
        body,
    })
}

/// Body with frontmatter and the leading H1 removed.
///
/// Used to decide whether a translated page has any content of its own.
pub fn strip_title_block(text: &str) -> &str {
    let body = match split_frontmatter(text) {
        Ok((_, body)) => body,
        Err(_) => text,
    };
    let trimmed = body.trim_start();
    if trimmed.starts_with("# ") {
        return trimmed.split_once('\n').map_or("", |(_, rest)| rest);
    }
    body
}

/// Anchor id for the `position`-th H2, deduplicated against earlier ids.
///
/// Headings with nothing to slugify (only punctuation or emoji) get
/// `heading-<position>` so the anchor is never empty.
fn unique_id(ids: &mut HashMap<String, usize>, text: &str, position: usize) -> String {
    let mut base_id = slugify(text);
    if base_id.is_empty() {
        base_id = format!("heading-{position}");
    }
    let count = ids.entry(base_id.clone()).or_default();
    let id = match *count {
        0 => base_id,
        n => format!("{base_id}-{n}"),
    };
    *count += 1;
    id
}

/// Convert heading text to an anchor id.
///
/// Lowercases, keeps alphanumerics (any script), and folds runs of
/// whitespace, dashes and underscores into single dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}
