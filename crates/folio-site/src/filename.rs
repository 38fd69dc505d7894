//! File name conventions of the docs tree.
//!
//! A name may carry a numeric rank prefix (`001-setup.md`) that controls sort
//! order and is hidden from titles and URLs unless rank display is enabled.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

static RANK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?s)(\d*-)?(.*)$").unwrap());

static DIR_CONFIG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^config\.ya?ml$").unwrap());

/// Markdown file extension, including the dot.
pub const MARKDOWN_EXT: &str = ".md";

/// A file name split into rank and title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedFilename {
    /// Digits of the rank prefix, without the dash. `Some("")` for a bare `-` prefix.
    pub rank: Option<String>,
    /// Remainder of the name after the rank prefix.
    pub title: String,
}

impl ParsedFilename {
    /// Rank for ordering, `None` when the prefix has no digits.
    #[must_use]
    pub fn rank_order(&self) -> Option<Rank<'_>> {
        let digits = self.rank.as_deref().filter(|r| !r.is_empty())?;
        Some(Rank(digits.trim_start_matches('0')))
    }
}

/// Rank digits ordered by numeric value, however many there are.
///
/// Holds the digits without leading zeros, so a longer string is always the
/// larger number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rank<'a>(&'a str);

impl Ord for Rank<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(other.0))
    }
}

impl PartialOrd for Rank<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Split `name` into its rank prefix and title.
///
/// Never fails: a name without a prefix is simply unranked.
#[must_use]
pub fn parse_filename(name: &str) -> ParsedFilename {
    let Some(caps) = RANK_RE.captures(name) else {
        return ParsedFilename {
            rank: None,
            title: name.to_owned(),
        };
    };
    ParsedFilename {
        rank: caps
            .get(1)
            .map(|m| m.as_str().trim_end_matches('-').to_owned()),
        title: caps.get(2).map_or_else(String::new, |m| m.as_str().to_owned()),
    }
}

/// Name with its rank prefix removed.
#[must_use]
pub fn strip_rank(name: &str) -> String {
    parse_filename(name).title
}

/// Whether `name` is a directory index (`readme.md` or `index.md`, any case).
///
/// Checked on the raw name, so `001-readme.md` is a regular page.
#[must_use]
pub fn is_index_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == "readme.md" || lower == "index.md"
}

/// Whether `name` is a markdown page.
#[must_use]
pub fn is_markdown_file(name: &str) -> bool {
    name.len() > MARKDOWN_EXT.len()
        && name
            .get(name.len() - MARKDOWN_EXT.len()..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(MARKDOWN_EXT))
}

/// Whether `name` is a per-directory config file (`config.yml` / `config.yaml`).
#[must_use]
pub fn is_dir_config_file(name: &str) -> bool {
    DIR_CONFIG_RE.is_match(name)
}

/// Strip a trailing `.md` extension, if present.
#[must_use]
pub fn strip_markdown_ext(name: &str) -> &str {
    if is_markdown_file(name) {
        name.get(..name.len() - MARKDOWN_EXT.len()).unwrap_or(name)
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_ranked_name() {
        assert_eq!(
            parse_filename("001-intro.md"),
            ParsedFilename {
                rank: Some("001".to_owned()),
                title: "intro.md".to_owned()
            }
        );
        assert_eq!(
            parse_filename("001-intro.md").rank_order(),
            parse_filename("1-intro.md").rank_order()
        );
    }

    #[test]
    fn test_parse_unranked_name() {
        let parsed = parse_filename("guide");
        assert_eq!(parsed.rank, None);
        assert_eq!(parsed.title, "guide");
        assert_eq!(parsed.rank_order(), None);
    }

    #[test]
    fn test_parse_bare_dash_prefix() {
        let parsed = parse_filename("-draft.md");
        assert_eq!(parsed.rank.as_deref(), Some(""));
        assert_eq!(parsed.title, "draft.md");
        assert_eq!(parsed.rank_order(), None);
    }

    #[test]
    fn test_rank_order_beyond_u64() {
        let huge = parse_filename("18446744073709551616-huge.md");
        let huger = parse_filename("99999999999999999999999-huger.md");
        let small = parse_filename("0009-small.md");
        let zero = parse_filename("000-zero.md");
        assert!(small.rank_order() < huge.rank_order());
        assert!(huge.rank_order() < huger.rank_order());
        assert!(zero.rank_order() < small.rank_order());
        assert!(zero.rank_order().is_some());
    }

    #[test]
    fn test_rank_only_takes_leading_digits() {
        let parsed = parse_filename("2021-10-report.md");
        assert_eq!(parsed.rank.as_deref(), Some("2021"));
        assert_eq!(parsed.title, "10-report.md");
    }

    #[test]
    fn test_is_index_file() {
        assert!(is_index_file("README.md"));
        assert!(is_index_file("readme.md"));
        assert!(is_index_file("Index.MD"));
        assert!(!is_index_file("001-README.md"));
        assert!(!is_index_file("readme.txt"));
    }

    #[test]
    fn test_markdown_and_config_detection() {
        assert!(is_markdown_file("a.md"));
        assert!(is_markdown_file("A.MD"));
        assert!(!is_markdown_file(".md"));
        assert!(!is_markdown_file("a.mdx"));
        assert!(is_dir_config_file("config.yml"));
        assert!(is_dir_config_file("Config.YAML"));
        assert!(!is_dir_config_file("myconfig.yml"));
    }

    #[test]
    fn test_strip_markdown_ext() {
        assert_eq!(strip_markdown_ext("guide.md"), "guide");
        assert_eq!(strip_markdown_ext("guide"), "guide");
    }
}
