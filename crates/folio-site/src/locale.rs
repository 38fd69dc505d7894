//! Language directories and locale-qualified paths.

/// Language codes accepted as top-level directories in i18n mode.
const LANGUAGES: &[(&str, &str)] = &[
    ("ar", "العربية"),
    ("bg", "Български"),
    ("bn", "বাংলা"),
    ("ca", "Català"),
    ("cs", "Čeština"),
    ("da", "Dansk"),
    ("de", "Deutsch"),
    ("el", "Ελληνικά"),
    ("en", "English"),
    ("en-GB", "English (UK)"),
    ("en-US", "English (US)"),
    ("es", "Español"),
    ("et", "Eesti"),
    ("fa", "فارسی"),
    ("fi", "Suomi"),
    ("fr", "Français"),
    ("he", "עברית"),
    ("hi", "हिन्दी"),
    ("hr", "Hrvatski"),
    ("hu", "Magyar"),
    ("id", "Bahasa Indonesia"),
    ("it", "Italiano"),
    ("ja", "日本語"),
    ("ko", "한국어"),
    ("lt", "Lietuvių"),
    ("lv", "Latviešu"),
    ("ms", "Bahasa Melayu"),
    ("nl", "Nederlands"),
    ("no", "Norsk"),
    ("pl", "Polski"),
    ("pt", "Português"),
    ("pt-BR", "Português (Brasil)"),
    ("pt-PT", "Português (Portugal)"),
    ("ro", "Română"),
    ("ru", "Русский"),
    ("sk", "Slovenčina"),
    ("sl", "Slovenščina"),
    ("sr", "Српски"),
    ("sv", "Svenska"),
    ("th", "ไทย"),
    ("tr", "Türkçe"),
    ("uk", "Українська"),
    ("vi", "Tiếng Việt"),
    ("zh", "中文"),
    ("zh-CN", "中文（简体）"),
    ("zh-HK", "中文（香港）"),
    ("zh-TW", "中文（繁體）"),
];

/// Display name of a language code, if the code is supported.
#[must_use]
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Pick the active language.
///
/// Prefers `requested`, then `fallback`, then the first available language.
/// Returns `None` only when `langs` is empty.
#[must_use]
pub fn resolve_language<'a>(
    requested: Option<&str>,
    fallback: Option<&str>,
    langs: &'a [String],
) -> Option<&'a str> {
    let find = |code: &str| langs.iter().find(|l| *l == code).map(String::as_str);
    requested
        .and_then(find)
        .or_else(|| fallback.and_then(find))
        .or_else(|| langs.first().map(String::as_str))
}

/// Split a locale-qualified path into its language and the remaining path.
///
/// `/en/guide` with `en` available becomes `(Some("en"), "/guide")`. Paths
/// without a known language prefix are returned unchanged.
#[must_use]
pub fn split_locale_path<'a>(path: &'a str, langs: &[String]) -> (Option<&'a str>, String) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let (first, rest) = match trimmed.split_once('/') {
        Some((first, rest)) => (first, Some(rest)),
        None => (trimmed, None),
    };
    if first.is_empty() || !langs.iter().any(|l| l == first) {
        return (None, path.to_owned());
    }
    let rest = rest.map_or_else(|| "/".to_owned(), |r| format!("/{r}"));
    (Some(first), rest)
}
