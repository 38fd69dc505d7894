//! Path forms of a docs link.
//!
//! Raw links come straight from the scan (`/001-guide/README.md`). Users see
//! them with the extension dropped, ranks hidden and index files collapsed to
//! their directory (`/guide/`).

use crate::filename::{is_index_file, strip_markdown_ext, strip_rank};

/// Raw link with the `.md` extension dropped and, unless `display_rank`,
/// every segment rank-stripped.
///
/// Index files are kept: `/guide/README.md` becomes `/guide/README`.
#[must_use]
pub fn link_path(link: &str, display_rank: bool) -> String {
    let segments: Vec<&str> = link.split('/').collect();
    let last = segments.len() - 1;
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let segment = if i == last {
                strip_markdown_ext(segment)
            } else {
                segment
            };
            if display_rank {
                segment.to_owned()
            } else {
                strip_rank(segment)
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Canonical user-facing link: [`link_path`] with index files collapsed to
/// their directory, which then ends in `/`.
#[must_use]
pub fn user_link(link: &str, display_rank: bool) -> String {
    match link.rsplit_once('/') {
        Some((dir, file)) if is_index_file(file) => format!("{}/", link_path(dir, display_rank)),
        _ => link_path(link, display_rank),
    }
}

/// Join path parts with single slashes and a leading slash.
///
/// Empty parts are skipped, so `join_path(&["", "/guide/a.md"])` is `/guide/a.md`.
#[must_use]
pub fn join_path(parts: &[&str]) -> String {
    let mut out = String::new();
    for part in parts {
        let part = part.trim_start_matches('/');
        if part.is_empty() {
            continue;
        }
        if !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(part);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Resolve `target` the way a browser resolves a relative URL against `base`.
///
/// Absolute targets are only normalized. Relative ones are resolved against
/// the directory part of `base` (everything up to its last `/`).
#[must_use]
pub fn resolve_link(base: &str, target: &str) -> String {
    let joined = if target.starts_with('/') {
        target.to_owned()
    } else {
        let dir = base.rsplit_once('/').map_or("", |(dir, _)| dir);
        format!("{dir}/{target}")
    };

    let trailing_slash = joined.ends_with('/') || joined.ends_with("/.") || joined.ends_with("/..");
    let mut stack: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }

    let mut resolved = format!("/{}", stack.join("/"));
    if trailing_slash && !resolved.ends_with('/') {
        resolved.push('/');
    }
    resolved
}
