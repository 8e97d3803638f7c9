use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use crate::config::{PhotoConfig, VideoConfig};
use crate::events::{MediaItem, MediaKind};

/// Photos directly under `photos.path`, sorted by path.
pub fn scan_photos(cfg: &PhotoConfig) -> Vec<MediaItem> {
    scan(&cfg.path, &cfg.files, MediaKind::Photo)
}

/// Videos directly under `videos.path`. Callers must not rely on the order.
pub fn scan_videos(cfg: &VideoConfig) -> Vec<MediaItem> {
    scan(&cfg.path, &cfg.files, MediaKind::Video)
}

/// Photo and video paths found by one rescan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub photos: Vec<PathBuf>,
    pub videos: Vec<PathBuf>,
}

/// Rescans both media directories and sorts the results by kind.
pub fn scan_catalog(photos: &PhotoConfig, videos: &VideoConfig) -> Catalog {
    scan_photos(photos)
        .into_iter()
        .chain(scan_videos(videos))
        .fold(Catalog::default(), |mut catalog, item| {
            match item.kind {
                MediaKind::Photo => catalog.photos.push(item.path),
                MediaKind::Video => catalog.videos.push(item.path),
            }
            catalog
        })
}

/// Lists the regular files in `dir` (not recursive) whose name matches one of
/// `patterns` written entirely in uppercase or entirely in lowercase.
///
/// `*.jpg` therefore finds `a.jpg` and `B.JPG` but never `c.Jpg`.
/// A missing directory yields an empty catalog.
#[instrument(skip(dir, patterns), fields(dir = %dir.display()))]
pub fn scan(dir: &Path, patterns: &[String], kind: MediaKind) -> Vec<MediaItem> {
    let variants: Vec<String> = patterns
        .iter()
        .flat_map(|p| [p.to_uppercase(), p.to_lowercase()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut found = BTreeSet::<PathBuf>::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("cannot list media directory: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            debug!(path = %entry.path().display(), "skipping non-UTF-8 file name");
            continue;
        };
        if variants.iter().any(|p| wildcard_match(p, name)) {
            found.insert(entry.into_path());
        }
    }

    debug!(?kind, matched = found.len(), "media scan complete");
    found
        .into_iter()
        .map(|path| MediaItem { path, kind })
        .collect()
}

/// Shell-style match of a file name against `*`, `?` and `[...]` wildcards.
///
/// Hidden names (leading `.`) only match patterns that start with `.`.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    if name.starts_with('.') && !pattern.starts_with('.') {
        return false;
    }
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    match_from(&pattern, &name)
}

fn match_from(pattern: &[char], name: &[char]) -> bool {
    let Some((&head, rest)) = pattern.split_first() else {
        return name.is_empty();
    };
    match head {
        '*' => (0..=name.len()).any(|skip| match_from(rest, &name[skip..])),
        '?' => !name.is_empty() && match_from(rest, &name[1..]),
        '[' => match (name.first(), parse_class(rest)) {
            (Some(&c), Some((class, after))) => class.matches(c) && match_from(after, &name[1..]),
            (_, None) => name.first() == Some(&'[') && match_from(rest, &name[1..]),
            (None, Some(_)) => false,
        },
        literal => name.first() == Some(&literal) && match_from(rest, &name[1..]),
    }
}

struct CharClass {
    negated: bool,
    ranges: Vec<(char, char)>,
}

impl CharClass {
    fn matches(&self, c: char) -> bool {
        let hit = self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi);
        hit != self.negated
    }
}

/// Parses the body of a `[...]` class; `pattern` starts just after `[`.
/// Returns `None` when the class is unterminated, in which case `[` is literal.
fn parse_class(pattern: &[char]) -> Option<(CharClass, &[char])> {
    let mut idx = 0;
    let negated = matches!(pattern.first(), Some('!'));
    if negated {
        idx += 1;
    }
    let mut ranges = Vec::new();
    let mut first = true;
    while idx < pattern.len() {
        let c = pattern[idx];
        if c == ']' && !first {
            return Some((CharClass { negated, ranges }, &pattern[idx + 1..]));
        }
        first = false;
        if pattern.get(idx + 1) == Some(&'-') && pattern.get(idx + 2).is_some_and(|&e| e != ']') {
            ranges.push((c, pattern[idx + 2]));
            idx += 3;
        } else {
            ranges.push((c, c));
            idx += 1;
        }
    }
    None
}
