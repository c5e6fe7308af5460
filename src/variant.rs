//! Platform variant resolution
//!
//! A generic asset `images/logo.png` may have tagged overrides such as
//! `images/logo~color.png` or `images/logo~color~round.png`. For a given
//! platform the most specific override wins:
//!
//! 1. Candidates carrying a tag outside the valid vocabulary are dropped.
//! 2. Each survivor scores one point per tag it shares with the platform.
//! 3. The single highest scorer is selected; a tie is an error.
//! 4. With no survivors the generic name is used unchanged.
//!
//! Scoring ([`select_variant`]) is pure; listing ([`list_candidates`]) is the
//! only part that touches the filesystem.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::Platform;
use crate::error::{ResourceError, ResourceResult};

/// Separator between a base name and its variant tags
pub const VARIANT_SEPARATOR: char = '~';

/// Tags encoded in a file name, e.g. `logo~color~round.png` -> {color, round}
pub fn parse_tags(file_name: &str) -> BTreeSet<String> {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    stem.split(VARIANT_SEPARATOR)
        .skip(1)
        .map(str::to_string)
        .collect()
}

/// Pick the most specific candidate for a platform
///
/// Returns `Ok(None)` when no candidate survives the vocabulary filter, in
/// which case the caller falls back to the generic name.
pub fn select_variant<'a>(
    generic_name: &str,
    candidates: &'a [String],
    valid_tags: &BTreeSet<String>,
    platform_name: &str,
    platform_tags: &BTreeSet<String>,
) -> ResourceResult<Option<&'a str>> {
    let scored: Vec<(usize, &str)> = candidates
        .iter()
        .filter_map(|candidate| {
            let tags = parse_tags(candidate);
            if !tags.is_subset(valid_tags) {
                tracing::debug!("Skipping variant {}: tags outside vocabulary", candidate);
                return None;
            }
            Some((tags.intersection(platform_tags).count(), candidate.as_str()))
        })
        .collect();

    let Some(best) = scored.iter().map(|(score, _)| *score).max() else {
        return Ok(None);
    };

    let winners: Vec<&str> = scored
        .iter()
        .filter(|(score, _)| *score == best)
        .map(|(_, c)| *c)
        .collect();

    if winners.len() > 1 {
        return Err(ResourceError::AmbiguousVariant {
            name: generic_name.to_string(),
            platform: platform_name.to_string(),
            score: best,
            candidates: winners.iter().map(|c| c.to_string()).collect(),
        });
    }

    Ok(Some(winners[0]))
}

/// List tagged variant file names next to a generic asset
///
/// Only the file names are returned, sorted so the result does not depend on
/// directory iteration order.
pub fn list_candidates(root: &Path, generic_name: &Path) -> ResourceResult<Vec<String>> {
    let file_name = generic_name
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ResourceError::InvalidName(generic_name.display().to_string()))?;

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };

    let dir = match generic_name.parent() {
        Some(parent) => root.join(parent),
        None => root.to_path_buf(),
    };

    let mut pattern = format!(
        "{}/{}{}*",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(stem),
        VARIANT_SEPARATOR
    );
    if let Some(ext) = ext {
        pattern.push('.');
        pattern.push_str(&glob::Pattern::escape(ext));
    }

    let paths = glob::glob(&pattern)
        .map_err(|e| ResourceError::InvalidName(format!("{}: {}", file_name, e)))?;

    let mut candidates = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| ResourceError::Io(e.into()))?;
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // `logo~x.png.bak` must not match `logo.png`
        let candidate_ext = name.rsplit_once('.').map(|(_, e)| e);
        if candidate_ext != ext {
            continue;
        }
        candidates.push(name.to_string());
    }
    candidates.sort();
    Ok(candidates)
}

/// Resolves generic asset names to platform-specific files under a root
#[derive(Debug, Clone)]
pub struct VariantResolver {
    root: PathBuf,
}

impl VariantResolver {
    /// Create a resolver for a resource root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Resource root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a generic name for a platform
    ///
    /// The platform's own tags form the valid vocabulary, so overrides meant
    /// for other platforms are never considered. The returned path is relative
    /// to the root, like `generic_name`.
    pub fn resolve(&self, generic_name: &Path, platform: &Platform) -> ResourceResult<PathBuf> {
        self.resolve_with_vocabulary(generic_name, platform, &platform.tags)
    }

    /// Resolve with an explicit valid-tag vocabulary
    pub fn resolve_with_vocabulary(
        &self,
        generic_name: &Path,
        platform: &Platform,
        valid_tags: &BTreeSet<String>,
    ) -> ResourceResult<PathBuf> {
        let shown = generic_name.to_string_lossy();
        let reserved = generic_name
            .file_name()
            .is_some_and(|n| n.to_string_lossy().contains(VARIANT_SEPARATOR));
        if reserved {
            return Err(ResourceError::InvalidName(format!(
                "'{}' contains reserved variant separator '{}'",
                shown, VARIANT_SEPARATOR
            )));
        }

        let candidates = list_candidates(&self.root, generic_name)?;
        let selected = select_variant(
            &shown,
            &candidates,
            valid_tags,
            &platform.name,
            &platform.tags,
        )?;

        match selected {
            Some(file_name) => {
                let resolved = generic_name.with_file_name(file_name);
                tracing::debug!(
                    "Resolved {} -> {} for {}",
                    shown,
                    resolved.display(),
                    platform.name
                );
                Ok(resolved)
            }
            None => Ok(generic_name.to_path_buf()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags("a~red~round.png"), tags(&["red", "round"]));
        assert!(parse_tags("a.png").is_empty());
        assert_eq!(parse_tags("a~red"), tags(&["red"]));
    }

    #[test]
    fn test_single_valid_candidate_wins() {
        let candidates = names(&["a~red.png", "a~blue.png"]);
        let selected = select_variant(
            "a.png",
            &candidates,
            &tags(&["red"]),
            "p",
            &tags(&["red"]),
        )
        .unwrap();
        assert_eq!(selected, Some("a~red.png"));
    }

    #[test]
    fn test_tie_is_ambiguous() {
        let candidates = names(&["a~red.png", "a~blue.png"]);
        let err = select_variant(
            "a.png",
            &candidates,
            &tags(&["red", "blue"]),
            "p",
            &tags(&["red", "blue"]),
        )
        .unwrap_err();
        match err {
            ResourceError::AmbiguousVariant {
                score, candidates, ..
            } => {
                assert_eq!(score, 1);
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_candidates_falls_back() {
        let selected =
            select_variant("a.png", &[], &tags(&["red"]), "p", &tags(&["red"])).unwrap();
        assert_eq!(selected, None);
    }

    #[test]
    fn test_more_specific_beats_less_specific() {
        let candidates = names(&["a~color.png", "a~color~round.png"]);
        let vocab = tags(&["color", "round", "chalk"]);
        let selected =
            select_variant("a.png", &candidates, &vocab, "chalk", &vocab).unwrap();
        assert_eq!(selected, Some("a~color~round.png"));
    }
}
