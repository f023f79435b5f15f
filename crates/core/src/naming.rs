//! Dream slug derivation.
//!
//! Slugs are derived from the dream title and are unique per dreamer, not
//! globally.

/// Derive a URL slug from a dream title.
///
/// Convention: lowercase, whitespace runs become a single `-`, every other
/// non-alphanumeric character (except `_` and `-`) is dropped.
///
/// # Examples
///
/// ```
/// use dreamshepherd_core::naming::dream_slug;
///
/// assert_eq!(dream_slug("Learn guitar"), "learn-guitar");
/// assert_eq!(dream_slug("Run a 5K!"), "run-a-5k");
/// ```
pub fn dream_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_sep = true;
    for ch in title.trim().to_lowercase().chars() {
        if ch.is_whitespace() {
            if !last_was_sep {
                slug.push('-');
                last_was_sep = true;
            }
        } else if ch.is_alphanumeric() || ch == '_' || ch == '-' {
            slug.push(ch);
            last_was_sep = false;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_title() {
        assert_eq!(dream_slug("Learn guitar"), "learn-guitar");
    }

    #[test]
    fn strips_punctuation() {
        assert_eq!(dream_slug("Run a 5K!"), "run-a-5k");
        assert_eq!(dream_slug("Write (and finish) a novel"), "write-and-finish-a-novel");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(dream_slug("Learn   guitar"), "learn-guitar");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(dream_slug("  Learn guitar  "), "learn-guitar");
        assert_eq!(dream_slug("Learn guitar?"), "learn-guitar");
    }

    #[test]
    fn preserves_existing_separators() {
        assert_eq!(dream_slug("self_discipline - daily"), "self_discipline---daily");
    }

    #[test]
    fn empty_title() {
        assert_eq!(dream_slug(""), "");
    }
}
