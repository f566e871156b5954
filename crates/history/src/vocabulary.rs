//! Tag vocabulary loading.

use std::io::ErrorKind;
use std::path::Path;

use pipeline::TagVocabulary;
use tracing::{info, warn};

/// Default vocabulary file name.
pub const DEFAULT_TAGS_FILE: &str = "tags.txt";

/// Loads a newline-delimited vocabulary from `path`.
///
/// A missing or unreadable file yields an empty vocabulary: analysis continues
/// without tags rather than failing.
pub fn load_vocabulary(path: &Path) -> TagVocabulary {
    match std::fs::read_to_string(path) {
        Ok(source) => {
            let vocabulary = TagVocabulary::parse(&source);
            info!(path = %path.display(), tags = vocabulary.len(), "tag vocabulary loaded");
            vocabulary
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "tag vocabulary not found; continuing without tags");
            TagVocabulary::empty()
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "tag vocabulary unreadable; continuing without tags"
            );
            TagVocabulary::empty()
        }
    }
}
