//! Summaries computed over the analysis history.

use std::collections::HashMap;

use serde::Serialize;

use crate::{AnalysisRecord, Category};

/// Number of tags reported by [`HistoryStatistics::from_records`].
pub const TOP_TAG_LIMIT: usize = 10;

/// Characters shown by [`preview`] before truncating.
pub const PREVIEW_CHARS: usize = 50;

/// Records of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// The category.
    #[serde(rename = "categoria")]
    pub category: Category,
    /// Number of records.
    #[serde(rename = "total")]
    pub count: usize,
}

/// Occurrences of one tag across the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    /// The tag.
    pub tag: String,
    /// Number of records carrying it.
    #[serde(rename = "total")]
    pub count: usize,
}

/// Aggregate view of the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryStatistics {
    /// Total records.
    pub total: usize,
    /// One entry per category, zero counts included, in [`Category::ALL`] order.
    #[serde(rename = "categorias")]
    pub categories: Vec<CategoryCount>,
    /// Most common tags, most frequent first; ties keep first-seen order.
    #[serde(rename = "tags_comunes")]
    pub top_tags: Vec<TagCount>,
}

impl HistoryStatistics {
    /// Computes statistics over `records`.
    pub fn from_records(records: &[AnalysisRecord]) -> Self {
        let categories = Category::ALL
            .into_iter()
            .map(|category| CategoryCount {
                category,
                count: records.iter().filter(|r| r.category == category).count(),
            })
            .collect();

        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut top_tags: Vec<TagCount> = Vec::new();
        for tag in records.iter().flat_map(|r| r.tags.iter()) {
            match index.get(tag.as_str()) {
                Some(&i) => top_tags[i].count += 1,
                None => {
                    index.insert(tag.as_str(), top_tags.len());
                    top_tags.push(TagCount {
                        tag: tag.clone(),
                        count: 1,
                    });
                }
            }
        }
        top_tags.sort_by(|a, b| b.count.cmp(&a.count));
        top_tags.truncate(TOP_TAG_LIMIT);

        Self {
            total: records.len(),
            categories,
            top_tags,
        }
    }

    /// Count for a single category.
    pub fn count_for(&self, category: Category) -> usize {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map_or(0, |c| c.count)
    }
}

/// The `n` most recent records, newest first.
pub fn recent(records: &[AnalysisRecord], n: usize) -> Vec<&AnalysisRecord> {
    records.iter().rev().take(n).collect()
}

/// Shortens `text` to [`PREVIEW_CHARS`] characters, appending `...` if cut.
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
