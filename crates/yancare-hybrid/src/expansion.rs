//! Synonym query expansion. Off unless `retrieval.query_expansion` is set;
//! the built-in table is a starting point, not a curated vocabulary.

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct QueryExpander {
    synonyms: Vec<(String, Vec<String>)>,
    max_variants: usize,
}

impl QueryExpander {
    /// `max_variants` counts the original query. An empty table falls back to
    /// [`default_synonyms`].
    pub fn new(table: &BTreeMap<String, Vec<String>>, max_variants: usize) -> Self {
        let synonyms = if table.is_empty() {
            default_synonyms()
        } else {
            table.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        };
        Self { synonyms, max_variants: max_variants.max(1) }
    }

    /// The query first, then one variant per synonym substitution, in table
    /// order, without duplicates.
    pub fn expand(&self, query: &str) -> Vec<String> {
        let mut out = vec![query.to_string()];
        for (word, alternatives) in &self.synonyms {
            if word.is_empty() || !query.contains(word.as_str()) { continue; }
            for alt in alternatives {
                if out.len() >= self.max_variants { return out; }
                let variant = query.replace(word.as_str(), alt);
                if !out.contains(&variant) { out.push(variant); }
            }
        }
        out
    }
}

pub fn default_synonyms() -> Vec<(String, Vec<String>)> {
    let table: [(&str, &[&str]); 5] = [
        ("掉发", &["脱发", "掉头发", "头发掉", "脱落"]),
        ("养发", &["护发", "头发护理", "头发养护", "养护头发"]),
        ("价格", &["多少钱", "费用", "收费", "花费"]),
        ("洗头", &["洗发", "洗头发"]),
        ("泡头", &["头疗", "头部护理"]),
    ];
    table.iter().map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect())).collect()
}
