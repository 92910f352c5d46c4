//! Multi-term keyword matching
//!
//! Terms are comma-separated and all of them must appear. Both sides are
//! lowercased and stripped of every whitespace character before an exact
//! substring test, so `"ABC review"` matches the term `"abc  review"`.

/// A parsed campaign keyword query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordQuery {
    raw: String,
    terms: Vec<String>,
}

impl KeywordQuery {
    /// Parses a comma-separated query; empty terms are dropped
    ///
    /// # Example
    ///
    /// ```
    /// use upload_tracker::KeywordQuery;
    ///
    /// let query = KeywordQuery::parse("Glow Serum, , review");
    /// assert_eq!(query.terms(), ["glowserum", "review"]);
    /// assert!(query.matches("My honest REVIEW of the glow serum"));
    /// assert!(!query.matches("glow serum haul"));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let terms = raw
            .split(',')
            .map(normalize)
            .filter(|term| !term.is_empty())
            .collect();

        Self {
            raw: raw.to_string(),
            terms,
        }
    }

    /// Normalized terms, in query order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns true if every term occurs in `text`
    pub fn matches(&self, text: &str) -> bool {
        let text = normalize(text);
        self.terms.iter().all(|term| text.contains(term.as_str()))
    }
}

impl std::fmt::Display for KeywordQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Free-function form of [`KeywordQuery::matches`]
pub fn matches(text: &str, query: &KeywordQuery) -> bool {
    query.matches(text)
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
