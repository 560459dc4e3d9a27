//! Page qualification by subject and keyword.

/// Decides whether a catalogue page advertises one of the configured titles.
///
/// A page qualifies when its text contains at least one subject and at least
/// one keyword. Matching is plain, case-sensitive substring containment.
#[derive(Debug, Clone)]
pub struct PageFilter {
    subjects: Vec<String>,
    keywords: Vec<String>,
}

impl PageFilter {
    pub fn new<S, K>(subjects: S, keywords: K) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        Self {
            subjects: subjects.into_iter().map(Into::into).collect(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn matches(&self, text: &str) -> bool {
        self.matched_pair(text).is_some()
    }

    /// First (subject, keyword) found on the page, in configuration order.
    pub fn matched_pair(&self, text: &str) -> Option<(&str, &str)> {
        let subject = self.subjects.iter().find(|s| text.contains(s.as_str()))?;
        let keyword = self.keywords.iter().find(|k| text.contains(k.as_str()))?;
        Some((subject.as_str(), keyword.as_str()))
    }
}
