use std::collections::{BTreeMap, BTreeSet};

/// Coarse package title -> finer titles its payload already re-delivers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubsumptionTable {
    rules: BTreeMap<String, BTreeSet<String>>,
}

pub const CONTENT_CATEGORIES: [&str; 5] = ["Atlas", "Fonts", "Images", "Sounds", "Music"];

impl SubsumptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The launcher's two tiers: the whole application, and the whole
    /// content directory (published under both `AllContent` and `Content`).
    pub fn launcher_default() -> Self {
        Self::new()
            .with_rule("AllData", ["Application", "Content", "AllContent"])
            .with_rule("AllContent", CONTENT_CATEGORIES)
            .with_rule("Content", CONTENT_CATEGORIES)
    }

    pub fn with_rule<I, S>(mut self, coarse: &str, finer: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .entry(coarse.to_string())
            .or_default()
            .extend(finer.into_iter().map(Into::into));
        self
    }

    pub fn is_coarse(&self, title: &str) -> bool {
        self.rules.contains_key(title)
    }

    /// Every title reachable from `coarse`, excluding `coarse` itself.
    pub fn subsumed_by(&self, coarse: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut pending = vec![coarse.to_string()];

        while let Some(next) = pending.pop() {
            let Some(children) = self.rules.get(&next) else {
                continue;
            };
            for child in children {
                if child != coarse && seen.insert(child.clone()) {
                    pending.push(child.clone());
                }
            }
        }

        seen
    }
}
