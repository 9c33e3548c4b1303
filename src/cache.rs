use std::collections::HashMap;
use std::sync::Mutex;

use tracing::warn;

use crate::error::Result;
use crate::tsv::Fields;

/// Read-only mapping from person identifier to display name.
///
/// Built completely from the people dataset before any dependent decoding
/// starts, then shared immutably across decode workers. Holding the whole
/// dataset resident is the dominant memory cost of a run; in exchange every
/// lookup is O(1) and needs no locking. The header line of the dataset is
/// consumed like any other line (its key can never collide with a person id).
pub struct NameCache {
    names: HashMap<String, String>,
}

impl NameCache {
    pub fn from_lines<I>(lines: I) -> Result<Self>
    where
        I: Iterator<Item = Result<String>>,
    {
        let mut names = HashMap::new();
        for line in lines {
            let line = line?;
            let mut fields = Fields::new(&line);
            let entry = fields
                .required("person identifier")
                .and_then(|id| fields.required("display name").map(|name| (id, name)));
            match entry {
                // Two consumed tokens per line; anything after them is ignored.
                Ok((id, name)) => {
                    names.insert(id.to_string(), name.to_string());
                }
                Err(e) => {
                    warn!("Skipping malformed people record: {}", e);
                }
            }
        }
        Ok(Self { names })
    }

    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for NameCache {
    fn default() -> Self {
        Self {
            names: HashMap::new(),
        }
    }
}

/// Mapping from title identifier to primary title.
///
/// Populated incrementally while the title-basics dataset streams through
/// (concurrent decode workers insert under the lock), then read during
/// principal-cast processing. The two access patterns never overlap in time.
/// Entries are write-once per key; lookups for titles not seen earlier in
/// this run miss, which the decoders treat as an absent display name.
pub struct TitleCache {
    titles: Mutex<HashMap<String, String>>,
}

impl TitleCache {
    pub fn new() -> Self {
        Self {
            titles: Mutex::new(HashMap::new()),
        }
    }

    pub fn record(&self, id: &str, primary_title: &str) {
        let mut titles = self.titles.lock().unwrap();
        titles
            .entry(id.to_string())
            .or_insert_with(|| primary_title.to_string());
    }

    pub fn resolve(&self, id: &str) -> Option<String> {
        let titles = self.titles.lock().unwrap();
        titles.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.titles.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.lock().unwrap().is_empty()
    }
}

impl Default for TitleCache {
    fn default() -> Self {
        Self::new()
    }
}

/// The cross-reference caches of one pipeline run, passed explicitly into the
/// decoders. Lives for the duration of the run and is discarded with it.
pub struct RunCaches {
    pub names: NameCache,
    pub titles: TitleCache,
}

impl RunCaches {
    pub fn new(names: NameCache) -> Self {
        Self {
            names,
            titles: TitleCache::new(),
        }
    }
}
