/// The query component of the browser location.
pub trait AddressBar: Send {
    /// Current query, without the leading `?`.
    fn query(&self) -> String;

    /// Replaces the current history entry's query.
    fn replace_query(&mut self, query: &str);
}

/// In-memory history stack with back/forward.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<String>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(query: &str) -> Self {
        Self {
            entries: vec![strip(query)],
            index: 0,
        }
    }

    /// Pushes a new entry, dropping any forward entries.
    pub fn push(&mut self, query: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(strip(query));
        self.index = self.entries.len() - 1;
    }

    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl AddressBar for MemoryHistory {
    fn query(&self) -> String {
        self.entries[self.index].clone()
    }

    fn replace_query(&mut self, query: &str) {
        self.entries[self.index] = strip(query);
    }
}

fn strip(query: &str) -> String {
    query.strip_prefix('?').unwrap_or(query).to_string()
}
