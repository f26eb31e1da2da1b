use chrono::Utc;

/// Lower bound of the next fetch window, as a Unix timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PollCursor {
    value: i64,
}

impl PollCursor {
    pub fn new(timestamp: i64) -> Self {
        Self { value: timestamp }
    }

    /// Cursor positioned at the current wall-clock time
    pub fn now() -> Self {
        Self::new(Utc::now().timestamp())
    }

    pub fn timestamp(self) -> i64 {
        self.value
    }
}

impl std::fmt::Display for PollCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}
