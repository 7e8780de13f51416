use std::collections::HashSet;

use chrono::{DateTime, Utc};

/// `YYYYMMDDHHMM_Author_Name` for a comment signed at `date`.
pub fn comment_anchor(date: DateTime<Utc>, author: &str) -> String {
    format!("{}_{}", date.format("%Y%m%d%H%M"), author.replace(' ', "_"))
}

/// Hands out comment anchors that are unique within one extraction.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    issued: HashSet<String>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The anchor for `(date, author)`, suffixed `_2`, `_3`... when an
    /// earlier comment already took it.
    pub fn issue(&mut self, date: DateTime<Utc>, author: &str) -> String {
        let base = comment_anchor(date, author);
        if self.issued.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn collisions_are_numbered() {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 9, 7, 0).unwrap();
        let mut registry = AnchorRegistry::new();

        assert_eq!(registry.issue(date, "Jane Doe"), "202405010907_Jane_Doe");
        assert_eq!(registry.issue(date, "Jane Doe"), "202405010907_Jane_Doe_2");
        assert_eq!(registry.issue(date, "Jane Doe"), "202405010907_Jane_Doe_3");
        assert_eq!(registry.issue(date, "Other"), "202405010907_Other");
    }
}
