use serde::{Deserialize, Serialize};

use crate::error::{ClinicalAmrError, Result};

/// Cache key of one paragraph: note row id, section id and paragraph index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParagraphKey {
    pub row_id: i64,
    pub sec_id: usize,
    pub pix: usize,
}

impl ParagraphKey {
    #[must_use]
    pub const fn new(row_id: i64, sec_id: usize, pix: usize) -> Self {
        Self {
            row_id,
            sec_id,
            pix,
        }
    }

    /// Identifier of a sentence in this paragraph: `row_id-sec_id-pix-six`.
    #[must_use]
    pub fn sentence_id(&self, six: usize) -> String {
        format!("{self}-{six}")
    }

    /// Parse a sentence identifier back into its paragraph key and sentence index.
    pub fn parse_sentence_id(sent_id: &str) -> Result<(Self, usize)> {
        let bad = || ClinicalAmrError::SentenceId(sent_id.to_string());
        let parts: Vec<&str> = sent_id.trim().split('-').collect();
        let [row_id, sec_id, pix, six] = parts.as_slice() else {
            return Err(bad());
        };
        let key = Self::new(
            row_id.parse().map_err(|_| bad())?,
            sec_id.parse().map_err(|_| bad())?,
            pix.parse().map_err(|_| bad())?,
        );
        Ok((key, six.parse().map_err(|_| bad())?))
    }
}

impl std::fmt::Display for ParagraphKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.row_id, self.sec_id, self.pix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic() {
        let a = ParagraphKey::new(1234, 7, 0);
        let b = ParagraphKey::new(1234, 7, 0);
        assert_eq!(a.to_string(), "1234-7-0");
        assert_eq!(a.to_string(), b.to_string());
        assert_ne!(a.to_string(), ParagraphKey::new(1234, 7, 1).to_string());
    }

    #[test]
    fn sentence_id_round_trip() {
        let key = ParagraphKey::new(55, 3, 2);
        let sid = key.sentence_id(4);
        assert_eq!(sid, "55-3-2-4");
        assert_eq!(ParagraphKey::parse_sentence_id(&sid).unwrap(), (key, 4));
    }

    #[test]
    fn malformed_sentence_id() {
        assert!(ParagraphKey::parse_sentence_id("55-3-2").is_err());
        assert!(ParagraphKey::parse_sentence_id("55-x-2-1").is_err());
    }
}
