use regex::Regex;

use super::note::Section;
use crate::error::Result;

/// Section headers recognized in MIMIC-III notes.
pub const DEFAULT_SECTION_HEADERS: &[&str] = &[
    "Admission Date",
    "Date of Birth",
    "Service",
    "Allergies",
    "Attending",
    "Chief Complaint",
    "Major Surgical or Invasive Procedure",
    "History of Present Illness",
    "Past Medical History",
    "Social History",
    "Family History",
    "Physical Exam",
    "Pertinent Results",
    "Brief Hospital Course",
    "Hospital Course",
    "Medications on Admission",
    "Discharge Medications",
    "Discharge Disposition",
    "Discharge Diagnosis",
    "Discharge Condition",
    "Discharge Instructions",
    "Followup Instructions",
    "Impression",
    "Findings",
    "Indication",
    "Comparison",
    "Assessment",
    "Plan",
];

/// Name of the section holding text before the first header.
pub const PREAMBLE_SECTION: &str = "preamble";

/// Name of the only section of a note without recognized headers.
pub const DEFAULT_SECTION: &str = "default";

/// Splits note text into sections on line-leading headers.
pub struct SectionSplitter {
    header_re: Regex,
}

impl SectionSplitter {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let mut headers: Vec<&str> = headers.iter().map(AsRef::as_ref).collect();
        // longest first so that a header never matches as another's prefix
        headers.sort_by_key(|h| std::cmp::Reverse(h.len()));
        let alternation = headers
            .iter()
            .map(|h| regex::escape(h).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");
        let header_re = Regex::new(&format!(r"(?mi)^[ \t]*({alternation})[ \t]*:"))?;
        Ok(Self { header_re })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_SECTION_HEADERS)
    }

    #[must_use]
    pub fn split(&self, text: &str) -> Vec<Section> {
        let matches: Vec<(usize, usize, String)> = self
            .header_re
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let header = caps.get(1)?;
                Some((whole.start(), whole.end(), header.as_str().to_string()))
            })
            .collect();
        if matches.is_empty() {
            return vec![Section {
                id: 0,
                name: DEFAULT_SECTION.to_string(),
                header: None,
                body: text.trim().to_string(),
            }];
        }
        let mut sections = Vec::with_capacity(matches.len() + 1);
        let preamble = text[..matches[0].0].trim();
        if !preamble.is_empty() {
            sections.push(Section {
                id: 0,
                name: PREAMBLE_SECTION.to_string(),
                header: None,
                body: preamble.to_string(),
            });
        }
        for (i, (_, body_start, header)) in matches.iter().enumerate() {
            let body_end = matches.get(i + 1).map_or(text.len(), |next| next.0);
            sections.push(Section {
                id: sections.len(),
                name: slug(header),
                header: Some(header.clone()),
                body: text[*body_start..body_end].trim().to_string(),
            });
        }
        sections
    }
}

/// Split a section body into paragraphs on blank lines.
#[must_use]
pub fn split_paragraphs(body: &str) -> Vec<String> {
    let mut paras = Vec::new();
    let mut lines: Vec<&str> = Vec::new();
    for line in body.lines() {
        if line.trim().is_empty() {
            if !lines.is_empty() {
                paras.push(lines.join("\n"));
                lines.clear();
            }
        } else {
            lines.push(line.trim_end());
        }
    }
    if !lines.is_empty() {
        paras.push(lines.join("\n"));
    }
    paras
}

fn slug(header: &str) -> String {
    header
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE: &str = "Admission Date:  [**2150-3-1**]     Discharge Date:   [**2150-3-9**]

History of Present Illness:
Patient presents with kidney failure.

He denies fever.

Discharge Medications:
Aspirin
";

    #[test]
    fn split_on_line_leading_headers() {
        let secs = SectionSplitter::with_defaults().unwrap().split(NOTE);
        let names: Vec<&str> = secs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["admission-date", "history-of-present-illness", "discharge-medications"]
        );
        assert_eq!(secs[1].id, 1);
        assert_eq!(
            secs[1].body,
            "Patient presents with kidney failure.\n\nHe denies fever."
        );
        assert_eq!(secs[2].header.as_deref(), Some("Discharge Medications"));
    }

    #[test]
    fn text_without_headers_is_one_section() {
        let secs = SectionSplitter::with_defaults()
            .unwrap()
            .split("Pt resting comfortably.\nNo acute events.");
        assert_eq!(secs.len(), 1);
        assert_eq!(secs[0].name, DEFAULT_SECTION);
    }

    #[test]
    fn preamble_before_first_header() {
        let secs = SectionSplitter::new(&["Impression"])
            .unwrap()
            .split("CHEST (PA & LAT)\n\nIMPRESSION: No acute process.");
        assert_eq!(secs[0].name, PREAMBLE_SECTION);
        assert_eq!(secs[1].name, "impression");
        assert_eq!(secs[1].body, "No acute process.");
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let paras = split_paragraphs("a b\nc\n\n  \nd\n\n");
        assert_eq!(paras, vec!["a b\nc".to_string(), "d".to_string()]);
        assert!(split_paragraphs("   ").is_empty());
    }
}
