use crate::models::ExtractedClaim;
use regex::Regex;

// Only the top of the document is scanned for labeled fields; dates can
// still be picked up anywhere by the unlabeled fallback
const LABELED_SCAN_LINES: usize = 40;
const NAME_FALLBACK_LINES: usize = 6;

const DOB_LABELS: [&str; 3] = ["DOB", "DATE OF BIRTH", "BIRTH"];
const BOILERPLATE_TOKENS: [&str; 6] = ["ADDRESS", "GOVT", "INDIA", "PIN", "LICENSE", "LICENCE"];

/// Heuristic extraction of a candidate name and date of birth from raw OCR
/// text. Both fields are optional outcomes; an unparseable document is not
/// an error.
pub struct ClaimParser {
    date_patterns: Vec<Regex>,
}

impl ClaimParser {
    pub fn new() -> Self {
        // Date shapes in fixed priority order; the first pattern to match
        // wins, both on a labeled line and in the whole-document fallback
        let date_patterns = [
            r"\d{2}[./-]\d{2}[./-]\d{4}",
            r"\d{2}[./-]\d{2}[./-]\d{2}",
            r"\d{4}[./-]\d{2}[./-]\d{2}",
            r"(?i)\d{1,2}\s+[A-Z]{3,}\s+\d{4}",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect();

        ClaimParser { date_patterns }
    }

    pub fn parse(&self, ocr_text: &str) -> ExtractedClaim {
        let lines: Vec<&str> = ocr_text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let mut name: Option<String> = None;
        let mut dob: Option<String> = None;

        // Labeled scan over the top of the document
        for line in lines.iter().take(LABELED_SCAN_LINES) {
            let upper = line.to_uppercase();

            if name.is_none() && upper.contains("NAME") && line.contains(':') {
                if let Some((_, rest)) = line.split_once(':') {
                    let candidate = rest.trim();
                    if !candidate.is_empty() {
                        name = Some(candidate.to_string());
                    }
                }
            }

            if dob.is_none() && DOB_LABELS.iter().any(|label| upper.contains(label)) {
                dob = self.first_date_in(line);
            }

            if name.is_some() && dob.is_some() {
                break;
            }
        }

        // Unlabeled date fallback: each pattern, in priority order, is tried
        // against every line; the first pattern to match anywhere wins
        if dob.is_none() {
            'patterns: for pattern in &self.date_patterns {
                for line in &lines {
                    if let Some(found) = pattern.find(line) {
                        dob = Some(found.as_str().to_string());
                        break 'patterns;
                    }
                }
            }
        }

        // Unlabeled name fallback: the first top-of-document line that is
        // free of digits and boilerplate and still looks like a full name
        if name.is_none() {
            for line in lines.iter().take(NAME_FALLBACK_LINES) {
                if line.chars().any(|c| c.is_ascii_digit()) {
                    continue;
                }
                let upper = line.to_uppercase();
                if BOILERPLATE_TOKENS.iter().any(|token| upper.contains(token)) {
                    continue;
                }
                if line.split_whitespace().count() >= 2 {
                    name = Some(line.to_string());
                    break;
                }
            }
        }

        ExtractedClaim {
            name,
            date_of_birth: dob,
        }
    }

    fn first_date_in(&self, line: &str) -> Option<String> {
        for pattern in &self.date_patterns {
            if let Some(found) = pattern.find(line) {
                return Some(found.as_str().to_string());
            }
        }
        None
    }
}

impl Default for ClaimParser {
    fn default() -> Self {
        Self::new()
    }
}
