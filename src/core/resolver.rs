use crate::core::catalog::Catalog;
use crate::core::code::{format_code, ParsedCode};
use crate::core::scanner::TextScanner;
use crate::core::{composer, matcher};
use crate::domain::model::{
    CandidateMatch, Course, MatchKind, RangeEntry, ScanOptions, ValidatedMatch,
};

/// 依序：目錄比對、合成節次、逐一前綴 ("APh/EE 23" -> "APh 23")
pub fn lookup(code: &str, courses: &[Course]) -> Option<Course> {
    if let Some(course) = matcher::find(code, courses) {
        return Some(course.clone());
    }
    if let Some(synthetic) = composer::compose(code, courses) {
        return Some(synthetic);
    }

    let parsed = ParsedCode::parse(code)?;
    if parsed.prefixes.len() < 2 {
        return None;
    }
    let numbers = parsed.number_group();
    parsed.prefixes.iter().find_map(|prefix| {
        matcher::find(&format_code(prefix, &numbers, &parsed.letters), courses).cloned()
    })
}

/// 查不到的候選直接略過
pub fn resolve(candidates: Vec<CandidateMatch>, catalog: &Catalog) -> Vec<ValidatedMatch> {
    let mut validated: Vec<ValidatedMatch> = candidates
        .into_iter()
        .filter_map(|candidate| resolve_candidate(candidate, catalog))
        .collect();

    validated.sort_by_key(|m| m.start());
    debug_assert!(
        validated.windows(2).all(|w| w[0].end() <= w[1].start()),
        "scanner produced overlapping candidates"
    );
    validated
}

fn resolve_candidate(candidate: CandidateMatch, catalog: &Catalog) -> Option<ValidatedMatch> {
    match &candidate.kind {
        MatchKind::Range {
            generated_codes, ..
        } => {
            let range_courses: Vec<RangeEntry> = generated_codes
                .iter()
                .filter_map(|code| {
                    catalog.lookup(code).map(|course| RangeEntry {
                        code: code.clone(),
                        course,
                    })
                })
                .collect();

            let first = range_courses.first()?.course.clone();
            Some(ValidatedMatch {
                candidate,
                course: first,
                range_courses,
            })
        }
        _ => {
            let Some(course) = catalog.lookup(&candidate.code) else {
                tracing::trace!("No catalog course for '{}'", candidate.code);
                return None;
            };
            Some(ValidatedMatch {
                candidate,
                course,
                range_courses: Vec::new(),
            })
        }
    }
}

/// 掃描並解析單一文字單元
pub fn recognize(text: &str, catalog: &Catalog, options: ScanOptions) -> Vec<ValidatedMatch> {
    let candidates = TextScanner::new(catalog, options).scan(text);
    resolve(candidates, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Course::new("CS 156", "Learning Systems"),
            Course::new("APh 23", "Optics Demonstrations"),
            Course::new("EE 24", "Electrical Engineering Lab"),
            Course::new("EC 121 a", "Topics I"),
            Course::new("EC 121 b", "Topics II"),
            Course::new("Ma 1 a", "Calculus"),
            Course::new("Ma 3", "Probability"),
        ])
    }

    #[test]
    fn test_lookup_order() {
        let catalog = catalog();
        assert_eq!(lookup("CS 156", catalog.courses()).unwrap().original_code, "CS 156");

        let synthetic = lookup("EC 121 ab", catalog.courses()).unwrap();
        assert!(synthetic.is_synthetic);

        let by_prefix = lookup("APh/EE 23", catalog.courses()).unwrap();
        assert_eq!(by_prefix.original_code, "APh 23");
        let by_second_prefix = lookup("APh/EE 24", catalog.courses()).unwrap();
        assert_eq!(by_second_prefix.original_code, "EE 24");

        assert!(lookup("CS 157", catalog.courses()).is_none());
    }

    #[test]
    fn test_range_collects_resolved_codes_in_order() {
        let matches = recognize("Ma 1-4 are core.", &catalog(), ScanOptions::default());
        assert_eq!(matches.len(), 1);
        let codes: Vec<_> = matches[0]
            .range_courses
            .iter()
            .map(|e| e.code.as_str())
            .collect();
        assert_eq!(codes, vec!["Ma 1", "Ma 3"]);
        assert_eq!(matches[0].course.original_code, "Ma 1 a");
    }

    #[test]
    fn test_unresolved_range_is_dropped() {
        assert!(recognize("EC 130-132", &catalog(), ScanOptions::default()).is_empty());
    }

    #[test]
    fn test_unresolved_candidates_are_silent() {
        let matches = recognize("Page 12 and CS 999, then CS 156.", &catalog(), ScanOptions::default());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].candidate.text, "CS 156");
    }

    #[test]
    fn test_empty_catalog_recognizes_nothing() {
        assert!(recognize("CS 156", &Catalog::default(), ScanOptions::default()).is_empty());
    }

    #[test]
    fn test_results_sorted_and_disjoint() {
        let text = "APh/EE 23/24, then CS 156 and Ma 1-3 plus EC 121 ab.";
        let matches = recognize(text, &catalog(), ScanOptions::default());
        assert!(matches.len() >= 4);
        for pair in matches.windows(2) {
            assert!(pair[0].end() <= pair[1].start());
        }
        for m in &matches {
            assert_eq!(&text[m.start()..m.end()], m.candidate.text);
        }
    }
}
