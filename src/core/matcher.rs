use crate::core::code::{is_letter_subset, separator_forms_equal, ParsedCode};
use crate::core::variants::generate_variants;
use crate::domain::model::Course;

/// 課程是否為任一變體所指 (不分大小寫)
/// 前綴與節次字母都必須是課程的子集
pub fn matches(course: &Course, variants: &[String]) -> bool {
    if variants
        .iter()
        .any(|v| separator_forms_equal(&course.original_code, v))
    {
        return true;
    }

    match ParsedCode::parse_folded(&course.original_code) {
        Some(course_code) => variants.iter().any(|variant| {
            ParsedCode::parse_folded(variant)
                .map(|input| matches_shape(&course_code, &input))
                .unwrap_or(false)
        }),
        None if course.original_code.contains('/') => variants
            .iter()
            .any(|variant| matches_slash_segment(&course.original_code, variant)),
        None => false,
    }
}

/// 在目錄中找課程，完全相符優先於規則比對
pub fn find<'a>(code: &str, courses: &'a [Course]) -> Option<&'a Course> {
    let variants = generate_variants(code);
    if variants.is_empty() {
        return None;
    }

    courses
        .iter()
        .find(|course| {
            variants
                .iter()
                .any(|v| separator_forms_equal(&course.original_code, v))
        })
        .or_else(|| courses.iter().find(|course| matches(course, &variants)))
}

fn matches_shape(course: &ParsedCode, input: &ParsedCode) -> bool {
    if course.numbers.len() >= 2 {
        matches_compound(course, input)
    } else if course.prefixes.len() > 1 {
        matches_cross_listed(course, input)
    } else {
        matches_single_department(course, input)
    }
}

fn matches_compound(course: &ParsedCode, input: &ParsedCode) -> bool {
    if !input.has_prefixes_within(course) {
        return false;
    }

    let numbers_match = match input.numbers.as_slice() {
        [single] => course.numbers.contains(single),
        several => several == course.numbers.as_slice(),
    };

    numbers_match && is_letter_subset(&input.letters, &course.letters)
}

fn matches_cross_listed(course: &ParsedCode, input: &ParsedCode) -> bool {
    input.has_prefixes_within(course)
        && input.numbers == course.numbers
        && is_letter_subset(&input.letters, &course.letters)
}

fn matches_single_department(course: &ParsedCode, input: &ParsedCode) -> bool {
    input.prefixes == course.prefixes
        && input.numbers == course.numbers
        && is_letter_subset(&input.letters, &course.letters)
}

fn matches_slash_segment(course_code: &str, variant: &str) -> bool {
    course_code
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .any(|segment| separator_forms_equal(segment, variant))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Course> {
        vec![
            Course::new("CS 156", "Learning Systems"),
            Course::new("Ma/CS 6/106 abc", "Introduction to Discrete Mathematics"),
            Course::new("ACM 95/100 ab", "Introductory Methods of Applied Mathematics"),
            Course::new("Ae/APh/CE/ME 101 abc", "Fluid Mechanics"),
            Course::new("EC 121 a", "Economics Section A"),
            Course::new("EC 121 b", "Economics Section B"),
        ]
    }

    fn code_of(code: &str, courses: &[Course]) -> Option<String> {
        find(code, courses).map(|c| c.original_code.clone())
    }

    #[test]
    fn test_direct_match_ignores_case_and_separators() {
        let courses = catalog();
        assert_eq!(code_of("CS 156", &courses).as_deref(), Some("CS 156"));
        assert_eq!(code_of("cs156", &courses).as_deref(), Some("CS 156"));
        assert_eq!(code_of("CS/156", &courses).as_deref(), Some("CS 156"));
    }

    #[test]
    fn test_cross_listed_compound_single_number() {
        let courses = catalog();
        assert_eq!(code_of("CS 6", &courses).as_deref(), Some("Ma/CS 6/106 abc"));
        assert_eq!(code_of("Ma 106", &courses).as_deref(), Some("Ma/CS 6/106 abc"));
        assert_eq!(code_of("Ma/CS 6 a", &courses).as_deref(), Some("Ma/CS 6/106 abc"));
        assert_eq!(code_of("Ma/CS 6/106", &courses).as_deref(), Some("Ma/CS 6/106 abc"));
    }

    #[test]
    fn test_compound_requires_exact_number_pair() {
        let courses = catalog();
        assert!(find("Ma/CS 106/6", &courses).is_none());
        assert!(find("Ma/CS 6/107", &courses).is_none());
        assert!(find("Ma/CS 7", &courses).is_none());
    }

    #[test]
    fn test_prefix_subset_law() {
        let courses = catalog();
        assert_eq!(code_of("APh/ME 101", &courses).as_deref(), Some("Ae/APh/CE/ME 101 abc"));
        assert!(find("Ph 101", &courses).is_none());
        assert!(find("EE/CS 6", &courses).is_none());
        assert!(find("CS/EE 156", &courses).is_none());
    }

    #[test]
    fn test_letter_subset_rule() {
        let courses = catalog();
        assert_eq!(code_of("ACM 95 b", &courses).as_deref(), Some("ACM 95/100 ab"));
        assert!(find("ACM 95 c", &courses).is_none());
        assert!(find("CS 156 a", &courses).is_none());
        assert!(find("EC 121 ab", &courses).is_none());
        assert_eq!(code_of("EC 121 b", &courses).as_deref(), Some("EC 121 b"));
    }

    #[test]
    fn test_exact_match_preferred_over_rule_match() {
        let courses = vec![
            Course::new("EC 121 a", "Section A"),
            Course::new("EC 121", "Whole course"),
        ];
        assert_eq!(code_of("EC 121", &courses).as_deref(), Some("EC 121"));
    }

    #[test]
    fn test_slash_split_fallback() {
        let course = Course::new("Bi 1 egimx/Bi 1 abc", "Principles of Biology");
        assert!(matches(&course, &generate_variants("Bi 1 abc")));
        assert!(!matches(&course, &generate_variants("Bi 2")));
    }

    #[test]
    fn test_malformed_course_never_matches() {
        let courses = vec![Course::new("", "Empty"), Course::new("Not a code", "Prose")];
        assert!(find("CS 1", &courses).is_none());
        assert!(find("", &catalog()).is_none());
    }
}
