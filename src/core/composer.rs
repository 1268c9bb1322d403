use crate::core::code::{format_code, ParsedCode};
use crate::core::matcher;
use crate::domain::model::Course;
use once_cell::sync::Lazy;
use regex::Regex;

pub const SEE_SECTIONS: &str = "See individual sections";

/// 課名結尾的節次標記，如 "Economics II"、"Economics (a)"
static SECTION_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(?:^|\s+)(?:[IVX]+|[A-Za-z])|\s*\([A-Za-z]\))\s*$")
        .expect("Failed to compile section suffix regex")
});

pub fn compose(code: &str, courses: &[Course]) -> Option<Course> {
    let parsed = ParsedCode::parse(code)?;
    if parsed.numbers.len() != 1 || parsed.letters.chars().count() <= 1 {
        return None;
    }

    let prefix = parsed.prefix_group();
    let number = &parsed.numbers[0];

    let mut sections: Vec<Course> = Vec::new();
    for letter in parsed.letters.chars() {
        let section_code = format_code(&prefix, number, &letter.to_string());
        if let Some(found) = matcher::find(&section_code, courses) {
            if !sections
                .iter()
                .any(|s| s.original_code == found.original_code)
            {
                sections.push(found.clone());
            }
        }
    }

    if sections.len() < 2 {
        tracing::debug!(
            "No synthetic course for {}: {} section(s) found",
            code,
            sections.len()
        );
        return None;
    }

    let name = sections[0]
        .name
        .as_deref()
        .map(strip_section_suffix)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("{} {} (Multi-section)", prefix, number));

    let letters: Vec<String> = parsed.letters.chars().map(|c| c.to_string()).collect();
    let description = format!(
        "This course is offered as separate sections ({}). Click the highlighted code repeatedly to cycle through each section.",
        letters.join(", ")
    );

    Some(Course {
        original_code: code.trim().to_string(),
        course_code: None,
        name: Some(name),
        units: Some(SEE_SECTIONS.to_string()),
        terms: Some(SEE_SECTIONS.to_string()),
        prerequisites: Some(SEE_SECTIONS.to_string()),
        description: Some(description),
        instructors: Some(SEE_SECTIONS.to_string()),
        is_synthetic: true,
        section_courses: sections,
    })
}

fn strip_section_suffix(name: &str) -> String {
    let stripped = SECTION_SUFFIX.replace(name.trim(), "");
    stripped
        .trim_end_matches(|c: char| c.is_whitespace() || c == '-' || c == ':' || c == ',')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<Course> {
        vec![
            Course::new("EC 121 a", "Topics in Economics I"),
            Course::new("EC 121 b", "Topics in Economics II"),
            Course::new("EC 121 c", "Topics in Economics III"),
            Course::new("Ph 77 a", "Advanced Lab (a)"),
            Course::new("Ph 77 b", "Advanced Lab (b)"),
            Course::new("Bi 9 a", "A"),
            Course::new("Bi 9 b", "B"),
        ]
    }

    #[test]
    fn test_compose_two_sections() {
        let course = compose("EC 121 ab", &sections()).unwrap();
        assert!(course.is_synthetic);
        assert_eq!(course.original_code, "EC 121 ab");
        assert_eq!(course.name.as_deref(), Some("Topics in Economics"));
        assert_eq!(course.units.as_deref(), Some(SEE_SECTIONS));
        assert_eq!(course.section_courses.len(), 2);
        assert_eq!(course.section_courses[0].original_code, "EC 121 a");
        assert_eq!(course.section_courses[1].original_code, "EC 121 b");
        assert!(course.description.unwrap().contains("a, b"));
    }

    #[test]
    fn test_sections_follow_letter_order() {
        let course = compose("EC 121 ca", &sections()).unwrap();
        let codes: Vec<_> = course
            .section_courses
            .iter()
            .map(|c| c.original_code.as_str())
            .collect();
        assert_eq!(codes, vec!["EC 121 c", "EC 121 a"]);
    }

    #[test]
    fn test_parenthesized_suffix_and_fallback_name() {
        let lab = compose("Ph 77 ab", &sections()).unwrap();
        assert_eq!(lab.name.as_deref(), Some("Advanced Lab"));

        let bio = compose("Bi 9 ab", &sections()).unwrap();
        assert_eq!(bio.name.as_deref(), Some("Bi 9 (Multi-section)"));
    }

    #[test]
    fn test_no_composition_cases() {
        let courses = sections();
        assert!(compose("EC 121 a", &courses).is_none());
        assert!(compose("EC 121", &courses).is_none());
        assert!(compose("EC 121 ad", &courses).is_none());
        assert!(compose("EC 122 ab", &courses).is_none());
        assert!(compose("not a code", &courses).is_none());
        assert!(compose("EC 121 ab", &[]).is_none());
    }

    #[test]
    fn test_same_course_twice_is_not_two_sections() {
        let courses = vec![Course::new("Ma 1 abc", "Calculus")];
        assert!(compose("Ma 1 ab", &courses).is_none());
    }
}
