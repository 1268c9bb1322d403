use crate::domain::model::{Course, CourseCodeParts};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// 超過此值的純數字行視為頁碼
pub const PAGE_NUMBER_THRESHOLD: u32 = 500;

pub const DEPARTMENT_HEADERS: &[&str] = &[
    "AEROSPACE",
    "ANTHROPOLOGY",
    "APPLIED AND COMPUTATIONAL MATH",
    "APPLIED & COMPUTATIONAL MATH",
    "APPLIED MECHANICS",
    "APPLIED PHYSICS",
    "ASTROPHYSICS",
    "BIOCHEMISTRY AND MOLECULAR BIOPHYSICS",
    "BIOCHEMISTRY & MOLECULAR BIOPHYSICS",
    "BIOENGINEERING",
    "BIOLOGY",
    "BUSINESS ECONOMICS AND MANAGEMENT",
    "BUSINESS ECONOMICS & MANAGEMENT",
    "CHEMICAL ENGINEERING",
    "CHEMISTRY",
    "CIVIL ENGINEERING",
    "COMPUTATION AND NEURAL SYSTEMS",
    "COMPUTATION & NEURAL SYSTEMS",
    "COMPUTER SCIENCE",
    "COMPUTING AND MATHEMATICAL SCIENCES",
    "COMPUTING & MATHEMATICAL SCIENCES",
    "CONTROL AND DYNAMICAL SYSTEMS",
    "CONTROL & DYNAMICAL SYSTEMS",
    "ECONOMICS",
    "ELECTRICAL ENGINEERING",
    "ENERGY SCIENCE AND TECHNOLOGY",
    "ENERGY SCIENCE & TECHNOLOGY",
    "ENGINEERING",
    "ENGLISH",
    "ENGLISH AS A SECOND LANGUAGE",
    "ENVIRONMENTAL SCIENCE AND ENGINEERING",
    "ENVIRONMENTAL SCIENCE & ENGINEERING",
    "FIRST-YEAR SEMINARS",
    "GEOLOGY",
    "HISTORY",
    "HISTORY AND PHILOSOPHY OF SCIENCE",
    "HISTORY & PHILOSOPHY OF SCIENCE",
    "HUMANITIES",
    "INFORMATION AND DATA SCIENCES",
    "INFORMATION & DATA SCIENCES",
    "INFORMATION SCIENCE AND TECHNOLOGY",
    "INFORMATION SCIENCE & TECHNOLOGY",
    "LANGUAGES",
    "LAW",
    "MATERIALS SCIENCE",
    "MATHEMATICS",
    "MECHANICAL ENGINEERING",
    "MEDICAL ENGINEERING",
    "MUSIC",
    "NEUROBIOLOGY",
    "PERFORMING AND VISUAL ARTS",
    "PERFORMING & VISUAL ARTS",
    "PHILOSOPHY",
    "PHYSICAL EDUCATION",
    "PHYSICS",
    "POLITICAL SCIENCE",
    "PSYCHOLOGY",
    "SCIENTIFIC AND ENGINEERING COMMUNICATION",
    "SCIENTIFIC & ENGINEERING COMMUNICATION",
    "SOCIAL SCIENCE",
    "STUDENT ACTIVITIES",
    "VISUAL CULTURE",
    "WRITING",
];

static HEADER_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| DEPARTMENT_HEADERS.iter().copied().collect());

static DEPARTMENT_ENDINGS: Lazy<Vec<String>> = Lazy::new(|| {
    DEPARTMENT_HEADERS
        .iter()
        .map(|d| format!("see {}", d.to_lowercase()))
        .collect()
});

static COURSE_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z][a-zA-Z]{1,4}(?:/[A-Z][a-zA-Z]{1,4})*\s\d{1,3}(?:/\d{1,3})?(?:\s[a-z]+)?\.\s+")
        .expect("Failed to compile course start regex")
});

static HEADER_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<code>[A-Z][a-zA-Z\s/&]+\s\d{1,3}.*?|[A-Z][a-zA-Z]{1,4}\s\d{1,3}/\d{1,3})\.\s")
        .expect("Failed to compile course header regex")
});

static PREREQUISITES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)Prerequisites:\s*(.*?)\.").expect("Failed to compile prerequisites regex")
});

static INSTRUCTORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)Instructors?:\s(.*?)(?:\sNot offered|$)")
        .expect("Failed to compile instructors regex")
});

static DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("Failed to compile digit regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub single_line_headers: usize,
    pub multi_line_headers: usize,
    pub page_numbers: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogBuild {
    pub courses: Vec<Course>,
    pub lines_read: usize,
    pub lines_kept: usize,
    pub clean_stats: CleanStats,
    pub cleaned_lines: Vec<String>,
}

impl CatalogBuild {
    pub fn cleaned_text(&self) -> String {
        self.cleaned_lines.join("\n")
    }
}

/// 清理、切塊、解析，產生課程目錄
pub fn build_catalog(raw_text: &str) -> CatalogBuild {
    let lines: Vec<&str> = raw_text.lines().collect();
    let (cleaned, clean_stats) = clean_catalog_text(&lines);

    tracing::info!(
        "Removed {} single-line headers, {} multi-line headers, {} page numbers",
        clean_stats.single_line_headers,
        clean_stats.multi_line_headers,
        clean_stats.page_numbers
    );
    tracing::info!("Cleaned catalog: {} -> {} lines", lines.len(), cleaned.len());

    let courses: Vec<Course> = split_course_blocks(&cleaned)
        .iter()
        .filter_map(|block| parse_course_block(block))
        .collect();

    tracing::info!("Parsed {} courses", courses.len());

    CatalogBuild {
        courses,
        lines_read: lines.len(),
        lines_kept: cleaned.len(),
        clean_stats,
        cleaned_lines: cleaned,
    }
}

pub fn is_department_header(line: &str) -> bool {
    HEADER_SET.contains(line.trim().to_uppercase().as_str())
}

/// 跨 2 或 3 行的系所標題行數
fn multi_line_header_len(lines: &[&str], start: usize) -> usize {
    let remaining = lines.len().saturating_sub(start);
    for count in 2..=remaining.min(3) {
        let parts: Vec<&str> = lines[start..start + count].iter().map(|l| l.trim()).collect();
        if parts.iter().any(|p| p.is_empty()) {
            break;
        }
        if is_department_header(&parts.join(" ")) {
            return count;
        }
    }
    0
}

fn is_page_number(line: &str) -> bool {
    !line.is_empty()
        && line.chars().all(|c| c.is_ascii_digit())
        && line
            .parse::<u32>()
            .map(|n| n > PAGE_NUMBER_THRESHOLD)
            .unwrap_or(true)
}

/// 移除系所標題與頁碼，頁碼前一行的頁尾也一併移除
pub fn clean_catalog_text(lines: &[&str]) -> (Vec<String>, CleanStats) {
    let mut result: Vec<String> = Vec::with_capacity(lines.len());
    let mut stats = CleanStats::default();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if is_department_header(line) {
            stats.single_line_headers += 1;
            i += 1;
            continue;
        }

        let header_len = multi_line_header_len(lines, i);
        if header_len > 0 {
            stats.multi_line_headers += 1;
            i += header_len;
            continue;
        }

        if is_page_number(line) {
            if result.last().is_some_and(|prev| !is_department_header(prev)) {
                result.pop();
            }
            stats.page_numbers += 1;
            i += 1;
            continue;
        }

        result.push(lines[i].to_string());
        i += 1;
    }

    (result, stats)
}

/// 此行是否可作為課程描述的結尾
pub fn is_valid_course_ending(line: &str, previous_line: &str) -> bool {
    let line = line.trim_end();
    if line.is_empty() {
        return false;
    }

    if line.ends_with('.')
        || line.ends_with(';')
        || ["Seminars", "Geology", "Biophysics"]
            .iter()
            .any(|w| line.ends_with(w))
    {
        return true;
    }

    let lower = line.to_lowercase();
    if lower.contains("not offered")
        || lower.contains("instructor:")
        || lower.contains("instructors:")
        || lower.contains("for course description,")
    {
        return true;
    }

    // "see" 與系所名稱可能被拆成兩行
    let combined = if previous_line.is_empty() {
        None
    } else {
        Some(format!("{} {}", previous_line.trim_end(), line).to_lowercase())
    };

    DEPARTMENT_ENDINGS.iter().any(|ending| {
        lower.ends_with(ending.as_str())
            || combined
                .as_deref()
                .is_some_and(|c| c.ends_with(ending.as_str()))
    })
}

/// 依課程切塊，第一門課之前的文字捨棄
pub fn split_course_blocks(lines: &[String]) -> Vec<Vec<String>> {
    let mut blocks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut previous = String::new();
    let mut two_back = String::new();

    for line in lines {
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }

        let mut is_start = COURSE_START.is_match(stripped);
        // 描述中提到的課程代碼不算新課程
        if is_start
            && !previous.is_empty()
            && !is_valid_course_ending(&previous, &two_back)
            && !is_department_header(&previous)
        {
            is_start = false;
        }

        if is_start && !current.is_empty() {
            blocks.push(std::mem::take(&mut current));
        }

        if is_start || !current.is_empty() {
            current.push(stripped.to_string());
        }

        two_back = std::mem::replace(&mut previous, stripped.to_string());
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

pub fn parse_course_code(code: &str) -> CourseCodeParts {
    let mut parts = code.split_whitespace();
    let Some(first) = parts.next() else {
        return CourseCodeParts::default();
    };

    let mut parsed = CourseCodeParts {
        prefixes: first
            .split('/')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
        ..CourseCodeParts::default()
    };

    for part in parts {
        if part.chars().any(|c| c.is_ascii_digit()) {
            if part.contains('/') {
                parsed
                    .numbers
                    .extend(DIGIT_RUN.find_iter(part).map(|m| m.as_str().to_string()));
            } else if let Some(m) = DIGIT_RUN.find(part) {
                parsed.numbers.push(m.as_str().to_string());
            }
        } else {
            parsed.letters.push(part.to_string());
        }
    }

    parsed
}

/// 解析單一課程區塊，只指向其他系所說明的區塊略過
pub fn parse_course_block(block: &[String]) -> Option<Course> {
    let first_line = block.first()?;
    let full_text = block
        .iter()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join(" ");

    if full_text.to_lowercase().contains("for course description, see") {
        return None;
    }

    let code_match = HEADER_CODE.captures(first_line.trim())?;
    let code = code_match.name("code")?.as_str().trim().to_string();
    let after_code = code_match.get(0)?.end();

    // 課程名稱到下一個句點為止，可能跨行
    let name_start = full_text[after_code..]
        .find(|c: char| !c.is_whitespace())
        .map(|offset| after_code + offset)?;
    let name_len = full_text[name_start..].find('.')?;
    let name = full_text[name_start..name_start + name_len].trim().to_string();
    if name.is_empty() {
        return None;
    }
    let header_end = name_start + name_len + 1;

    let remaining = &full_text[header_end..];
    let (units, terms) = extract_units_and_terms(remaining);

    let prerequisites_match = PREREQUISITES.captures(&full_text);
    let instructors_match = INSTRUCTORS.captures(&full_text);

    let prerequisites = prerequisites_match
        .as_ref()
        .and_then(|c| c.get(1))
        .map(|m| collapse(m.as_str()))
        .filter(|s| !s.is_empty());
    let instructors = instructors_match
        .as_ref()
        .and_then(|c| c.get(1))
        .map(|m| collapse(m.as_str()).trim_end_matches('.').to_string())
        .filter(|s| !s.is_empty());

    let description_start = prerequisites_match
        .as_ref()
        .and_then(|c| c.get(0))
        .map(|m| m.end())
        .unwrap_or(header_end);
    let description_end = instructors_match
        .as_ref()
        .and_then(|c| c.get(0))
        .map(|m| m.start())
        .unwrap_or(full_text.len());
    let description = extract_description(&full_text, description_start, description_end);

    Some(Course {
        course_code: Some(parse_course_code(&code)),
        original_code: code,
        name: Some(name),
        units,
        terms,
        prerequisites,
        description,
        instructors,
        is_synthetic: false,
        section_courses: Vec::new(),
    })
}

/// 學分與開課學期
fn extract_units_and_terms(text: &str) -> (Option<String>, Option<String>) {
    let (first, rest) = match text.split_once(';') {
        Some((first, rest)) => (first, Some(rest)),
        None => (text, None),
    };
    let terms_of = |rest: &str| {
        let terms = rest.split('.').next().unwrap_or("").trim().to_string();
        (!terms.is_empty()).then_some(terms)
    };

    if first.to_lowercase().contains("units") {
        let units = first.trim().to_string();
        let lower = units.to_lowercase();
        let terms = if lower.starts_with("units in accordance") || lower.starts_with("units to be") {
            None
        } else {
            rest.and_then(terms_of)
        };
        ((!units.is_empty()).then_some(units), terms)
    } else {
        (None, rest.and_then(terms_of))
    }
}

fn extract_description(text: &str, start: usize, end: usize) -> Option<String> {
    if start >= end || end > text.len() {
        return None;
    }
    let raw = text.get(start..end)?;
    let description = collapse(raw.trim().trim_matches(|c| c == ';' || c == ' ' || c == '.'));
    if description.is_empty() || description.to_lowercase().starts_with("prerequisites") {
        None
    } else {
        Some(description)
    }
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "\
COMPUTER SCIENCE
CS 156 ab. Learning Systems. 9 units (3-0-6); third term. Prerequisites: Ma 2 and CS 2. Introduction to
the theory and practice of machine learning. Instructor: Abu-Mostafa.
Ma/CS 6/106 abc. Introduction to Discrete
Mathematics. 9 units (3-0-6); first, second terms. An introduction to combinatorics.
Course catalog footer 2025
612
CS 2. Introduction to Programming Methods. 9 units; second term.
CS 9. Introduction to Computer Science Research. 1 unit; first term. For course description, see Electrical Engineering.
";

    #[test]
    fn test_clean_removes_headers_and_page_footers() {
        let lines: Vec<&str> = RAW.lines().collect();
        let (cleaned, stats) = clean_catalog_text(&lines);
        assert_eq!(stats.single_line_headers, 1);
        assert_eq!(stats.page_numbers, 1);
        assert!(!cleaned.iter().any(|l| l.contains("footer")));
        assert!(!cleaned.iter().any(|l| l.trim() == "612"));
    }

    #[test]
    fn test_multi_line_header() {
        let lines = vec!["APPLIED AND", "COMPUTATIONAL MATH", "ACM 95/100 ab. Methods. 9 units."];
        let (cleaned, stats) = clean_catalog_text(&lines);
        assert_eq!(stats.multi_line_headers, 1);
        assert_eq!(cleaned.len(), 1);
    }

    #[test]
    fn test_small_numbers_are_not_page_numbers() {
        assert!(is_page_number("612"));
        assert!(!is_page_number("12"));
        assert!(!is_page_number("12a"));
    }

    #[test]
    fn test_build_catalog() {
        let build = build_catalog(RAW);
        assert_eq!(build.lines_read, RAW.lines().count());
        assert!(!build.cleaned_text().contains("COMPUTER SCIENCE"));
        let codes: Vec<_> = build.courses.iter().map(|c| c.original_code.as_str()).collect();
        assert_eq!(codes, vec!["CS 156 ab", "Ma/CS 6/106 abc", "CS 2"]);

        let cs156 = &build.courses[0];
        assert_eq!(cs156.name.as_deref(), Some("Learning Systems"));
        assert_eq!(cs156.units.as_deref(), Some("9 units (3-0-6)"));
        assert_eq!(cs156.terms.as_deref(), Some("third term"));
        assert_eq!(cs156.prerequisites.as_deref(), Some("Ma 2 and CS 2"));
        assert_eq!(cs156.instructors.as_deref(), Some("Abu-Mostafa"));
        assert_eq!(
            cs156.description.as_deref(),
            Some("Introduction to the theory and practice of machine learning")
        );

        let discrete = &build.courses[1];
        assert_eq!(
            discrete.name.as_deref(),
            Some("Introduction to Discrete Mathematics")
        );
        assert_eq!(discrete.terms.as_deref(), Some("first, second terms"));
        assert_eq!(
            discrete.course_code,
            Some(CourseCodeParts {
                prefixes: vec!["Ma".into(), "CS".into()],
                numbers: vec!["6".into(), "106".into()],
                letters: vec!["abc".into()],
            })
        );
    }

    #[test]
    fn test_mentions_inside_descriptions_do_not_split() {
        let lines: Vec<String> = vec![
            "CS 1. Programming. 9 units; first term. Students who took".to_string(),
            "CS 2. may not enroll.".to_string(),
            "CS 3. Practicum. 6 units; third term.".to_string(),
        ];
        let blocks = split_course_blocks(&lines);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].len(), 2);
    }

    #[test]
    fn test_valid_course_endings() {
        assert!(is_valid_course_ending("Instructor: Staff", ""));
        assert!(is_valid_course_ending("Not offered 2025-26", ""));
        assert!(is_valid_course_ending("Seminars", ""));
        assert!(is_valid_course_ending("Electrical Engineering", "For details see"));
        assert!(!is_valid_course_ending("continues with more", ""));
        assert!(!is_valid_course_ending("", ""));
    }

    #[test]
    fn test_units_without_terms() {
        let (units, terms) = extract_units_and_terms(" Units to be arranged; any term.");
        assert_eq!(units.as_deref(), Some("Units to be arranged"));
        assert!(terms.is_none());

        let (units, terms) = extract_units_and_terms(" Credit varies; first term.");
        assert!(units.is_none());
        assert_eq!(terms.as_deref(), Some("first term"));
    }

    #[test]
    fn test_parse_course_code_parts() {
        let parts = parse_course_code("Ae/APh/CE/ME 101 abc");
        assert_eq!(parts.prefixes, vec!["Ae", "APh", "CE", "ME"]);
        assert_eq!(parts.numbers, vec!["101"]);
        assert_eq!(parts.letters, vec!["abc"]);
        assert_eq!(parse_course_code(""), CourseCodeParts::default());
    }
}
