use crate::core::catalog::Catalog;
use crate::core::code::format_code;
use crate::domain::model::{CandidateMatch, MatchKind, ScanOptions};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;

const PREFIX_GROUP: &str = r"[A-Z][A-Za-z]{0,4}(?:/[A-Z][A-Za-z]{0,4})*";
const LIST_SEPARATOR: &str = r"(?:\s*,\s*(?:(?:and|or)\s+)?|\s+(?:and|or)\s+)";

static RANGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?P<prefix>{})\s+(?P<start>\d{{1,3}})\s*[-–—]\s*(?P<end>\d{{1,3}})\b",
        PREFIX_GROUP
    ))
    .expect("Failed to compile range regex")
});

static SHORTHAND_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?P<prefix>{})\s+(?P<number>\d{{1,3}})(?: ?(?P<letters>[a-z]{{1,3}}))?(?P<rest>(?:{}\d{{1,3}}[a-z]{{0,3}}\b)+)",
        PREFIX_GROUP, LIST_SEPARATOR
    ))
    .expect("Failed to compile shorthand regex")
});

static SHORTHAND_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<number>\d{1,3})(?P<letters>[a-z]{0,3})")
        .expect("Failed to compile shorthand token regex")
});

static STANDARD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?P<prefix>{})\s+(?P<numbers>\d{{1,3}}(?:/\d{{1,3}})*)(?: ?(?P<letters>[a-z]{{1,3}}))?",
        PREFIX_GROUP
    ))
    .expect("Failed to compile standard course regex")
});

static TRAILING_CONJUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]+(?:and|or)\b").expect("Failed to compile conjunction regex")
});

static TRAILING_BLANK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*(?:\r?\n|$)").expect("Failed to compile line end regex"));

/// 單一文字單元的掃描器，課程目錄只用來決定複合代碼是否拆開
pub struct TextScanner<'a> {
    catalog: &'a Catalog,
    options: ScanOptions,
}

impl<'a> TextScanner<'a> {
    pub fn new(catalog: &'a Catalog, options: ScanOptions) -> Self {
        Self { catalog, options }
    }

    /// 依序執行範圍、簡寫、標準三階段，結果依位置排序且不重疊
    pub fn scan(&self, text: &str) -> Vec<CandidateMatch> {
        let mut claimed: Vec<Range<usize>> = Vec::new();

        let ranges = detect_ranges(text, self.options.max_range_span);
        claimed.extend(ranges.iter().map(|c| c.start..c.end()));

        let (shorthand, shorthand_spans) = detect_shorthand(text, &claimed);
        claimed.extend(shorthand_spans);

        let standard = detect_standard(text, &claimed, self.catalog, &self.options);

        let mut candidates: Vec<CandidateMatch> = ranges
            .into_iter()
            .chain(shorthand)
            .chain(standard)
            .collect();
        candidates.sort_by_key(|c| c.start);
        candidates
    }
}

/// 第一階段：範圍 `<前綴> <n1>-<n2>`，需 n1 < n2 且跨度不超過 `max_span`
pub fn detect_ranges(text: &str, max_span: u32) -> Vec<CandidateMatch> {
    let mut candidates = Vec::new();

    for caps in RANGE_PATTERN.captures_iter(text) {
        let full = &caps[0];
        let whole = caps.get(0).map(|m| m.start()).unwrap_or_default();
        let prefix = &caps["prefix"];
        let (Ok(start), Ok(end)) = (caps["start"].parse::<u32>(), caps["end"].parse::<u32>())
        else {
            continue;
        };

        if start >= end || end - start > max_span {
            tracing::debug!("Rejected range '{}' ({}..{})", full, start, end);
            continue;
        }

        let generated_codes: Vec<String> =
            (start..=end).map(|n| format!("{} {}", prefix, n)).collect();

        candidates.push(CandidateMatch {
            text: full.to_string(),
            start: whole,
            length: full.len(),
            display_text: full.to_string(),
            code: format!("{} {}-{}", prefix, start, end),
            prefixes: prefix.to_string(),
            numbers: format!("{}-{}", &caps["start"], &caps["end"]),
            letters: String::new(),
            kind: MatchKind::Range {
                start,
                end,
                generated_codes,
            },
        });
    }

    candidates
}

/// 第二階段：簡寫清單，同時回傳整段範圍供後續階段略過
pub fn detect_shorthand(
    text: &str,
    claimed: &[Range<usize>],
) -> (Vec<CandidateMatch>, Vec<Range<usize>>) {
    let mut candidates = Vec::new();
    let mut spans = Vec::new();

    for caps in SHORTHAND_PATTERN.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if overlaps_any(claimed, whole.start(), whole.end()) {
            continue;
        }

        let prefix = &caps["prefix"];
        let first_number = &caps["number"];
        let first_letters = caps.name("letters").map(|m| m.as_str()).unwrap_or("");
        let first_end = caps
            .name("letters")
            .or_else(|| caps.name("number"))
            .map(|m| m.end())
            .unwrap_or(whole.end());

        let first_text = &text[whole.start()..first_end];
        candidates.push(CandidateMatch {
            text: first_text.to_string(),
            start: whole.start(),
            length: first_text.len(),
            display_text: first_text.to_string(),
            code: format_code(prefix, first_number, first_letters),
            prefixes: prefix.to_string(),
            numbers: first_number.to_string(),
            letters: first_letters.to_string(),
            kind: MatchKind::Shorthand {
                is_first_in_group: true,
            },
        });

        if let Some(rest) = caps.name("rest") {
            for token in SHORTHAND_TOKEN.captures_iter(rest.as_str()) {
                let Some(token_match) = token.get(0) else { continue };
                let number = &token["number"];
                let letters = &token["letters"];
                candidates.push(CandidateMatch {
                    text: token_match.as_str().to_string(),
                    start: rest.start() + token_match.start(),
                    length: token_match.len(),
                    display_text: token_match.as_str().to_string(),
                    code: format_code(prefix, number, letters),
                    prefixes: prefix.to_string(),
                    numbers: number.to_string(),
                    letters: letters.to_string(),
                    kind: MatchKind::Shorthand {
                        is_first_in_group: false,
                    },
                });
            }
        }

        spans.push(whole.start()..whole.end());
    }

    (candidates, spans)
}

/// 第三階段：標準代碼與複合代碼
pub fn detect_standard(
    text: &str,
    claimed: &[Range<usize>],
    catalog: &Catalog,
    options: &ScanOptions,
) -> Vec<CandidateMatch> {
    let mut candidates = Vec::new();

    for caps in STANDARD_PATTERN.captures_iter(text) {
        let Some(parts) = StandardParts::from_captures(text, &caps) else {
            continue;
        };
        if overlaps_any(claimed, parts.start, parts.end) {
            continue;
        }

        if parts.numbers.contains('/') && options.expand_compounds {
            candidates.extend(split_compound(text, &parts, catalog));
        } else {
            candidates.push(parts.standard_candidate(text));
        }
    }

    candidates
}

/// 整體查不到而每個部分都查得到時，才把 `P N1/N2 L` 拆開
fn split_compound(text: &str, parts: &StandardParts, catalog: &Catalog) -> Vec<CandidateMatch> {
    let full_code = format_code(&parts.prefixes, &parts.numbers, &parts.letters);
    if catalog.lookup(&full_code).is_some() {
        return vec![parts.standard_candidate(text)];
    }

    let numbers: Vec<&str> = parts.numbers.split('/').collect();
    let all_known = numbers.len() >= 2
        && numbers.iter().all(|n| {
            catalog
                .lookup(&format_code(&parts.prefixes, n, &parts.letters))
                .is_some()
        });
    if !all_known {
        return vec![parts.standard_candidate(text)];
    }

    let original_full_match = text[parts.start..parts.end].to_string();
    let mut candidates = Vec::with_capacity(numbers.len());
    let mut cursor = parts.numbers_start;
    let last = numbers.len() - 1;

    for (index, number) in numbers.iter().enumerate() {
        let (start, display_text) = if index == 0 {
            (parts.start, text[parts.start..cursor + number.len()].to_string())
        } else {
            // 從斜線開始
            (cursor - 1, format!("/{}{}", number, parts.letters))
        };
        let number_end = cursor + number.len();
        // 節次字母跟在最後一個號碼後面
        let end = if index == last { parts.end } else { number_end };

        candidates.push(CandidateMatch {
            text: text[start..end].to_string(),
            start,
            length: end - start,
            display_text,
            code: format_code(&parts.prefixes, number, &parts.letters),
            prefixes: parts.prefixes.clone(),
            numbers: number.to_string(),
            letters: parts.letters.clone(),
            kind: MatchKind::CompoundExpanded {
                original_full_match: original_full_match.clone(),
            },
        });

        cursor = number_end + 1;
    }

    candidates
}

struct StandardParts {
    start: usize,
    end: usize,
    numbers_start: usize,
    prefixes: String,
    numbers: String,
    letters: String,
}

impl StandardParts {
    // regex 不支援 lookaround，邊界規則在這裡檢查
    fn from_captures(text: &str, caps: &Captures<'_>) -> Option<Self> {
        let whole = caps.get(0)?;
        let prefix = caps.name("prefix")?;
        let numbers = caps.name("numbers")?;

        let mut end = numbers.end();
        let mut letters = String::new();

        match caps.name("letters") {
            Some(l) if is_letters_boundary(text, l.end()) => {
                end = l.end();
                letters = l.as_str().to_string();
            }
            Some(l) if l.start() == numbers.end() => {
                tracing::trace!("Dropped '{}': number runs into a word", whole.as_str());
                return None;
            }
            _ => {
                if text[numbers.end()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_alphanumeric())
                {
                    return None;
                }
            }
        }

        Some(Self {
            start: whole.start(),
            end,
            numbers_start: numbers.start(),
            prefixes: prefix.as_str().to_string(),
            numbers: numbers.as_str().to_string(),
            letters,
        })
    }

    fn standard_candidate(&self, text: &str) -> CandidateMatch {
        let matched = &text[self.start..self.end];
        CandidateMatch {
            text: matched.to_string(),
            start: self.start,
            length: self.end - self.start,
            display_text: matched.to_string(),
            code: format_code(&self.prefixes, &self.numbers, &self.letters),
            prefixes: self.prefixes.clone(),
            numbers: self.numbers.clone(),
            letters: self.letters.clone(),
            kind: MatchKind::Standard,
        }
    }
}

/// 節次字母後面必須是結尾、換行、標點或 and/or，避免把 "APh 200 do" 的 do 當成字母
fn is_letters_boundary(text: &str, pos: usize) -> bool {
    let rest = &text[pos..];
    match rest.chars().next() {
        None => true,
        Some(c) if c.is_alphanumeric() => false,
        Some(c) if c.is_whitespace() => {
            TRAILING_CONJUNCTION.is_match(rest) || TRAILING_BLANK_LINE.is_match(rest)
        }
        Some(_) => true,
    }
}

fn overlaps_any(claimed: &[Range<usize>], start: usize, end: usize) -> bool {
    claimed.iter().any(|span| span.start < end && start < span.end)
}
