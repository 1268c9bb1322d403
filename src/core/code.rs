use once_cell::sync::Lazy;
use regex::Regex;

/// 課程代碼 `<前綴>(/<前綴>)* <號碼>(/<號碼>)* <字母>?`，如 "Ma/CS 6/106 abc"
static CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]{1,5}(?:/[A-Za-z]{1,5})*)\s+(\d{1,3}(?:/\d{1,3})*)\s*([A-Za-z]{0,6})$")
        .expect("Failed to compile course code regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCode {
    pub prefixes: Vec<String>,
    pub numbers: Vec<String>,
    pub letters: String,
}

impl ParsedCode {
    pub fn parse(code: &str) -> Option<Self> {
        let caps = CODE_PATTERN.captures(code.trim())?;
        Some(Self {
            prefixes: caps[1].split('/').map(str::to_string).collect(),
            numbers: caps[2].split('/').map(str::to_string).collect(),
            letters: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
        })
    }

    /// 轉小寫後解析
    pub fn parse_folded(code: &str) -> Option<Self> {
        Self::parse(&code.to_lowercase())
    }

    pub fn prefix_group(&self) -> String {
        self.prefixes.join("/")
    }

    pub fn number_group(&self) -> String {
        self.numbers.join("/")
    }

    pub fn has_prefixes_within(&self, other: &ParsedCode) -> bool {
        self.prefixes.iter().all(|p| other.prefixes.contains(p))
    }
}

pub fn format_code(prefix: &str, number: &str, letters: &str) -> String {
    if letters.is_empty() {
        format!("{} {}", prefix, number)
    } else {
        format!("{} {} {}", prefix, number, letters)
    }
}

/// `input` 的每個字母都出現在 `course` 中 (不計順序)
pub fn is_letter_subset(input: &str, course: &str) -> bool {
    if input.is_empty() {
        return true;
    }
    if course.is_empty() {
        return false;
    }
    input.chars().all(|c| course.contains(c))
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 小寫後的空白、斜線與去除分隔三種形式
pub fn separator_forms(code: &str) -> [String; 3] {
    let folded = collapse_whitespace(&code.to_lowercase());
    let space_joined = collapse_whitespace(&folded.replace('/', " "));
    let slash_joined = folded.replace(' ', "/");
    let stripped: String = folded
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '/')
        .collect();
    [space_joined, slash_joined, stripped]
}

pub fn separator_forms_equal(a: &str, b: &str) -> bool {
    let left = separator_forms(a);
    let right = separator_forms(b);
    left.iter()
        .zip(right.iter())
        .any(|(l, r)| !l.is_empty() && l == r)
}
