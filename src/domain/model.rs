use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// 課程目錄中的一筆課程資料，載入後不再變動
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(alias = "originalCode", alias = "course_code_original")]
    pub original_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_code: Option<CourseCodeParts>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub prerequisites: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructors: Option<String>,
    #[serde(default, alias = "isSynthetic")]
    pub is_synthetic: bool,
    #[serde(default, alias = "sectionCourses", skip_serializing_if = "Vec::is_empty")]
    pub section_courses: Vec<Course>,
}

impl Course {
    pub fn new(original_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            original_code: original_code.into(),
            course_code: None,
            name: Some(name.into()),
            units: None,
            terms: None,
            prerequisites: None,
            description: None,
            instructors: None,
            is_synthetic: false,
            section_courses: Vec::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// 結構化的課程代碼，例如 "Ae/APh 101 abc"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseCodeParts {
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub numbers: Vec<String>,
    #[serde(default)]
    pub letters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchKind {
    Standard,
    Range {
        start: u32,
        end: u32,
        generated_codes: Vec<String>,
    },
    Shorthand {
        is_first_in_group: bool,
    },
    CompoundExpanded {
        original_full_match: String,
    },
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Standard => "standard",
            MatchKind::Range { .. } => "range",
            MatchKind::Shorthand { .. } => "shorthand",
            MatchKind::CompoundExpanded { .. } => "compound_expanded",
        }
    }
}

/// 看起來像課程代碼的一段文字，位置為文字單元內的位元組位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub text: String,
    pub start: usize,
    pub length: usize,
    pub display_text: String,
    /// 查詢課程目錄用的代碼
    pub code: String,
    pub prefixes: String,
    pub numbers: String,
    pub letters: String,
    #[serde(flatten)]
    pub kind: MatchKind,
}

impl CandidateMatch {
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeEntry {
    pub code: String,
    pub course: Course,
}

/// 已在課程目錄中確認的候選
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedMatch {
    #[serde(flatten)]
    pub candidate: CandidateMatch,
    pub course: Course,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub range_courses: Vec<RangeEntry>,
}

impl ValidatedMatch {
    pub fn start(&self) -> usize {
        self.candidate.start
    }

    pub fn end(&self) -> usize {
        self.candidate.end()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub source: String,
    pub text: String,
}

/// 文件中獨立掃描的一段純文字 (HTML 的葉節點文字)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit<'a> {
    /// 在原始文件中的起始位置
    pub offset: usize,
    /// 實體解碼後的文字
    pub text: Cow<'a, str>,
    /// 解碼位置與原始位置的對照 (decoded, raw)，只在長度改變處記錄
    pub shifts: Vec<(usize, usize)>,
}

impl<'a> TextUnit<'a> {
    /// 原文即為掃描文字，位置一對一
    pub fn plain(offset: usize, text: &'a str) -> Self {
        Self {
            offset,
            text: Cow::Borrowed(text),
            shifts: Vec::new(),
        }
    }

    /// 將單元內的位置換算回原始文件位置
    pub fn document_offset(&self, position: usize) -> usize {
        let index = self
            .shifts
            .partition_point(|&(decoded, _)| decoded <= position);
        let (decoded, raw) = match index {
            0 => (0, 0),
            i => self.shifts[i - 1],
        };
        self.offset + raw + position.saturating_sub(decoded)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMatch {
    /// 比對結果在原始文件中的位置與長度
    pub document_offset: usize,
    pub document_length: usize,
    #[serde(flatten)]
    pub validated: ValidatedMatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    pub source: String,
    pub text_units: usize,
    pub candidates: usize,
    pub matches: Vec<DocumentMatch>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub documents: usize,
    pub text_units: usize,
    pub candidates: usize,
    pub validated: usize,
    pub synthetic: usize,
    pub ranges: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub catalog_size: usize,
    pub documents: Vec<DocumentReport>,
    pub stats: ScanStats,
}

/// 顯示偏好設定，只影響輸出格式，不影響辨識
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub show_units: bool,
    pub show_terms: bool,
    pub show_prerequisites: bool,
    pub show_description: bool,
    pub show_instructors: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_units: true,
            show_terms: true,
            show_prerequisites: true,
            show_description: false,
            show_instructors: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// 範圍 (如 "EC 120-122") 允許的最大跨度
    pub max_range_span: u32,
    pub expand_compounds: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_range_span: 20,
            expand_compounds: true,
        }
    }
}
