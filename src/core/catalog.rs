use crate::core::{matcher, resolver};
use crate::domain::model::Course;
use crate::utils::error::Result;
use serde_json::Value;

/// 唯讀課程目錄，載入後以 `Arc` 共用
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: Vec<Course>,
}

impl Catalog {
    pub fn new(courses: Vec<Course>) -> Self {
        let courses = courses
            .into_iter()
            .filter(|c| !c.original_code.trim().is_empty())
            .collect();
        Self { courses }
    }

    /// 非陣列視為空目錄，無法解析的紀錄略過
    pub fn from_value(value: Value) -> Self {
        let Value::Array(items) = value else {
            tracing::warn!("Catalog data is not a list; no courses will be recognized");
            return Self::default();
        };

        let total = items.len();
        let mut courses = Vec::with_capacity(total);
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<Course>(item) {
                Ok(course) if !course.original_code.trim().is_empty() => courses.push(course),
                Ok(_) => tracing::debug!("Skipping catalog record {} with empty code", index),
                Err(e) => tracing::debug!("Skipping malformed catalog record {}: {}", index, e),
            }
        }

        if courses.len() < total {
            tracing::warn!(
                "Loaded {} of {} catalog records ({} skipped)",
                courses.len(),
                total,
                total - courses.len()
            );
        }
        if courses.is_empty() {
            tracing::warn!("Catalog is empty; no courses will be recognized");
        }

        Self { courses }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Ok(Self::from_value(value))
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn find(&self, code: &str) -> Option<&Course> {
        matcher::find(code, &self.courses)
    }

    /// 完整查詢：直接比對、合成節次、再逐一試前綴
    pub fn lookup(&self, code: &str) -> Option<Course> {
        resolver::lookup(code, &self.courses)
    }
}
