use crate::domain::model::{Course, DisplaySettings, DocumentMatch, MatchKind, ScanReport};
use crate::utils::error::{LensError, Result};

pub const SUPPORTED_FORMATS: &[&str] = &["json", "csv", "text"];

pub fn file_name(format: &str) -> Option<&'static str> {
    match format {
        "json" => Some("course_matches.json"),
        "csv" => Some("course_matches.csv"),
        "text" => Some("course_matches.txt"),
        _ => None,
    }
}

pub fn render(format: &str, report: &ScanReport, display: &DisplaySettings) -> Result<String> {
    match format {
        "json" => to_json(report),
        "csv" => to_csv(report, display),
        "text" => Ok(to_text(report, display)),
        other => Err(LensError::InvalidConfigValueError {
            field: "output_formats".to_string(),
            value: other.to_string(),
            reason: format!("Valid formats: {}", SUPPORTED_FORMATS.join(", ")),
        }),
    }
}

pub fn to_json(report: &ScanReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// 每筆比對一列，詳細欄位依顯示設定
pub fn to_csv(report: &ScanReport, display: &DisplaySettings) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![
        "source",
        "offset",
        "length",
        "kind",
        "display_text",
        "code",
        "course_code",
        "course_name",
    ];
    header.extend(detail_fields(display).iter().map(|(label, _)| *label));
    writer.write_record(&header)?;

    for document in &report.documents {
        for m in &document.matches {
            let course = &m.validated.course;
            let mut row = vec![
                document.source.clone(),
                m.document_offset.to_string(),
                m.document_length.to_string(),
                m.validated.candidate.kind.as_str().to_string(),
                m.validated.candidate.display_text.clone(),
                m.validated.candidate.code.clone(),
                course.original_code.clone(),
                course.display_name().to_string(),
            ];
            row.extend(
                detail_fields(display)
                    .iter()
                    .map(|(_, field)| field(course).unwrap_or_default().to_string()),
            );
            writer.write_record(&row)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LensError::ProcessingError {
            message: format!("Failed to finish CSV output: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| LensError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

/// 純文字清單
pub fn to_text(report: &ScanReport, display: &DisplaySettings) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Course scan {} ({} catalog courses)\n",
        report.generated_at.to_rfc3339(),
        report.catalog_size
    ));
    out.push_str(&format!(
        "{} matches in {} documents\n",
        report.stats.validated, report.stats.documents
    ));

    for document in &report.documents {
        out.push_str(&format!(
            "\n== {} ({} matches)\n",
            document.source,
            document.matches.len()
        ));
        for m in &document.matches {
            out.push_str(&match_entry(m, display));
        }
    }

    out
}

fn match_entry(m: &DocumentMatch, display: &DisplaySettings) -> String {
    let candidate = &m.validated.candidate;
    let mut entry = format!("[{}] {}", m.document_offset, candidate.display_text);

    if let MatchKind::Range { .. } = candidate.kind {
        entry.push_str(" (range)\n");
        for range_entry in &m.validated.range_courses {
            entry.push_str(&format!(
                "    {}: {}\n",
                range_entry.code,
                range_entry.course.display_name()
            ));
        }
        return entry;
    }

    entry.push_str(&format!(" -> {}\n", tooltip_title(&m.validated.course)));
    for line in tooltip_lines(&m.validated.course, display) {
        entry.push_str(&format!("    {}\n", line));
    }
    entry
}

pub fn tooltip_title(course: &Course) -> String {
    match course.name.as_deref() {
        Some(name) if !name.is_empty() => format!("{}: {}", course.original_code, name),
        _ => course.original_code.clone(),
    }
}

/// 課程的詳細資訊行
pub fn tooltip_lines(course: &Course, display: &DisplaySettings) -> Vec<String> {
    let mut lines: Vec<String> = detail_fields(display)
        .iter()
        .filter_map(|(label, field)| {
            field(course)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}: {}", capitalize(label), v))
        })
        .collect();

    if course.is_synthetic && !course.section_courses.is_empty() {
        let sections: Vec<&str> = course
            .section_courses
            .iter()
            .map(|c| c.original_code.as_str())
            .collect();
        lines.push(format!("Sections: {}", sections.join(", ")));
    }

    lines
}

type CourseField = fn(&Course) -> Option<&str>;

fn units(course: &Course) -> Option<&str> {
    course.units.as_deref()
}

fn terms(course: &Course) -> Option<&str> {
    course.terms.as_deref()
}

fn prerequisites(course: &Course) -> Option<&str> {
    course.prerequisites.as_deref()
}

fn description(course: &Course) -> Option<&str> {
    course.description.as_deref()
}

fn instructors(course: &Course) -> Option<&str> {
    course.instructors.as_deref()
}

fn detail_fields(display: &DisplaySettings) -> Vec<(&'static str, CourseField)> {
    let all: [(bool, &'static str, CourseField); 5] = [
        (display.show_units, "units", units),
        (display.show_terms, "terms", terms),
        (display.show_prerequisites, "prerequisites", prerequisites),
        (display.show_description, "description", description),
        (display.show_instructors, "instructors", instructors),
    ];

    all.into_iter()
        .filter(|(enabled, _, _)| *enabled)
        .map(|(_, label, field)| (label, field))
        .collect()
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
