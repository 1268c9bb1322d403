use crate::domain::model::TextUnit;
use scraper::node::Node;
use scraper::Html;
use std::borrow::Cow;
use std::path::Path;

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

// 實體名稱最長約 32 字元
const MAX_ENTITY_LEN: usize = 40;

pub fn is_html(source: &str) -> bool {
    Path::new(source)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

/// 將文件切成獨立掃描的文字單元：HTML 取葉節點文字，其他檔案整份一個單元
pub fn split_text_units<'a>(source: &str, text: &'a str) -> Vec<TextUnit<'a>> {
    if is_html(source) {
        html_text_units(text)
    } else if text.trim().is_empty() {
        Vec::new()
    } else {
        vec![TextUnit::plain(0, text)]
    }
}

/// HTML 葉節點文字，已解碼實體。略過 `<script>`、`<style>` 與空白節點，
/// 每個單元都對回原始文件的位置
pub fn html_text_units(html: &str) -> Vec<TextUnit<'_>> {
    let document = Html::parse_document(html);
    let mut units = Vec::new();
    let mut cursor = 0;

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let content: &str = &text.text;
        if content.trim().is_empty() {
            continue;
        }
        let in_raw_text = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| RAW_TEXT_ELEMENTS.contains(&element.name()))
        });
        if in_raw_text {
            continue;
        }

        match locate_text(html, cursor, content) {
            Some(located) => {
                cursor = located.end;
                units.push(located.into_unit(html, content));
            }
            None => {
                tracing::debug!("HTML text node not found in source: {:?}", content);
            }
        }
    }

    units
}

struct LocatedText {
    start: usize,
    end: usize,
    shifts: Vec<(usize, usize)>,
}

impl LocatedText {
    fn into_unit<'a>(self, html: &'a str, content: &str) -> TextUnit<'a> {
        let text = if self.shifts.is_empty() {
            Cow::Borrowed(&html[self.start..self.end])
        } else {
            Cow::Owned(content.to_string())
        };
        TextUnit {
            offset: self.start,
            text,
            shifts: self.shifts,
        }
    }
}

/// 解析器不保留原始位置，從 `cursor` 之後的標籤結尾逐一嘗試對齊節點文字
fn locate_text(html: &str, cursor: usize, content: &str) -> Option<LocatedText> {
    let mut starts = (cursor == 0).then_some(0).into_iter().chain(
        html[cursor..]
            .match_indices('>')
            .map(|(pos, _)| cursor + pos + 1),
    );

    starts.find_map(|start| {
        align_at(html, start, content).or_else(|| {
            // 解析器可能把開頭空白留在前一個節點
            let rest = &html[start..];
            let skipped = rest.len() - rest.trim_start().len();
            (skipped > 0)
                .then(|| align_at(html, start + skipped, content))
                .flatten()
        })
    })
}

/// 原文從 `start` 起解碼後必須等於 `content`，且結束於標記或文件結尾
fn align_at(html: &str, start: usize, content: &str) -> Option<LocatedText> {
    let raw = html.as_bytes();
    let mut raw_pos = start;
    let mut text_pos = 0;
    let mut shifts = Vec::new();

    while text_pos < content.len() {
        let remaining = &content[text_pos..];
        let source = html.get(raw_pos..)?;

        if source.starts_with('&') {
            if let Some((raw_len, decoded)) = decode_entity(source) {
                if remaining.starts_with(decoded.as_str()) {
                    raw_pos += raw_len;
                    text_pos += decoded.len();
                    shifts.push((text_pos, raw_pos - start));
                    continue;
                }
            }
        }

        if source.starts_with("\r\n") && remaining.starts_with('\n') {
            raw_pos += 2;
            text_pos += 1;
            shifts.push((text_pos, raw_pos - start));
            continue;
        }

        let expected = remaining.chars().next()?;
        let found = source.chars().next()?;
        if found == expected || (found == '\r' && expected == '\n') {
            raw_pos += found.len_utf8();
            text_pos += expected.len_utf8();
        } else {
            return None;
        }
    }

    match raw.get(raw_pos) {
        None | Some(b'<') => Some(LocatedText {
            start,
            end: raw_pos,
            shifts,
        }),
        Some(_) => None,
    }
}

/// `&name;` 或 `&#NN;` 形式的實體，回傳原文長度與解碼結果
fn decode_entity(source: &str) -> Option<(usize, String)> {
    let end = source
        .bytes()
        .take(MAX_ENTITY_LEN)
        .position(|b| b == b';')?;
    let entity = &source[..=end];
    if entity[1..end].is_empty()
        || !entity[1..end]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '#')
    {
        return None;
    }
    let decoded = html_escape::decode_html_entities(entity);
    (decoded != entity).then(|| (entity.len(), decoded.into_owned()))
}
