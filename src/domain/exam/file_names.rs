//! Download and archive entry names derived from an exam title.
//!
//! Titles are free text owned by another subsystem. They end up inside HTTP
//! header values and ZIP entry paths, so they are reduced to a safe file
//! stem first: control characters, path separators and characters reserved
//! on common filesystems become `_`.

use super::CopyLabel;

const FALLBACK_STEM: &str = "exam";

/// Characters replaced by `_` in file stems, besides control characters.
const RESERVED: &[char] = &['/', '\\', '"', ':', '*', '?', '<', '>', '|'];

/// Safe file stem for `title`.
pub fn file_stem(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| {
            if c.is_control() || RESERVED.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `"{title}.pdf"` for single-document exports.
pub fn document_file_name(title: &str) -> String {
    format!("{}.pdf", file_stem(title))
}

/// `"{title}_{quantity}_versions.zip"` for batch exports.
pub fn archive_file_name(title: &str, quantity: u32) -> String {
    format!("{}_{}_versions.zip", file_stem(title), quantity)
}

/// `"{title}_Versao_{k}.pdf"` for the entry holding copy `k`.
pub fn archive_entry_name(title: &str, label: CopyLabel) -> String {
    format!("{}_Versao_{}.pdf", file_stem(title), label)
}

/// `Content-Disposition` value for an attachment named `file_name`.
///
/// Plain ASCII names produce `attachment; filename="..."`. Anything else
/// gets an ASCII fallback plus an RFC 5987 `filename*` parameter.
pub fn content_disposition(file_name: &str) -> String {
    let is_plain = file_name
        .chars()
        .all(|c| c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\');

    if is_plain {
        return format!("attachment; filename=\"{}\"", file_name);
    }

    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}
