//! Small helpers shared by the finalizer and the output layer.

/// Extension appended to output names.
pub const PDF_EXTENSION: &str = ".pdf";

/// Name used when sanitising leaves nothing usable.
pub const FALLBACK_OUTPUT_NAME: &str = "merged";

/// Characters that are not allowed in output file names on common platforms.
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Format a byte count as a human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}

/// Make a user-supplied name safe to use as a file name.
///
/// Invalid characters become `_`, runs of `_` collapse into one, and leading
/// or trailing underscores and spaces are trimmed.
pub fn sanitize_filename(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());

    for ch in name.chars() {
        let ch = if INVALID_FILENAME_CHARS.contains(&ch) {
            '_'
        } else {
            ch
        };

        if ch == '_' && sanitized.ends_with('_') {
            continue;
        }
        sanitized.push(ch);
    }

    sanitized.trim_matches(|c| c == '_' || c == ' ').to_string()
}

/// Append `.pdf` unless the name already ends with it (case-insensitive).
pub fn ensure_pdf_extension(name: &str) -> String {
    if name.to_lowercase().ends_with(PDF_EXTENSION) {
        name.to_string()
    } else {
        format!("{name}{PDF_EXTENSION}")
    }
}
