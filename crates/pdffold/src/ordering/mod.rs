//! Reading-order sorting for discovered documents.
//!
//! Course material usually comes as an introduction, numbered parts, and a
//! conclusion, with names in English or Ukrainian/Russian. Files are sorted
//! by a [`SortKey`]:
//!
//! 1. [`PriorityClass`]: introductions first, conclusions last, everything
//!    else in between. A name carrying both markers counts as an introduction.
//! 2. The normalized name, compared with [`collate`].
//!
//! Sorting is stable: files whose keys are equal keep discovery order.
//!
//! # Normalization
//!
//! [`normalize_name`] strips the extension and surrounding whitespace,
//! lower-cases (Unicode, so Cyrillic folds too) and turns every run of
//! separators (whitespace, `_`, `-`, `.`) into one space.
//!
//! # Collation
//!
//! [`collate`] does not consult the platform locale. Runs of ASCII digits
//! compare by numeric value, so `chapter 2` sorts before `chapter 10`; equal
//! values with fewer leading zeros come first. Other characters compare by
//! weight:
//!
//! space < ASCII punctuation < digits < Latin `a`–`z` < Cyrillic < anything else
//!
//! Cyrillic letters follow the combined Ukrainian/Russian alphabet
//! `а б в г ґ д е ё є ж з и і ї й к л м н о п р с т у ф х ц ч ш щ ъ ы ь э ю я`.
//! Remaining characters compare by code point.
//!
//! # Examples
//!
//! ```
//! use pdffold::discovery::CandidateFile;
//! use pdffold::ordering::OrderingRules;
//!
//! let files = vec![
//!     CandidateFile::from_path("/c/99_Conclusion.pdf"),
//!     CandidateFile::from_path("/c/Chapter 10.pdf"),
//!     CandidateFile::from_path("/c/Chapter 2.pdf"),
//!     CandidateFile::from_path("/c/00_Introduction.pdf"),
//! ];
//!
//! let ordered = OrderingRules::default().sort(files);
//! let names: Vec<_> = ordered.iter().map(|f| f.name.as_str()).collect();
//! assert_eq!(
//!     names,
//!     ["00_Introduction.pdf", "Chapter 2.pdf", "Chapter 10.pdf", "99_Conclusion.pdf"]
//! );
//! ```

use serde::Serialize;
use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use crate::discovery::CandidateFile;

/// Markers that put a file at the front.
pub const INTRO_MARKERS: &[&str] = &["introduction", "intro", "вступ", "введення", "введение"];

/// Markers that put a file at the back.
pub const CONCLUSION_MARKERS: &[&str] = &["conclusion", "висновок", "висновки", "заключение"];

/// Collation order of Cyrillic letters.
const CYRILLIC_ORDER: &str = "абвгґдеёєжзиіїйклмнопрстуфхцчшщъыьэюя";

/// Coarse position of a file in the merged document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityClass {
    /// Introductions, merged first.
    Intro,
    /// Everything without a marker.
    Normal,
    /// Conclusions, merged last.
    Conclusion,
}

/// Key used to order candidate files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Priority class derived from the markers.
    pub class: PriorityClass,
    /// Name after [`normalize_name`].
    pub normalized_name: String,
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.class
            .cmp(&other.class)
            .then_with(|| collate(&self.normalized_name, &other.normalized_name))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Marker lists used to classify names.
#[derive(Debug, Clone)]
pub struct OrderingRules {
    intro_markers: Vec<String>,
    conclusion_markers: Vec<String>,
}

impl Default for OrderingRules {
    fn default() -> Self {
        Self {
            intro_markers: INTRO_MARKERS.iter().map(|m| m.to_string()).collect(),
            conclusion_markers: CONCLUSION_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl OrderingRules {
    /// Add introduction markers on top of the built-in ones.
    pub fn with_intro_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.intro_markers.extend(normalize_markers(markers));
        self
    }

    /// Add conclusion markers on top of the built-in ones.
    pub fn with_conclusion_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.conclusion_markers.extend(normalize_markers(markers));
        self
    }

    /// Classify an already normalized name.
    pub fn classify(&self, normalized_name: &str) -> PriorityClass {
        let has_marker =
            |markers: &[String]| markers.iter().any(|m| normalized_name.contains(m.as_str()));

        if has_marker(&self.intro_markers) {
            PriorityClass::Intro
        } else if has_marker(&self.conclusion_markers) {
            PriorityClass::Conclusion
        } else {
            PriorityClass::Normal
        }
    }

    /// Compute the sort key for a file name.
    pub fn key_for(&self, file_name: &str) -> SortKey {
        let normalized_name = normalize_name(file_name);
        SortKey {
            class: self.classify(&normalized_name),
            normalized_name,
        }
    }

    /// Sort candidates into reading order.
    ///
    /// Keys are computed once per file. The sort is stable.
    pub fn sort(&self, files: Vec<CandidateFile>) -> Vec<CandidateFile> {
        let mut keyed: Vec<(SortKey, CandidateFile)> = files
            .into_iter()
            .map(|file| (self.key_for(&file.name), file))
            .collect();

        keyed.sort_by(|(a, _), (b, _)| a.cmp(b));

        keyed.into_iter().map(|(_, file)| file).collect()
    }
}

fn normalize_markers<I, S>(markers: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    markers
        .into_iter()
        .map(|m| normalize_name_parts(m.as_ref()))
        .filter(|m| !m.is_empty())
}

/// Normalize a file name for classification and comparison.
///
/// # Examples
///
/// ```
/// use pdffold::ordering::normalize_name;
///
/// assert_eq!(normalize_name("  00__Intro--Part .pdf"), "00 intro part");
/// assert_eq!(normalize_name("Лекція_01.PDF"), "лекція 01");
/// ```
pub fn normalize_name(file_name: &str) -> String {
    normalize_name_parts(strip_extension(file_name.trim()))
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

fn normalize_name_parts(stem: &str) -> String {
    let lowered = stem.trim().to_lowercase();
    let mut normalized = String::with_capacity(lowered.len());
    let mut pending_separator = false;

    for ch in lowered.chars() {
        if is_separator(ch) {
            pending_separator = true;
            continue;
        }
        if pending_separator && !normalized.is_empty() {
            normalized.push(' ');
        }
        pending_separator = false;
        normalized.push(ch);
    }

    normalized
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '_' | '-' | '.')
}

/// Compare two normalized names.
///
/// Returns [`Ordering::Equal`] only for identical strings.
pub fn collate(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        let (x, y) = match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => (x, y),
        };

        if x.is_ascii_digit() && y.is_ascii_digit() {
            let l = take_digits(&mut left);
            let r = take_digits(&mut right);
            match compare_numeric(&l, &r) {
                Ordering::Equal => continue,
                other => return other,
            }
        }

        match char_weight(x).cmp(&char_weight(y)) {
            Ordering::Equal => {
                left.next();
                right.next();
            }
            other => return other,
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(&ch) = chars.peek() {
        if !ch.is_ascii_digit() {
            break;
        }
        digits.push(ch);
        chars.next();
    }
    digits
}

/// Compare digit runs by value without parsing (no overflow on long runs).
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');

    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        .then_with(|| a.len().cmp(&b.len()))
}

fn char_weight(ch: char) -> (u8, u32) {
    if ch == ' ' {
        return (0, 0);
    }
    if ch.is_ascii_punctuation() {
        return (1, ch as u32);
    }
    if ch.is_ascii_digit() {
        return (2, ch as u32);
    }
    if ch.is_ascii_lowercase() {
        return (3, ch as u32);
    }
    if let Some(pos) = CYRILLIC_ORDER.chars().position(|c| c == ch) {
        return (4, pos as u32);
    }
    (5, ch as u32)
}
