//! Natural ordering for file names.
//!
//! A trailing run of digits in the stem is compared as an integer, so
//! `img2.png` sorts before `img10.png`.

/// The pieces a file name is split into before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameParts<'a> {
    pub prefix: &'a str,
    /// `None` when there is no trailing digit run or it does not fit a `u64`.
    pub numeric_suffix: Option<u64>,
    pub extension: &'a str,
}

/// Composite comparison key: `prefix ++ be_u64(suffix) ++ extension`.
///
/// Keys compare byte-wise. The numeric field holds `value + 1`, leaving 0 for
/// "no suffix", so `file.txt` sorts before `file0.txt`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey(Vec<u8>);

impl SortKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Splits `name` at the last `.` and peels the trailing digits off the stem.
pub fn split_name(name: &str) -> NameParts<'_> {
    let (stem, extension) = match name.rfind('.') {
        Some(dot) => name.split_at(dot),
        None => (name, ""),
    };

    let digits_start = stem
        .bytes()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);
    let (prefix, digits) = stem.split_at(digits_start);

    let numeric_suffix = if digits.is_empty() {
        None
    } else {
        // Overflow degrades to prefix-only ordering.
        digits.parse::<u64>().ok()
    };

    NameParts {
        prefix,
        numeric_suffix,
        extension,
    }
}

pub fn sort_key(name: &str) -> SortKey {
    let parts = split_name(name);
    let encoded = parts
        .numeric_suffix
        .and_then(|n| n.checked_add(1))
        .unwrap_or(0);

    let mut bytes = Vec::with_capacity(parts.prefix.len() + 8 + parts.extension.len());
    bytes.extend_from_slice(parts.prefix.as_bytes());
    bytes.extend_from_slice(&encoded.to_be_bytes());
    bytes.extend_from_slice(parts.extension.as_bytes());
    SortKey(bytes)
}
