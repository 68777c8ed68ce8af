//! Text rendering helpers for the screenlist header and thumbnail labels.

/// Format a millisecond timestamp as zero-padded `HH:MM:SS`.
///
/// Sub-second precision is discarded (truncated, not rounded). Hours are not
/// wrapped, so very long videos render as e.g. `"100:00:00"`.
///
/// ```
/// use screengen::format::format_timestamp;
///
/// assert_eq!(format_timestamp(3_661_000), "01:01:01");
/// assert_eq!(format_timestamp(59_999), "00:00:59");
/// ```
pub fn format_timestamp(milliseconds: u64) -> String {
    let seconds = milliseconds / 1000;
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Format a byte count for the header's size row.
///
/// Divides by 1024×1024 and truncates, but labels the result `Mb`. Kept
/// this way so screenlists match those made by earlier releases.
pub fn format_file_size(bytes: u64) -> String {
    format!("{} Mb", bytes / 1024 / 1024)
}

/// Format a resolution as `WIDTHxHEIGHT`.
pub fn format_resolution(width: u32, height: u32) -> String {
    format!("{width}x{height}")
}

/// Escape text for a single-quoted ImageMagick draw string.
pub fn escape_draw_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        if matches!(character, '\\' | '\'') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped
}
