/// Longest stderr excerpt carried in an error message
const STDERR_EXCERPT_BYTES: usize = 2048;

/// Trimmed tail of a child process's stderr
pub fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();

    if text.len() <= STDERR_EXCERPT_BYTES {
        return text.to_string();
    }

    let mut start = text.len() - STDERR_EXCERPT_BYTES;
    while !text.is_char_boundary(start) {
        start += 1;
    }

    format!("...{}", &text[start..])
}
