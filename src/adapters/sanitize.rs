//! Log sanitization for patient identifiers.
//!
//! The only PII this client handles is the patient name, which appears in
//! submitted records and in every prediction response. Log output is routed
//! through a sanitizing writer so a formatted struct or an error body never
//! lands a name in the log file.
//!
//! String sanitization is a fallback; the services avoid putting names into
//! logging calls in the first place.

use regex::Regex;
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static NAME_PATTERNS: OnceLock<Vec<NamePattern>> = OnceLock::new();

/// Maximum number of bytes to sanitize per call.
///
/// Scanning huge untrusted strings is expensive. Defaults to 16 KiB; can be
/// overridden via `CARDIOSCOPE_SANITIZE_MAX_BYTES`.
const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

struct NamePattern {
    regex: Regex,
    replacement: &'static str,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes.min(input.len());
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var("CARDIOSCOPE_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn get_patterns() -> &'static Vec<NamePattern> {
    NAME_PATTERNS.get_or_init(|| {
        let rules: Vec<(&'static str, &'static str)> = vec![
            // Quoted key-value forms: name="Alice", patient_name: "Alice"
            // (covers Debug output of the patient record and wire payloads)
            (
                r#"(?i)\b(patient_name|patient|name)\s*[=:]\s*"[^"]*""#,
                r#"${1}="[REDACTED-NAME]""#,
            ),
            // Unquoted key-value forms: patient=Alice Smith. Capped at two
            // words so surrounding key=value pairs are not swallowed.
            (
                r"(?i)\b(patient_name|patient)\s*[=:]\s*[A-Za-z][A-Za-z.'-]*(?: [A-Za-z][A-Za-z.'-]*)?",
                "${1}=[REDACTED-NAME]",
            ),
        ];

        rules
            .into_iter()
            .map(|(pattern, replacement)| NamePattern {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect()
    })
}

/// Sanitize a string by redacting patient-name patterns.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for pattern in get_patterns() {
        if pattern.regex.is_match(&result) {
            result = pattern
                .regex
                .replace_all(&result, pattern.replacement)
                .to_string();
        }
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// Check if a string contains a patient-name pattern.
#[must_use]
pub fn contains_name(input: &str) -> bool {
    let (prefix, _truncated) = truncate_to_char_boundary(input, max_sanitize_bytes());
    get_patterns().iter().any(|p| p.regex.is_match(prefix))
}

/// A `tracing_subscriber` writer wrapper that sanitizes formatted log
/// output before it reaches the underlying sink.
///
/// Keeps sanitization centralized instead of requiring `sanitize()` at
/// every callsite.
#[derive(Debug)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<M> Clone for SanitizingMakeWriter<M>
where
    M: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }
}

impl<W> SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = self.buffer.drain(..=pos).collect::<Vec<u8>>();
            let line_str = String::from_utf8_lossy(&line);
            let sanitized = sanitize(&line_str);
            self.inner.write_all(sanitized.as_bytes())?;
        }
        Ok(())
    }
}

impl<W> std::io::Write for SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A formatter writing a huge line with no newline must not buffer
        // without bound.
        let hard_cap = max_sanitize_bytes().saturating_mul(2);
        if hard_cap > 0 && self.buffer.len() > hard_cap {
            let s = String::from_utf8_lossy(&self.buffer).to_string();
            let sanitized = sanitize(&s);
            self.inner.write_all(sanitized.as_bytes())?;
            self.inner.write_all(b"\n[TRUNCATED]\n")?;
            self.buffer.clear();
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;

        if !self.buffer.is_empty() {
            let s = String::from_utf8_lossy(&self.buffer);
            let sanitized = sanitize(&s);
            self.inner.write_all(sanitized.as_bytes())?;
            self.buffer.clear();
        }

        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_quoted_name_fields() {
        let line = r#"submitting record name: "Alice Smith" age=55"#;
        let out = sanitize(line);
        assert!(!out.contains("Alice"));
        assert!(out.contains("[REDACTED-NAME]"));
        assert!(out.contains("age=55"));
    }

    #[test]
    fn test_redacts_debug_output() {
        let line = r#"PatientData { name: "Bob", age: 61, sex: 1 }"#;
        let out = sanitize(line);
        assert!(!out.contains("Bob"));
        assert!(out.contains("age: 61"));
    }

    #[test]
    fn test_redacts_unquoted_patient_field() {
        let out = sanitize("prediction complete patient=Carol Jones risk=High");
        assert!(!out.contains("Carol"));
        assert!(out.contains("risk=High"));
    }

    #[test]
    fn test_leaves_clean_lines_alone() {
        let line = "prediction complete: prediction=1 risk=High Risk";
        assert_eq!(sanitize(line), line);
        assert!(!contains_name(line));
    }

    #[test]
    fn test_truncates_oversized_input() {
        let big = "x".repeat(DEFAULT_SANITIZE_MAX_BYTES + 100);
        let out = sanitize_with_limit(&big, DEFAULT_SANITIZE_MAX_BYTES);
        assert!(out.ends_with(" [TRUNCATED]"));
        assert!(out.len() <= DEFAULT_SANITIZE_MAX_BYTES + " [TRUNCATED]".len());
    }

    #[test]
    fn test_writer_sanitizes_lines() {
        use std::io::Write;

        let mut sink = Vec::new();
        {
            let mut writer = SanitizingWriter::new(&mut sink);
            writer
                .write_all(b"submitted name: \"Dave\"\npartial tail")
                .expect("Should write");
            writer.flush().expect("Should flush");
        }

        let out = String::from_utf8(sink).expect("utf8");
        assert!(!out.contains("Dave"));
        assert!(out.contains("partial tail"));
    }
}
