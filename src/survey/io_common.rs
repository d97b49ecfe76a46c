use std::path::Path;

/// The name of the file, without its directories.
pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Percentages are reported with two decimals.
pub fn round_percent(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
