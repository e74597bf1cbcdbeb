pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Render a float stat the way reports show it.
pub fn fmt_stat(value: f64) -> String {
    format!("{value:.1}")
}
