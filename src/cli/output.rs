//! Output formatting for CLI summaries

const KEY_WIDTH: usize = 20;

/// Print a title underlined to its own width
pub fn print_section(title: &str) {
    println!("\n{title}");
    println!("{}", "=".repeat(title.chars().count()));
}

/// Print a key-value pair aligned on the value column
pub fn print_kv(key: &str, value: &str) {
    let label = format!("{key}:");
    println!("  {label:KEY_WIDTH$} {value}");
}

/// Format a count with thousands separators
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;
    let mut groups: Vec<&str> = Vec::new();
    if head > 0 {
        groups.push(&digits[..head]);
    }
    groups.extend(
        digits.as_bytes()[head..]
            .chunks(3)
            .filter_map(|chunk| std::str::from_utf8(chunk).ok()),
    );
    groups.join(",")
}

/// Format a loss value, `n/a` when there is none
pub fn format_loss(loss: Option<f64>) -> String {
    match loss {
        Some(value) if value.is_finite() => format!("{value:.6}"),
        Some(value) => value.to_string(),
        None => "n/a".to_string(),
    }
}
