//! Content for each route. The access gate has already decided that the
//! view may be shown by the time these are called.

pub mod dashboard;
pub mod editor;
pub mod login;

/// Keep the tail of `s` that fits in `width` characters.
pub(crate) fn tail(s: &str, width: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(width)).collect()
}

/// Shorten `s` to `max_len` characters, marking the cut with "...".
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub(crate) fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail() {
        assert_eq!(tail("owner@example.com", 7), "ple.com");
        assert_eq!(tail("abc", 10), "abc");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Monthly reminder", 10), "Monthly...");
        assert_eq!(truncate("Short", 10), "Short");
        assert_eq!(truncate("Rechnungsübersicht", 8), "Rechn...");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(8000.0), "8000.00");
        assert_eq!(format_amount(12.5), "12.50");
    }
}
