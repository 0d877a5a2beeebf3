/// Two decimals, or "-" for a gap.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

/// Short form for chart labels: 72.79K, 33.57M, 1.19T.
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000_000.0 {
        format!("{:.2}T", value / 1_000_000_000_000.0)
    } else if abs >= 1_000_000_000.0 {
        format!("{:.2}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if abs >= 10_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else {
        format!("{:.2}", value)
    }
}

pub fn format_compact_opt(value: Option<f64>) -> String {
    value.map(format_compact).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(3.14159)), "3.14");
        assert_eq!(format_value(None), "-");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(72_794.0), "72.79K");
        assert_eq!(format_compact(33_573_874.0), "33.57M");
        assert_eq!(format_compact(-2_500_000_000.0), "-2.50B");
        assert_eq!(format_compact(1_190_000_000_000.0), "1.19T");
        assert_eq!(format_compact(185.5), "185.50");
        assert_eq!(format_compact_opt(None), "-");
    }
}
