pub mod panels;
pub mod plot;

/// Format an amount the Brazilian way: `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{:02}", cents % 100)
}

#[cfg(test)]
mod tests {
    use super::format_brl;

    #[test]
    fn formats_reais() {
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(12.5), "R$ 12,50");
        assert_eq!(format_brl(1234.56), "R$ 1.234,56");
        assert_eq!(format_brl(1_000_000.0), "R$ 1.000.000,00");
        assert_eq!(format_brl(-70.0), "-R$ 70,00");
    }
}
