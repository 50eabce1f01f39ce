use rust_decimal::Decimal;

/// Decimal formatting for quote display.
pub trait DecimalExt {
    fn format_price(&self) -> String;
    fn format_signed(&self) -> String;
}

impl DecimalExt for Decimal {
    fn format_price(&self) -> String {
        // More precision for penny-range prices
        if self.abs() < Decimal::from(10) {
            format!("{self:.3}")
        } else {
            format!("{self:.2}")
        }
    }

    fn format_signed(&self) -> String {
        if self.is_sign_negative() {
            format!("{self:.2}")
        } else {
            format!("+{self:.2}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DecimalExt;
    use rust_decimal_macros::dec;

    #[test]
    fn price_precision_depends_on_magnitude() {
        assert_eq!(dec!(189.372).format_price(), "189.37");
        assert_eq!(dec!(3.1415).format_price(), "3.142");
    }

    #[test]
    fn signed_format_keeps_the_plus() {
        assert_eq!(dec!(1.5).format_signed(), "+1.50");
        assert_eq!(dec!(-1.5).format_signed(), "-1.50");
        assert_eq!(dec!(0).format_signed(), "+0.00");
    }
}
