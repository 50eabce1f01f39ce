use std::cmp::Ordering;

pub trait Sign {
    fn positive(&self) -> bool;
    fn negative(&self) -> bool;
    fn zero(&self) -> bool;
    fn sign(&self) -> Ordering;
}

impl Sign for str {
    fn positive(&self) -> bool {
        !(self.negative() || self.zero())
    }

    fn negative(&self) -> bool {
        self.starts_with('-')
    }

    fn zero(&self) -> bool {
        self.chars().all(|c| matches!(c, '0' | '.' | '+' | '-'))
    }

    fn sign(&self) -> Ordering {
        if self.negative() {
            Ordering::Less
        } else if self.zero() {
            Ordering::Equal
        } else {
            Ordering::Greater
        }
    }
}

impl Sign for rust_decimal::Decimal {
    fn positive(&self) -> bool {
        self.is_sign_positive() && !self.is_zero()
    }

    fn negative(&self) -> bool {
        self.is_sign_negative()
    }

    fn zero(&self) -> bool {
        self.is_zero()
    }

    fn sign(&self) -> Ordering {
        if self.is_sign_negative() {
            Ordering::Less
        } else if self.is_zero() {
            Ordering::Equal
        } else {
            Ordering::Greater
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Sign;
    use rust_decimal_macros::dec;
    use std::cmp::Ordering;

    #[test]
    fn string_signs() {
        assert_eq!("-1.52".sign(), Ordering::Less);
        assert_eq!("+0.00".sign(), Ordering::Equal);
        assert_eq!("2.31".sign(), Ordering::Greater);
    }

    #[test]
    fn decimal_signs() {
        assert!(dec!(1.2).positive());
        assert!(dec!(-0.5).negative());
        assert_eq!(dec!(0).sign(), Ordering::Equal);
    }
}
