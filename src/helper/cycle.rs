/// Select previous item, with one extra slot for the input source.
pub fn prev_opt(idx: Option<usize>, all: usize) -> Option<usize> {
    if let Some(idx) = idx {
        if idx == 0 {
            None
        } else {
            Some(idx - 1)
        }
    } else {
        all.checked_sub(1)
    }
}

/// Select next item, with one extra slot for the input source.
pub fn next_opt(idx: Option<usize>, all: usize) -> Option<usize> {
    if let Some(idx) = idx {
        let next = idx + 1;
        if next < all {
            Some(next)
        } else {
            None
        }
    } else {
        (all > 0).then_some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::{next_opt, prev_opt};

    #[test]
    fn cycles_through_the_input_slot() {
        assert_eq!(next_opt(None, 3), Some(0));
        assert_eq!(next_opt(Some(2), 3), None);
        assert_eq!(prev_opt(None, 3), Some(2));
        assert_eq!(prev_opt(Some(0), 3), None);
    }

    #[test]
    fn empty_list_never_selects() {
        assert_eq!(next_opt(None, 0), None);
        assert_eq!(prev_opt(None, 0), None);
    }
}
