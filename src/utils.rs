/// Returns a copy of `items` rotated so that `items[start]` comes first.
///
/// Turn order for a round is the seating order rotated to the round's
/// first bidder.
pub fn rotated_from<T: Clone>(items: &[T], start: usize) -> Vec<T> {
    (0..items.len())
        .map(|i| items[(start + i) % items.len()].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotated_from_wraps_around() {
        assert_eq!(rotated_from(&[1, 2, 3, 4], 2), vec![3, 4, 1, 2]);
    }

    #[test]
    fn test_rotated_from_start_zero_keeps_order() {
        assert_eq!(rotated_from(&["a", "b", "c"], 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rotated_from_preserves_length() {
        for start in 0..6 {
            assert_eq!(rotated_from(&[10, 20, 30], start).len(), 3);
        }
    }

    #[test]
    fn test_rotated_from_empty() {
        let empty: Vec<i32> = vec![];
        assert!(rotated_from(&empty, 3).is_empty());
    }
}
