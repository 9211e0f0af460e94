/// Reduce a grid reference to the 1km square that contains it.
///
/// `TG 51408 13177` becomes `TG5113`. The reference must be two letters followed by an even
/// number of digits, at least four; spaces are ignored and letters are upper cased.
pub fn one_km_square(grid_ref: &str) -> Option<String> {
    let compact: String = grid_ref
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if compact.len() < 6 || !compact.is_ascii() {
        return None;
    }

    let (letters, digits) = compact.split_at(2);
    if !letters.bytes().all(|b| b.is_ascii_alphabetic())
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || digits.len() % 2 != 0
    {
        return None;
    }

    let (easting, northing) = digits.split_at(digits.len() / 2);
    Some(format!("{}{}{}", letters, &easting[..2], &northing[..2]))
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_one_km_square() {
        assert_eq!(one_km_square("TG 51408 13177").as_deref(), Some("TG5113"));
        assert_eq!(one_km_square("ns5865").as_deref(), Some("NS5865"));
        assert_eq!(one_km_square("NS 586 654").as_deref(), Some("NS5865"));
        assert_eq!(one_km_square("NS58").as_deref(), None);
        assert_eq!(one_km_square("NS 5861 654").as_deref(), None);
        assert_eq!(one_km_square("1234567").as_deref(), None);
        assert_eq!(one_km_square("").as_deref(), None);
    }
}
