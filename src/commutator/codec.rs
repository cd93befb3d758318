// Turn command line format understood by the commutator firmware:
//     {turn: -0.25000}\r\n

/// Decimal places of the turn value on the wire
pub const TURN_PRECISION: usize = 5;

/// Render one turn command as an ASCII line
pub fn encode_turn(turn: f64) -> Vec<u8> {
    format!("{{turn: {:.*}}}\r\n", TURN_PRECISION, turn).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(turn: f64) -> String {
        String::from_utf8(encode_turn(turn)).unwrap()
    }

    #[test]
    fn test_negative_quarter_turn() {
        assert_eq!(line(-0.25), "{turn: -0.25000}\r\n");
    }

    #[test]
    fn test_positive_has_no_sign() {
        assert_eq!(line(0.1), "{turn: 0.10000}\r\n");
    }

    #[test]
    fn test_rounds_to_five_places() {
        assert_eq!(line(0.0123456), "{turn: 0.01235}\r\n");
        assert_eq!(line(1.5), "{turn: 1.50000}\r\n");
    }

    #[test]
    fn test_is_ascii() {
        assert!(encode_turn(-12.345678).is_ascii());
    }
}
