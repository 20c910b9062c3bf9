use std::time::Duration;

/// Parses a duration string such as `30s`, `15m` or `7d12h`.
///
/// The string is a sequence of `<digits><unit>` pairs where the unit is one of
/// `s`, `m`, `h` or `d`. Surrounding whitespace is ignored.
///
/// # Returns
/// The parsed [`Duration`], or `None` if the input is empty, malformed, or overflows.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use vitrine_utils::time::parse_duration;
///
/// assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
/// assert_eq!(parse_duration("soon"), None);
/// ```
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut chars = input.chars().peekable();

    while chars.peek().is_some() {
        let mut number_str = String::new();
        while let Some(c) = chars.next_if(char::is_ascii_digit) {
            number_str.push(c);
        }

        if number_str.is_empty() {
            return None;
        }

        let number: u64 = number_str.parse().ok()?;
        let multiplier = match chars.next()? {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            _ => return None,
        };

        total = total.checked_add(number.checked_mul(multiplier)?)?;
    }

    Some(Duration::from_secs(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("1s"), Some(Duration::from_secs(1)));
        assert_eq!(parse_duration("1m"), Some(Duration::from_secs(60)));
        assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3_600)));
        assert_eq!(parse_duration("7d"), Some(Duration::from_secs(7 * 86_400)));
        assert_eq!(
            parse_duration(" 1d1h1m1s "),
            Some(Duration::from_secs(86_400 + 3_600 + 60 + 1))
        );
        assert_eq!(parse_duration("1d1h1m1s1"), None);
        assert_eq!(parse_duration("10x"), None);
        assert_eq!(parse_duration("fail"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn test_integer_overflow() {
        assert_eq!(parse_duration("18446744073709551615d"), None);
        assert_eq!(
            parse_duration("340282366920938463463374607431768211456s"),
            None
        );
    }
}
