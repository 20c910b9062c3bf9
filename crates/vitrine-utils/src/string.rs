/// Removes every whitespace character from `s`.
///
/// Column lists for embedded resources are often written across several lines
/// (`"*, produto:produtos(id, nome)"`); the REST backend expects them compact.
///
/// # Examples
///
/// ```
/// use vitrine_utils::string::strip_whitespace;
///
/// assert_eq!(strip_whitespace("*,\n  produto:produtos(id, nome)"), "*,produto:produtos(id,nome)");
/// ```
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Keeps only the ASCII digits of `s`.
pub fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Builds a URL slug: lowercase ASCII, accents folded, every other run of
/// characters collapsed into a single `-`.
///
/// # Examples
///
/// ```
/// use vitrine_utils::string::slugify;
///
/// assert_eq!(slugify("Mesas & Cadeiras"), "mesas-cadeiras");
/// assert_eq!(slugify("  Decoração "), "decoracao");
/// ```
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut pending_dash = false;

    for c in s.chars().flat_map(char::to_lowercase).map(fold_accent) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Formats `n` in base 36 using lowercase digits.
pub fn to_base36(mut n: u64) -> String {
    const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if n == 0 {
        return "0".to_string();
    }

    let mut buf = Vec::new();
    while n > 0 {
        buf.push(ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_whitespace() {
        let formatted = "
            *,
            produto:produtos (
                id,
                nome
            )
        ";
        assert_eq!(strip_whitespace(formatted), "*,produto:produtos(id,nome)");
        assert_eq!(strip_whitespace("*"), "*");
        assert_eq!(strip_whitespace(""), "");
    }

    #[test]
    fn test_digits() {
        assert_eq!(digits("(11) 98765-4321"), "11987654321");
        assert_eq!(digits("abc"), "");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Sofás e Poltronas"), "sofas-e-poltronas");
        assert_eq!(slugify("--Mesa--"), "mesa");
        assert_eq!(slugify("Iluminação 2024"), "iluminacao-2024");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_295), "zz");
    }
}
