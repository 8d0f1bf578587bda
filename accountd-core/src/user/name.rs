//! Display name rule: a denylist of characters, everything else is allowed.

/// Minimum length, counted in characters rather than bytes.
pub const NAME_MIN_CHARS: usize = 2;

const FORBIDDEN_CHARS: &[char] = &[
    '_', '!', '¡', '?', '¿', '÷', '/', '\\', '+', '=', '@', '#', '$', '%', '^', 'ˆ', '&', '*',
    '(', ')', '{', '}', '|', '~', '<', '>', ';', ':', '[', ']',
];

/// True if the name has at least two characters and none of them is an ASCII
/// digit or a forbidden symbol. Letters from any script pass.
pub fn is_valid_name(name: &str) -> bool {
    name.chars().count() >= NAME_MIN_CHARS
        && !name
            .chars()
            .any(|c| c.is_ascii_digit() || FORBIDDEN_CHARS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_names_in_any_script() {
        for name in ["Leo Fender", "陳大文", "আবাসযোগ্য", "Biréli Lagrène", "O'Brien-Smith"] {
            assert!(is_valid_name(name), "{name}");
        }
    }

    #[test]
    fn rejects_digits_underscore_and_symbols() {
        for name in [
            "A$@p Rocky",
            "Leo Fender)(*&",
            "I am the greetest!",
            "leo_fender",
            "Leo 2",
            "¿Qué?",
        ] {
            assert!(!is_valid_name(name), "{name}");
        }
    }

    #[test]
    fn length_counts_characters() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("L"));
        assert!(is_valid_name("Lé"));
        // One multi-byte character is still one character.
        assert!(!is_valid_name("陳"));
    }
}
