use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// How raw tokens are folded into terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// Lower-case only.
    #[default]
    Lowercase,
    /// NFKC compatibility folding, then lower-case.
    NfkcLowercase,
}

/// Normalize a single raw token into a term.
pub fn normalize(token: &str, normalization: Normalization) -> String {
    match normalization {
        Normalization::Lowercase => token.to_lowercase(),
        Normalization::NfkcLowercase => token.nfkc().collect::<String>().to_lowercase(),
    }
}

/// Split one line into raw whitespace-delimited tokens. Tokens are not normalized.
pub fn tokenize_line(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace()
}

/// Tokenize a whole text into normalized terms, in order of appearance.
pub fn tokenize(text: &str, normalization: Normalization) -> Vec<String> {
    text.lines()
        .flat_map(tokenize_line)
        .map(|tok| normalize(tok, normalization))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Brutus killed  Caesar\nCAESAR was\tambitious", Normalization::Lowercase);
        assert_eq!(t, vec!["brutus", "killed", "caesar", "caesar", "was", "ambitious"]);
    }

    #[test]
    fn punctuation_is_kept() {
        // no stripping beyond whitespace splitting
        let t = tokenize("Caesar, Brutus.", Normalization::Lowercase);
        assert_eq!(t, vec!["caesar,", "brutus."]);
    }

    #[test]
    fn nfkc_folds_compatibility_forms() {
        assert_eq!(normalize("ＣＡＥＳＡＲ", Normalization::NfkcLowercase), "caesar");
        assert_eq!(normalize("ＣＡＥＳＡＲ", Normalization::Lowercase), "ｃａｅｓａｒ");
    }
}
