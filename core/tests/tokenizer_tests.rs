use boolean_index_core::tokenizer::{tokenize, Normalization};

#[test]
fn it_lowercases_without_stemming() {
    let words = tokenize("Running Runners RUN! The café's menu.", Normalization::Lowercase);
    assert_eq!(words, vec!["running", "runners", "run!", "the", "café's", "menu."]);
}

#[test]
fn it_keeps_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog", Normalization::Lowercase);
    assert_eq!(words.iter().filter(|w| *w == "the").count(), 2);
    assert!(words.contains(&"and".to_string()));
}

#[test]
fn it_splits_on_any_whitespace() {
    let words = tokenize("  noble\tBrutus \r\n\n  hath  ", Normalization::Lowercase);
    assert_eq!(words, vec!["noble", "brutus", "hath"]);
}
