use boolean_index_core::{DocId, InvertedIndex};
const TERM_WIDTH: usize = 20;
const CELL_WIDTH: usize = 16;

/// Term x document incidence matrix, terms ascending, one column per document.
pub fn render_matrix(index: &InvertedIndex) -> String {
    let doc_ids: Vec<DocId> = index.doc_ids().collect();
    let mut out = String::new();

    out.push_str(&format!("{:<w$}", "", w = TERM_WIDTH));
    for &id in &doc_ids {
        let name = index.doc_name(id).unwrap_or("?");
        out.push_str(&format!("{:<w$}", name, w = CELL_WIDTH));
    }
    out.push('\n');
    out.push_str(&"-".repeat(TERM_WIDTH + CELL_WIDTH * doc_ids.len()));
    out.push('\n');

    for (term, postings) in index.iter() {
        out.push_str(&format!("{:<w$}", term, w = TERM_WIDTH));
        for &id in &doc_ids {
            let cell = if postings.contains(id) { "1" } else { "0" };
            out.push_str(&format!("{:<w$}", cell, w = CELL_WIDTH));
        }
        out.push('\n');
    }
    out
}

pub fn render_index(index: &InvertedIndex) -> String {
    let mut out = String::from("Inverted Index Representation:\n");
    for (term, postings) in index.iter() {
        out.push_str(&format!("{term}: {:?}\n", postings.as_slice()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use boolean_index_core::{build_from_sources, TextSource};

    fn index() -> InvertedIndex {
        let sources = vec![
            TextSource::new("Doc1.txt", "Brutus Caesar"),
            TextSource::new("Doc2.txt", "caesar"),
        ];
        build_from_sources(&sources).index
    }

    #[test]
    fn matrix_has_header_and_rows() {
        let text = render_matrix(&index());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Doc1.txt") && lines[0].contains("Doc2.txt"));
        assert!(lines[1].chars().all(|c| c == '-'));
        let brutus: Vec<&str> = lines[2].split_whitespace().collect();
        assert_eq!(brutus, vec!["brutus", "1", "0"]);
        let caesar: Vec<&str> = lines[3].split_whitespace().collect();
        assert_eq!(caesar, vec!["caesar", "1", "1"]);
    }

    #[test]
    fn index_listing() {
        assert_eq!(
            render_index(&index()),
            "Inverted Index Representation:\nbrutus: [1]\ncaesar: [1, 2]\n"
        );
    }
}
