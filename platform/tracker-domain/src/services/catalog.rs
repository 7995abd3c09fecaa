use crate::value_objects::ticker::TickerSymbol;
use serde::Serialize;
use std::collections::HashSet;

const HEADER_WORDS: [&str; 4] = ["symbol", "symbols", "ticker", "tickers"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickerCatalog {
    pub symbols: Vec<TickerSymbol>,
    /// Lines that did not parse as a symbol.
    pub skipped: usize,
}

impl TickerCatalog {
    pub fn from_symbols(symbols: Vec<TickerSymbol>) -> Self {
        let mut seen = HashSet::new();
        let symbols = symbols
            .into_iter()
            .filter(|s| seen.insert(s.clone()))
            .collect();
        Self { symbols, skipped: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Symbols containing `query` (case-insensitive), in catalog order.
    pub fn filter(&self, query: &str) -> Vec<&TickerSymbol> {
        let needle = query.trim().to_uppercase();
        self.symbols
            .iter()
            .filter(|s| needle.is_empty() || s.as_str().contains(&needle))
            .collect()
    }
}

/// One symbol per line; only the first comma/whitespace-separated field counts.
/// Blank lines, `#` comments and a leading header row are ignored.
pub fn parse_catalog(text: &str) -> TickerCatalog {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0usize;
    let mut first_field = true;

    for line in text.lines() {
        let line = line.trim().trim_start_matches('\u{feff}');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let field = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .next()
            .unwrap_or("")
            .trim_matches('"');

        if first_field {
            first_field = false;
            if HEADER_WORDS.iter().any(|h| h.eq_ignore_ascii_case(field)) {
                continue;
            }
        }

        match TickerSymbol::parse(field) {
            Ok(symbol) => {
                if seen.insert(symbol.clone()) {
                    symbols.push(symbol);
                }
            }
            Err(_) => skipped += 1,
        }
    }

    TickerCatalog { symbols, skipped }
}

#[cfg(test)]
mod tests {
    use super::{parse_catalog, TickerCatalog};

    fn names(catalog: &TickerCatalog) -> Vec<&str> {
        catalog.symbols.iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn parses_one_symbol_per_line() {
        let catalog = parse_catalog("AAPL\nmsft\n\n  GOOG  \n");
        assert_eq!(names(&catalog), vec!["AAPL", "MSFT", "GOOG"]);
        assert_eq!(catalog.skipped, 0);
    }

    #[test]
    fn skips_header_comments_and_duplicates() {
        let catalog = parse_catalog("Ticker\n# watchlist\nAAPL\nAAPL\nTSLA,Tesla Inc\n");
        assert_eq!(names(&catalog), vec!["AAPL", "TSLA"]);
    }

    #[test]
    fn header_word_is_only_skipped_on_the_first_line() {
        let catalog = parse_catalog("AAPL\nTICKER\n");
        assert_eq!(names(&catalog), vec!["AAPL", "TICKER"]);
    }

    #[test]
    fn counts_invalid_lines() {
        let catalog = parse_catalog("AAPL\n$$$\nthis-symbol-is-way-too-long\n");
        assert_eq!(names(&catalog), vec!["AAPL"]);
        assert_eq!(catalog.skipped, 2);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let catalog = parse_catalog("AAPL\nAMZN\nMSFT\n");
        let hits: Vec<&str> = catalog.filter("a").iter().map(|s| s.as_str()).collect();
        assert_eq!(hits, vec!["AAPL", "AMZN"]);
        assert_eq!(catalog.filter("").len(), 3);
        assert_eq!(catalog.filter(" sft ").len(), 1);
    }
}
