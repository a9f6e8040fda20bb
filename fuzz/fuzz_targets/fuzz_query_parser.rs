#![no_main]

use cirrus_query::{DefaultNamespacePrefixParser, QueryStringParser, SearchConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing arbitrary user input must never panic
    let config = SearchConfig::default();
    let ns_parser = DefaultNamespacePrefixParser::new();
    if let Ok(parser) = QueryStringParser::new(&config, &ns_parser) {
        let _ = parser.parse(data);
    }
});
