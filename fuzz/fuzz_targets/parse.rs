#![no_main]

use jsast::pipeline::AstParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(source) = std::str::from_utf8(data) {
        // The pipeline must produce a tree for any input, however broken.
        let tree = AstParser::new().parse(source, "fuzz.js");
        assert!(tree.tokens.windows(2).all(|w| w[0].range.start < w[1].range.start));
    }
});
