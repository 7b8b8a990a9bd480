#![no_main]

use libfuzzer_sys::fuzz_target;
use tlua::format::{FormatConfig, unparse};
use tlua::frontend::parser;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Whatever parses must unparse into something that parses again
        if let Ok(chunk) = parser::parse(s) {
            let output = unparse(&chunk, &FormatConfig::default());
            if let Err(err) = parser::parse(&output) {
                panic!("unparsed output does not parse: {err}\n{output}");
            }
        }
        let _ = parser::parse_typing(s);
    }
});
