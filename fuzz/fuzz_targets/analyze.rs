#![no_main]

use libfuzzer_sys::fuzz_target;
use tlua::frontend::analyzer::{TypeEnvironment, analyze};
use tlua::frontend::parser;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(mut chunk) = parser::parse(s) {
            let env = TypeEnvironment::new();
            let _ = analyze(&mut chunk, &env);
        }
    }
});
