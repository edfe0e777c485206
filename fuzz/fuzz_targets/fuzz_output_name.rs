#![no_main]

use assetplan::domain::services::{NameOptions, OutputNameFn};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // "<template>\n<path>"
        let (template, path) = input.split_once('\n').unwrap_or((input, "a/b.js"));
        let f = OutputNameFn::compile(template, &NameOptions::default());
        let _ = f.render(path, || Ok(data));
    }
});
