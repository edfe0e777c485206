#![no_main]

use assetplan::application::{Html, Plugin, State};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(html) = std::str::from_utf8(data) {
        let mut state = State::new("/src", "/dist");
        state.register_now("app");
        state.graph_dependencies();
        state.add_op_write("index.html", html, None);
        if let Ok(plugin) = Html::new() {
            // Unknown references are plan errors, never panics
            let _ = plugin.run(&mut state);
        }
    }
});
