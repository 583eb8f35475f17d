// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use std::rc::Rc;

use bracketree_engine::{BracketRegistry, StaticLanguageConfiguration};

#[allow(dead_code)]
pub fn generate_c_like_source(functions: usize) -> String {
    let base = concat!(
        "fn example(a: [u8; 4], b: &str) {\n",
        "    if a[0] > 1 {\n",
        "        call(b, \"(\");\n",
        "    }\n",
        "    let v = vec![(1, 2), (3, 4)];\n",
        "}\n",
        "\n",
    );
    base.repeat(functions)
}

#[allow(dead_code)]
pub fn generate_deeply_nested(depth: usize) -> String {
    let mut content = String::new();
    for level in 0..depth {
        content.push_str(&"  ".repeat(level));
        content.push_str("call(x, {\n");
    }
    for level in (0..depth).rev() {
        content.push_str(&"  ".repeat(level));
        content.push_str("})\n");
    }
    content
}

#[allow(dead_code)]
pub fn registry() -> BracketRegistry {
    BracketRegistry::new(Rc::new(StaticLanguageConfiguration::c_like()))
}
