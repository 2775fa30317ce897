// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_glossary(entries: usize) -> String {
    let mut content = String::from("# Glossary\n\n");
    for i in 0..entries {
        content.push_str(&format!("term {i}\n:   definition of term {i}, with *some* markup\n"));
        if i % 10 == 9 {
            content.push_str("\nA plain paragraph between groups of entries.\n\n");
        }
    }
    content
}

#[allow(dead_code)]
pub fn generate_mixed_document(sections: usize) -> String {
    let base = "## Section\n\nSome paragraph content.\n\n\
                ice\n:   frozen water\nsnow\n:   frozen flakes\n\n\
                - first\n- second\n:   absorbed definition\n- third\n\n\
                ```text\nnot\n:   a definition\n```\n\n";
    base.repeat(sections)
}
