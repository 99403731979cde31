use lgrep_matcher::{matcher::LineMatcher, nfa::Nfa};

fn main() {
    let matcher = LineMatcher::builder(r"\d{4}-\d{2}-\d{2}").build().unwrap();
    assert!(matcher.is_match("released on 2025-11-30, patched later"));
    assert!(!matcher.is_match("released last november"));

    let matcher = LineMatcher::builder("^(warn|error):").build().unwrap();
    assert!(matcher.is_match("error: disk full"));
    assert!(!matcher.is_match("notice: error counts are fine"));

    // The automaton layer matches whole inputs; padding is explicit.
    let nfa = Nfa::compile(br".*(TODO|FIXME).*").unwrap();
    assert!(nfa.accepts(b"// TODO: remove once the cache is gone"));

    println!("all matched as expected");
}
