/*!
Line matching on top of the compiled automaton.

[`LineMatcher`] is the grep-facing surface: it interprets the conventional
line anchors by string surgery before compilation, pads the body with `.*`
so the automaton decides "does the pattern occur on this line" as a
whole-line question, and answers [`is_match`](LineMatcher::is_match) per
line.

## Anchors

Only a leading `^` and a trailing unescaped `$` are anchors; the core
pattern language has no anchor states, so `^` and `$` anywhere else in the
body are ordinary literal bytes. The four combinations rewrite a user
pattern `P` into `P`, `P.*`, `.*P` or `.*P.*`.

## Example

```
use lgrep_matcher::matcher::LineMatcher;

let matcher = LineMatcher::builder(r"^\d+ (bottles|cans)").build()?;
assert!(matcher.is_match("99 bottles of beer"));
assert!(!matcher.is_match("no bottles of beer"));

let exact = LineMatcher::builder("ok").whole_line(true).build()?;
assert!(exact.is_match("ok"));
assert!(!exact.is_match("ok then"));
# Ok::<(), lgrep_matcher::nfa::BuildError>(())
```
*/

use bon::bon;

use crate::nfa::{BuildError, Nfa};

/// A compiled line pattern.
///
/// Construction compiles the rewritten pattern once; matching is read-only,
/// so a `LineMatcher` can be shared across threads.
#[derive(Debug)]
pub struct LineMatcher {
    nfa: Nfa,
    pattern: Box<str>,
}

#[bon]
impl LineMatcher {
    #[builder]
    pub fn new(
        #[builder(start_fn)] pattern: &str,

        /// Require the pattern to cover the entire line, as if it were
        /// wrapped in `^` and `$`. Redundant explicit anchors are still
        /// stripped.
        #[builder(default = false)]
        whole_line: bool,
    ) -> Result<LineMatcher, BuildError> {
        let prepared = prepare(pattern, whole_line);
        let nfa = Nfa::compile(prepared.as_bytes())?;
        Ok(LineMatcher {
            nfa,
            pattern: pattern.into(),
        })
    }

    /// Returns true if and only if the pattern matches the line under the
    /// matcher's anchoring rules. Lines are byte sequences; they are not
    /// required to be UTF-8 and must not contain the terminator.
    pub fn is_match(&self, line: impl AsRef<[u8]>) -> bool {
        self.nfa.accepts(line.as_ref())
    }

    /// The pattern this matcher was built from, as given.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Rewrites a user pattern into the core pattern actually compiled,
/// resolving anchors by string surgery.
fn prepare(pattern: &str, whole_line: bool) -> String {
    let mut body = pattern;
    let mut from_start = whole_line;
    let mut to_end = whole_line;
    if let Some(rest) = body.strip_prefix('^') {
        body = rest;
        from_start = true;
    }
    if ends_with_line_anchor(body) {
        body = &body[..body.len() - 1];
        to_end = true;
    }
    match (from_start, to_end) {
        (true, true) => body.to_owned(),
        (true, false) => format!("{body}.*"),
        (false, true) => format!(".*{body}"),
        (false, false) => format!(".*{body}.*"),
    }
}

/// A trailing `$` is an anchor unless it is escaped, i.e. preceded by an
/// odd number of backslashes.
fn ends_with_line_anchor(pattern: &str) -> bool {
    let Some(body) = pattern.strip_suffix('$') else {
        return false;
    };
    body.bytes().rev().take_while(|&byte| byte == b'\\').count() % 2 == 0
}
