/*!
A line-oriented regular expression matcher built on a Thompson NFA.

Given a pattern and a stream of input lines, this crate decides which lines
contain (or exactly match) the pattern. The engine has two stages, both in
[`nfa`]:

- a compiler that parses the pattern into a non-deterministic finite
  automaton by Thompson-style construction, supporting `.`, the
  `\d \D \w \W \s \S` classes, `[...]` bracket sets, alternation, groups,
  the `? + *` repetitions and general `{m,n}` cardinalities (with an open
  upper bound);
- a simulator that runs a simultaneous multi-state simulation with
  epsilon-closure expansion, in time linear in the line length. There is no
  backtracking, so patterns like `(a*)*b` cannot blow up.

The alphabet is 7-bit: classes, wildcards and negated sets never match
bytes above `0x7f`, and `.` never matches `\n`.

[`matcher::LineMatcher`] is the grep-facing surface: it resolves the
conventional `^`/`$` line anchors by rewriting the pattern and answers
match/no-match per line.

## Usage

```
use lgrep_matcher::matcher::LineMatcher;

let matcher = LineMatcher::builder(r"\d+ (bottles|cans)").build()?;
assert!(matcher.is_match("99 bottles of beer on the wall"));
assert!(!matcher.is_match("some bottles of beer"));
# Ok::<(), lgrep_matcher::nfa::BuildError>(())
```

The automaton layer is available directly when no anchor handling is
wanted; it matches whole inputs only, so wildcard padding is spelled out in
the pattern:

```
use lgrep_matcher::nfa::Nfa;

let nfa = Nfa::compile(br".*\d+.*")?;
assert!(nfa.accepts(b"hello 42 world"));
assert!(!nfa.accepts(b"hello world"));
# Ok::<(), lgrep_matcher::nfa::BuildError>(())
```
*/

pub mod matcher;
pub mod nfa;
mod syntax;
