/*!
The pattern compiler: a recursive descent over the pattern bytes that emits
automaton fragments directly, without an intermediate syntax tree.

One subroutine, [`Compiler::alternation`], accumulates a sequence of
quantified atoms by concatenation and returns when it reaches `|` (the rest
of the alternation is parsed by a recursive call), `)` (the enclosing group
ends) or the end of the pattern. Group depth is tracked explicitly so that a
dangling `(` and a stray `)` are told apart.
*/

use crate::syntax::{self, ByteClass, ByteSet};

use super::{BuildError, ErrorKind, Fragment, Graph, Nfa, Repetition, INFINITE};

pub(crate) fn compile(pattern: &[u8]) -> Result<Nfa, BuildError> {
    let mut compiler = Compiler {
        pattern,
        graph: Graph::new(),
    };
    let (next, frag) = compiler.alternation(0, 0)?;
    debug_assert_eq!(next, pattern.len());
    Ok(compiler.graph.finish(frag))
}

struct Compiler<'p> {
    pattern: &'p [u8],
    graph: Graph,
}

impl Compiler<'_> {
    /// Parses one alternation branch starting at `start`, returning the
    /// index after the consumed input and the accumulated fragment. At
    /// `depth` zero the branch may run to the end of the pattern; inside a
    /// group it must be terminated by `)`, which is consumed.
    fn alternation(&mut self, start: usize, depth: usize) -> Result<(usize, Fragment), BuildError> {
        let mut result: Option<Fragment> = None;
        let mut at = start;
        while at < self.pattern.len() {
            match self.pattern[at] {
                b'|' => {
                    let (next, rest) = self.alternation(at + 1, depth)?;
                    let frag = match result {
                        Some(mut frag) => {
                            self.graph.alternate(&mut frag, rest);
                            frag
                        }
                        None => rest,
                    };
                    return Ok((next, frag));
                }
                b')' if depth > 0 => {
                    let frag = result.unwrap_or_else(|| self.graph.empty());
                    return Ok((at + 1, frag));
                }
                _ => {}
            }

            // At most one quantifier per atom; a second one is rejected as
            // an unexpected byte on the next round.
            let (mut next, mut atom) = self.atom(at, depth)?;
            if let Some(&byte) = self.pattern.get(next) {
                if let Some(op) = Repetition::from_byte(byte) {
                    self.graph.repeat(&mut atom, op);
                    next += 1;
                } else if byte == b'{' {
                    let (after, min, max) = self.cardinality(next + 1)?;
                    self.graph.repeat_range(&mut atom, min, max);
                    next = after;
                }
            }

            match &mut result {
                Some(frag) => self.graph.concat(frag, atom),
                None => result = Some(atom),
            }
            at = next;
        }

        if depth > 0 {
            return Err(BuildError::new(ErrorKind::UnclosedGroup, self.pattern.len()));
        }
        Ok((self.pattern.len(), result.unwrap_or_else(|| self.graph.empty())))
    }

    /// Parses a single atom at `at` and returns the index after it together
    /// with its fragment.
    fn atom(&mut self, at: usize, depth: usize) -> Result<(usize, Fragment), BuildError> {
        match self.pattern[at] {
            b'\\' => {
                let Some(&escaped) = self.pattern.get(at + 1) else {
                    return Err(BuildError::new(ErrorKind::TrailingBackslash, at));
                };
                if syntax::is_special(escaped) {
                    Ok((at + 2, self.graph.single(escaped)))
                } else if let Some(class) = ByteClass::from_letter(escaped) {
                    Ok((at + 2, self.graph.class(class)))
                } else {
                    Err(BuildError::new(ErrorKind::InvalidEscape, at + 1))
                }
            }
            b'.' => Ok((at + 1, self.graph.dot())),
            b'(' => self.alternation(at + 1, depth + 1),
            b'[' => self.bracket(at + 1),
            byte if byte.is_ascii() && !syntax::is_special(byte) => {
                Ok((at + 1, self.graph.single(byte)))
            }
            _ => Err(BuildError::new(ErrorKind::InvalidPattern, at)),
        }
    }

    /// Compiles a bracket expression. `start` is the index just after `[`;
    /// the returned index is just after the closing `]`.
    ///
    /// A leading `^` negates membership against the full 7-bit alphabet. A
    /// `-` is literal as the first element or right before `]`, and forms
    /// an inclusive range anywhere else. There is no nesting and no escape:
    /// `\` is an ordinary member byte.
    fn bracket(&mut self, start: usize) -> Result<(usize, Fragment), BuildError> {
        let pattern = self.pattern;
        let mut first = start;
        if first >= pattern.len() {
            return Err(BuildError::new(ErrorKind::UnclosedCharset, first));
        }
        let negated = pattern[first] == b'^';
        if negated {
            first += 1;
            if first >= pattern.len() {
                return Err(BuildError::new(ErrorKind::UnclosedCharset, first));
            }
        }

        let mut permitted = if negated { ByteSet::full() } else { ByteSet::empty() };
        let mut after_close = None;
        let mut at = first;
        while at < pattern.len() {
            let byte = pattern[at];
            if byte == b']' {
                after_close = Some(at + 1);
                break;
            }
            if byte == b'-' {
                if at == first || pattern.get(at + 1) == Some(&b']') {
                    permitted.set(b'-', !negated);
                    at += 1;
                    continue;
                }
                return Err(BuildError::new(ErrorKind::InvalidCharsetDash, at));
            }
            if !byte.is_ascii() {
                return Err(BuildError::new(ErrorKind::InvalidPattern, at));
            }
            match self.pattern.get(at + 1) {
                None => return Err(BuildError::new(ErrorKind::UnclosedCharset, at + 1)),
                Some(&b'-') => match self.pattern.get(at + 2) {
                    None => return Err(BuildError::new(ErrorKind::UnclosedCharset, at + 2)),
                    Some(&b']') => {
                        // Trailing literal dash; the dash arm above picks it
                        // up on the next round.
                        permitted.set(byte, !negated);
                        at += 1;
                    }
                    Some(&high) => {
                        if !high.is_ascii() {
                            return Err(BuildError::new(ErrorKind::InvalidPattern, at + 2));
                        }
                        if byte > high {
                            return Err(BuildError::new(ErrorKind::WrongCharsetInterval, at));
                        }
                        permitted.set_range(byte, high, !negated);
                        at += 3;
                    }
                },
                Some(_) => {
                    permitted.set(byte, !negated);
                    at += 1;
                }
            }
        }

        let Some(next) = after_close else {
            return Err(BuildError::new(ErrorKind::UnclosedCharset, pattern.len()));
        };
        Ok((next, self.graph.byte_set(&permitted)))
    }

    /// Parses a `{m,n}` cardinality. `start` is the index just after `{`;
    /// the returned index is just after `}`. A missing minimum is 0, a
    /// missing maximum is [`INFINITE`], and a single literal space right
    /// after the comma is tolerated.
    fn cardinality(&mut self, start: usize) -> Result<(usize, u32, u32), BuildError> {
        let pattern = self.pattern;

        let (min, mut at) = if pattern.get(start) == Some(&b',') {
            (0, start + 1)
        } else {
            let mut digits_end = start;
            while digits_end < pattern.len() && pattern[digits_end].is_ascii_digit() {
                digits_end += 1;
            }
            if digits_end >= pattern.len() {
                return Err(BuildError::new(ErrorKind::MissingCardinalityClose, pattern.len()));
            }
            if pattern[digits_end] != b',' {
                return Err(BuildError::new(ErrorKind::InvalidCardinalitySeparator, digits_end));
            }
            let min = self.number(start, digits_end, ErrorKind::InvalidCardinalitySeparator)?;
            (min, digits_end + 1)
        };

        // Historical leniency: one literal space after the comma.
        if pattern.get(at) == Some(&b' ') {
            at += 1;
        }
        if at >= pattern.len() {
            return Err(BuildError::new(ErrorKind::MissingCardinalityClose, pattern.len()));
        }

        let (max, next) = if pattern[at] == b'}' {
            (INFINITE, at + 1)
        } else {
            let mut digits_end = at;
            while digits_end < pattern.len() && pattern[digits_end].is_ascii_digit() {
                digits_end += 1;
            }
            if digits_end >= pattern.len() {
                return Err(BuildError::new(ErrorKind::MissingCardinalityClose, pattern.len()));
            }
            if pattern[digits_end] != b'}' {
                return Err(BuildError::new(ErrorKind::MissingCardinalityClose, digits_end));
            }
            let max = self.number(at, digits_end, ErrorKind::MissingCardinalityClose)?;
            (max, digits_end + 1)
        };

        if min > max {
            // Reported at the opening brace.
            return Err(BuildError::new(ErrorKind::WrongCardinalityOrder, start - 1));
        }
        Ok((next, min, max))
    }

    /// Parses the decimal run `pattern[from..to]` (all digits by
    /// construction). A value that does not fit is malformed input.
    fn number(&self, from: usize, to: usize, kind: ErrorKind) -> Result<u32, BuildError> {
        self.pattern[from..to]
            .iter()
            .try_fold(0u32, |number, &digit| {
                number.checked_mul(10)?.checked_add(u32::from(digit - b'0'))
            })
            .ok_or_else(|| BuildError::new(kind, from))
    }
}
