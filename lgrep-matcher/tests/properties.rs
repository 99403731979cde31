//! Randomized agreement tests: patterns drawn from a restricted grammar are
//! run through the engine and through a brute-force membership oracle that
//! tracks every position a subpattern can reach. Inputs are kept short so
//! the oracle stays honest and cheap.

use std::collections::HashSet;

use lgrep_matcher::nfa::Nfa;
use quickcheck::{Arbitrary, Gen, QuickCheck};

#[derive(Clone, Debug)]
enum Pat {
    Byte(u8),
    Dot,
    Concat(Box<Pat>, Box<Pat>),
    Alt(Box<Pat>, Box<Pat>),
    Opt(Box<Pat>),
    Star(Box<Pat>),
    Plus(Box<Pat>),
    Range(Box<Pat>, u32, u32),
}

impl Pat {
    /// Renders the pattern with every subexpression parenthesized, so the
    /// result is a single atom no matter where it is spliced in.
    fn to_pattern(&self) -> String {
        match self {
            Pat::Byte(byte) => (*byte as char).to_string(),
            Pat::Dot => ".".to_string(),
            Pat::Concat(left, right) => format!("({}{})", left.to_pattern(), right.to_pattern()),
            Pat::Alt(left, right) => format!("({}|{})", left.to_pattern(), right.to_pattern()),
            Pat::Opt(inner) => format!("({}?)", inner.to_pattern()),
            Pat::Star(inner) => format!("({}*)", inner.to_pattern()),
            Pat::Plus(inner) => format!("({}+)", inner.to_pattern()),
            Pat::Range(inner, min, max) => format!("({}{{{min},{max}}})", inner.to_pattern()),
        }
    }

    /// One string of the pattern's language, picked by the given rng.
    fn sample(&self, rng: &mut u64) -> Vec<u8> {
        match self {
            Pat::Byte(byte) => vec![*byte],
            Pat::Dot => vec![*pick(rng, b"abz")],
            Pat::Concat(left, right) => {
                let mut line = left.sample(rng);
                line.extend(right.sample(rng));
                line
            }
            Pat::Alt(left, right) => {
                if next(rng) % 2 == 0 {
                    left.sample(rng)
                } else {
                    right.sample(rng)
                }
            }
            Pat::Opt(inner) => {
                if next(rng) % 2 == 0 {
                    Vec::new()
                } else {
                    inner.sample(rng)
                }
            }
            Pat::Star(inner) => repeat_sample(inner, next(rng) % 3, rng),
            Pat::Plus(inner) => repeat_sample(inner, 1 + next(rng) % 2, rng),
            Pat::Range(inner, min, max) => {
                let count = u64::from(*min) + next(rng) % u64::from(max - min + 1);
                repeat_sample(inner, count, rng)
            }
        }
    }
}

fn repeat_sample(inner: &Pat, count: u64, rng: &mut u64) -> Vec<u8> {
    let mut line = Vec::new();
    for _ in 0..count {
        line.extend(inner.sample(rng));
    }
    line
}

fn next(rng: &mut u64) -> u64 {
    *rng ^= *rng << 13;
    *rng ^= *rng >> 7;
    *rng ^= *rng << 17;
    *rng
}

fn pick<'a, T>(rng: &mut u64, slice: &'a [T]) -> &'a T {
    &slice[(next(rng) % slice.len() as u64) as usize]
}

impl Arbitrary for Pat {
    fn arbitrary(g: &mut Gen) -> Pat {
        arbitrary_pat(g, 3)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Pat>> {
        match self {
            Pat::Byte(_) | Pat::Dot => quickcheck::empty_shrinker(),
            Pat::Concat(left, right) | Pat::Alt(left, right) => {
                Box::new(vec![(**left).clone(), (**right).clone()].into_iter())
            }
            Pat::Opt(inner) | Pat::Star(inner) | Pat::Plus(inner) | Pat::Range(inner, _, _) => {
                Box::new(std::iter::once((**inner).clone()))
            }
        }
    }
}

fn arbitrary_pat(g: &mut Gen, depth: usize) -> Pat {
    let choice = if depth == 0 {
        *g.choose(&[0, 1]).unwrap()
    } else {
        // Leaves twice as likely as each combinator, to keep trees small.
        *g.choose(&[0, 0, 1, 1, 2, 3, 4, 5, 6, 7]).unwrap()
    };
    match choice {
        0 => Pat::Byte(*g.choose(b"ab").unwrap()),
        1 => Pat::Dot,
        2 => Pat::Concat(
            Box::new(arbitrary_pat(g, depth - 1)),
            Box::new(arbitrary_pat(g, depth - 1)),
        ),
        3 => Pat::Alt(
            Box::new(arbitrary_pat(g, depth - 1)),
            Box::new(arbitrary_pat(g, depth - 1)),
        ),
        4 => Pat::Opt(Box::new(arbitrary_pat(g, depth - 1))),
        5 => Pat::Star(Box::new(arbitrary_pat(g, depth - 1))),
        6 => Pat::Plus(Box::new(arbitrary_pat(g, depth - 1))),
        _ => {
            let min = *g.choose(&[0u32, 1, 2]).unwrap();
            let span = *g.choose(&[0u32, 1, 2]).unwrap();
            Pat::Range(Box::new(arbitrary_pat(g, depth - 1)), min, min + span)
        }
    }
}

#[derive(Clone, Debug)]
struct Line(Vec<u8>);

impl Arbitrary for Line {
    fn arbitrary(g: &mut Gen) -> Line {
        let len = *g.choose(&[0usize, 1, 2, 3, 4, 5, 6]).unwrap();
        Line((0..len).map(|_| *g.choose(b"aab").unwrap()).collect())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Line>> {
        if self.0.is_empty() {
            quickcheck::empty_shrinker()
        } else {
            Box::new(std::iter::once(Line(self.0[..self.0.len() - 1].to_vec())))
        }
    }
}

/// Every position the pattern can reach when it starts matching `line` at
/// `at`. The whole line matches iff `line.len()` is reachable from 0.
fn oracle_ends(pat: &Pat, line: &[u8], at: usize) -> HashSet<usize> {
    match pat {
        Pat::Byte(byte) => match line.get(at) {
            Some(c) if c == byte => HashSet::from([at + 1]),
            _ => HashSet::new(),
        },
        Pat::Dot => match line.get(at) {
            Some(&c) if c != b'\n' && c.is_ascii() => HashSet::from([at + 1]),
            _ => HashSet::new(),
        },
        Pat::Concat(left, right) => oracle_ends(left, line, at)
            .into_iter()
            .flat_map(|mid| oracle_ends(right, line, mid))
            .collect(),
        Pat::Alt(left, right) => {
            let mut ends = oracle_ends(left, line, at);
            ends.extend(oracle_ends(right, line, at));
            ends
        }
        Pat::Opt(inner) => {
            let mut ends = oracle_ends(inner, line, at);
            ends.insert(at);
            ends
        }
        Pat::Star(inner) => oracle_closure(inner, line, HashSet::from([at])),
        Pat::Plus(inner) => oracle_closure(inner, line, oracle_step(inner, line, &HashSet::from([at]))),
        Pat::Range(inner, min, max) => {
            let mut frontier = HashSet::from([at]);
            for _ in 0..*min {
                frontier = oracle_step(inner, line, &frontier);
            }
            let mut ends = frontier.clone();
            for _ in *min..*max {
                frontier = oracle_step(inner, line, &frontier);
                if frontier.is_subset(&ends) {
                    break;
                }
                ends.extend(&frontier);
            }
            ends
        }
    }
}

fn oracle_step(pat: &Pat, line: &[u8], from: &HashSet<usize>) -> HashSet<usize> {
    from.iter().flat_map(|&at| oracle_ends(pat, line, at)).collect()
}

/// Zero or more applications of `pat` from any seed position.
fn oracle_closure(pat: &Pat, line: &[u8], seeds: HashSet<usize>) -> HashSet<usize> {
    let mut ends = seeds.clone();
    let mut frontier = seeds;
    loop {
        let fresh: HashSet<usize> = oracle_step(pat, line, &frontier)
            .into_iter()
            .filter(|end| !ends.contains(end))
            .collect();
        if fresh.is_empty() {
            return ends;
        }
        ends.extend(&fresh);
        frontier = fresh;
    }
}

#[test]
fn engine_agrees_with_the_brute_force_oracle() {
    fn prop(pat: Pat, line: Line) -> bool {
        let nfa = Nfa::compile(pat.to_pattern().as_bytes()).unwrap();
        let expected = oracle_ends(&pat, &line.0, 0).contains(&line.0.len());
        nfa.accepts(&line.0) == expected
    }
    QuickCheck::new()
        .tests(2000)
        .quickcheck(prop as fn(Pat, Line) -> bool);
}

#[test]
fn strings_sampled_from_a_pattern_are_accepted() {
    fn prop(pat: Pat, seed: u64) -> bool {
        let nfa = Nfa::compile(pat.to_pattern().as_bytes()).unwrap();
        let mut rng = seed | 1;
        (0..8).all(|_| nfa.accepts(&pat.sample(&mut rng)))
    }
    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(Pat, u64) -> bool);
}
