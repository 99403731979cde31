/*!
Multi-state simulation of a finished automaton.

The simulator keeps the set of currently reachable states, advancing it one
byte at a time. Because per-state epsilon closures are precomputed at
finalization, a step is a union of closure slices over the byte's targets;
no graph walking happens on the match path.
*/

use std::mem;

use super::{Nfa, StateId};

/// A sparse set over state ids: a dense list of members plus a membership
/// table, so insert, lookup and iteration are all constant-time-ish and
/// clearing does not touch the whole table.
struct StateSet {
    dense: Vec<StateId>,
    member: Vec<bool>,
}

impl StateSet {
    fn for_states(count: usize) -> StateSet {
        StateSet {
            dense: Vec::with_capacity(count),
            member: vec![false; count],
        }
    }

    fn insert(&mut self, id: StateId) {
        if !self.member[id] {
            self.member[id] = true;
            self.dense.push(id);
        }
    }

    fn contains(&self, id: StateId) -> bool {
        self.member[id]
    }

    fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    fn iter(&self) -> std::slice::Iter<'_, StateId> {
        self.dense.iter()
    }

    fn clear(&mut self) {
        for id in self.dense.drain(..) {
            self.member[id] = false;
        }
    }
}

impl Nfa {
    /// Decides whether `line` is in the language of the automaton.
    ///
    /// The working sets live on the stack of this call; the automaton
    /// itself is never touched, so concurrent calls on a shared [`Nfa`] do
    /// not interfere. Bytes outside the 7-bit alphabet have no transitions
    /// anywhere and simply kill every active state.
    pub fn accepts(&self, line: &[u8]) -> bool {
        let mut current = StateSet::for_states(self.states.len());
        let mut next = StateSet::for_states(self.states.len());

        for &state in self.closures[self.start].iter() {
            current.insert(state);
        }

        for &byte in line {
            if current.is_empty() {
                // No state is live; no further byte can revive one.
                break;
            }
            for &state in current.iter() {
                let Some(targets) = self.states[state].transitions.get(&byte) else {
                    continue;
                };
                for &target in targets {
                    for &reached in self.closures[target].iter() {
                        next.insert(reached);
                    }
                }
            }
            mem::swap(&mut current, &mut next);
            next.clear();
        }

        current.contains(self.accept)
    }
}
