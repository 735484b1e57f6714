use super::Interpretation;
use crate::adf::{Argument, ArgumentSet};
use std::collections::HashSet;

const UNDECIDED: u8 = 0;
const UNSATISFIED: u8 = 1;
const SATISFIED: u8 = 2;

fn dedup(arguments: &[Argument]) -> Vec<Argument> {
    let mut seen = HashSet::with_capacity(arguments.len());
    arguments
        .iter()
        .filter(|a| seen.insert(*a))
        .cloned()
        .collect()
}

/// An iterator over all the partial interpretations of a list of arguments.
///
/// The assignment is handled as a ternary counter, the first argument being the least significant digit.
/// Each digit goes from undecided to unsatisfied, then to satisfied.
/// The first interpretation is the one in which all the arguments are undecided,
/// and the last one is the one in which they are all satisfied.
/// For `n` arguments, `3^n` distinct interpretations are returned.
///
/// If an argument is repeated in the list, only its first occurrence is considered.
/// An empty list of arguments leads to an empty iterator.
///
/// # Example
///
/// ```
/// # use crustadf::adf::Argument;
/// # use crustadf::interpretation::InterpretationIterator;
/// let arguments = vec![Argument::new("a"), Argument::new("b")];
/// let all = InterpretationIterator::new(&arguments).map(|i| i.to_string()).collect::<Vec<_>>();
/// assert_eq!(9, all.len());
/// assert_eq!("{u(a) u(b)}", all[0]);
/// assert_eq!("{f(a) u(b)}", all[1]);
/// assert_eq!("{t(a) t(b)}", all[8]);
/// ```
pub struct InterpretationIterator {
    arguments: Vec<Argument>,
    digits: Vec<u8>,
    done: bool,
}

impl InterpretationIterator {
    /// Builds an iterator over the partial interpretations of the given arguments.
    pub fn new(arguments: &[Argument]) -> Self {
        let arguments = dedup(arguments);
        Self {
            digits: vec![UNDECIDED; arguments.len()],
            done: arguments.is_empty(),
            arguments,
        }
    }

    fn current(&self) -> Interpretation {
        let mut satisfied = HashSet::new();
        let mut unsatisfied = HashSet::new();
        let mut undecided = HashSet::new();
        for (argument, digit) in self.arguments.iter().zip(self.digits.iter()) {
            match *digit {
                SATISFIED => satisfied.insert(argument.clone()),
                UNSATISFIED => unsatisfied.insert(argument.clone()),
                _ => undecided.insert(argument.clone()),
            };
        }
        Interpretation::from_parts(satisfied, unsatisfied, undecided)
    }

    fn increment(&mut self) {
        for digit in self.digits.iter_mut() {
            if *digit == SATISFIED {
                *digit = UNDECIDED;
            } else {
                *digit += 1;
                return;
            }
        }
        // the all-satisfied configuration has been returned
        self.done = true;
    }
}

impl Iterator for InterpretationIterator {
    type Item = Interpretation;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.current();
        self.increment();
        Some(current)
    }
}

/// An iterator over all the two-valued interpretations of a list of arguments.
///
/// The assignment is handled as a binary counter going from `0` to `2^n - 1`, the first argument being the least significant bit.
/// A bit set to `1` means the corresponding argument is satisfied.
/// For `n` arguments, `2^n` distinct interpretations are returned, none of them having an undecided argument.
///
/// If an argument is repeated in the list, only its first occurrence is considered.
/// An empty list of arguments leads to an empty iterator.
///
/// # Panics
///
/// Building this iterator panics if the number of arguments is not lower than the number of bits of a `usize`.
///
/// # Example
///
/// ```
/// # use crustadf::adf::Argument;
/// # use crustadf::interpretation::TwoValuedInterpretationIterator;
/// let arguments = vec![Argument::new("a"), Argument::new("b")];
/// let all = TwoValuedInterpretationIterator::new(&arguments).map(|i| i.to_string()).collect::<Vec<_>>();
/// assert_eq!(vec!["{f(a) f(b)}", "{t(a) f(b)}", "{t(b) f(a)}", "{t(a) t(b)}"], all);
/// ```
pub struct TwoValuedInterpretationIterator {
    arguments: Vec<Argument>,
    next: usize,
    end: usize,
}

impl TwoValuedInterpretationIterator {
    /// Builds an iterator over the two-valued interpretations of the given arguments.
    pub fn new(arguments: &[Argument]) -> Self {
        let arguments = dedup(arguments);
        if arguments.len() >= usize::BITS as usize {
            panic!(
                "cannot enumerate the two-valued interpretations of {} arguments",
                arguments.len()
            )
        }
        let end = if arguments.is_empty() {
            0
        } else {
            1 << arguments.len()
        };
        Self {
            arguments,
            next: 0,
            end,
        }
    }
}

impl Iterator for TwoValuedInterpretationIterator {
    type Item = Interpretation;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == self.end {
            return None;
        }
        let mut satisfied = HashSet::new();
        let mut unsatisfied = HashSet::new();
        for (i, argument) in self.arguments.iter().enumerate() {
            if (self.next >> i) & 1 == 1 {
                satisfied.insert(argument.clone());
            } else {
                unsatisfied.insert(argument.clone());
            }
        }
        self.next += 1;
        Some(Interpretation::from_parts(
            satisfied,
            unsatisfied,
            HashSet::new(),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TwoValuedInterpretationIterator {}

/// An iterator over the partial interpretations of a subset of the arguments of a framework.
///
/// The interpretations are the ones of an [`InterpretationIterator`], in which the other arguments of the framework are added as undecided.
///
/// Built by [`Interpretation::partials`].
pub struct PartialInterpretationIterator {
    inner: InterpretationIterator,
    others: HashSet<Argument>,
}

impl PartialInterpretationIterator {
    pub(crate) fn new(arguments: &[Argument], framework: &ArgumentSet) -> Self {
        let arguments = arguments
            .iter()
            .filter(|a| framework.contains(a))
            .cloned()
            .collect::<Vec<Argument>>();
        let others = framework
            .iter()
            .filter(|a| !arguments.contains(a))
            .cloned()
            .collect();
        Self {
            inner: InterpretationIterator::new(&arguments),
            others,
        }
    }
}

impl Iterator for PartialInterpretationIterator {
    type Item = Interpretation;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|i| {
            let (satisfied, unsatisfied, mut undecided) = i.into_sets();
            undecided.extend(self.others.iter().cloned());
            Interpretation::from_parts(satisfied, unsatisfied, undecided)
        })
    }
}
