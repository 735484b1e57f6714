use super::{
    InterpretationBuilder, PartialInterpretationIterator, PropositionalMapping,
    view::ArgumentsView,
};
use crate::{
    adf::{Argument, ArgumentSet},
    sat::Atom,
};
use anyhow::{anyhow, bail, Result};
use std::{
    collections::{hash_map::DefaultHasher, HashMap, HashSet},
    fmt::Display,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// A three-valued interpretation.
///
/// An interpretation partitions a finite set of arguments (its universe) into three disjoint sets:
/// the satisfied arguments, the unsatisfied ones and the undecided ones.
/// Interpretations are immutable; the combinators ([`union`](Self::union), [`extend`](Self::extend), [`restrict`](Self::restrict))
/// return new interpretations.
///
/// Apart from [`Interpretation::empty`], the constructors refuse to build an interpretation with an empty universe.
///
/// # Example
///
/// ```
/// # use crustadf::adf::{Argument, ArgumentSet};
/// # use crustadf::interpretation::Interpretation;
/// # use std::collections::HashSet;
/// let adf = ArgumentSet::new_with_names(&["a", "b", "c"]);
/// let a = adf.get_argument("a").unwrap().clone();
/// let b = adf.get_argument("b").unwrap().clone();
/// let i = Interpretation::partial(HashSet::from([a.clone()]), HashSet::from([b.clone()]), &adf).unwrap();
/// assert!(i.is_satisfied(&a));
/// assert!(i.is_unsatisfied(&b));
/// assert_eq!(1, i.undecided().len());
/// assert_eq!("{t(a) f(b) u(c)}", i.to_string());
/// ```
#[derive(Clone, Debug)]
pub struct Interpretation {
    repr: Repr,
}

#[derive(Clone, Debug)]
enum Repr {
    Sets {
        satisfied: HashSet<Argument>,
        unsatisfied: HashSet<Argument>,
        undecided: HashSet<Argument>,
    },
    // exactly one decided argument, the rest of the shared universe is undecided
    SingleValued {
        argument: Argument,
        value: bool,
        universe: Arc<HashSet<Argument>>,
    },
}

impl Interpretation {
    pub(crate) fn from_parts(
        satisfied: HashSet<Argument>,
        unsatisfied: HashSet<Argument>,
        undecided: HashSet<Argument>,
    ) -> Self {
        debug_assert!(satisfied.is_disjoint(&unsatisfied));
        debug_assert!(satisfied.is_disjoint(&undecided));
        debug_assert!(unsatisfied.is_disjoint(&undecided));
        Self {
            repr: Repr::Sets {
                satisfied,
                unsatisfied,
                undecided,
            },
        }
    }

    fn from_disjoint_sets(
        satisfied: HashSet<Argument>,
        unsatisfied: HashSet<Argument>,
        undecided: HashSet<Argument>,
    ) -> Result<Self> {
        if satisfied.is_empty() && unsatisfied.is_empty() && undecided.is_empty() {
            bail!("there must be at least one non-empty set")
        }
        Ok(Self::from_parts(satisfied, unsatisfied, undecided))
    }

    /// Builds the interpretation in which all the arguments of the framework are undecided.
    ///
    /// This is the only way to build an interpretation with an empty universe (given an empty framework).
    pub fn empty(framework: &ArgumentSet) -> Self {
        Self::from_parts(
            HashSet::new(),
            HashSet::new(),
            framework.shared_membership().as_ref().clone(),
        )
    }

    /// Builds an interpretation from an explicit assignment.
    ///
    /// Arguments mapped to `Some(true)` are satisfied, the ones mapped to `Some(false)` are unsatisfied,
    /// and the ones mapped to `None` are undecided.
    ///
    /// An error is returned if the assignment is empty.
    pub fn from_map(assignment: HashMap<Argument, Option<bool>>) -> Result<Self> {
        let mut satisfied = HashSet::new();
        let mut unsatisfied = HashSet::new();
        let mut undecided = HashSet::new();
        for (argument, value) in assignment {
            match value {
                Some(true) => satisfied.insert(argument),
                Some(false) => unsatisfied.insert(argument),
                None => undecided.insert(argument),
            };
        }
        Self::from_disjoint_sets(satisfied, unsatisfied, undecided)
    }

    /// Builds an interpretation from its three sets.
    ///
    /// An error is returned if the sets are not pairwise disjoint, or if they are all empty.
    pub fn from_sets(
        satisfied: HashSet<Argument>,
        unsatisfied: HashSet<Argument>,
        undecided: HashSet<Argument>,
    ) -> Result<Self> {
        if !satisfied.is_disjoint(&unsatisfied)
            || !satisfied.is_disjoint(&undecided)
            || !unsatisfied.is_disjoint(&undecided)
        {
            bail!("the given sets are not disjoint")
        }
        Self::from_disjoint_sets(satisfied, unsatisfied, undecided)
    }

    /// Builds an interpretation assigning the same value to a whole set of arguments.
    ///
    /// An error is returned if the set is empty.
    pub fn from_set(arguments: HashSet<Argument>, value: Option<bool>) -> Result<Self> {
        match value {
            Some(true) => Self::from_disjoint_sets(arguments, HashSet::new(), HashSet::new()),
            Some(false) => Self::from_disjoint_sets(HashSet::new(), arguments, HashSet::new()),
            None => Self::from_disjoint_sets(HashSet::new(), HashSet::new(), arguments),
        }
    }

    /// Builds an interpretation in the context of a framework.
    ///
    /// The arguments of the framework that are neither satisfied nor unsatisfied are undecided.
    /// An error is returned if an argument is both satisfied and unsatisfied, or if the resulting universe is empty.
    pub fn partial(
        satisfied: HashSet<Argument>,
        unsatisfied: HashSet<Argument>,
        framework: &ArgumentSet,
    ) -> Result<Self> {
        if !satisfied.is_disjoint(&unsatisfied) {
            bail!("the given sets are not disjoint")
        }
        let undecided = framework
            .iter()
            .filter(|a| !satisfied.contains(*a) && !unsatisfied.contains(*a))
            .cloned()
            .collect();
        Self::from_disjoint_sets(satisfied, unsatisfied, undecided)
    }

    /// Builds an interpretation from a witness returned by a [`SolverState`](crate::sat::SolverState).
    ///
    /// An argument is satisfied if its "true" atom is in the witness, unsatisfied if its "false" atom is, and undecided otherwise.
    pub fn from_witness<M>(witness: &HashSet<Atom>, mapping: &M) -> Result<Self>
    where
        M: PropositionalMapping + ?Sized,
    {
        let mut satisfied = HashSet::new();
        let mut unsatisfied = HashSet::new();
        let mut undecided = HashSet::new();
        for argument in mapping.arguments() {
            if witness.contains(mapping.true_atom(argument)) {
                satisfied.insert(argument.clone());
            } else if witness.contains(mapping.false_atom(argument)) {
                unsatisfied.insert(argument.clone());
            } else {
                undecided.insert(argument.clone());
            }
        }
        Self::from_disjoint_sets(satisfied, unsatisfied, undecided)
    }

    /// Builds an interpretation in which a single argument of the framework is decided.
    ///
    /// The universe of the framework is shared, not copied.
    /// The result behaves exactly as any other interpretation with the same sets.
    ///
    /// An error is returned if the argument does not belong to the framework.
    ///
    /// # Example
    ///
    /// ```
    /// # use crustadf::adf::ArgumentSet;
    /// # use crustadf::interpretation::Interpretation;
    /// # use std::collections::HashSet;
    /// let adf = ArgumentSet::new_with_names(&["a", "b"]);
    /// let a = adf.get_argument("a").unwrap().clone();
    /// let single = Interpretation::single_valued(a.clone(), true, &adf).unwrap();
    /// let general = Interpretation::partial(HashSet::from([a]), HashSet::new(), &adf).unwrap();
    /// assert_eq!(general, single);
    /// assert_eq!(1, single.num_decided());
    /// ```
    pub fn single_valued(argument: Argument, value: bool, framework: &ArgumentSet) -> Result<Self> {
        if !framework.contains(&argument) {
            bail!(
                "the argument {} does not belong to the given framework",
                argument
            )
        }
        Ok(Self {
            repr: Repr::SingleValued {
                argument,
                value,
                universe: Arc::clone(framework.shared_membership()),
            },
        })
    }

    /// Builds the interpretation which universe is made of the argument only, which is satisfied.
    pub fn of_satisfied(argument: Argument) -> Self {
        Self::from_parts(HashSet::from([argument]), HashSet::new(), HashSet::new())
    }

    /// Builds the interpretation which universe is made of the argument only, which is unsatisfied.
    pub fn of_unsatisfied(argument: Argument) -> Self {
        Self::from_parts(HashSet::new(), HashSet::from([argument]), HashSet::new())
    }

    /// Builds the interpretation which universe is made of the argument only, which is undecided.
    pub fn of_undecided(argument: Argument) -> Self {
        Self::from_parts(HashSet::new(), HashSet::new(), HashSet::from([argument]))
    }

    /// Returns a builder which universe is the set of arguments of the framework.
    pub fn builder(framework: &ArgumentSet) -> InterpretationBuilder {
        InterpretationBuilder::new(framework.iter())
    }

    /// Returns a builder which universe is the given set of arguments.
    pub fn builder_for<'a, I>(arguments: I) -> InterpretationBuilder
    where
        I: IntoIterator<Item = &'a Argument>,
    {
        InterpretationBuilder::new(arguments)
    }

    /// Enumerates all the partial interpretations over the given arguments,
    /// the other arguments of the framework being undecided.
    ///
    /// Arguments that do not belong to the framework are ignored.
    pub fn partials(
        arguments: &[Argument],
        framework: &ArgumentSet,
    ) -> PartialInterpretationIterator {
        PartialInterpretationIterator::new(arguments, framework)
    }

    /// Returns `true` iff the argument is satisfied.
    pub fn is_satisfied(&self, argument: &Argument) -> bool {
        match &self.repr {
            Repr::Sets { satisfied, .. } => satisfied.contains(argument),
            Repr::SingleValued {
                argument: a, value, ..
            } => *value && a == argument,
        }
    }

    /// Returns `true` iff the argument is unsatisfied.
    pub fn is_unsatisfied(&self, argument: &Argument) -> bool {
        match &self.repr {
            Repr::Sets { unsatisfied, .. } => unsatisfied.contains(argument),
            Repr::SingleValued {
                argument: a, value, ..
            } => !*value && a == argument,
        }
    }

    /// Returns `true` iff the argument is undecided.
    ///
    /// Arguments that are not in the universe of this interpretation are not undecided.
    pub fn is_undecided(&self, argument: &Argument) -> bool {
        match &self.repr {
            Repr::Sets { undecided, .. } => undecided.contains(argument),
            Repr::SingleValued {
                argument: a,
                universe,
                ..
            } => a != argument && universe.contains(argument),
        }
    }

    /// Returns `true` iff the argument is either satisfied or unsatisfied.
    pub fn is_decided(&self, argument: &Argument) -> bool {
        self.is_satisfied(argument) || self.is_unsatisfied(argument)
    }

    /// Returns the value of the argument: `Some(true)` if it is satisfied, `Some(false)` if it is unsatisfied, `None` otherwise.
    pub fn value_of(&self, argument: &Argument) -> Option<bool> {
        if self.is_satisfied(argument) {
            Some(true)
        } else if self.is_unsatisfied(argument) {
            Some(false)
        } else {
            None
        }
    }

    /// Returns the satisfied arguments.
    pub fn satisfied(&self) -> ArgumentsView<'_> {
        match &self.repr {
            Repr::Sets { satisfied, .. } => ArgumentsView::set(satisfied),
            Repr::SingleValued {
                argument,
                value: true,
                ..
            } => ArgumentsView::single(argument),
            Repr::SingleValued { .. } => ArgumentsView::empty(),
        }
    }

    /// Returns the unsatisfied arguments.
    pub fn unsatisfied(&self) -> ArgumentsView<'_> {
        match &self.repr {
            Repr::Sets { unsatisfied, .. } => ArgumentsView::set(unsatisfied),
            Repr::SingleValued {
                argument,
                value: false,
                ..
            } => ArgumentsView::single(argument),
            Repr::SingleValued { .. } => ArgumentsView::empty(),
        }
    }

    /// Returns the undecided arguments.
    pub fn undecided(&self) -> ArgumentsView<'_> {
        match &self.repr {
            Repr::Sets { undecided, .. } => ArgumentsView::set(undecided),
            Repr::SingleValued {
                argument,
                universe,
                ..
            } => ArgumentsView::without(universe, argument),
        }
    }

    /// Returns the universe of this interpretation, i.e. the union of its three sets.
    pub fn arguments(&self) -> ArgumentsView<'_> {
        match &self.repr {
            Repr::Sets {
                satisfied,
                unsatisfied,
                undecided,
            } => ArgumentsView::union(satisfied, unsatisfied, undecided),
            Repr::SingleValued { universe, .. } => ArgumentsView::set(universe),
        }
    }

    /// Returns the number of arguments in the universe of this interpretation.
    pub fn size(&self) -> usize {
        self.arguments().len()
    }

    /// Returns the number of satisfied or unsatisfied arguments.
    pub fn num_decided(&self) -> usize {
        match &self.repr {
            Repr::Sets {
                satisfied,
                unsatisfied,
                ..
            } => satisfied.len() + unsatisfied.len(),
            Repr::SingleValued { .. } => 1,
        }
    }

    /// Returns `true` iff the argument is in the universe of this interpretation.
    pub fn contains(&self, argument: &Argument) -> bool {
        self.arguments().contains(argument)
    }

    /// Returns `true` iff all the arguments are in the universe of this interpretation.
    pub fn contains_all<'a, I>(&self, arguments: I) -> bool
    where
        I: IntoIterator<Item = &'a Argument>,
    {
        let universe = self.arguments();
        arguments.into_iter().all(|a| universe.contains(a))
    }

    /// Returns the union of two interpretations.
    ///
    /// Each category of the result is the union of the corresponding categories.
    /// An error is returned if the universes of the interpretations are not disjoint.
    ///
    /// # Example
    ///
    /// ```
    /// # use crustadf::adf::Argument;
    /// # use crustadf::interpretation::Interpretation;
    /// let i1 = Interpretation::of_satisfied(Argument::new("a"));
    /// let i2 = Interpretation::of_undecided(Argument::new("b"));
    /// let union = i1.union(&i2).unwrap();
    /// assert_eq!(2, union.size());
    /// assert!(i1.union(&i1).is_err());
    /// ```
    pub fn union(&self, other: &Interpretation) -> Result<Interpretation> {
        if !self.arguments().is_disjoint(&other.arguments()) {
            bail!("the given interpretations are not disjoint")
        }
        let merge = |v1: ArgumentsView, v2: ArgumentsView| {
            v1.iter()
                .chain(v2.iter())
                .cloned()
                .collect::<HashSet<Argument>>()
        };
        Self::from_disjoint_sets(
            merge(self.satisfied(), other.satisfied()),
            merge(self.unsatisfied(), other.unsatisfied()),
            merge(self.undecided(), other.undecided()),
        )
    }

    /// Returns a copy of this interpretation in which an undecided argument is set to the given value.
    ///
    /// An error is returned if the argument is not undecided.
    pub fn extend(&self, argument: &Argument, value: bool) -> Result<Interpretation> {
        if !self.is_undecided(argument) {
            bail!("the given argument must be undecided")
        }
        let mut satisfied = self.satisfied().to_set();
        let mut unsatisfied = self.unsatisfied().to_set();
        let mut undecided = self.undecided().to_set();
        undecided.remove(argument);
        if value {
            satisfied.insert(argument.clone());
        } else {
            unsatisfied.insert(argument.clone());
        }
        Ok(Self::from_parts(satisfied, unsatisfied, undecided))
    }

    /// Projects this interpretation on a set of arguments.
    ///
    /// The universe of the result is exactly the given set of arguments;
    /// each one keeps its value, or is undecided if it is not in the universe of this interpretation.
    /// An error is returned if the set of arguments is empty.
    pub fn restrict<'a, I>(&self, restriction: I) -> Result<Interpretation>
    where
        I: IntoIterator<Item = &'a Argument>,
    {
        let mut satisfied = HashSet::new();
        let mut unsatisfied = HashSet::new();
        let mut undecided = HashSet::new();
        for argument in restriction {
            match self.value_of(argument) {
                Some(true) => satisfied.insert(argument.clone()),
                Some(false) => unsatisfied.insert(argument.clone()),
                None => undecided.insert(argument.clone()),
            };
        }
        Self::from_disjoint_sets(satisfied, unsatisfied, undecided)
    }

    /// Returns `true` iff both interpretations have the same satisfied and unsatisfied arguments.
    ///
    /// Contrary to equality, undecided arguments are not considered.
    ///
    /// # Example
    ///
    /// ```
    /// # use crustadf::adf::Argument;
    /// # use crustadf::interpretation::Interpretation;
    /// # use std::collections::HashSet;
    /// let a = Argument::new("a");
    /// let b = Argument::new("b");
    /// let i1 = Interpretation::from_sets(HashSet::from([a.clone()]), HashSet::new(), HashSet::from([b])).unwrap();
    /// let i2 = Interpretation::of_satisfied(a);
    /// assert!(i1.equals_two_valued(&i2));
    /// assert_ne!(i1, i2);
    /// ```
    pub fn equals_two_valued(&self, other: &Interpretation) -> bool {
        self.satisfied() == other.satisfied() && self.unsatisfied() == other.unsatisfied()
    }

    /// Returns `true` iff the satisfied (resp. unsatisfied) arguments of this interpretation are satisfied (resp. unsatisfied) in the other one.
    pub fn is_subset_of(&self, superset: &Interpretation) -> bool {
        self.satisfied().is_subset(&superset.satisfied())
            && self.unsatisfied().is_subset(&superset.unsatisfied())
    }

    /// Same as [`is_subset_of`](Self::is_subset_of), with a different number of decided arguments.
    pub fn is_strict_subset_of(&self, superset: &Interpretation) -> bool {
        self.is_subset_of(superset) && self.num_decided() != superset.num_decided()
    }

    /// Returns `true` iff the satisfied (resp. unsatisfied) arguments of the other interpretation are satisfied (resp. unsatisfied) in this one.
    pub fn is_superset_of(&self, subset: &Interpretation) -> bool {
        subset.is_subset_of(self)
    }

    /// Same as [`is_superset_of`](Self::is_superset_of), with a different number of decided arguments.
    pub fn is_strict_superset_of(&self, subset: &Interpretation) -> bool {
        self.is_superset_of(subset) && self.num_decided() != subset.num_decided()
    }

    /// Returns the assignment corresponding to this interpretation (see [`from_map`](Self::from_map)).
    pub fn to_map(&self) -> HashMap<Argument, Option<bool>> {
        self.satisfied()
            .iter()
            .map(|a| (a.clone(), Some(true)))
            .chain(self.unsatisfied().iter().map(|a| (a.clone(), Some(false))))
            .chain(self.undecided().iter().map(|a| (a.clone(), None)))
            .collect()
    }

    pub(crate) fn into_sets(self) -> (HashSet<Argument>, HashSet<Argument>, HashSet<Argument>) {
        match self.repr {
            Repr::Sets {
                satisfied,
                unsatisfied,
                undecided,
            } => (satisfied, unsatisfied, undecided),
            repr @ Repr::SingleValued { .. } => {
                let single = Self { repr };
                (
                    single.satisfied().to_set(),
                    single.unsatisfied().to_set(),
                    single.undecided().to_set(),
                )
            }
        }
    }
}

impl PartialEq for Interpretation {
    fn eq(&self, other: &Self) -> bool {
        self.satisfied() == other.satisfied()
            && self.unsatisfied() == other.unsatisfied()
            && self.undecided() == other.undecided()
    }
}

impl Eq for Interpretation {}

impl Hash for Interpretation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        fn unordered_hash(view: ArgumentsView) -> u64 {
            view.iter()
                .map(|a| {
                    let mut hasher = DefaultHasher::new();
                    a.hash(&mut hasher);
                    hasher.finish()
                })
                .fold(0, u64::wrapping_add)
        }
        unordered_hash(self.satisfied()).hash(state);
        unordered_hash(self.unsatisfied()).hash(state);
        unordered_hash(self.undecided()).hash(state);
    }
}

impl Display for Interpretation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let words = self
            .satisfied()
            .to_sorted_vec()
            .into_iter()
            .map(|a| format!("t({})", a))
            .chain(
                self.unsatisfied()
                    .to_sorted_vec()
                    .into_iter()
                    .map(|a| format!("f({})", a)),
            )
            .chain(
                self.undecided()
                    .to_sorted_vec()
                    .into_iter()
                    .map(|a| format!("u({})", a)),
            )
            .collect::<Vec<String>>();
        write!(f, "{{{}}}", words.join(" "))
    }
}

impl TryFrom<HashMap<Argument, Option<bool>>> for Interpretation {
    type Error = anyhow::Error;

    fn try_from(assignment: HashMap<Argument, Option<bool>>) -> Result<Self> {
        Self::from_map(assignment).map_err(|e| anyhow!("while building an interpretation: {}", e))
    }
}
