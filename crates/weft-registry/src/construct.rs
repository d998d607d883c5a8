//! Best-fit constructor selection.

use std::any::TypeId;

use crate::component::ComponentRef;
use crate::ContainerError;

/// One candidate constructor: its parameter types and a build function
/// receiving resolved arguments in declaration order.
pub struct ConstructorCandidate {
    pub param_types: Vec<TypeId>,
    pub build: Box<dyn Fn(Vec<ComponentRef>) -> ComponentRef>,
}

impl std::fmt::Debug for ConstructorCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructorCandidate")
            .field("param_types", &self.param_types)
            .finish_non_exhaustive()
    }
}

impl ConstructorCandidate {
    #[must_use]
    pub fn new(
        param_types: Vec<TypeId>,
        build: impl Fn(Vec<ComponentRef>) -> ComponentRef + 'static,
    ) -> Self {
        Self {
            param_types,
            build: Box::new(build),
        }
    }
}

/// Pick the candidate best satisfiable from the available types.
///
/// `distance` maps a requested parameter type to its type-difference weight:
/// `Some(0)` for an exact match, `Some(n)` when a registered component
/// reaches the type `n` steps up its provides chain, `None` when nothing
/// satisfies it. Each step weighs 2.
///
/// A candidate is viable when every parameter resolves. Among viable
/// candidates the one accepting the most arguments wins; equal argument
/// counts are decided by the lower summed weight, and remaining ties by
/// declaration order.
pub fn select_candidate<'a>(
    candidates: &'a [ConstructorCandidate],
    distance: impl Fn(TypeId) -> Option<usize>,
) -> Option<(usize, &'a ConstructorCandidate)> {
    let mut best: Option<(usize, usize)> = None; // (index, weight)
    for (index, candidate) in candidates.iter().enumerate() {
        let mut weight = 0usize;
        let mut viable = true;
        for param in &candidate.param_types {
            match distance(*param) {
                Some(steps) => weight += steps * 2,
                None => {
                    viable = false;
                    break;
                }
            }
        }
        if !viable {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_index, best_weight)) => {
                let best_args = candidates[best_index].param_types.len();
                let args = candidate.param_types.len();
                args > best_args || (args == best_args && weight < best_weight)
            }
        };
        if better {
            best = Some((index, weight));
        }
    }
    best.map(|(index, _)| (index, &candidates[index]))
}

/// Like [`select_candidate`], but an empty or unsatisfiable candidate list
/// is an error naming the type under construction.
pub fn require_candidate<'a>(
    type_name: &'static str,
    candidates: &'a [ConstructorCandidate],
    distance: impl Fn(TypeId) -> Option<usize>,
) -> Result<&'a ConstructorCandidate, ContainerError> {
    select_candidate(candidates, distance)
        .map(|(_, candidate)| candidate)
        .ok_or(ContainerError::NoMatchingConstructor { type_name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::component::Component;

    struct Dummy;

    impl Component for Dummy {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn dummy(_args: Vec<ComponentRef>) -> ComponentRef {
        Rc::new(RefCell::new(Dummy))
    }

    struct A;
    struct B;
    struct C;

    fn table(distances: &[(TypeId, usize)]) -> impl Fn(TypeId) -> Option<usize> + '_ {
        move |t| distances.iter().find(|(id, _)| *id == t).map(|(_, d)| *d)
    }

    #[test]
    fn prefers_the_candidate_with_the_most_resolvable_arguments() {
        let candidates = vec![
            ConstructorCandidate::new(vec![TypeId::of::<A>()], dummy),
            ConstructorCandidate::new(vec![TypeId::of::<A>(), TypeId::of::<B>()], dummy),
        ];
        let available = [(TypeId::of::<A>(), 0), (TypeId::of::<B>(), 0)];
        let (index, _) = select_candidate(&candidates, table(&available)).unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn unresolvable_parameters_disqualify_a_candidate() {
        let candidates = vec![
            ConstructorCandidate::new(vec![TypeId::of::<A>(), TypeId::of::<C>()], dummy),
            ConstructorCandidate::new(vec![TypeId::of::<A>()], dummy),
        ];
        let available = [(TypeId::of::<A>(), 0)];
        let (index, _) = select_candidate(&candidates, table(&available)).unwrap();
        assert_eq!(index, 1, "two-argument candidate needs an unavailable type");
    }

    #[test]
    fn equal_arity_is_decided_by_type_difference_weight() {
        // Two one-argument candidates; B is reachable only one step up a
        // provides chain, A exactly.
        let candidates = vec![
            ConstructorCandidate::new(vec![TypeId::of::<B>()], dummy),
            ConstructorCandidate::new(vec![TypeId::of::<A>()], dummy),
        ];
        let available = [(TypeId::of::<A>(), 0), (TypeId::of::<B>(), 1)];
        let (index, _) = select_candidate(&candidates, table(&available)).unwrap();
        assert_eq!(index, 1, "exact match (weight 0) beats chain match (weight 2)");
    }

    #[test]
    fn full_ties_go_to_the_first_declared() {
        let candidates = vec![
            ConstructorCandidate::new(vec![TypeId::of::<A>()], dummy),
            ConstructorCandidate::new(vec![TypeId::of::<A>()], dummy),
        ];
        let available = [(TypeId::of::<A>(), 0)];
        let (index, _) = select_candidate(&candidates, table(&available)).unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn nothing_viable_is_an_error() {
        let candidates = vec![ConstructorCandidate::new(vec![TypeId::of::<C>()], dummy)];
        let err = require_candidate("app::Widget", &candidates, |_| None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no matching constructor found for type 'app::Widget'"
        );
    }
}
