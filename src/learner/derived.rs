use crate::error::Result;
use crate::types::{Params, PredicateKey, State, Value};

/// Extra predicates computed from the pre-action state and the action's
/// arguments before an example is translated (kinematic feasibility and the like)
pub trait DerivedPredicates: Send + Sync {
    fn name(&self) -> &str;

    fn derive(&self, params: &Params, state: &State) -> Result<Vec<(PredicateKey, Value)>>;
}

/// Extend a state with every derived predicate; later functions see the
/// output of earlier ones
pub fn augment(state: &State, params: &Params, derived: &[std::sync::Arc<dyn DerivedPredicates>]) -> Result<State> {
    let mut augmented = state.clone();
    for function in derived {
        for (key, value) in function.derive(params, &augmented)? {
            augmented.insert(key, value);
        }
    }
    Ok(augmented)
}
