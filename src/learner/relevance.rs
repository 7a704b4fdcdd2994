use std::collections::HashSet;

use crate::logic::Literal;
use crate::types::{Params, Value};

/// Keep the literals reachable from the action's arguments.
///
/// Literals are hyperedges over the values of their constant terms. Starting
/// from the argument values, any literal touching a reached value is kept and
/// its values become reached; this repeats until nothing new is reached.
/// Kept literals stay in their original order.
pub fn restrict_to_relevant(literals: Vec<Literal>, params: &Params) -> Vec<Literal> {
    let mut reached: HashSet<Option<Value>> = params.iter().map(|(_, value)| Some(value.clone())).collect();
    let mut kept = vec![false; literals.len()];

    loop {
        let mut grew = false;
        for (index, literal) in literals.iter().enumerate() {
            if kept[index] || !literal.constants().any(|value| reached.contains(value)) {
                continue;
            }
            kept[index] = true;
            for value in literal.constants() {
                grew |= reached.insert(value.clone());
            }
        }
        if !grew {
            break;
        }
    }

    literals
        .into_iter()
        .zip(kept)
        .filter_map(|(literal, keep)| keep.then_some(literal))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Term;

    fn pos(object: i64, at: (i64, i64)) -> Literal {
        Literal::new(true, "pos", vec![Term::constant("obj", object), Term::constant("pos", at)])
    }

    #[test]
    fn test_transitive_closure() {
        let literals = vec![
            pos(2, (5, 0)),
            Literal::new(true, "on", vec![Term::constant("obj", 1), Term::constant("obj", 0)]),
            pos(1, (0, 0)),
            pos(0, (0, 1)),
        ];
        let params = Params::new().with("b", 0);
        let kept: Vec<String> = restrict_to_relevant(literals, &params)
            .iter()
            .map(ToString::to_string)
            .collect();
        // pos(1, ..) is reached through on(1, 0) which comes before it
        assert_eq!(kept, vec!["on(1, 0)", "pos(1, (0, 0))", "pos(0, (0, 1))"]);
    }

    #[test]
    fn test_late_link_triggers_another_round() {
        let literals = vec![
            pos(1, (0, 0)),
            Literal::new(true, "on", vec![Term::constant("obj", 1), Term::constant("obj", 0)]),
        ];
        let kept = restrict_to_relevant(literals, &Params::new().with("b", 0));
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].name, "pos");
    }
}
