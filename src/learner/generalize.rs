use std::collections::{BTreeSet, HashMap};

use super::rule::Rule;
use crate::logic::{Clause, Literal, Role, Term};

/// Rule-local variable names in the order they are handed out. There is no
/// wrap-around: running past the end is a capacity error.
const ALPHABET: [char; 26] = [
    'X', 'Y', 'Z', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W',
];

/// Hands out fresh variable names, skipping the ones a rule already uses
pub struct VariableNames {
    used: BTreeSet<String>,
    cursor: usize,
}

impl VariableNames {
    pub fn new(used: BTreeSet<String>) -> Self {
        VariableNames { used, cursor: 0 }
    }

    pub fn next_name(&mut self) -> Option<String> {
        while self.cursor < ALPHABET.len() {
            let name = ALPHABET[self.cursor].to_string();
            self.cursor += 1;
            if self.used.insert(name.clone()) {
                return Some(name);
            }
        }
        None
    }
}

/// Why a rule could not be generalized against an example
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlignmentError {
    /// A term is renamed on one side only, or to a different variable
    Anomaly { rule_term: String, clause_term: String },
    /// A rule precondition ran past the end of the clause
    MissingCounterpart { literal: String },
    /// The effect literals are not compatible
    IncompatibleEffects { rule: String, clause: String },
    VariableCapacity,
}

type TermId = (String, Role);

fn id(term: &Term) -> TermId {
    (term.kind.clone(), term.role.clone())
}

/// Renamings collected while aligning a rule against a clause
struct Alignment {
    rule: HashMap<TermId, String>,
    clause: HashMap<TermId, String>,
    names: VariableNames,
}

impl Alignment {
    fn new(rule: &Rule) -> Self {
        Alignment {
            rule: HashMap::new(),
            clause: HashMap::new(),
            names: VariableNames::new(rule.clause.variables()),
        }
    }

    /// Introduce a shared variable for every position where the two literals differ
    fn align(&mut self, rule_literal: &Literal, clause_literal: &Literal) -> Result<(), AlignmentError> {
        for (r, c) in rule_literal.terms.iter().zip(clause_literal.terms.iter()) {
            if r == c {
                continue;
            }
            let anomaly = || AlignmentError::Anomaly {
                rule_term: r.to_string(),
                clause_term: c.to_string(),
            };
            if r.kind != c.kind {
                return Err(anomaly());
            }
            let clause_id = id(c);

            // already a variable: the clause term joins it
            if let Some(name) = r.variable_name() {
                match self.clause.get(&clause_id) {
                    Some(mapped) if mapped != name => return Err(anomaly()),
                    Some(_) => {}
                    None => {
                        self.clause.insert(clause_id, name.to_string());
                    }
                }
                continue;
            }

            let rule_id = id(r);
            match (self.rule.get(&rule_id), self.clause.get(&clause_id)) {
                (Some(a), Some(b)) if a == b => {}
                (None, None) => {
                    let name = self.names.next_name().ok_or(AlignmentError::VariableCapacity)?;
                    self.rule.insert(rule_id, name.clone());
                    self.clause.insert(clause_id, name);
                }
                _ => return Err(anomaly()),
            }
        }
        Ok(())
    }
}

/// Loosen `rule` until it covers `effect` as observed in `clause`.
///
/// The effects are aligned first, then the preconditions are walked in order
/// against the clause's preconditions, pairing literals by predicate name:
/// a same-named pair with opposite polarity drops the rule literal, a
/// compatible pair is aligned term by term, and clause literals with no
/// same-named rule literal at the current position are skipped. This assumes
/// same-named literals occur in the same relative order on both sides; two
/// same-named rule literals that need independent alignments are not
/// supported. A rule literal left without a counterpart aborts the
/// generalization and the rule stays as it was.
pub fn generalize(rule: &Rule, effect: &Literal, clause: &Clause) -> Result<Rule, AlignmentError> {
    let mut alignment = Alignment::new(rule);

    if !rule.effect().is_compatible_with(effect) {
        return Err(AlignmentError::IncompatibleEffects {
            rule: rule.effect().to_string(),
            clause: effect.to_string(),
        });
    }
    if !rule.effect().same_as(effect) {
        alignment.align(rule.effect(), effect)?;
    }

    let rule_preconditions = rule.preconditions();
    let mut dropped = BTreeSet::new();
    let (mut r, mut c) = (0, 0);
    while r < rule_preconditions.len() {
        let rule_literal = &rule_preconditions[r];
        let Some(clause_literal) = clause.preconditions.get(c) else {
            return Err(AlignmentError::MissingCounterpart {
                literal: rule_literal.to_string(),
            });
        };
        if !rule_literal.is_same_type(clause_literal) {
            c += 1;
            continue;
        }
        if !rule_literal.is_compatible_with(clause_literal) {
            dropped.insert(r);
        } else if !rule_literal.same_as(clause_literal) {
            alignment.align(rule_literal, clause_literal)?;
        }
        r += 1;
        c += 1;
    }

    let mut generalized = rule.clone();
    generalized.clause.preconditions = rule_preconditions
        .iter()
        .enumerate()
        .filter(|(index, _)| !dropped.contains(index))
        .map(|(_, literal)| literal.clone())
        .collect();
    for literal in generalized.clause.literals_mut() {
        for term in literal.terms.iter_mut() {
            if let Some(name) = alignment.rule.get(&id(term)) {
                term.make_variable(name.clone());
            }
        }
    }
    Ok(generalized)
}
