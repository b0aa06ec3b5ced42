use itertools::Itertools;
use varisat::{Lit, Var};

/// At least one var is true; A + B + C + ...
pub(crate) fn at_least_one(vars: Vec<Var>) -> Vec<Vec<Lit>> {
    vec![vars.iter().map(|v| v.positive()).collect_vec()]
}

/// Not every var is true; !A + !B + !C + ...
///
/// Used to block a cover once found: no later model may contain all of it.
pub(crate) fn not_all(vars: Vec<Var>) -> Vec<Vec<Lit>> {
    vec![vars.iter().map(|v| v.negative()).collect_vec()]
}
