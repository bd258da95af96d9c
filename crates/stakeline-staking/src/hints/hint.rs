use stakeline_common::{Hint, Validator, EMPTY_ADDRESS};

/// Computes the `(newPosPrev, newPosNext)` neighbours of `target_id` in a list
/// already sorted descending by stake.
///
/// Never fails: an empty list, an empty target, a target that is not in the
/// list, or a single-entry list all produce the null-address hint, which the
/// contract accepts (at the cost of a linear search on-chain).
pub fn get_hint(target_id: &str, sorted_validators: &[Validator]) -> Hint {
    if sorted_validators.is_empty() || target_id.is_empty() {
        return Hint::empty();
    }

    let index = match sorted_validators.iter().position(|v| v.has_id(target_id)) {
        Some(index) if sorted_validators.len() >= 2 => index,
        _ => return Hint::empty(),
    };

    let last = sorted_validators.len() - 1;
    let prev = if index == 0 {
        EMPTY_ADDRESS
    } else {
        sorted_validators[index - 1].id.as_str()
    };
    let next = if index == last {
        EMPTY_ADDRESS
    } else {
        sorted_validators[index + 1].id.as_str()
    };

    Hint::new(prev, next)
}
