//! Equal-split calculator.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Splits `total` equally across `members`, one share per member.
///
/// Each share is `total / n` rounded half-up to the cent. The shares are
/// **not** adjusted to sum back to `total`: 100.00 over three members yields
/// 33.33 each and the missing cent stays with the payer. Output iterates in
/// user-id order, so the result is stable across calls.
///
/// The payer is not treated specially; callers that want the payer excluded
/// pass a member set without them.
pub fn equal_split(
    total: MoneyCents,
    members: &BTreeSet<Uuid>,
) -> ResultEngine<BTreeMap<Uuid, MoneyCents>> {
    if members.is_empty() {
        return Err(EngineError::InvalidInput(
            "cannot split across an empty member set".to_string(),
        ));
    }
    if !total.is_positive() {
        return Err(EngineError::InvalidInput(
            "amount must be > 0".to_string(),
        ));
    }

    let share = total.share_half_up(members.len() as i64);
    Ok(members.iter().map(|id| (*id, share)).collect())
}
