//! Net-position and transfer computation.
//!
//! This is pure arithmetic over in-memory expenses: no storage access, no
//! mutation. Positions are computed fresh on every call and never persisted.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::{Expense, MoneyCents};

/// A recommended payment from a debtor to a creditor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: Uuid,
    pub to: Uuid,
    pub amount: MoneyCents,
}

/// Computes each member's net position over the non-archived expenses.
///
/// Every id in `members` is seeded at zero so inactive members still show
/// up. The payer is credited the full expense amount and each split user is
/// debited their owed share; the two are independent signals, so an expense
/// whose splits do not sum to its total simply leaves residue in the map.
/// Split users outside `members` are applied as well - membership
/// referential integrity is not this function's concern.
pub fn net_positions(
    expenses: &[Expense],
    members: &BTreeSet<Uuid>,
) -> BTreeMap<Uuid, MoneyCents> {
    let mut net: BTreeMap<Uuid, MoneyCents> =
        members.iter().map(|id| (*id, MoneyCents::ZERO)).collect();

    for expense in expenses.iter().filter(|e| !e.archived) {
        *net.entry(expense.paid_by).or_insert(MoneyCents::ZERO) += expense.amount;
        for (user_id, owed) in &expense.splits {
            *net.entry(*user_id).or_insert(MoneyCents::ZERO) -= *owed;
        }
    }

    net
}

/// Produces the greedy transfer list that settles the given net positions.
///
/// Creditors are matched largest-first against debtors largest-first, with
/// ties broken by user id, so the output is deterministic for a given
/// position map. The two-pointer walk pays `min(credit, debt)` at each step
/// and advances whichever side reaches zero, so the total transferred always
/// equals the total positive net (when positions sum to zero) and no cent is
/// invented or lost.
///
/// The result is not guaranteed to be the true minimum number of transfers
/// (that is a set-partition problem); it is linear, deterministic and good
/// enough for the UI.
pub fn transfers(net: &BTreeMap<Uuid, MoneyCents>) -> Vec<Transfer> {
    let mut creditors: Vec<(Uuid, MoneyCents)> = net
        .iter()
        .filter(|(_, amount)| amount.is_positive())
        .map(|(id, amount)| (*id, *amount))
        .collect();
    let mut debtors: Vec<(Uuid, MoneyCents)> = net
        .iter()
        .filter(|(_, amount)| amount.is_negative())
        .map(|(id, amount)| (*id, amount.abs()))
        .collect();

    // Largest credit and largest debt first; id as tie-break.
    creditors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    debtors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < debtors.len() && j < creditors.len() {
        let (debtor_id, debt) = debtors[i];
        let (creditor_id, credit) = creditors[j];

        let pay = debt.min(credit);
        if pay.is_positive() {
            out.push(Transfer {
                from: debtor_id,
                to: creditor_id,
                amount: pay,
            });
        }

        debtors[i].1 -= pay;
        creditors[j].1 -= pay;

        if debtors[i].1.is_zero() {
            i += 1;
        }
        if creditors[j].1.is_zero() {
            j += 1;
        }
    }

    out
}
