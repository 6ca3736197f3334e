//! Floor-division split arithmetic.
//!
//! Each contributor is credited `amount * share / 100` using integer
//! (floor) division. The remainder left by rounding is **not**
//! redistributed to anyone; it stays with the payer side and is reported
//! as `rounding_loss`. Consequently the credited total is always `<=`
//! the inbound amount, never more.

use muse_types::{AccountId, Amount};

use crate::{Result, ShareTable, SplitError};

/// The result of splitting one inbound amount across a share table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Per-contributor credits in table order.
    pub credits: Vec<(AccountId, Amount)>,
    /// Sum of all credits.
    pub credited: Amount,
    /// `amount - credited`; zero when the amount divides evenly.
    pub rounding_loss: Amount,
}

/// Split `amount` across the table's contributors.
///
/// # Errors
///
/// - [`SplitError::ZeroAmount`] if `amount` is zero
/// - [`SplitError::Overflow`] on arithmetic overflow
pub fn split(amount: Amount, table: &ShareTable) -> Result<SplitOutcome> {
    if amount == 0 {
        return Err(SplitError::ZeroAmount);
    }

    let mut credits = Vec::with_capacity(table.len());
    let mut credited: Amount = 0;

    for (account, share) in table.iter() {
        let cut = amount
            .checked_mul(Amount::from(share))
            .ok_or(SplitError::Overflow)?
            / 100;
        credited = credited.checked_add(cut).ok_or(SplitError::Overflow)?;
        credits.push((account.clone(), cut));
    }

    // credited <= amount holds because the shares sum to exactly 100.
    let rounding_loss = amount - credited;

    tracing::trace!(amount, credited, rounding_loss, "split computed");

    Ok(SplitOutcome {
        credits,
        credited,
        rounding_loss,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, u8)]) -> ShareTable {
        let (accounts, shares): (Vec<AccountId>, Vec<u8>) = entries
            .iter()
            .map(|(a, s)| (a.to_string(), *s))
            .unzip();
        ShareTable::new(accounts, shares).expect("valid table")
    }

    #[test]
    fn test_split_70_30() {
        let outcome = split(100, &table(&[("alice", 70), ("bob", 30)])).expect("split");
        assert_eq!(outcome.credits[0], ("alice".to_string(), 70));
        assert_eq!(outcome.credits[1], ("bob".to_string(), 30));
        assert_eq!(outcome.credited, 100);
        assert_eq!(outcome.rounding_loss, 0);
    }

    #[test]
    fn test_split_rounding_loss_not_redistributed() {
        // 100 into 33/33/34: floor(33) + floor(33) + floor(34) = 100, no loss.
        // 10 into 33/33/34: 3 + 3 + 3 = 9, loss of 1.
        let t = table(&[("a", 33), ("b", 33), ("c", 34)]);
        let outcome = split(10, &t).expect("split");
        assert_eq!(outcome.credited, 9);
        assert_eq!(outcome.rounding_loss, 1);
    }

    #[test]
    fn test_split_credited_never_exceeds_amount() {
        let t = table(&[("a", 1), ("b", 99)]);
        for amount in [1u64, 7, 99, 100, 101, 12_345] {
            let outcome = split(amount, &t).expect("split");
            assert!(outcome.credited <= amount);
            assert_eq!(outcome.credited + outcome.rounding_loss, amount);
        }
    }

    #[test]
    fn test_split_small_amount_all_lost() {
        // Every cut floors to zero; the full amount is rounding loss.
        let t = table(&[("a", 33), ("b", 33), ("c", 34)]);
        let outcome = split(2, &t).expect("split");
        assert_eq!(outcome.credited, 0);
        assert_eq!(outcome.rounding_loss, 2);
    }

    #[test]
    fn test_split_zero_amount_rejected() {
        let t = table(&[("a", 100)]);
        assert!(matches!(split(0, &t), Err(SplitError::ZeroAmount)));
    }

    #[test]
    fn test_split_overflow_rejected() {
        let t = table(&[("a", 30), ("b", 70)]);
        assert!(matches!(split(u64::MAX, &t), Err(SplitError::Overflow)));
    }

    #[test]
    fn test_split_large_amount_within_range() {
        // Largest amount that cannot overflow: u64::MAX / 100.
        let t = table(&[("a", 50), ("b", 50)]);
        let amount = u64::MAX / 100;
        let outcome = split(amount, &t).expect("split");
        assert_eq!(outcome.credited + outcome.rounding_loss, amount);
    }

    #[test]
    fn test_split_zero_share_gets_nothing() {
        let t = table(&[("a", 100), ("b", 0)]);
        let outcome = split(1_000, &t).expect("split");
        assert_eq!(outcome.credits[0].1, 1_000);
        assert_eq!(outcome.credits[1].1, 0);
    }
}
