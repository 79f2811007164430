//! Property-based tests (proptest) for treasury math — complements Kani
//! formal proofs.
//!
//! These test with u64/u128 production types across wide ranges.
//! They can't prove exhaustively (unlike Kani), but they test
//! millions of random inputs including production-scale values.

use proptest::prelude::*;

const RATIO_SCALE: u128 = 1_000_000_000_000_000_000;
const PERCENT_SCALE: u128 = 100 * RATIO_SCALE;
const ACC_SCALE: u128 = 1_000_000_000_000_000_000_000_000;

// Mirror production functions exactly (from src/math.rs)
fn split_profit(amount: u64, endowment_percent: u128) -> Option<(u64, u64)> {
    if endowment_percent > PERCENT_SCALE {
        return None;
    }
    let endowment = (amount as u128)
        .checked_mul(endowment_percent)?
        .checked_div(PERCENT_SCALE)?;
    let endowment = endowment as u64;
    Some((endowment, amount - endowment))
}

fn split_bonus(
    bonus: u64,
    primary_staked: u64,
    primary_weight: u64,
    lp_staked: u64,
    lp_weight: u64,
) -> Option<(u64, u64)> {
    let primary_shares = (primary_staked as u128).checked_mul(primary_weight as u128)?;
    let lp_shares = (lp_staked as u128).checked_mul(lp_weight as u128)?;
    let total_shares = primary_shares.checked_add(lp_shares)?;
    if total_shares == 0 {
        return Some((0, 0));
    }
    let bonus_primary = (bonus as u128)
        .checked_mul(primary_shares)?
        .checked_div(total_shares)?;
    let bonus_primary = bonus_primary as u64;
    Some((bonus_primary, bonus - bonus_primary))
}

fn acc_delta(share: u64, total_staked: u64) -> Option<u128> {
    if total_staked == 0 {
        return None;
    }
    (share as u128)
        .checked_mul(ACC_SCALE)?
        .checked_div(total_staked as u128)
}

fn credited(amount: u64, acc: u128) -> Option<u64> {
    let value = (amount as u128).checked_mul(acc)?.checked_div(ACC_SCALE)?;
    if value > u64::MAX as u128 { None } else { Some(value as u64) }
}

fn pending(amount: u64, acc: u128, tally: u64) -> Option<u64> {
    credited(amount, acc)?.checked_sub(tally)
}

fn plan_bonus_spend(
    pending_primary: u64,
    pending_lp: u64,
    minted: u64,
    amount: u64,
) -> Option<(u64, u64, u64)> {
    let amount_wide = amount as u128;
    if pending_lp as u128 >= amount_wide {
        return Some((amount, 0, 0));
    }
    if pending_lp as u128 + pending_primary as u128 >= amount_wide {
        return Some((pending_lp, amount - pending_lp, 0));
    }
    if pending_lp as u128 + pending_primary as u128 + minted as u128 >= amount_wide {
        return Some((pending_lp, pending_primary, amount - pending_lp - pending_primary));
    }
    None
}

fn burn_value_portions(
    burn_amount: u64,
    primary_supply: u64,
    endowment_balance: u64,
    total_bonus: u64,
    burn_multiplier: u64,
) -> Option<(u64, u64)> {
    if primary_supply == 0 {
        return None;
    }
    let fraction = (burn_amount as u128)
        .checked_mul(RATIO_SCALE)?
        .checked_div(primary_supply as u128)?;
    let endowment_pre = fraction
        .checked_mul(endowment_balance as u128)?
        .checked_div(RATIO_SCALE)?;
    let bonus = endowment_pre.min(total_bonus as u128);
    let endowment = endowment_pre
        .checked_mul(burn_multiplier as u128)?
        .checked_div(RATIO_SCALE)?;
    if endowment > u64::MAX as u128 || bonus > u64::MAX as u128 {
        None
    } else {
        Some((endowment as u64, bonus as u64))
    }
}

fn max_burn_amount(primary_supply: u64, burn_limit: u64) -> Option<u64> {
    let max = (primary_supply as u128)
        .checked_mul(burn_limit as u128)?
        .checked_div(RATIO_SCALE)?;
    if max > u64::MAX as u128 { None } else { Some(max as u64) }
}

// ═══════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════

proptest! {
    // ── Top Split Exactness ──

    #[test]
    fn prop_split_profit_exact_sum(
        amount in 0u64..1_000_000_000_000_000_000,
        percent in 0u128..=PERCENT_SCALE,
    ) {
        let (e, b) = split_profit(amount, percent).unwrap();
        prop_assert_eq!(e as u128 + b as u128, amount as u128);
    }

    #[test]
    fn prop_split_profit_endowment_bounded(
        amount in 0u64..1_000_000_000_000_000_000,
        percent in 0u128..=PERCENT_SCALE,
    ) {
        let (e, _) = split_profit(amount, percent).unwrap();
        prop_assert!(e <= amount);
    }

    // ── Cross-Pool Split Exactness ──

    #[test]
    fn prop_split_bonus_exact_sum(
        bonus in 0u64..1_000_000_000_000,
        sp in 0u64..1_000_000_000_000,
        wp in 0u64..1_000,
        sl in 0u64..1_000_000_000_000,
        wl in 0u64..1_000,
    ) {
        let (p, l) = split_bonus(bonus, sp, wp, sl, wl).unwrap();
        // The remainder assignment makes the two portions sum exactly,
        // except when the weighted total is zero (everything unattributed)
        if (sp as u128) * (wp as u128) + (sl as u128) * (wl as u128) > 0 {
            prop_assert_eq!(p + l, bonus);
        } else {
            prop_assert_eq!((p, l), (0, 0));
        }
    }

    #[test]
    fn prop_split_bonus_unstaked_pool_gets_zero(
        bonus in 0u64..1_000_000_000_000,
        sp in 1u64..1_000_000_000_000,
        wp in 1u64..1_000,
        wl in 0u64..1_000,
    ) {
        // LP pool empty → its share is exactly zero, nothing retained
        let (p, l) = split_bonus(bonus, sp, wp, 0, wl).unwrap();
        prop_assert_eq!(l, 0);
        prop_assert_eq!(p, bonus);
    }

    #[test]
    fn prop_split_bonus_proportional(
        bonus in 1u64..1_000_000_000,
        staked in 1u64..1_000_000_000,
        weight in 1u64..1_000,
    ) {
        // Symmetric pools split evenly (up to the truncated unit)
        let (p, l) = split_bonus(bonus, staked, weight, staked, weight).unwrap();
        prop_assert!(l >= p);
        prop_assert!(l - p <= 1);
    }

    // ── Accumulator / Pending ──

    #[test]
    fn prop_pending_zero_after_tally_reset(
        amount in 0u64..1_000_000_000,
        acc in 0u128..100_000 * ACC_SCALE,
    ) {
        // rewardTally == amount × acc ÷ 1e24 ⇒ no pending outstanding
        let tally = credited(amount, acc).unwrap();
        prop_assert_eq!(pending(amount, acc, tally), Some(0));
    }

    #[test]
    fn prop_credited_rounds_down(
        amount in 0u64..1_000_000_000,
        acc in 0u128..100_000 * ACC_SCALE,
    ) {
        let c = credited(amount, acc).unwrap();
        prop_assert!((c as u128) * ACC_SCALE <= (amount as u128) * acc);
    }

    #[test]
    fn prop_accumulator_settlement_near_exact(
        share in 1u64..1_000_000_000,
        staked in 1u64..1_000_000_000,
    ) {
        // Distributing share over the pool then crediting the whole pool
        // loses less than one unit to fixed-point dust
        let delta = acc_delta(share, staked).unwrap();
        let back = credited(staked, delta).unwrap();
        prop_assert!(back <= share);
        prop_assert!(share - back <= 1);
    }

    #[test]
    fn prop_pending_monotone_in_acc(
        amount in 1u64..1_000_000_000,
        acc in 0u128..1_000 * ACC_SCALE,
        extra in 0u128..1_000 * ACC_SCALE,
        tally in 0u64..1_000,
    ) {
        // Accumulator only grows; pending never shrinks with it
        let before = pending(amount, acc, tally);
        let after = pending(amount, acc + extra, tally);
        if let (Some(b), Some(a)) = (before, after) {
            prop_assert!(a >= b);
        }
    }

    // ── Spend Plan ──

    #[test]
    fn prop_spend_plan_conserves_amount(
        pp in 0u64..1_000_000_000,
        pl in 0u64..1_000_000_000,
        minted in 0u64..1_000_000_000,
        amount in 0u64..4_000_000_000,
    ) {
        if let Some((lp_draw, primary_draw, burn)) = plan_bonus_spend(pp, pl, minted, amount) {
            prop_assert_eq!(lp_draw + primary_draw + burn, amount);
        }
    }

    #[test]
    fn prop_spend_plan_respects_priority(
        pp in 0u64..1_000_000_000,
        pl in 0u64..1_000_000_000,
        minted in 0u64..1_000_000_000,
        amount in 0u64..4_000_000_000,
    ) {
        if let Some((lp_draw, primary_draw, burn)) = plan_bonus_spend(pp, pl, minted, amount) {
            // Each tier is exhausted before the next is touched
            prop_assert_eq!(lp_draw, pl.min(amount));
            prop_assert_eq!(primary_draw, pp.min(amount - lp_draw));
            prop_assert_eq!(burn, amount - lp_draw - primary_draw);
            prop_assert!(burn <= minted);
        }
    }

    #[test]
    fn prop_spend_plan_none_iff_insufficient(
        pp in 0u64..1_000_000_000,
        pl in 0u64..1_000_000_000,
        minted in 0u64..1_000_000_000,
        amount in 0u64..4_000_000_000,
    ) {
        let total = pp as u128 + pl as u128 + minted as u128;
        let plan = plan_bonus_spend(pp, pl, minted, amount);
        if (amount as u128) <= total {
            prop_assert!(plan.is_some());
        } else {
            prop_assert!(plan.is_none());
        }
    }

    // ── Burn Redemption ──

    #[test]
    fn prop_burn_bonus_capped_pre_multiplier(
        burn in 0u64..1_000_000_000,
        supply in 1u64..1_000_000_000,
        endowment in 0u64..1_000_000_000_000,
        total_bonus in 0u64..1_000_000_000_000,
        mult in 0u64..10_000_000_000_000_000_000,
    ) {
        prop_assume!(burn <= supply);
        if let Some((_, bonus)) = burn_value_portions(burn, supply, endowment, total_bonus, mult) {
            // The cap uses the PRE-multiplier endowment share
            let fraction = (burn as u128) * RATIO_SCALE / (supply as u128);
            let pre = fraction * (endowment as u128) / RATIO_SCALE;
            prop_assert!(bonus as u128 <= pre);
            prop_assert!(bonus <= total_bonus);
        }
    }

    #[test]
    fn prop_burn_endowment_bounded_at_1x(
        burn in 0u64..1_000_000_000,
        supply in 1u64..1_000_000_000,
        endowment in 0u64..1_000_000_000_000,
    ) {
        prop_assume!(burn <= supply);
        let (e, _) = burn_value_portions(burn, supply, endowment, 0, RATIO_SCALE as u64).unwrap();
        // Without amplification a burn can never draw more than the endowment
        prop_assert!(e <= endowment);
    }

    #[test]
    fn prop_burn_monotone_in_amount(
        small in 1u64..500_000_000,
        supply in 1u64..1_000_000_000,
        endowment in 0u64..1_000_000_000_000,
    ) {
        let large = small + 1;
        prop_assume!(large <= supply);
        let one_x = RATIO_SCALE as u64;
        let (es, _) = burn_value_portions(small, supply, endowment, 0, one_x).unwrap();
        let (el, _) = burn_value_portions(large, supply, endowment, 0, one_x).unwrap();
        prop_assert!(el >= es);
    }

    #[test]
    fn prop_max_burn_bounded_by_supply_at_full_limit(
        supply in 0u64..1_000_000_000_000,
    ) {
        let max = max_burn_amount(supply, RATIO_SCALE as u64).unwrap();
        prop_assert_eq!(max, supply);
    }

    // ── Large Values (production scale) ──

    #[test]
    fn prop_split_profit_no_panic(amount: u64, percent: u128) {
        let _ = split_profit(amount, percent);
    }

    #[test]
    fn prop_split_bonus_no_panic(bonus: u64, sp: u64, wp: u64, sl: u64, wl: u64) {
        let _ = split_bonus(bonus, sp, wp, sl, wl);
    }

    #[test]
    fn prop_spend_plan_no_panic(pp: u64, pl: u64, minted: u64, amount: u64) {
        let _ = plan_bonus_spend(pp, pl, minted, amount);
    }

    #[test]
    fn prop_burn_portions_no_panic(
        burn: u64, supply: u64, endowment: u64, bonus: u64, mult: u64,
    ) {
        let _ = burn_value_portions(burn, supply, endowment, bonus, mult);
    }

    #[test]
    fn prop_pending_no_panic(amount: u64, acc: u128, tally: u64) {
        let _ = pending(amount, acc, tally);
    }
}

// ═══════════════════════════════════════════════════════════════
// Targeted Edge Cases (not random)
// ═══════════════════════════════════════════════════════════════

#[test]
fn test_production_scale_profit_cycle() {
    // Simulate a real treasury: 10M staked (6 decimals), 50K profit
    let staked = 10_000_000_000_000u64;
    let profit = 50_000_000_000u64;
    let thirty_percent = 30 * RATIO_SCALE;

    let (endowment, bonus) = split_profit(profit, thirty_percent).unwrap();
    assert_eq!(endowment, 15_000_000_000);
    assert_eq!(bonus, 35_000_000_000);

    let delta = acc_delta(bonus, staked).unwrap();
    let settled = credited(staked, delta).unwrap();
    assert!(settled <= bonus);
    assert!(bonus - settled <= 1); // fixed-point dust only
}

#[test]
fn test_spend_priority_spec_example() {
    // pendingLP=10, pendingPrimary=5, minted=0, spend 10 → all from LP
    assert_eq!(plan_bonus_spend(5, 10, 0, 10), Some((10, 0, 0)));
}

#[test]
fn test_spend_burn_spec_example() {
    // pendingLP=3, pendingPrimary=2, minted=20, spend 15 → burn 10
    assert_eq!(plan_bonus_spend(2, 3, 20, 15), Some((3, 2, 10)));
}

#[test]
fn test_burn_cap_spec_example() {
    // endowmentPortion(pre-mult)=100, TotalBonus=150 ⇒ bonusPortion=100
    let (e, b) = burn_value_portions(100, 1_000, 1_000, 150, RATIO_SCALE as u64).unwrap();
    assert_eq!(e, 100);
    assert_eq!(b, 100);
}

#[test]
fn test_whale_burn_full_supply_fraction() {
    // Burning the entire supply at 1x claims the entire endowment
    let (e, _) = burn_value_portions(5_000, 5_000, 777_777, 0, RATIO_SCALE as u64).unwrap();
    assert_eq!(e, 777_777);
}
