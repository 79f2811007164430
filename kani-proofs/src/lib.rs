//! Kani formal verification for caldera-treasury math.
//!
//! ZERO dependencies. Pure Rust. CBMC-friendly.
//!
//! KEY DESIGN DECISION: Functions use u32 inputs / u64 intermediates and
//! narrow fixed-point scales. The production code uses u64/u128 with
//! 1e18/1e20/1e24 scales, but the arithmetic properties (split exactness,
//! spend priority, burn cap, settlement) are scale-invariant.
//! u32 keeps SAT formulas tractable for CBMC (<60s per proof).
//!
//! Run all:   cargo kani --lib
//! Run one:   cargo kani --harness proof_split_profit_exact

/// Narrow mirror of RATIO_SCALE (production: 1e18).
pub const RATIO_SCALE: u64 = 1_000;
/// Narrow mirror of PERCENT_SCALE (production: 1e20). 100_000 == 100%.
pub const PERCENT_SCALE: u64 = 100 * RATIO_SCALE;
/// Narrow mirror of ACC_SCALE (production: 1e24).
pub const ACC_SCALE: u64 = 1_000_000;

// ═══════════════════════════════════════════════════════════════
// Treasury Math (u32/u64 mirror of caldera-treasury/src/math.rs)
// Arithmetic is IDENTICAL — just narrower types for CBMC tractability.
// ═══════════════════════════════════════════════════════════════

/// Top split: (endowment, bonus), bonus is the remainder.
pub fn split_profit(amount: u32, endowment_percent: u64) -> Option<(u32, u32)> {
    if endowment_percent > PERCENT_SCALE {
        return None;
    }
    let endowment = (amount as u64)
        .checked_mul(endowment_percent)?
        .checked_div(PERCENT_SCALE)?;
    let endowment = endowment as u32;
    Some((endowment, amount - endowment))
}

/// Cross-pool split: primary gets the floor, LP gets the remainder.
pub fn split_bonus(bonus: u32, sp: u32, wp: u32, sl: u32, wl: u32) -> Option<(u32, u32)> {
    let primary_shares = (sp as u64).checked_mul(wp as u64)?;
    let lp_shares = (sl as u64).checked_mul(wl as u64)?;
    let total_shares = primary_shares.checked_add(lp_shares)?;
    if total_shares == 0 {
        return Some((0, 0));
    }
    let bonus_primary = (bonus as u64)
        .checked_mul(primary_shares)?
        .checked_div(total_shares)?;
    let bonus_primary = bonus_primary as u32;
    Some((bonus_primary, bonus - bonus_primary))
}

/// Bonus credited at the accumulator: floor(amount × acc / scale).
pub fn credited(amount: u32, acc: u64) -> Option<u32> {
    let value = (amount as u64).checked_mul(acc)?.checked_div(ACC_SCALE)?;
    if value > u32::MAX as u64 { None } else { Some(value as u32) }
}

/// Pending bonus: credited − tally.
pub fn pending(amount: u32, acc: u64, tally: u32) -> Option<u32> {
    credited(amount, acc)?.checked_sub(tally)
}

/// Three-tier spend plan: (lp_draw, primary_draw, burn_minted).
pub fn plan_bonus_spend(pp: u32, pl: u32, minted: u32, amount: u32) -> Option<(u32, u32, u32)> {
    let amount_wide = amount as u64;
    if pl as u64 >= amount_wide {
        return Some((amount, 0, 0));
    }
    if pl as u64 + pp as u64 >= amount_wide {
        return Some((pl, amount - pl, 0));
    }
    if pl as u64 + pp as u64 + minted as u64 >= amount_wide {
        return Some((pl, pp, amount - pl - pp));
    }
    None
}

/// Burn portions: (endowment, bonus), cap before multiplier.
pub fn burn_value_portions(
    burn: u32,
    supply: u32,
    endowment_balance: u32,
    total_bonus: u32,
    multiplier: u64,
) -> Option<(u32, u32)> {
    if supply == 0 {
        return None;
    }
    let fraction = (burn as u64).checked_mul(RATIO_SCALE)?.checked_div(supply as u64)?;
    let endowment_pre = fraction
        .checked_mul(endowment_balance as u64)?
        .checked_div(RATIO_SCALE)?;
    let bonus = endowment_pre.min(total_bonus as u64);
    let endowment = endowment_pre.checked_mul(multiplier)?.checked_div(RATIO_SCALE)?;
    if endowment > u32::MAX as u64 || bonus > u32::MAX as u64 {
        None
    } else {
        Some((endowment as u32, bonus as u32))
    }
}

// ═══════════════════════════════════════════════════════════════
// KANI PROOFS
// ═══════════════════════════════════════════════════════════════

#[cfg(kani)]
mod proofs {
    use super::*;

    // ── 1. Split Exactness ──

    /// Top split conserves the amount exactly.
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_split_profit_exact() {
        let amount: u32 = kani::any();
        let percent: u64 = kani::any();
        kani::assume(percent <= PERCENT_SCALE);

        let (e, b) = split_profit(amount, percent).unwrap();
        assert!(e as u64 + b as u64 == amount as u64);
        assert!(e <= amount);
    }

    /// Cross-pool split conserves the bonus exactly (non-zero shares).
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_split_bonus_exact() {
        let bonus: u32 = kani::any();
        let sp: u32 = kani::any();
        let wp: u32 = kani::any();
        let sl: u32 = kani::any();
        let wl: u32 = kani::any();
        kani::assume(bonus < 1_000);
        kani::assume(sp < 100 && wp < 20 && sl < 100 && wl < 20);
        kani::assume((sp as u64) * (wp as u64) + (sl as u64) * (wl as u64) > 0);

        let (p, l) = split_bonus(bonus, sp, wp, sl, wl).unwrap();
        assert!(p + l == bonus);
    }

    /// Unstaked pool gets exactly zero, nothing retained.
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_split_bonus_unstaked_zero() {
        let bonus: u32 = kani::any();
        let sp: u32 = kani::any();
        let wp: u32 = kani::any();
        kani::assume(bonus < 1_000);
        kani::assume(sp > 0 && sp < 100);
        kani::assume(wp > 0 && wp < 20);

        let (p, l) = split_bonus(bonus, sp, wp, 0, kani::any()).unwrap();
        assert_eq!(l, 0);
        assert_eq!(p, bonus);
    }

    // ── 2. Arithmetic Safety ──

    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_split_profit_no_panic() {
        let _ = split_profit(kani::any(), kani::any());
    }

    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_split_bonus_no_panic() {
        let _ = split_bonus(kani::any(), kani::any(), kani::any(), kani::any(), kani::any());
    }

    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_plan_no_panic() {
        let _ = plan_bonus_spend(kani::any(), kani::any(), kani::any(), kani::any());
    }

    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_pending_no_panic() {
        let _ = pending(kani::any(), kani::any(), kani::any());
    }

    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_burn_portions_no_panic() {
        let _ = burn_value_portions(
            kani::any(),
            kani::any(),
            kani::any(),
            kani::any(),
            kani::any(),
        );
    }

    // ── 3. Spend Priority ──

    /// A successful plan conserves the spent amount.
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_plan_conserves() {
        let pp: u32 = kani::any();
        let pl: u32 = kani::any();
        let minted: u32 = kani::any();
        let amount: u32 = kani::any();

        if let Some((l, p, m)) = plan_bonus_spend(pp, pl, minted, amount) {
            assert!(l as u64 + p as u64 + m as u64 == amount as u64);
        }
    }

    /// Tiers drain in order: LP, then primary, then minted.
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_plan_priority() {
        let pp: u32 = kani::any();
        let pl: u32 = kani::any();
        let minted: u32 = kani::any();
        let amount: u32 = kani::any();

        if let Some((l, p, m)) = plan_bonus_spend(pp, pl, minted, amount) {
            if p > 0 {
                assert_eq!(l, pl);
            }
            if m > 0 {
                assert_eq!(l, pl);
                assert_eq!(p, pp);
            }
            assert!(l <= pl && p <= pp && m <= minted);
        }
    }

    /// The plan fails exactly when total claimable is short.
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_plan_none_iff_insufficient() {
        let pp: u32 = kani::any();
        let pl: u32 = kani::any();
        let minted: u32 = kani::any();
        let amount: u32 = kani::any();

        let total = pp as u64 + pl as u64 + minted as u64;
        let plan = plan_bonus_spend(pp, pl, minted, amount);
        if (amount as u64) <= total {
            assert!(plan.is_some());
        } else {
            assert!(plan.is_none());
        }
    }

    // ── 4. Burn Bounds ──

    /// Bonus capped at the pre-multiplier endowment share.
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_burn_bonus_capped() {
        let burn: u32 = kani::any();
        let supply: u32 = kani::any();
        let endowment: u32 = kani::any();
        let total_bonus: u32 = kani::any();
        let mult: u64 = kani::any();
        kani::assume(supply > 0 && supply < 100);
        kani::assume(burn <= supply);
        kani::assume(endowment < 100);

        if let Some((_, bonus)) = burn_value_portions(burn, supply, endowment, total_bonus, mult) {
            let pre = (burn as u64) * RATIO_SCALE / (supply as u64) * (endowment as u64)
                / RATIO_SCALE;
            assert!(bonus as u64 <= pre);
            assert!(bonus <= total_bonus);
        }
    }

    /// At 1x multiplier a burn never draws more than the endowment.
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_burn_endowment_bounded() {
        let burn: u32 = kani::any();
        let supply: u32 = kani::any();
        let endowment: u32 = kani::any();
        kani::assume(supply > 0 && supply < 100);
        kani::assume(burn <= supply);
        kani::assume(endowment < 100);

        let (e, _) = burn_value_portions(burn, supply, endowment, 0, RATIO_SCALE).unwrap();
        assert!(e <= endowment);
    }

    // ── 5. Settlement ──

    /// Tally reset to the credited value zeroes pending.
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_tally_reset_zeroes_pending() {
        let amount: u32 = kani::any();
        let acc: u64 = kani::any();
        kani::assume(amount < 1_000);
        kani::assume(acc < 1_000 * ACC_SCALE);

        let tally = match credited(amount, acc) {
            Some(v) => v,
            None => return,
        };
        assert_eq!(pending(amount, acc, tally), Some(0));
    }

    /// credited rounds down (treasury-favoring).
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_credited_rounds_down() {
        let amount: u32 = kani::any();
        let acc: u64 = kani::any();
        kani::assume(amount < 1_000);
        kani::assume(acc < 1_000 * ACC_SCALE);

        if let Some(c) = credited(amount, acc) {
            assert!((c as u64) * ACC_SCALE <= (amount as u64) * acc);
        }
    }
}
