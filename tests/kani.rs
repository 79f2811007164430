//! Kani formal verification proofs for caldera-treasury math.
//!
//! Proves critical safety properties on the PURE MATH layer:
//! 1. Split exactness: no value created or leaked by either profit split
//! 2. Arithmetic safety: no overflow/panic at any valid input
//! 3. Spend priority: tiers drain in order and conserve the spent amount
//! 4. Burn bounds: bonus compensation capped at the pre-multiplier share
//! 5. Settlement: tally reset always zeroes pending
//!
//! Run all:  cargo kani --tests
//! Run one:  cargo kani --harness <name>

#[cfg(kani)]
mod kani_proofs {
    use caldera_treasury::math::{
        burn_value_portions, credited, pending, plan_bonus_spend, split_bonus, split_profit,
        ACC_SCALE, PERCENT_SCALE, RATIO_SCALE,
    };

    // ═══════════════════════════════════════════════════════════
    // 1. Split Exactness — No Leaks
    // ═══════════════════════════════════════════════════════════

    /// PROOF: The top split conserves the received amount exactly.
    #[kani::proof]
    fn proof_split_profit_exact() {
        let amount: u64 = kani::any();
        let percent: u128 = kani::any();

        kani::assume(percent <= PERCENT_SCALE);
        kani::assume(amount <= 1_000_000_000);

        let (endowment, bonus) = match split_profit(amount, percent) {
            Some(v) => v,
            None => return,
        };
        assert!(endowment as u128 + bonus as u128 == amount as u128, "LEAK at top split");
        assert!(endowment <= amount);
    }

    /// PROOF: The cross-pool remainder assignment conserves the bonus
    /// portion exactly whenever the weighted total is non-zero.
    #[kani::proof]
    fn proof_split_bonus_exact() {
        let bonus: u64 = kani::any();
        let sp: u64 = kani::any();
        let wp: u64 = kani::any();
        let sl: u64 = kani::any();
        let wl: u64 = kani::any();

        kani::assume(bonus <= 1_000_000);
        kani::assume(sp <= 1_000 && wp <= 100);
        kani::assume(sl <= 1_000 && wl <= 100);
        kani::assume((sp as u128) * (wp as u128) + (sl as u128) * (wl as u128) > 0);

        let (p, l) = match split_bonus(bonus, sp, wp, sl, wl) {
            Some(v) => v,
            None => return,
        };
        assert!(p + l == bonus, "LEAK at cross-pool split");
    }

    /// PROOF: An unstaked pool's share is exactly zero.
    #[kani::proof]
    fn proof_split_bonus_unstaked_zero() {
        let bonus: u64 = kani::any();
        let sp: u64 = kani::any();
        let wp: u64 = kani::any();
        let wl: u64 = kani::any();

        kani::assume(bonus <= 1_000_000);
        kani::assume(sp > 0 && sp <= 1_000);
        kani::assume(wp > 0 && wp <= 100);
        kani::assume(wl <= 100);

        let (p, l) = split_bonus(bonus, sp, wp, 0, wl).unwrap();
        assert_eq!(l, 0);
        assert_eq!(p, bonus);
    }

    // ═══════════════════════════════════════════════════════════
    // 2. Arithmetic Safety — No Panics
    // ═══════════════════════════════════════════════════════════

    /// PROOF: split_profit never panics for any inputs.
    #[kani::proof]
    fn proof_split_profit_no_panic() {
        let _ = split_profit(kani::any(), kani::any());
    }

    /// PROOF: split_bonus never panics for any inputs.
    #[kani::proof]
    fn proof_split_bonus_no_panic() {
        let _ = split_bonus(kani::any(), kani::any(), kani::any(), kani::any(), kani::any());
    }

    /// PROOF: plan_bonus_spend never panics for any inputs.
    #[kani::proof]
    fn proof_spend_plan_no_panic() {
        let _ = plan_bonus_spend(kani::any(), kani::any(), kani::any(), kani::any());
    }

    /// PROOF: pending never panics for any inputs.
    #[kani::proof]
    fn proof_pending_no_panic() {
        let _ = pending(kani::any(), kani::any(), kani::any());
    }

    /// PROOF: burn_value_portions never panics for any inputs.
    #[kani::proof]
    fn proof_burn_portions_no_panic() {
        let _ = burn_value_portions(
            kani::any(),
            kani::any(),
            kani::any(),
            kani::any(),
            kani::any(),
        );
    }

    // ═══════════════════════════════════════════════════════════
    // 3. Spend Priority
    // ═══════════════════════════════════════════════════════════

    /// PROOF: A successful plan conserves the spent amount across tiers.
    #[kani::proof]
    fn proof_spend_plan_conserves() {
        let pp: u64 = kani::any();
        let pl: u64 = kani::any();
        let minted: u64 = kani::any();
        let amount: u64 = kani::any();

        if let Some(plan) = plan_bonus_spend(pp, pl, minted, amount) {
            assert!(
                plan.lp_draw as u128 + plan.primary_draw as u128 + plan.burn_minted as u128
                    == amount as u128,
            );
        }
    }

    /// PROOF: Tiers drain strictly in order — primary is only touched once
    /// LP is exhausted, minted only once both pendings are.
    #[kani::proof]
    fn proof_spend_plan_priority() {
        let pp: u64 = kani::any();
        let pl: u64 = kani::any();
        let minted: u64 = kani::any();
        let amount: u64 = kani::any();

        if let Some(plan) = plan_bonus_spend(pp, pl, minted, amount) {
            if plan.primary_draw > 0 {
                assert_eq!(plan.lp_draw, pl, "primary touched before LP drained");
            }
            if plan.burn_minted > 0 {
                assert_eq!(plan.lp_draw, pl);
                assert_eq!(plan.primary_draw, pp, "minted touched before pendings drained");
            }
            assert!(plan.lp_draw <= pl);
            assert!(plan.primary_draw <= pp);
            assert!(plan.burn_minted <= minted);
        }
    }

    /// PROOF: The plan fails exactly when total claimable is short.
    #[kani::proof]
    fn proof_spend_plan_none_iff_insufficient() {
        let pp: u64 = kani::any();
        let pl: u64 = kani::any();
        let minted: u64 = kani::any();
        let amount: u64 = kani::any();

        let total = pp as u128 + pl as u128 + minted as u128;
        let plan = plan_bonus_spend(pp, pl, minted, amount);
        if (amount as u128) <= total {
            assert!(plan.is_some());
        } else {
            assert!(plan.is_none());
        }
    }

    // ═══════════════════════════════════════════════════════════
    // 4. Burn Bounds
    // ═══════════════════════════════════════════════════════════

    /// PROOF: The bonus portion never exceeds the pre-multiplier endowment
    /// share nor the account's total bonus.
    #[kani::proof]
    fn proof_burn_bonus_capped() {
        let burn: u64 = kani::any();
        let supply: u64 = kani::any();
        let endowment: u64 = kani::any();
        let total_bonus: u64 = kani::any();
        let mult: u64 = kani::any();

        kani::assume(supply > 0 && supply <= 1_000_000);
        kani::assume(burn <= supply);
        kani::assume(endowment <= 1_000_000);

        if let Some((_, bonus)) = burn_value_portions(burn, supply, endowment, total_bonus, mult) {
            let fraction = (burn as u128) * RATIO_SCALE / (supply as u128);
            let pre = fraction * (endowment as u128) / RATIO_SCALE;
            assert!(bonus as u128 <= pre);
            assert!(bonus <= total_bonus);
        }
    }

    /// PROOF: At a 1x multiplier a burn never draws more than the endowment.
    #[kani::proof]
    fn proof_burn_endowment_bounded_at_1x() {
        let burn: u64 = kani::any();
        let supply: u64 = kani::any();
        let endowment: u64 = kani::any();

        kani::assume(supply > 0 && supply <= 1_000_000);
        kani::assume(burn <= supply);
        kani::assume(endowment <= 1_000_000);

        let (e, _) =
            burn_value_portions(burn, supply, endowment, 0, RATIO_SCALE as u64).unwrap();
        assert!(e <= endowment);
    }

    // ═══════════════════════════════════════════════════════════
    // 5. Settlement
    // ═══════════════════════════════════════════════════════════

    /// PROOF: Resetting the tally to the credited value zeroes pending.
    #[kani::proof]
    fn proof_tally_reset_zeroes_pending() {
        let amount: u64 = kani::any();
        let acc: u128 = kani::any();

        kani::assume(amount <= 1_000_000);
        kani::assume(acc <= 1_000 * ACC_SCALE);

        let tally = match credited(amount, acc) {
            Some(v) => v,
            None => return,
        };
        assert_eq!(pending(amount, acc, tally), Some(0));
    }

    /// PROOF: credited rounds down (treasury-favoring).
    #[kani::proof]
    fn proof_credited_rounds_down() {
        let amount: u64 = kani::any();
        let acc: u128 = kani::any();

        kani::assume(amount <= 1_000_000);
        kani::assume(acc <= 1_000 * ACC_SCALE);

        if let Some(c) = credited(amount, acc) {
            assert!((c as u128) * ACC_SCALE <= (amount as u128) * acc);
        }
    }
}
