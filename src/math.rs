//! Pure treasury math — extracted for Kani formal verification.
//!
//! No Solana/Pubkey dependencies. Just fixed-point integer arithmetic.
//! Kani can verify these functions exhaustively.

/// Scale for 1e18 fixed-point ratios (burn limit, burn multiplier).
pub const RATIO_SCALE: u128 = 1_000_000_000_000_000_000;

/// Scale for the endowment percentage. 1e20 == 100%.
pub const PERCENT_SCALE: u128 = 100 * RATIO_SCALE;

/// Scale for the per-share bonus accumulator (1e24).
pub const ACC_SCALE: u128 = 1_000_000_000_000_000_000_000_000;

/// How a bonus spend is drawn from the three sources, in priority order.
///
/// Invariant: `lp_draw + primary_draw + burn_minted == amount` spent.
/// Applying `tally += draw` per pool consumes exactly `draw` from that
/// pool's pending bonus (drawing the full pending is the same as resetting
/// the tally to the credited value).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpendPlan {
    /// Drawn from the LP pool's pending bonus
    pub lp_draw: u64,
    /// Drawn from the primary pool's pending bonus
    pub primary_draw: u64,
    /// Burned from the account's minted bonus-token balance
    pub burn_minted: u64,
}

/// Split received profit between endowment and bonus.
///
/// # Arguments
/// * `amount` - Settlement asset received
/// * `endowment_percent` - 1e20-scaled share kept as endowment (1e20 = 100%)
///
/// # Returns
/// * `Some((endowment, bonus))` - Exact split: the two always sum to `amount`
/// * `None` - Percent out of range or arithmetic overflow
///
/// # Invariant
/// `endowment + bonus == amount` — the bonus portion is the remainder, so
/// truncation never leaks value at the top split.
pub fn split_profit(amount: u64, endowment_percent: u128) -> Option<(u64, u64)> {
    if endowment_percent > PERCENT_SCALE {
        return None;
    }
    let endowment = (amount as u128)
        .checked_mul(endowment_percent)?
        .checked_div(PERCENT_SCALE)?;
    // endowment <= amount because endowment_percent <= PERCENT_SCALE
    let endowment = endowment as u64;
    Some((endowment, amount - endowment))
}

/// Split the bonus portion across the two pools by `total_staked × weight`.
///
/// The primary pool gets the truncated pro-rata share; the LP pool gets the
/// remainder. Independently rounding both shares would leak dust, so the
/// remainder assignment is load-bearing: the two always sum to `bonus`.
///
/// # Returns
/// * `Some((bonus_primary, bonus_lp))`
/// * `None` - Arithmetic overflow
///
/// A zero weighted total yields `(0, 0)`: the whole bonus portion stays in
/// the treasury's bonus balance, credited to no accumulator.
pub fn split_bonus(
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
    // bonus_primary <= bonus since primary_shares <= total_shares
    let bonus_primary = bonus_primary as u64;
    Some((bonus_primary, bonus - bonus_primary))
}

/// Accumulator advance for one pool: `share × 1e24 ÷ total_staked`.
///
/// # Returns
/// * `Some(delta)` to add to `acc_bonus_per_share`
/// * `None` - Zero stake or overflow
pub fn acc_delta(share: u64, total_staked: u64) -> Option<u128> {
    if total_staked == 0 {
        return None;
    }
    (share as u128)
        .checked_mul(ACC_SCALE)?
        .checked_div(total_staked as u128)
}

/// Bonus credited to a position at the current accumulator:
/// `amount × acc ÷ 1e24` (rounds DOWN — treasury-favoring).
pub fn credited(amount: u64, acc: u128) -> Option<u64> {
    let value = (amount as u128).checked_mul(acc)?.checked_div(ACC_SCALE)?;
    if value > u64::MAX as u128 {
        None
    } else {
        Some(value as u64)
    }
}

/// Pending (unsettled) bonus for one pool: `credited − tally`.
///
/// # Returns
/// * `Some(pending)` - Always >= 0 in any reachable state
/// * `None` - Overflow, or tally ahead of credited (broken accounting)
pub fn pending(amount: u64, acc: u128, tally: u64) -> Option<u64> {
    credited(amount, acc)?.checked_sub(tally)
}

/// Plan a bonus spend across the three sources.
///
/// Priority order is a design decision, not an optimization: unsettled
/// pending bonus is cheaper to spend than already-minted tokens (which may
/// be in free circulation), and within pending, LP-pool rewards are drawn
/// down before primary-pool rewards.
///
/// 1. LP pending covers it  → draw `amount` from LP only.
/// 2. LP + primary covers it → drain LP, draw the rest from primary.
/// 3. Otherwise              → drain both pendings, burn the rest from the
///    minted balance.
///
/// # Returns
/// * `Some(plan)` with `lp_draw + primary_draw + burn_minted == amount`
/// * `None` - Total claimable (pending + minted) is less than `amount`
pub fn plan_bonus_spend(
    pending_primary: u64,
    pending_lp: u64,
    minted: u64,
    amount: u64,
) -> Option<SpendPlan> {
    let amount_wide = amount as u128;
    if pending_lp as u128 >= amount_wide {
        return Some(SpendPlan {
            lp_draw: amount,
            primary_draw: 0,
            burn_minted: 0,
        });
    }
    if pending_lp as u128 + pending_primary as u128 >= amount_wide {
        return Some(SpendPlan {
            lp_draw: pending_lp,
            primary_draw: amount - pending_lp,
            burn_minted: 0,
        });
    }
    if pending_lp as u128 + pending_primary as u128 + minted as u128 >= amount_wide {
        return Some(SpendPlan {
            lp_draw: pending_lp,
            primary_draw: pending_primary,
            burn_minted: amount - pending_lp - pending_primary,
        });
    }
    None
}

/// Burn-to-redeem conversion: value of burning `burn_amount` primary units.
///
/// # Arguments
/// * `burn_amount` - Primary asset units to be burned
/// * `primary_supply` - GLOBAL total supply of the primary mint (not staked)
/// * `endowment_balance` - Current endowment subdivision
/// * `total_bonus` - The account's pending + minted bonus
/// * `burn_multiplier` - 1e18-scaled endowment amplifier
///
/// # Returns
/// * `Some((endowment_portion, bonus_portion))`
/// * `None` - Zero supply or overflow
///
/// # Invariant
/// `bonus_portion <= pre-multiplier endowment_portion`: bonus compensation
/// on burn never exceeds the burn's own proportional endowment value, so
/// bonus tokens cannot be laundered into endowment value. The multiplier is
/// applied AFTER the cap, amplifying only the endowment side.
pub fn burn_value_portions(
    burn_amount: u64,
    primary_supply: u64,
    endowment_balance: u64,
    total_bonus: u64,
    burn_multiplier: u64,
) -> Option<(u64, u64)> {
    if primary_supply == 0 {
        return None;
    }
    // Two-step truncation, in this order: supply fraction first, then the
    // endowment share of that fraction.
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

/// Maximum primary units burnable in one call:
/// `primary_supply × burn_limit ÷ 1e18`.
pub fn max_burn_amount(primary_supply: u64, burn_limit: u64) -> Option<u64> {
    let max = (primary_supply as u128)
        .checked_mul(burn_limit as u128)?
        .checked_div(RATIO_SCALE)?;
    if max > u64::MAX as u128 {
        None
    } else {
        Some(max as u64)
    }
}

/// Settlement-asset balance not yet attributed to either subdivision —
/// profit received in the vault but not yet swept through ReceiveProfit.
///
/// # Returns
/// * `None` if the attributed subdivisions exceed the vault balance
///   (broken accounting)
pub fn estimated_yield(
    vault_balance: u64,
    endowment_balance: u64,
    bonus_balance: u64,
) -> Option<u64> {
    vault_balance
        .checked_sub(endowment_balance)?
        .checked_sub(bonus_balance)
}


// ═══════════════════════════════════════════════════════════════
// Kani Formal Verification
// ═══════════════════════════════════════════════════════════════
//
// Production-type (u64/u128) proofs live in kani-proofs/ crate with
// u32/u64 mirrors for CBMC tractability. See kani-proofs/src/lib.rs.
//
// Keeping this note here so nobody adds u64 Kani proofs that timeout.
