use bytemuck::{Pod, Zeroable};
use solana_program::pubkey::Pubkey;

use crate::error::TreasuryError;
use crate::math::{self, SpendPlan};

/// Primary-asset pool index into `Treasury::pools` / `StakePosition` arrays.
pub const POOL_PRIMARY: usize = 0;
/// LP-derivative pool index.
pub const POOL_LP: usize = 1;

/// Seconds after an emergency request is set before it becomes executable.
pub const EMERGENCY_WINDOW_OPEN_SECS: i64 = 24 * 60 * 60;
/// Seconds after an emergency request is set when it stops being executable.
pub const EMERGENCY_WINDOW_CLOSE_SECS: i64 = 72 * 60 * 60;

/// One stake pool's share of the reward engine.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct PoolState {
    /// Cumulative bonus earned per staked unit since inception,
    /// 1e24 fixed point. Monotonically non-decreasing; advanced only
    /// by profit receipt.
    pub acc_bonus_per_share: u128,

    /// Influence factor for cross-pool profit splitting
    pub weight: u64,

    /// Sum of all positions' amounts in this pool
    pub total_staked: u64,
}

/// Treasury state — singleton per primary mint.
/// PDA seeds: [b"treasury", primary_mint]
///
/// Holds the two pool configs, the endowment/bonus subdivision of the
/// settlement vault, the mutable parameters, and the single-slot
/// emergency transfer request.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct Treasury {
    /// Pools: [POOL_PRIMARY, POOL_LP]
    pub pools: [PoolState; 2],

    /// Endowment subdivision of the settlement vault (base units).
    /// Drawn down only by burn redemption and emergency transfer.
    pub endowment_balance: u64,

    /// Bonus subdivision of the settlement vault (base units).
    /// Increases via profit receipt and rebate, decreases via spend.
    pub bonus_balance: u64,

    /// Endowment share of received profit, 1e20 scale (1e20 = 100%)
    pub endowment_percent: u128,

    /// Max burnable fraction of primary supply per call, 1e18 scale
    pub burn_limit: u64,

    /// Endowment amplifier on burn redemption, 1e18 scale
    pub burn_multiplier: u64,

    /// Whether the treasury is initialized (1 = yes, 0 = no)
    pub is_initialized: u8,

    /// Bump seed for the treasury PDA
    pub bump: u8,

    /// Bump seed for the vault authority PDA
    pub vault_authority_bump: u8,

    /// Padding for alignment
    pub _padding: [u8; 5],

    /// Finance admin (parameter setters, emergency transfers)
    pub admin: [u8; 32],

    /// Trusted operator (spend/rebate/on-behalf/claim-and-burn)
    pub delegate: [u8; 32],

    /// Primary staked asset mint
    pub primary_mint: [u8; 32],

    /// LP-derivative staked asset mint
    pub lp_mint: [u8; 32],

    /// Settlement asset mint (profit and payouts)
    pub settlement_mint: [u8; 32],

    /// Bonus token mint (authority = vault authority PDA)
    pub bonus_mint: [u8; 32],

    /// Vault holding staked primary assets (owned by vault authority PDA)
    pub primary_vault: [u8; 32],

    /// Vault holding staked LP-derivative assets
    pub lp_vault: [u8; 32],

    /// Vault holding the settlement asset backing endowment + bonus
    pub settlement_vault: [u8; 32],

    /// Emergency transfer request: source token account
    pub emergency_token: [u8; 32],

    /// Emergency transfer request: destination token account
    pub emergency_destination: [u8; 32],

    /// Emergency transfer request: amount
    pub emergency_amount: u64,

    /// Emergency transfer request: unix timestamp when set (0 = none)
    pub emergency_set_at: i64,

    /// Reserved for future use
    pub _reserved: [u8; 40],
}

/// Size of Treasury in bytes
pub const TREASURY_SIZE: usize = core::mem::size_of::<Treasury>();

/// Per-account stake state — one per (treasury, owner).
/// PDA seeds: [b"position", treasury_pda, owner_pubkey]
///
/// Created lazily on first deposit, never deleted; zeroed by emergency
/// withdraw.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct StakePosition {
    /// Whether this record is initialized
    pub is_initialized: u8,

    /// Bump seed for the position PDA
    pub bump: u8,

    /// Padding
    pub _padding: [u8; 6],

    /// The treasury this position belongs to
    pub treasury: [u8; 32],

    /// The staking account
    pub owner: [u8; 32],

    /// Staked units per pool: [POOL_PRIMARY, POOL_LP]
    pub amounts: [u64; 2],

    /// Bonus units already credited per pool. Immediately after a
    /// settlement + tally reset: tally == amount × acc ÷ 1e24 exactly.
    pub tallies: [u64; 2],

    /// Reserved for future use
    pub _reserved: [u8; 48],
}

/// Size of StakePosition in bytes
pub const STAKE_POSITION_SIZE: usize = core::mem::size_of::<StakePosition>();

/// What a claim-and-burn pays out, for the processor to execute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BurnOutcome {
    /// Settlement units drawn from the endowment subdivision
    pub endowment_portion: u64,
    /// Settlement units drawn from the bonus subdivision
    pub bonus_portion: u64,
    /// Bonus tokens to burn from the beneficiary (tier-3 spend)
    pub burn_from_minted: u64,
    /// Total settlement transfer: endowment_portion + bonus_portion
    pub payout: u64,
}

impl Treasury {
    pub fn admin_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.admin)
    }

    pub fn delegate_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.delegate)
    }

    /// Whether any pool has stake to reward.
    pub fn has_stake(&self) -> bool {
        self.pools[POOL_PRIMARY].total_staked > 0 || self.pools[POOL_LP].total_staked > 0
    }

    /// Unsettled bonus across both pools for a position.
    pub fn pending_bonus(&self, pos: &StakePosition) -> Option<u64> {
        let p = math::pending(
            pos.amounts[POOL_PRIMARY],
            self.pools[POOL_PRIMARY].acc_bonus_per_share,
            pos.tallies[POOL_PRIMARY],
        )?;
        let l = math::pending(
            pos.amounts[POOL_LP],
            self.pools[POOL_LP].acc_bonus_per_share,
            pos.tallies[POOL_LP],
        )?;
        p.checked_add(l)
    }

    /// Pending bonus plus the account's minted bonus-token balance.
    pub fn total_bonus(&self, pos: &StakePosition, minted_balance: u64) -> Option<u64> {
        self.pending_bonus(pos)?.checked_add(minted_balance)
    }

    /// Settle + stake. Settles both pools (the returned amount is the
    /// pending bonus to mint to the owner), then adds the amounts to the
    /// position and pool totals and resets the tallies to the current
    /// accumulator values.
    ///
    /// No state is written until every step has been validated.
    pub fn deposit(
        &mut self,
        pos: &mut StakePosition,
        amount_primary: u64,
        amount_lp: u64,
    ) -> Result<u64, TreasuryError> {
        let bonus_to_mint = self.pending_bonus(pos).ok_or(TreasuryError::Overflow)?;

        let new_amounts = [
            pos.amounts[POOL_PRIMARY]
                .checked_add(amount_primary)
                .ok_or(TreasuryError::Overflow)?,
            pos.amounts[POOL_LP]
                .checked_add(amount_lp)
                .ok_or(TreasuryError::Overflow)?,
        ];
        let new_totals = [
            self.pools[POOL_PRIMARY]
                .total_staked
                .checked_add(amount_primary)
                .ok_or(TreasuryError::Overflow)?,
            self.pools[POOL_LP]
                .total_staked
                .checked_add(amount_lp)
                .ok_or(TreasuryError::Overflow)?,
        ];
        let new_tallies = self.tallies_at_current_acc(&new_amounts)?;

        pos.amounts = new_amounts;
        pos.tallies = new_tallies;
        self.pools[POOL_PRIMARY].total_staked = new_totals[POOL_PRIMARY];
        self.pools[POOL_LP].total_staked = new_totals[POOL_LP];
        Ok(bonus_to_mint)
    }

    /// Settle + unstake. Fails with InsufficientBalance (before any
    /// mutation) if either pool's requested amount exceeds the position.
    pub fn withdraw(
        &mut self,
        pos: &mut StakePosition,
        amount_primary: u64,
        amount_lp: u64,
    ) -> Result<u64, TreasuryError> {
        let new_amounts = [
            pos.amounts[POOL_PRIMARY]
                .checked_sub(amount_primary)
                .ok_or(TreasuryError::InsufficientBalance)?,
            pos.amounts[POOL_LP]
                .checked_sub(amount_lp)
                .ok_or(TreasuryError::InsufficientBalance)?,
        ];
        let bonus_to_mint = self.pending_bonus(pos).ok_or(TreasuryError::Overflow)?;

        let new_totals = [
            self.pools[POOL_PRIMARY]
                .total_staked
                .checked_sub(amount_primary)
                .ok_or(TreasuryError::Overflow)?,
            self.pools[POOL_LP]
                .total_staked
                .checked_sub(amount_lp)
                .ok_or(TreasuryError::Overflow)?,
        ];
        let new_tallies = self.tallies_at_current_acc(&new_amounts)?;

        pos.amounts = new_amounts;
        pos.tallies = new_tallies;
        self.pools[POOL_PRIMARY].total_staked = new_totals[POOL_PRIMARY];
        self.pools[POOL_LP].total_staked = new_totals[POOL_LP];
        Ok(bonus_to_mint)
    }

    /// Fail-safe full withdrawal: zeroes the position without settling —
    /// pending bonus is forfeited. Returns the amounts to transfer back.
    pub fn emergency_withdraw(
        &mut self,
        pos: &mut StakePosition,
    ) -> Result<(u64, u64), TreasuryError> {
        let amount_primary = pos.amounts[POOL_PRIMARY];
        let amount_lp = pos.amounts[POOL_LP];

        let new_totals = [
            self.pools[POOL_PRIMARY]
                .total_staked
                .checked_sub(amount_primary)
                .ok_or(TreasuryError::Overflow)?,
            self.pools[POOL_LP]
                .total_staked
                .checked_sub(amount_lp)
                .ok_or(TreasuryError::Overflow)?,
        ];

        pos.amounts = [0, 0];
        pos.tallies = [0, 0];
        self.pools[POOL_PRIMARY].total_staked = new_totals[POOL_PRIMARY];
        self.pools[POOL_LP].total_staked = new_totals[POOL_LP];
        Ok((amount_primary, amount_lp))
    }

    /// Split received profit into endowment and bonus and advance the
    /// pool accumulators.
    ///
    /// With no stake anywhere the whole amount is endowment — there is no
    /// one to reward. A pool with zero stake is skipped (its accumulator
    /// is untouched); if the weighted total is zero while stake exists,
    /// the bonus portion stays in `bonus_balance` credited to no
    /// accumulator.
    pub fn receive_profit(&mut self, amount: u64) -> Result<(), TreasuryError> {
        if !self.has_stake() {
            self.endowment_balance = self
                .endowment_balance
                .checked_add(amount)
                .ok_or(TreasuryError::Overflow)?;
            return Ok(());
        }

        let (endowment, bonus) = math::split_profit(amount, self.endowment_percent)
            .ok_or(TreasuryError::Overflow)?;
        let (share_primary, share_lp) = math::split_bonus(
            bonus,
            self.pools[POOL_PRIMARY].total_staked,
            self.pools[POOL_PRIMARY].weight,
            self.pools[POOL_LP].total_staked,
            self.pools[POOL_LP].weight,
        )
        .ok_or(TreasuryError::Overflow)?;

        let mut new_accs = [
            self.pools[POOL_PRIMARY].acc_bonus_per_share,
            self.pools[POOL_LP].acc_bonus_per_share,
        ];
        for (i, share) in [share_primary, share_lp].into_iter().enumerate() {
            if self.pools[i].total_staked > 0 && share > 0 {
                let delta = math::acc_delta(share, self.pools[i].total_staked)
                    .ok_or(TreasuryError::Overflow)?;
                new_accs[i] = new_accs[i].checked_add(delta).ok_or(TreasuryError::Overflow)?;
            }
        }
        let new_endowment = self
            .endowment_balance
            .checked_add(endowment)
            .ok_or(TreasuryError::Overflow)?;
        let new_bonus = self
            .bonus_balance
            .checked_add(bonus)
            .ok_or(TreasuryError::Overflow)?;

        self.pools[POOL_PRIMARY].acc_bonus_per_share = new_accs[POOL_PRIMARY];
        self.pools[POOL_LP].acc_bonus_per_share = new_accs[POOL_LP];
        self.endowment_balance = new_endowment;
        self.bonus_balance = new_bonus;
        Ok(())
    }

    /// Spend claimable bonus with the three-tier priority: LP pending,
    /// then primary pending, then the minted balance (burned).
    ///
    /// Fails with InsufficientBonus before any mutation if the total
    /// claimable is short. Returns the plan; the caller burns
    /// `plan.burn_minted` bonus tokens from the account.
    pub fn spend_bonus(
        &mut self,
        pos: &mut StakePosition,
        minted_balance: u64,
        amount: u64,
    ) -> Result<SpendPlan, TreasuryError> {
        let pending_primary = math::pending(
            pos.amounts[POOL_PRIMARY],
            self.pools[POOL_PRIMARY].acc_bonus_per_share,
            pos.tallies[POOL_PRIMARY],
        )
        .ok_or(TreasuryError::Overflow)?;
        let pending_lp = math::pending(
            pos.amounts[POOL_LP],
            self.pools[POOL_LP].acc_bonus_per_share,
            pos.tallies[POOL_LP],
        )
        .ok_or(TreasuryError::Overflow)?;

        let plan = math::plan_bonus_spend(pending_primary, pending_lp, minted_balance, amount)
            .ok_or(TreasuryError::InsufficientBonus)?;

        let new_tally_primary = pos.tallies[POOL_PRIMARY]
            .checked_add(plan.primary_draw)
            .ok_or(TreasuryError::Overflow)?;
        let new_tally_lp = pos.tallies[POOL_LP]
            .checked_add(plan.lp_draw)
            .ok_or(TreasuryError::Overflow)?;
        // The amount was already credited into one of the three sources
        let new_bonus_balance = self
            .bonus_balance
            .checked_sub(amount)
            .ok_or(TreasuryError::Overflow)?;

        pos.tallies = [new_tally_primary, new_tally_lp];
        self.bonus_balance = new_bonus_balance;
        Ok(plan)
    }

    /// Refund an earlier over-charge: the caller mints `amount` bonus
    /// tokens to the account and the bonus subdivision grows to match.
    pub fn rebate_bonus(&mut self, amount: u64) -> Result<(), TreasuryError> {
        self.bonus_balance = self
            .bonus_balance
            .checked_add(amount)
            .ok_or(TreasuryError::Overflow)?;
        Ok(())
    }

    /// Burn-value quote for a position: (endowment_portion, bonus_portion).
    pub fn burn_value_portions(
        &self,
        pos: &StakePosition,
        minted_balance: u64,
        primary_supply: u64,
        burn_amount: u64,
    ) -> Result<(u64, u64), TreasuryError> {
        let total_bonus = self
            .total_bonus(pos, minted_balance)
            .ok_or(TreasuryError::Overflow)?;
        math::burn_value_portions(
            burn_amount,
            primary_supply,
            self.endowment_balance,
            total_bonus,
            self.burn_multiplier,
        )
        .ok_or(TreasuryError::Overflow)
    }

    /// Max primary units burnable per call under the configured limit.
    pub fn max_burn_amount(&self, primary_supply: u64) -> Option<u64> {
        math::max_burn_amount(primary_supply, self.burn_limit)
    }

    /// Convert a burn of the primary asset into the settlement payout.
    /// Enforces the burn cap, runs the bonus spend for the capped bonus
    /// portion, and draws the endowment portion from the endowment
    /// subdivision only.
    pub fn claim_and_burn(
        &mut self,
        pos: &mut StakePosition,
        minted_balance: u64,
        primary_supply: u64,
        burn_amount: u64,
    ) -> Result<BurnOutcome, TreasuryError> {
        let max = self
            .max_burn_amount(primary_supply)
            .ok_or(TreasuryError::Overflow)?;
        if burn_amount > max {
            return Err(TreasuryError::BurnLimitExceeded);
        }

        let (endowment_portion, bonus_portion) =
            self.burn_value_portions(pos, minted_balance, primary_supply, burn_amount)?;
        let new_endowment = self
            .endowment_balance
            .checked_sub(endowment_portion)
            .ok_or(TreasuryError::Overflow)?;
        let payout = endowment_portion
            .checked_add(bonus_portion)
            .ok_or(TreasuryError::Overflow)?;

        // bonus_portion <= total claimable by the cap, so this cannot fail
        // with InsufficientBonus; it decrements bonus_balance itself.
        let plan = if bonus_portion > 0 {
            self.spend_bonus(pos, minted_balance, bonus_portion)?
        } else {
            SpendPlan::default()
        };

        self.endowment_balance = new_endowment;
        Ok(BurnOutcome {
            endowment_portion,
            bonus_portion,
            burn_from_minted: plan.burn_minted,
            payout,
        })
    }

    /// Settlement vault balance not yet swept through receive_profit.
    pub fn estimated_yield(&self, settlement_vault_balance: u64) -> Option<u64> {
        math::estimated_yield(
            settlement_vault_balance,
            self.endowment_balance,
            self.bonus_balance,
        )
    }

    /// Record an emergency transfer request, overwriting any previous one.
    pub fn set_emergency_transfer(
        &mut self,
        token: [u8; 32],
        destination: [u8; 32],
        amount: u64,
        now: i64,
    ) {
        self.emergency_token = token;
        self.emergency_destination = destination;
        self.emergency_amount = amount;
        self.emergency_set_at = now;
    }

    /// Consume the pending emergency request if `now` lies strictly inside
    /// the (set_at+24h, set_at+72h) window. Clears the slot on success.
    pub fn execute_emergency_transfer(
        &mut self,
        now: i64,
    ) -> Result<([u8; 32], [u8; 32], u64), TreasuryError> {
        if self.emergency_set_at == 0 {
            return Err(TreasuryError::NoEmergencyRequest);
        }
        let opens = self
            .emergency_set_at
            .checked_add(EMERGENCY_WINDOW_OPEN_SECS)
            .ok_or(TreasuryError::Overflow)?;
        let closes = self
            .emergency_set_at
            .checked_add(EMERGENCY_WINDOW_CLOSE_SECS)
            .ok_or(TreasuryError::Overflow)?;
        if now <= opens {
            return Err(TreasuryError::TimelockNotElapsed);
        }
        if now >= closes {
            return Err(TreasuryError::TimelockExpired);
        }

        let request = (
            self.emergency_token,
            self.emergency_destination,
            self.emergency_amount,
        );
        self.emergency_token = [0; 32];
        self.emergency_destination = [0; 32];
        self.emergency_amount = 0;
        self.emergency_set_at = 0;
        Ok(request)
    }

    /// Tallies for the given amounts at the current accumulators —
    /// the zero-point reset after a stake mutation.
    fn tallies_at_current_acc(&self, amounts: &[u64; 2]) -> Result<[u64; 2], TreasuryError> {
        Ok([
            math::credited(
                amounts[POOL_PRIMARY],
                self.pools[POOL_PRIMARY].acc_bonus_per_share,
            )
            .ok_or(TreasuryError::Overflow)?,
            math::credited(amounts[POOL_LP], self.pools[POOL_LP].acc_bonus_per_share)
                .ok_or(TreasuryError::Overflow)?,
        ])
    }
}

/// Derive the treasury PDA for a given primary mint.
pub fn derive_treasury_pda(program_id: &Pubkey, primary_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"treasury", primary_mint.as_ref()], program_id)
}

/// Derive the vault authority PDA for a given treasury.
/// Controls: bonus mint authority + all three vault token accounts.
pub fn derive_vault_authority(program_id: &Pubkey, treasury: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"vault_auth", treasury.as_ref()], program_id)
}

/// Derive the per-account position PDA.
pub fn derive_position_pda(
    program_id: &Pubkey,
    treasury: &Pubkey,
    owner: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"position", treasury.as_ref(), owner.as_ref()], program_id)
}
