//! Caldera Treasury Program (PDA Admin Architecture)
//!
//! Shared treasury that pools two kinds of staked assets and splits
//! externally received profit between a long-term endowment reserve and a
//! per-staker bonus pool. A trusted delegate can draw down accrued bonus on
//! a staker's behalf (to subsidize costs) and convert burns of the primary
//! asset into a proportional endowment payout plus capped bonus
//! compensation.
//!
//! Architecture:
//! - One treasury PDA per primary mint holds both pool configs, the
//!   endowment/bonus subdivision of the settlement vault, and the mutable
//!   parameters; per-account position PDAs hold stake amounts and reward
//!   tallies
//! - Accumulator-based reward accounting: each pool carries a 1e24
//!   fixed-point bonus-per-share running total; positions settle lazily
//!   against it before any stake mutation, with no recomputation pass
//! - Bonus claims are an SPL token minted on settlement and burned by the
//!   three-tier spend priority (LP pending, primary pending, minted)
//! - The vault_auth PDA owns the three vaults and the bonus mint; all
//!   token movement is CPI into the SPL Token program
//! - Capability checks are signer comparisons against the stored admin
//!   (finance) and delegate (operator) keys
//!
//! Instructions:
//!   0 - Initialize:               Create treasury PDA, bonus mint, vaults
//!   1 - Deposit:                  Settle + stake, transfer assets in
//!   2 - Withdraw:                 Settle + unstake, transfer assets out
//!   3 - EmergencyWithdraw:        Zero-settlement full withdrawal
//!   4 - ReceiveProfit:            Split profit into endowment/bonus
//!   5 - SpendBonus:               Delegate draws down claimable bonus
//!   6 - RebateBonus:              Delegate refunds an over-charge
//!   7 - DepositOnBehalf:          Record stake without asset transfer
//!   8 - WithdrawOnBehalf:         Record unstake without asset transfer
//!   9 - ClaimAndBurn:             Burn-to-redeem payout for a beneficiary
//!  10 - SetEndowmentPercent:      Admin updates the profit split
//!  11 - SetBurnLimit:             Admin updates the per-call burn cap
//!  12 - SetBurnMultiplier:        Admin updates the endowment amplifier
//!  13 - SetPoolWeights:           Admin updates cross-pool weights
//!  14 - SetDelegate:              Admin rotates the operator key
//!  15 - SetEmergencyTransfer:     Admin queues timelocked fund recovery
//!  16 - ExecuteEmergencyTransfer: Admin executes inside the 24h-72h window
//!  17 - RebateBonusBatch:         Delegate rebates many accounts at once

pub mod error;
pub mod instruction;
pub mod math;
pub mod processor;
pub mod state;
pub mod cpi;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;
