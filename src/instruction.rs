use solana_program::{program_error::ProgramError, pubkey::Pubkey};

/// Instructions for the Caldera Treasury program.
#[derive(Debug)]
pub enum TreasuryInstruction {
    /// Initialize the treasury for a primary mint.
    /// Creates the treasury PDA, the bonus mint, and the three vaults.
    ///
    /// Accounts:
    ///   0. `[signer, writable]` Admin (pays rent, becomes finance admin)
    ///   1. `[]` Delegate (trusted operator)
    ///   2. `[]` Primary asset mint
    ///   3. `[]` LP-derivative asset mint
    ///   4. `[]` Settlement asset mint
    ///   5. `[writable]` Bonus mint (to be created, authority = vault_auth PDA)
    ///   6. `[writable]` Treasury PDA (to be created)
    ///   7. `[writable]` Primary vault token account (to be created)
    ///   8. `[writable]` LP vault token account (to be created)
    ///   9. `[writable]` Settlement vault token account (to be created)
    ///  10. `[]` Vault authority PDA
    ///  11. `[]` Token program
    ///  12. `[]` System program
    ///  13. `[]` Rent sysvar
    Initialize {
        primary_weight: u64,
        lp_weight: u64,
        endowment_percent: u128,
        burn_limit: u64,
        burn_multiplier: u64,
    },

    /// Settle pending bonus, then stake into one or both pools.
    /// Transfers the staked assets in and mints any settled bonus.
    ///
    /// Accounts:
    ///   0. `[signer]` Owner depositing
    ///   1. `[writable]` Treasury PDA
    ///   2. `[writable]` Position PDA (per-owner, created if needed)
    ///   3. `[writable]` Owner's primary token account (source)
    ///   4. `[writable]` Primary vault (destination)
    ///   5. `[writable]` Owner's LP token account (source)
    ///   6. `[writable]` LP vault (destination)
    ///   7. `[writable]` Bonus mint
    ///   8. `[writable]` Owner's bonus token account (receives settled bonus)
    ///   9. `[]` Vault authority PDA (bonus mint authority)
    ///  10. `[]` Token program
    ///  11. `[]` System program
    Deposit { amount_primary: u64, amount_lp: u64 },

    /// Settle pending bonus, then unstake from one or both pools.
    /// Fails if either pool's requested amount exceeds the position.
    ///
    /// Accounts:
    ///   0. `[signer]` Owner withdrawing
    ///   1. `[writable]` Treasury PDA
    ///   2. `[writable]` Position PDA
    ///   3. `[writable]` Primary vault (source)
    ///   4. `[writable]` Owner's primary token account (destination)
    ///   5. `[writable]` LP vault (source)
    ///   6. `[writable]` Owner's LP token account (destination)
    ///   7. `[writable]` Bonus mint
    ///   8. `[writable]` Owner's bonus token account (receives settled bonus)
    ///   9. `[]` Vault authority PDA (transfer + mint authority)
    ///  10. `[]` Token program
    Withdraw { amount_primary: u64, amount_lp: u64 },

    /// Fail-safe full withdrawal: returns all staked assets and zeroes the
    /// position without settling. Pending bonus is forfeited.
    ///
    /// Accounts:
    ///   0. `[signer]` Owner
    ///   1. `[writable]` Treasury PDA
    ///   2. `[writable]` Position PDA
    ///   3. `[writable]` Primary vault (source)
    ///   4. `[writable]` Owner's primary token account (destination)
    ///   5. `[writable]` LP vault (source)
    ///   6. `[writable]` Owner's LP token account (destination)
    ///   7. `[]` Vault authority PDA (transfer authority)
    ///   8. `[]` Token program
    EmergencyWithdraw,

    /// Deposit external profit in the settlement asset. Split between the
    /// endowment and the per-staker bonus pool; advances the accumulators.
    /// Permissionless — anyone may contribute profit.
    ///
    /// Accounts:
    ///   0. `[signer]` Payer
    ///   1. `[writable]` Treasury PDA
    ///   2. `[writable]` Payer's settlement token account (source)
    ///   3. `[writable]` Settlement vault (destination)
    ///   4. `[]` Token program
    ReceiveProfit { amount: u64 },

    /// Delegate draws down an account's claimable bonus: LP pending first,
    /// then primary pending, then the minted balance (burned).
    ///
    /// Accounts:
    ///   0. `[signer]` Delegate
    ///   1. `[writable]` Treasury PDA
    ///   2. `[]` Owner (beneficiary of the position)
    ///   3. `[writable]` Position PDA
    ///   4. `[writable]` Bonus mint
    ///   5. `[writable]` Owner's bonus token account (balance read; burned from
    ///      on tier-3 spends — the vault authority PDA must be its approved
    ///      token delegate)
    ///   6. `[]` Vault authority PDA (burn authority via token delegation)
    ///   7. `[]` Token program
    SpendBonus { amount: u64 },

    /// Delegate refunds an earlier over-charge: mints bonus tokens to the
    /// account and grows the bonus subdivision to match.
    ///
    /// Accounts:
    ///   0. `[signer]` Delegate
    ///   1. `[writable]` Treasury PDA
    ///   2. `[writable]` Bonus mint
    ///   3. `[writable]` Owner's bonus token account (receives the rebate)
    ///   4. `[]` Vault authority PDA (mint authority)
    ///   5. `[]` Token program
    RebateBonus { amount: u64 },

    /// Delegate records a stake whose asset transfer was already performed
    /// off-band. Same settlement as Deposit, no token transfer by the core.
    ///
    /// Accounts:
    ///   0. `[signer]` Delegate
    ///   1. `[writable]` Treasury PDA
    ///   2. `[]` Owner (stake is recorded for this account)
    ///   3. `[writable]` Position PDA (created if needed; delegate pays rent)
    ///   4. `[writable]` Bonus mint
    ///   5. `[writable]` Owner's bonus token account (receives settled bonus)
    ///   6. `[]` Vault authority PDA (mint authority)
    ///   7. `[]` Token program
    ///   8. `[]` System program
    DepositOnBehalf { amount_primary: u64, amount_lp: u64 },

    /// Delegate unstakes on an account's behalf without asset transfer by
    /// the core. Same settlement and balance checks as Withdraw.
    ///
    /// Accounts:
    ///   0. `[signer]` Delegate
    ///   1. `[writable]` Treasury PDA
    ///   2. `[]` Owner
    ///   3. `[writable]` Position PDA
    ///   4. `[writable]` Bonus mint
    ///   5. `[writable]` Owner's bonus token account (receives settled bonus)
    ///   6. `[]` Vault authority PDA (mint authority)
    ///   7. `[]` Token program
    WithdrawOnBehalf { amount_primary: u64, amount_lp: u64 },

    /// Delegate converts a burn of the primary asset into a settlement
    /// payout for the beneficiary: proportional endowment share (amplified
    /// by the burn multiplier) plus bonus compensation capped at the
    /// pre-multiplier endowment share. The primary-asset burn itself is
    /// performed by the delegate alongside this call.
    ///
    /// Accounts:
    ///   0. `[signer]` Delegate
    ///   1. `[writable]` Treasury PDA
    ///   2. `[]` Beneficiary
    ///   3. `[writable]` Position PDA
    ///   4. `[writable]` Bonus mint
    ///   5. `[writable]` Beneficiary's bonus token account (tier-3 burns)
    ///   6. `[writable]` Settlement vault (source of payout)
    ///   7. `[writable]` Beneficiary's settlement token account (destination)
    ///   8. `[]` Primary mint (global supply read for the conversion)
    ///   9. `[]` Vault authority PDA
    ///  10. `[]` Token program
    ClaimAndBurn { burn_amount: u64 },

    /// Admin sets the endowment share of received profit (1e20 = 100%).
    ///
    /// Accounts:
    ///   0. `[signer]` Admin
    ///   1. `[writable]` Treasury PDA
    SetEndowmentPercent { value: u128 },

    /// Admin sets the per-call burn cap as a 1e18-scaled fraction of the
    /// primary supply.
    ///
    /// Accounts:
    ///   0. `[signer]` Admin
    ///   1. `[writable]` Treasury PDA
    SetBurnLimit { value: u64 },

    /// Admin sets the 1e18-scaled endowment amplifier for burns.
    ///
    /// Accounts:
    ///   0. `[signer]` Admin
    ///   1. `[writable]` Treasury PDA
    SetBurnMultiplier { value: u64 },

    /// Admin sets the cross-pool profit-splitting weights.
    ///
    /// Accounts:
    ///   0. `[signer]` Admin
    ///   1. `[writable]` Treasury PDA
    SetPoolWeights { primary_weight: u64, lp_weight: u64 },

    /// Admin rotates the trusted-operator key.
    ///
    /// Accounts:
    ///   0. `[signer]` Admin
    ///   1. `[writable]` Treasury PDA
    SetDelegate { new_delegate: Pubkey },

    /// Admin records an emergency fund-recovery request. Single slot —
    /// overwrites any pending request and restarts the timelock.
    ///
    /// Accounts:
    ///   0. `[signer]` Admin
    ///   1. `[writable]` Treasury PDA
    ///   2. `[]` Source vault token account
    ///   3. `[]` Destination token account
    ///   4. `[]` Clock sysvar
    SetEmergencyTransfer { amount: u64 },

    /// Admin executes the pending emergency request. Valid only strictly
    /// inside the (set+24h, set+72h) window; clears the slot.
    ///
    /// Accounts:
    ///   0. `[signer]` Admin
    ///   1. `[writable]` Treasury PDA
    ///   2. `[writable]` Source vault token account (must match the request)
    ///   3. `[writable]` Destination token account (must match the request)
    ///   4. `[]` Vault authority PDA (transfer authority)
    ///   5. `[]` Token program
    ///   6. `[]` Clock sysvar
    ExecuteEmergencyTransfer,

    /// Delegate rebates several accounts in one transaction. The amount
    /// list must match the recipient account list, one-to-one.
    ///
    /// Accounts:
    ///   0. `[signer]` Delegate
    ///   1. `[writable]` Treasury PDA
    ///   2. `[writable]` Bonus mint
    ///   3. `[]` Vault authority PDA (mint authority)
    ///   4. `[]` Token program
    ///   5.. `[writable]` Recipient bonus token accounts (one per amount)
    RebateBonusBatch { amounts: Vec<u64> },
}

impl TreasuryInstruction {
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let (&tag, rest) = data.split_first().ok_or(ProgramError::InvalidInstructionData)?;

        match tag {
            0 => {
                // Initialize: weights(8+8) + endowment_percent(16) + limit(8) + multiplier(8)
                if rest.len() < 48 {
                    return Err(ProgramError::InvalidInstructionData);
                }
                let primary_weight = u64::from_le_bytes(rest[0..8].try_into().unwrap());
                let lp_weight = u64::from_le_bytes(rest[8..16].try_into().unwrap());
                let endowment_percent = u128::from_le_bytes(rest[16..32].try_into().unwrap());
                let burn_limit = u64::from_le_bytes(rest[32..40].try_into().unwrap());
                let burn_multiplier = u64::from_le_bytes(rest[40..48].try_into().unwrap());
                Ok(Self::Initialize {
                    primary_weight,
                    lp_weight,
                    endowment_percent,
                    burn_limit,
                    burn_multiplier,
                })
            }
            1 => {
                let (amount_primary, amount_lp) = unpack_two_u64(rest)?;
                Ok(Self::Deposit { amount_primary, amount_lp })
            }
            2 => {
                let (amount_primary, amount_lp) = unpack_two_u64(rest)?;
                Ok(Self::Withdraw { amount_primary, amount_lp })
            }
            3 => Ok(Self::EmergencyWithdraw),
            4 => Ok(Self::ReceiveProfit { amount: unpack_u64(rest)? }),
            5 => Ok(Self::SpendBonus { amount: unpack_u64(rest)? }),
            6 => Ok(Self::RebateBonus { amount: unpack_u64(rest)? }),
            7 => {
                let (amount_primary, amount_lp) = unpack_two_u64(rest)?;
                Ok(Self::DepositOnBehalf { amount_primary, amount_lp })
            }
            8 => {
                let (amount_primary, amount_lp) = unpack_two_u64(rest)?;
                Ok(Self::WithdrawOnBehalf { amount_primary, amount_lp })
            }
            9 => Ok(Self::ClaimAndBurn { burn_amount: unpack_u64(rest)? }),
            10 => {
                if rest.len() < 16 {
                    return Err(ProgramError::InvalidInstructionData);
                }
                let value = u128::from_le_bytes(rest[0..16].try_into().unwrap());
                Ok(Self::SetEndowmentPercent { value })
            }
            11 => Ok(Self::SetBurnLimit { value: unpack_u64(rest)? }),
            12 => Ok(Self::SetBurnMultiplier { value: unpack_u64(rest)? }),
            13 => {
                let (primary_weight, lp_weight) = unpack_two_u64(rest)?;
                Ok(Self::SetPoolWeights { primary_weight, lp_weight })
            }
            14 => {
                if rest.len() < 32 {
                    return Err(ProgramError::InvalidInstructionData);
                }
                let new_delegate = Pubkey::try_from(&rest[0..32])
                    .map_err(|_| ProgramError::InvalidInstructionData)?;
                Ok(Self::SetDelegate { new_delegate })
            }
            15 => Ok(Self::SetEmergencyTransfer { amount: unpack_u64(rest)? }),
            16 => Ok(Self::ExecuteEmergencyTransfer),
            17 => {
                // RebateBonusBatch: count(2) + count × amount(8)
                if rest.len() < 2 {
                    return Err(ProgramError::InvalidInstructionData);
                }
                let count = u16::from_le_bytes(rest[0..2].try_into().unwrap()) as usize;
                let body = &rest[2..];
                if body.len() < count * 8 {
                    return Err(ProgramError::InvalidInstructionData);
                }
                let amounts = body[..count * 8]
                    .chunks_exact(8)
                    .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
                    .collect();
                Ok(Self::RebateBonusBatch { amounts })
            }
            _ => Err(ProgramError::InvalidInstructionData),
        }
    }
}

fn unpack_u64(rest: &[u8]) -> Result<u64, ProgramError> {
    if rest.len() < 8 {
        return Err(ProgramError::InvalidInstructionData);
    }
    Ok(u64::from_le_bytes(rest[0..8].try_into().unwrap()))
}

fn unpack_two_u64(rest: &[u8]) -> Result<(u64, u64), ProgramError> {
    if rest.len() < 16 {
        return Err(ProgramError::InvalidInstructionData);
    }
    Ok((
        u64::from_le_bytes(rest[0..8].try_into().unwrap()),
        u64::from_le_bytes(rest[8..16].try_into().unwrap()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Tag 0: Initialize ──

    #[test]
    fn test_unpack_initialize() {
        let mut data = vec![0u8]; // tag
        data.extend_from_slice(&3u64.to_le_bytes()); // primary weight
        data.extend_from_slice(&1u64.to_le_bytes()); // lp weight
        data.extend_from_slice(&30_000_000_000_000_000_000u128.to_le_bytes()); // 30%
        data.extend_from_slice(&50_000_000_000_000_000u64.to_le_bytes()); // 5% limit
        data.extend_from_slice(&1_000_000_000_000_000_000u64.to_le_bytes()); // 1x
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::Initialize {
                primary_weight,
                lp_weight,
                endowment_percent,
                burn_limit,
                burn_multiplier,
            } => {
                assert_eq!(primary_weight, 3);
                assert_eq!(lp_weight, 1);
                assert_eq!(endowment_percent, 30_000_000_000_000_000_000);
                assert_eq!(burn_limit, 50_000_000_000_000_000);
                assert_eq!(burn_multiplier, 1_000_000_000_000_000_000);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_initialize_too_short() {
        let data = vec![0u8, 1, 2, 3];
        assert!(TreasuryInstruction::unpack(&data).is_err());
    }

    // ── Tag 1: Deposit ──

    #[test]
    fn test_unpack_deposit() {
        let mut data = vec![1u8];
        data.extend_from_slice(&42u64.to_le_bytes());
        data.extend_from_slice(&7u64.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::Deposit { amount_primary, amount_lp } => {
                assert_eq!(amount_primary, 42);
                assert_eq!(amount_lp, 7);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_deposit_truncated() {
        let mut data = vec![1u8];
        data.extend_from_slice(&42u64.to_le_bytes()); // only one amount
        assert!(TreasuryInstruction::unpack(&data).is_err());
    }

    // ── Tag 2: Withdraw ──

    #[test]
    fn test_unpack_withdraw() {
        let mut data = vec![2u8];
        data.extend_from_slice(&999u64.to_le_bytes());
        data.extend_from_slice(&0u64.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::Withdraw { amount_primary, amount_lp } => {
                assert_eq!(amount_primary, 999);
                assert_eq!(amount_lp, 0);
            }
            _ => panic!("wrong variant"),
        }
    }

    // ── Tag 3: EmergencyWithdraw ──

    #[test]
    fn test_unpack_emergency_withdraw() {
        let data = vec![3u8];
        assert!(matches!(
            TreasuryInstruction::unpack(&data).unwrap(),
            TreasuryInstruction::EmergencyWithdraw
        ));
    }

    // ── Tag 4: ReceiveProfit ──

    #[test]
    fn test_unpack_receive_profit() {
        let mut data = vec![4u8];
        data.extend_from_slice(&500u64.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::ReceiveProfit { amount } => assert_eq!(amount, 500),
            _ => panic!("wrong variant"),
        }
    }

    // ── Tags 5/6: SpendBonus / RebateBonus ──

    #[test]
    fn test_unpack_spend_bonus() {
        let mut data = vec![5u8];
        data.extend_from_slice(&123u64.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::SpendBonus { amount } => assert_eq!(amount, 123),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_rebate_bonus() {
        let mut data = vec![6u8];
        data.extend_from_slice(&77u64.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::RebateBonus { amount } => assert_eq!(amount, 77),
            _ => panic!("wrong variant"),
        }
    }

    // ── Tags 7/8: On-behalf stake ops ──

    #[test]
    fn test_unpack_deposit_on_behalf() {
        let mut data = vec![7u8];
        data.extend_from_slice(&10u64.to_le_bytes());
        data.extend_from_slice(&20u64.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::DepositOnBehalf { amount_primary, amount_lp } => {
                assert_eq!(amount_primary, 10);
                assert_eq!(amount_lp, 20);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_withdraw_on_behalf() {
        let mut data = vec![8u8];
        data.extend_from_slice(&0u64.to_le_bytes());
        data.extend_from_slice(&5u64.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::WithdrawOnBehalf { amount_primary, amount_lp } => {
                assert_eq!(amount_primary, 0);
                assert_eq!(amount_lp, 5);
            }
            _ => panic!("wrong variant"),
        }
    }

    // ── Tag 9: ClaimAndBurn ──

    #[test]
    fn test_unpack_claim_and_burn() {
        let mut data = vec![9u8];
        data.extend_from_slice(&1234u64.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::ClaimAndBurn { burn_amount } => assert_eq!(burn_amount, 1234),
            _ => panic!("wrong variant"),
        }
    }

    // ── Tags 10-14: Parameter setters ──

    #[test]
    fn test_unpack_set_endowment_percent() {
        let mut data = vec![10u8];
        data.extend_from_slice(&12345u128.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::SetEndowmentPercent { value } => assert_eq!(value, 12345),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_set_burn_limit() {
        let mut data = vec![11u8];
        data.extend_from_slice(&55u64.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::SetBurnLimit { value } => assert_eq!(value, 55),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_set_burn_multiplier() {
        let mut data = vec![12u8];
        data.extend_from_slice(&66u64.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::SetBurnMultiplier { value } => assert_eq!(value, 66),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_set_pool_weights() {
        let mut data = vec![13u8];
        data.extend_from_slice(&3u64.to_le_bytes());
        data.extend_from_slice(&2u64.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::SetPoolWeights { primary_weight, lp_weight } => {
                assert_eq!(primary_weight, 3);
                assert_eq!(lp_weight, 2);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_set_delegate() {
        let mut data = vec![14u8];
        let key = Pubkey::new_unique();
        data.extend_from_slice(key.as_ref());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::SetDelegate { new_delegate } => assert_eq!(new_delegate, key),
            _ => panic!("wrong variant"),
        }
    }

    // ── Tags 15/16: Emergency transfer ──

    #[test]
    fn test_unpack_set_emergency_transfer() {
        let mut data = vec![15u8];
        data.extend_from_slice(&9999u64.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::SetEmergencyTransfer { amount } => assert_eq!(amount, 9999),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_execute_emergency_transfer() {
        let data = vec![16u8];
        assert!(matches!(
            TreasuryInstruction::unpack(&data).unwrap(),
            TreasuryInstruction::ExecuteEmergencyTransfer
        ));
    }

    // ── Tag 17: RebateBonusBatch ──

    #[test]
    fn test_unpack_rebate_batch() {
        let mut data = vec![17u8];
        data.extend_from_slice(&3u16.to_le_bytes());
        for v in [10u64, 20, 30] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::RebateBonusBatch { amounts } => {
                assert_eq!(amounts, vec![10, 20, 30]);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_rebate_batch_empty() {
        let mut data = vec![17u8];
        data.extend_from_slice(&0u16.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::RebateBonusBatch { amounts } => assert!(amounts.is_empty()),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_rebate_batch_short_body() {
        let mut data = vec![17u8];
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&10u64.to_le_bytes()); // only one of two amounts
        assert!(TreasuryInstruction::unpack(&data).is_err());
    }

    // ── Invalid input ──

    #[test]
    fn test_unpack_invalid_tag() {
        let data = vec![255u8];
        assert!(TreasuryInstruction::unpack(&data).is_err());
    }

    #[test]
    fn test_unpack_empty() {
        let data: Vec<u8> = vec![];
        assert!(TreasuryInstruction::unpack(&data).is_err());
    }

    // ── Boundary: max u64 values ──

    #[test]
    fn test_unpack_max_values() {
        let mut data = vec![4u8]; // ReceiveProfit
        data.extend_from_slice(&u64::MAX.to_le_bytes());
        match TreasuryInstruction::unpack(&data).unwrap() {
            TreasuryInstruction::ReceiveProfit { amount } => assert_eq!(amount, u64::MAX),
            _ => panic!("wrong variant"),
        }
    }
}
