use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::invoke_signed,
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    sysvar::{clock::Clock, Sysvar},
};

use crate::cpi;
use crate::error::TreasuryError;
use crate::instruction::TreasuryInstruction;
use crate::math::PERCENT_SCALE;
use crate::state::{
    self, StakePosition, Treasury, STAKE_POSITION_SIZE, TREASURY_SIZE,
};

/// Verify the token program is the real SPL Token program.
/// CRITICAL: Without this check, an attacker can pass a fake token program,
/// receive PDA signer authority via invoke_signed, and drain the vaults.
fn verify_token_program(token_program: &AccountInfo) -> ProgramResult {
    if *token_program.key != cpi::TOKEN_PROGRAM_ID {
        msg!("Error: invalid token program {}", token_program.key);
        return Err(TreasuryError::InvalidTokenProgram.into());
    }
    Ok(())
}

pub fn process(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = TreasuryInstruction::unpack(instruction_data)?;

    match instruction {
        TreasuryInstruction::Initialize {
            primary_weight,
            lp_weight,
            endowment_percent,
            burn_limit,
            burn_multiplier,
        } => process_initialize(
            program_id,
            accounts,
            primary_weight,
            lp_weight,
            endowment_percent,
            burn_limit,
            burn_multiplier,
        ),
        TreasuryInstruction::Deposit { amount_primary, amount_lp } => {
            process_deposit(program_id, accounts, amount_primary, amount_lp)
        }
        TreasuryInstruction::Withdraw { amount_primary, amount_lp } => {
            process_withdraw(program_id, accounts, amount_primary, amount_lp)
        }
        TreasuryInstruction::EmergencyWithdraw => {
            process_emergency_withdraw(program_id, accounts)
        }
        TreasuryInstruction::ReceiveProfit { amount } => {
            process_receive_profit(program_id, accounts, amount)
        }
        TreasuryInstruction::SpendBonus { amount } => {
            process_spend_bonus(program_id, accounts, amount)
        }
        TreasuryInstruction::RebateBonus { amount } => {
            process_rebate_bonus(program_id, accounts, amount)
        }
        TreasuryInstruction::DepositOnBehalf { amount_primary, amount_lp } => {
            process_deposit_on_behalf(program_id, accounts, amount_primary, amount_lp)
        }
        TreasuryInstruction::WithdrawOnBehalf { amount_primary, amount_lp } => {
            process_withdraw_on_behalf(program_id, accounts, amount_primary, amount_lp)
        }
        TreasuryInstruction::ClaimAndBurn { burn_amount } => {
            process_claim_and_burn(program_id, accounts, burn_amount)
        }
        TreasuryInstruction::SetEndowmentPercent { value } => {
            process_set_endowment_percent(program_id, accounts, value)
        }
        TreasuryInstruction::SetBurnLimit { value } => {
            process_set_burn_limit(program_id, accounts, value)
        }
        TreasuryInstruction::SetBurnMultiplier { value } => {
            process_set_burn_multiplier(program_id, accounts, value)
        }
        TreasuryInstruction::SetPoolWeights { primary_weight, lp_weight } => {
            process_set_pool_weights(program_id, accounts, primary_weight, lp_weight)
        }
        TreasuryInstruction::SetDelegate { new_delegate } => {
            process_set_delegate(program_id, accounts, &new_delegate)
        }
        TreasuryInstruction::SetEmergencyTransfer { amount } => {
            process_set_emergency_transfer(program_id, accounts, amount)
        }
        TreasuryInstruction::ExecuteEmergencyTransfer => {
            process_execute_emergency_transfer(program_id, accounts)
        }
        TreasuryInstruction::RebateBonusBatch { amounts } => {
            process_rebate_bonus_batch(program_id, accounts, &amounts)
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Capability and account validation helpers
// ═══════════════════════════════════════════════════════════════

fn expect_initialized(treasury: &Treasury) -> ProgramResult {
    if treasury.is_initialized != 1 {
        return Err(TreasuryError::NotInitialized.into());
    }
    Ok(())
}

/// Finance-admin capability: signer must be the stored admin key.
fn expect_admin(treasury: &Treasury, signer: &AccountInfo) -> ProgramResult {
    if !signer.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    if treasury.admin_pubkey() != *signer.key {
        return Err(TreasuryError::Unauthorized.into());
    }
    Ok(())
}

/// Trusted-operator capability: signer must be the stored delegate key.
fn expect_delegate(treasury: &Treasury, signer: &AccountInfo) -> ProgramResult {
    if !signer.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    if treasury.delegate_pubkey() != *signer.key {
        return Err(TreasuryError::Unauthorized.into());
    }
    Ok(())
}

/// The treasury PDA must be the address derived from its own stored
/// primary mint — rejects program-owned accounts at the wrong address.
fn verify_treasury_pda(
    program_id: &Pubkey,
    treasury_pda: &AccountInfo,
    treasury: &Treasury,
) -> ProgramResult {
    let primary_mint = Pubkey::new_from_array(treasury.primary_mint);
    let (expected, _) = state::derive_treasury_pda(program_id, &primary_mint);
    if *treasury_pda.key != expected {
        return Err(TreasuryError::InvalidPda.into());
    }
    Ok(())
}

fn verify_vault_authority(
    program_id: &Pubkey,
    treasury_key: &Pubkey,
    bump: u8,
    vault_authority: &AccountInfo,
) -> ProgramResult {
    let expected = Pubkey::create_program_address(
        &[b"vault_auth", treasury_key.as_ref(), &[bump]],
        program_id,
    )
    .map_err(|_| ProgramError::from(TreasuryError::InvalidPda))?;
    if *vault_authority.key != expected {
        return Err(TreasuryError::InvalidPda.into());
    }
    Ok(())
}

/// Create the position PDA if it does not exist yet (lazy, zeroed record).
/// Returns the position bump.
fn ensure_position_account<'a>(
    program_id: &Pubkey,
    payer: &AccountInfo<'a>,
    treasury_key: &Pubkey,
    owner_key: &Pubkey,
    position_pda: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
) -> Result<u8, ProgramError> {
    let (expected, bump) = state::derive_position_pda(program_id, treasury_key, owner_key);
    if *position_pda.key != expected {
        return Err(TreasuryError::InvalidPda.into());
    }

    if position_pda.data_is_empty() {
        let seeds: &[&[u8]] = &[
            b"position",
            treasury_key.as_ref(),
            owner_key.as_ref(),
            &[bump],
        ];
        let rent = Rent::get()?;
        invoke_signed(
            &system_instruction::create_account(
                payer.key,
                position_pda.key,
                rent.minimum_balance(STAKE_POSITION_SIZE),
                STAKE_POSITION_SIZE as u64,
                program_id,
            ),
            &[payer.clone(), position_pda.clone(), system_program.clone()],
            &[seeds],
        )?;
    }
    Ok(bump)
}

/// Validate an existing position account against its treasury and owner.
fn verify_position(
    program_id: &Pubkey,
    treasury_key: &Pubkey,
    owner_key: &Pubkey,
    position_pda: &AccountInfo,
    position: &StakePosition,
) -> ProgramResult {
    let (expected, _) = state::derive_position_pda(program_id, treasury_key, owner_key);
    if *position_pda.key != expected {
        return Err(TreasuryError::InvalidPda.into());
    }
    if position.is_initialized != 1
        || position.treasury != treasury_key.to_bytes()
        || position.owner != owner_key.to_bytes()
    {
        return Err(TreasuryError::Unauthorized.into());
    }
    Ok(())
}

/// A token account must belong to the expected mint.
fn verify_token_account_mint(account: &AccountInfo, expected_mint: &[u8; 32]) -> ProgramResult {
    if cpi::token_account_mint(account)? != *expected_mint {
        return Err(TreasuryError::InvalidMint.into());
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 0: Initialize
// ═══════════════════════════════════════════════════════════════

#[allow(clippy::too_many_arguments)]
fn process_initialize(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    primary_weight: u64,
    lp_weight: u64,
    endowment_percent: u128,
    burn_limit: u64,
    burn_multiplier: u64,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let admin = next_account_info(accounts_iter)?;
    let delegate = next_account_info(accounts_iter)?;
    let primary_mint = next_account_info(accounts_iter)?;
    let lp_mint = next_account_info(accounts_iter)?;
    let settlement_mint = next_account_info(accounts_iter)?;
    let bonus_mint = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;
    let primary_vault = next_account_info(accounts_iter)?;
    let lp_vault = next_account_info(accounts_iter)?;
    let settlement_vault = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;
    let system_program = next_account_info(accounts_iter)?;
    let rent_sysvar = next_account_info(accounts_iter)?;

    if !admin.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    if endowment_percent > PERCENT_SCALE {
        return Err(TreasuryError::InvalidParameter.into());
    }

    // Derive and verify treasury PDA
    let (expected_treasury, treasury_bump) =
        state::derive_treasury_pda(program_id, primary_mint.key);
    if *treasury_pda.key != expected_treasury {
        return Err(TreasuryError::InvalidPda.into());
    }
    if !treasury_pda.data_is_empty() {
        return Err(TreasuryError::AlreadyInitialized.into());
    }

    // Derive vault authority
    let (expected_vault_auth, vault_auth_bump) =
        state::derive_vault_authority(program_id, &expected_treasury);
    if *vault_auth.key != expected_vault_auth {
        return Err(TreasuryError::InvalidPda.into());
    }

    // Validate token program BEFORE any invoke_signed that grants PDA signer authority
    verify_token_program(token_program)?;

    // Create treasury PDA account
    let rent = Rent::from_account_info(rent_sysvar)?;
    let treasury_seeds: &[&[u8]] = &[b"treasury", primary_mint.key.as_ref(), &[treasury_bump]];
    invoke_signed(
        &system_instruction::create_account(
            admin.key,
            treasury_pda.key,
            rent.minimum_balance(TREASURY_SIZE),
            TREASURY_SIZE as u64,
            program_id,
        ),
        &[admin.clone(), treasury_pda.clone(), system_program.clone()],
        &[treasury_seeds],
    )?;

    // Create bonus mint (authority = vault_auth PDA)
    cpi::cpi_initialize_mint(token_program, bonus_mint, rent_sysvar, vault_auth.key, 6)?;

    // Initialize the three vaults (authority = vault_auth PDA)
    cpi::cpi_initialize_account(token_program, primary_vault, primary_mint, vault_auth, rent_sysvar)?;
    cpi::cpi_initialize_account(token_program, lp_vault, lp_mint, vault_auth, rent_sysvar)?;
    cpi::cpi_initialize_account(
        token_program,
        settlement_vault,
        settlement_mint,
        vault_auth,
        rent_sysvar,
    )?;

    // Write treasury state
    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);

    treasury.is_initialized = 1;
    treasury.bump = treasury_bump;
    treasury.vault_authority_bump = vault_auth_bump;
    treasury.admin = admin.key.to_bytes();
    treasury.delegate = delegate.key.to_bytes();
    treasury.primary_mint = primary_mint.key.to_bytes();
    treasury.lp_mint = lp_mint.key.to_bytes();
    treasury.settlement_mint = settlement_mint.key.to_bytes();
    treasury.bonus_mint = bonus_mint.key.to_bytes();
    treasury.primary_vault = primary_vault.key.to_bytes();
    treasury.lp_vault = lp_vault.key.to_bytes();
    treasury.settlement_vault = settlement_vault.key.to_bytes();
    treasury.pools[state::POOL_PRIMARY].weight = primary_weight;
    treasury.pools[state::POOL_LP].weight = lp_weight;
    treasury.endowment_percent = endowment_percent;
    treasury.burn_limit = burn_limit;
    treasury.burn_multiplier = burn_multiplier;

    msg!("Treasury initialized for primary mint {}", primary_mint.key);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 1: Deposit / 7: DepositOnBehalf
// ═══════════════════════════════════════════════════════════════

fn process_deposit(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount_primary: u64,
    amount_lp: u64,
) -> ProgramResult {
    if amount_primary == 0 && amount_lp == 0 {
        return Err(TreasuryError::ZeroAmount.into());
    }

    let accounts_iter = &mut accounts.iter();

    let owner = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;
    let position_pda = next_account_info(accounts_iter)?;
    let owner_primary_ata = next_account_info(accounts_iter)?;
    let primary_vault = next_account_info(accounts_iter)?;
    let owner_lp_ata = next_account_info(accounts_iter)?;
    let lp_vault = next_account_info(accounts_iter)?;
    let bonus_mint = next_account_info(accounts_iter)?;
    let owner_bonus_ata = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;
    let system_program = next_account_info(accounts_iter)?;

    if !owner.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    verify_token_program(token_program)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);

    expect_initialized(treasury)?;
    verify_treasury_pda(program_id, treasury_pda, treasury)?;
    if treasury.primary_vault != primary_vault.key.to_bytes()
        || treasury.lp_vault != lp_vault.key.to_bytes()
    {
        return Err(TreasuryError::InvalidPda.into());
    }
    if treasury.bonus_mint != bonus_mint.key.to_bytes() {
        return Err(TreasuryError::InvalidMint.into());
    }
    verify_vault_authority(
        program_id,
        treasury_pda.key,
        treasury.vault_authority_bump,
        vault_auth,
    )?;

    let position_bump = ensure_position_account(
        program_id,
        owner,
        treasury_pda.key,
        owner.key,
        position_pda,
        system_program,
    )?;

    let mut position_data = position_pda.try_borrow_mut_data()?;
    let position: &mut StakePosition =
        bytemuck::from_bytes_mut(&mut position_data[..STAKE_POSITION_SIZE]);
    if position.is_initialized == 0 {
        position.is_initialized = 1;
        position.bump = position_bump;
        position.treasury = treasury_pda.key.to_bytes();
        position.owner = owner.key.to_bytes();
    }
    verify_position(program_id, treasury_pda.key, owner.key, position_pda, position)?;

    let bonus_to_mint = treasury.deposit(position, amount_primary, amount_lp)?;

    // Transfer staked assets: owner ATAs → vaults
    if amount_primary > 0 {
        cpi::cpi_token_transfer(token_program, owner_primary_ata, primary_vault, owner, amount_primary)?;
    }
    if amount_lp > 0 {
        cpi::cpi_token_transfer(token_program, owner_lp_ata, lp_vault, owner, amount_lp)?;
    }

    // Mint settled bonus to the owner
    if bonus_to_mint > 0 {
        let vault_auth_seeds: &[&[u8]] = &[
            b"vault_auth",
            treasury_pda.key.as_ref(),
            &[treasury.vault_authority_bump],
        ];
        cpi::cpi_mint_bonus(
            token_program,
            bonus_mint,
            owner_bonus_ata,
            vault_auth,
            bonus_to_mint,
            vault_auth_seeds,
        )?;
    }

    msg!(
        "Deposited {} primary / {} LP, settled {} bonus",
        amount_primary,
        amount_lp,
        bonus_to_mint,
    );
    Ok(())
}

fn process_deposit_on_behalf(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount_primary: u64,
    amount_lp: u64,
) -> ProgramResult {
    if amount_primary == 0 && amount_lp == 0 {
        return Err(TreasuryError::ZeroAmount.into());
    }

    let accounts_iter = &mut accounts.iter();

    let delegate = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;
    let owner = next_account_info(accounts_iter)?;
    let position_pda = next_account_info(accounts_iter)?;
    let bonus_mint = next_account_info(accounts_iter)?;
    let owner_bonus_ata = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;
    let system_program = next_account_info(accounts_iter)?;

    verify_token_program(token_program)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);

    expect_initialized(treasury)?;
    expect_delegate(treasury, delegate)?;
    verify_treasury_pda(program_id, treasury_pda, treasury)?;
    if treasury.bonus_mint != bonus_mint.key.to_bytes() {
        return Err(TreasuryError::InvalidMint.into());
    }
    verify_vault_authority(
        program_id,
        treasury_pda.key,
        treasury.vault_authority_bump,
        vault_auth,
    )?;

    let position_bump = ensure_position_account(
        program_id,
        delegate,
        treasury_pda.key,
        owner.key,
        position_pda,
        system_program,
    )?;

    let mut position_data = position_pda.try_borrow_mut_data()?;
    let position: &mut StakePosition =
        bytemuck::from_bytes_mut(&mut position_data[..STAKE_POSITION_SIZE]);
    if position.is_initialized == 0 {
        position.is_initialized = 1;
        position.bump = position_bump;
        position.treasury = treasury_pda.key.to_bytes();
        position.owner = owner.key.to_bytes();
    }
    verify_position(program_id, treasury_pda.key, owner.key, position_pda, position)?;

    // Asset transfer already performed off-band — record the stake only
    let bonus_to_mint = treasury.deposit(position, amount_primary, amount_lp)?;

    if bonus_to_mint > 0 {
        let vault_auth_seeds: &[&[u8]] = &[
            b"vault_auth",
            treasury_pda.key.as_ref(),
            &[treasury.vault_authority_bump],
        ];
        cpi::cpi_mint_bonus(
            token_program,
            bonus_mint,
            owner_bonus_ata,
            vault_auth,
            bonus_to_mint,
            vault_auth_seeds,
        )?;
    }

    msg!(
        "Recorded on-behalf deposit of {} primary / {} LP for {}",
        amount_primary,
        amount_lp,
        owner.key,
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 2: Withdraw / 8: WithdrawOnBehalf
// ═══════════════════════════════════════════════════════════════

fn process_withdraw(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount_primary: u64,
    amount_lp: u64,
) -> ProgramResult {
    if amount_primary == 0 && amount_lp == 0 {
        return Err(TreasuryError::ZeroAmount.into());
    }

    let accounts_iter = &mut accounts.iter();

    let owner = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;
    let position_pda = next_account_info(accounts_iter)?;
    let primary_vault = next_account_info(accounts_iter)?;
    let owner_primary_ata = next_account_info(accounts_iter)?;
    let lp_vault = next_account_info(accounts_iter)?;
    let owner_lp_ata = next_account_info(accounts_iter)?;
    let bonus_mint = next_account_info(accounts_iter)?;
    let owner_bonus_ata = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;

    if !owner.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    verify_token_program(token_program)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);

    expect_initialized(treasury)?;
    verify_treasury_pda(program_id, treasury_pda, treasury)?;
    if treasury.primary_vault != primary_vault.key.to_bytes()
        || treasury.lp_vault != lp_vault.key.to_bytes()
    {
        return Err(TreasuryError::InvalidPda.into());
    }
    if treasury.bonus_mint != bonus_mint.key.to_bytes() {
        return Err(TreasuryError::InvalidMint.into());
    }
    verify_vault_authority(
        program_id,
        treasury_pda.key,
        treasury.vault_authority_bump,
        vault_auth,
    )?;

    let mut position_data = position_pda.try_borrow_mut_data()?;
    let position: &mut StakePosition =
        bytemuck::from_bytes_mut(&mut position_data[..STAKE_POSITION_SIZE]);
    verify_position(program_id, treasury_pda.key, owner.key, position_pda, position)?;

    let bonus_to_mint = treasury.withdraw(position, amount_primary, amount_lp)?;

    let vault_auth_seeds: &[&[u8]] = &[
        b"vault_auth",
        treasury_pda.key.as_ref(),
        &[treasury.vault_authority_bump],
    ];

    // Transfer staked assets: vaults → owner ATAs
    if amount_primary > 0 {
        cpi::cpi_token_transfer_signed(
            token_program,
            primary_vault,
            owner_primary_ata,
            vault_auth,
            amount_primary,
            vault_auth_seeds,
        )?;
    }
    if amount_lp > 0 {
        cpi::cpi_token_transfer_signed(
            token_program,
            lp_vault,
            owner_lp_ata,
            vault_auth,
            amount_lp,
            vault_auth_seeds,
        )?;
    }

    if bonus_to_mint > 0 {
        cpi::cpi_mint_bonus(
            token_program,
            bonus_mint,
            owner_bonus_ata,
            vault_auth,
            bonus_to_mint,
            vault_auth_seeds,
        )?;
    }

    msg!(
        "Withdrew {} primary / {} LP, settled {} bonus",
        amount_primary,
        amount_lp,
        bonus_to_mint,
    );
    Ok(())
}

fn process_withdraw_on_behalf(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount_primary: u64,
    amount_lp: u64,
) -> ProgramResult {
    if amount_primary == 0 && amount_lp == 0 {
        return Err(TreasuryError::ZeroAmount.into());
    }

    let accounts_iter = &mut accounts.iter();

    let delegate = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;
    let owner = next_account_info(accounts_iter)?;
    let position_pda = next_account_info(accounts_iter)?;
    let bonus_mint = next_account_info(accounts_iter)?;
    let owner_bonus_ata = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;

    verify_token_program(token_program)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);

    expect_initialized(treasury)?;
    expect_delegate(treasury, delegate)?;
    verify_treasury_pda(program_id, treasury_pda, treasury)?;
    if treasury.bonus_mint != bonus_mint.key.to_bytes() {
        return Err(TreasuryError::InvalidMint.into());
    }
    verify_vault_authority(
        program_id,
        treasury_pda.key,
        treasury.vault_authority_bump,
        vault_auth,
    )?;

    let mut position_data = position_pda.try_borrow_mut_data()?;
    let position: &mut StakePosition =
        bytemuck::from_bytes_mut(&mut position_data[..STAKE_POSITION_SIZE]);
    verify_position(program_id, treasury_pda.key, owner.key, position_pda, position)?;

    // Asset transfer handled off-band — unstake the records only
    let bonus_to_mint = treasury.withdraw(position, amount_primary, amount_lp)?;

    if bonus_to_mint > 0 {
        let vault_auth_seeds: &[&[u8]] = &[
            b"vault_auth",
            treasury_pda.key.as_ref(),
            &[treasury.vault_authority_bump],
        ];
        cpi::cpi_mint_bonus(
            token_program,
            bonus_mint,
            owner_bonus_ata,
            vault_auth,
            bonus_to_mint,
            vault_auth_seeds,
        )?;
    }

    msg!(
        "Recorded on-behalf withdrawal of {} primary / {} LP for {}",
        amount_primary,
        amount_lp,
        owner.key,
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 3: EmergencyWithdraw
// ═══════════════════════════════════════════════════════════════

fn process_emergency_withdraw(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let owner = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;
    let position_pda = next_account_info(accounts_iter)?;
    let primary_vault = next_account_info(accounts_iter)?;
    let owner_primary_ata = next_account_info(accounts_iter)?;
    let lp_vault = next_account_info(accounts_iter)?;
    let owner_lp_ata = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;

    if !owner.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    verify_token_program(token_program)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);

    expect_initialized(treasury)?;
    verify_treasury_pda(program_id, treasury_pda, treasury)?;
    if treasury.primary_vault != primary_vault.key.to_bytes()
        || treasury.lp_vault != lp_vault.key.to_bytes()
    {
        return Err(TreasuryError::InvalidPda.into());
    }
    verify_vault_authority(
        program_id,
        treasury_pda.key,
        treasury.vault_authority_bump,
        vault_auth,
    )?;

    let mut position_data = position_pda.try_borrow_mut_data()?;
    let position: &mut StakePosition =
        bytemuck::from_bytes_mut(&mut position_data[..STAKE_POSITION_SIZE]);
    verify_position(program_id, treasury_pda.key, owner.key, position_pda, position)?;

    // No settlement — pending bonus is forfeited
    let (amount_primary, amount_lp) = treasury.emergency_withdraw(position)?;

    let vault_auth_seeds: &[&[u8]] = &[
        b"vault_auth",
        treasury_pda.key.as_ref(),
        &[treasury.vault_authority_bump],
    ];
    if amount_primary > 0 {
        cpi::cpi_token_transfer_signed(
            token_program,
            primary_vault,
            owner_primary_ata,
            vault_auth,
            amount_primary,
            vault_auth_seeds,
        )?;
    }
    if amount_lp > 0 {
        cpi::cpi_token_transfer_signed(
            token_program,
            lp_vault,
            owner_lp_ata,
            vault_auth,
            amount_lp,
            vault_auth_seeds,
        )?;
    }

    msg!(
        "Emergency withdrawal: {} primary / {} LP returned, rewards forfeited",
        amount_primary,
        amount_lp,
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 4: ReceiveProfit
// ═══════════════════════════════════════════════════════════════

fn process_receive_profit(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount: u64,
) -> ProgramResult {
    if amount == 0 {
        return Err(TreasuryError::ZeroAmount.into());
    }

    let accounts_iter = &mut accounts.iter();

    let payer = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;
    let payer_settlement_ata = next_account_info(accounts_iter)?;
    let settlement_vault = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;

    if !payer.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    verify_token_program(token_program)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);

    expect_initialized(treasury)?;
    verify_treasury_pda(program_id, treasury_pda, treasury)?;
    if treasury.settlement_vault != settlement_vault.key.to_bytes() {
        return Err(TreasuryError::InvalidPda.into());
    }

    treasury.receive_profit(amount)?;

    cpi::cpi_token_transfer(token_program, payer_settlement_ata, settlement_vault, payer, amount)?;

    msg!(
        "Profit {} received: endowment {} / bonus {}",
        amount,
        treasury.endowment_balance,
        treasury.bonus_balance,
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 5: SpendBonus
// ═══════════════════════════════════════════════════════════════

fn process_spend_bonus(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
    if amount == 0 {
        return Err(TreasuryError::ZeroAmount.into());
    }

    let accounts_iter = &mut accounts.iter();

    let delegate = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;
    let owner = next_account_info(accounts_iter)?;
    let position_pda = next_account_info(accounts_iter)?;
    let bonus_mint = next_account_info(accounts_iter)?;
    let owner_bonus_ata = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;

    verify_token_program(token_program)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);

    expect_initialized(treasury)?;
    expect_delegate(treasury, delegate)?;
    verify_treasury_pda(program_id, treasury_pda, treasury)?;
    if treasury.bonus_mint != bonus_mint.key.to_bytes() {
        return Err(TreasuryError::InvalidMint.into());
    }
    verify_token_account_mint(owner_bonus_ata, &treasury.bonus_mint)?;
    verify_vault_authority(
        program_id,
        treasury_pda.key,
        treasury.vault_authority_bump,
        vault_auth,
    )?;

    let mut position_data = position_pda.try_borrow_mut_data()?;
    let position: &mut StakePosition =
        bytemuck::from_bytes_mut(&mut position_data[..STAKE_POSITION_SIZE]);
    verify_position(program_id, treasury_pda.key, owner.key, position_pda, position)?;

    let minted_balance = cpi::token_account_amount(owner_bonus_ata)?;
    let plan = treasury.spend_bonus(position, minted_balance, amount)?;

    if plan.burn_minted > 0 {
        let vault_auth_seeds: &[&[u8]] = &[
            b"vault_auth",
            treasury_pda.key.as_ref(),
            &[treasury.vault_authority_bump],
        ];
        cpi::cpi_burn_bonus(
            token_program,
            owner_bonus_ata,
            bonus_mint,
            vault_auth,
            plan.burn_minted,
            vault_auth_seeds,
        )?;
    }

    msg!(
        "Spent {} bonus for {}: {} LP pending / {} primary pending / {} burned",
        amount,
        owner.key,
        plan.lp_draw,
        plan.primary_draw,
        plan.burn_minted,
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 6: RebateBonus / 17: RebateBonusBatch
// ═══════════════════════════════════════════════════════════════

fn process_rebate_bonus(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
    if amount == 0 {
        return Err(TreasuryError::ZeroAmount.into());
    }

    let accounts_iter = &mut accounts.iter();

    let delegate = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;
    let bonus_mint = next_account_info(accounts_iter)?;
    let owner_bonus_ata = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;

    verify_token_program(token_program)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);

    expect_initialized(treasury)?;
    expect_delegate(treasury, delegate)?;
    verify_treasury_pda(program_id, treasury_pda, treasury)?;
    if treasury.bonus_mint != bonus_mint.key.to_bytes() {
        return Err(TreasuryError::InvalidMint.into());
    }
    verify_token_account_mint(owner_bonus_ata, &treasury.bonus_mint)?;
    verify_vault_authority(
        program_id,
        treasury_pda.key,
        treasury.vault_authority_bump,
        vault_auth,
    )?;

    treasury.rebate_bonus(amount)?;

    let vault_auth_seeds: &[&[u8]] = &[
        b"vault_auth",
        treasury_pda.key.as_ref(),
        &[treasury.vault_authority_bump],
    ];
    cpi::cpi_mint_bonus(token_program, bonus_mint, owner_bonus_ata, vault_auth, amount, vault_auth_seeds)?;

    msg!("Rebated {} bonus", amount);
    Ok(())
}

fn process_rebate_bonus_batch(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amounts: &[u64],
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let delegate = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;
    let bonus_mint = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;
    let recipients: Vec<&AccountInfo> = accounts_iter.collect();

    // Input shape must match: one recipient account per amount
    if recipients.len() != amounts.len() {
        return Err(TreasuryError::ArrayLengthMismatch.into());
    }
    if amounts.is_empty() {
        return Err(TreasuryError::ZeroAmount.into());
    }
    verify_token_program(token_program)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);

    expect_initialized(treasury)?;
    expect_delegate(treasury, delegate)?;
    verify_treasury_pda(program_id, treasury_pda, treasury)?;
    if treasury.bonus_mint != bonus_mint.key.to_bytes() {
        return Err(TreasuryError::InvalidMint.into());
    }
    verify_vault_authority(
        program_id,
        treasury_pda.key,
        treasury.vault_authority_bump,
        vault_auth,
    )?;

    let mut total = 0u64;
    for (&recipient, &amount) in recipients.iter().zip(amounts) {
        if amount == 0 {
            return Err(TreasuryError::ZeroAmount.into());
        }
        verify_token_account_mint(recipient, &treasury.bonus_mint)?;
        total = total.checked_add(amount).ok_or(TreasuryError::Overflow)?;
    }
    treasury.rebate_bonus(total)?;

    let vault_auth_seeds: &[&[u8]] = &[
        b"vault_auth",
        treasury_pda.key.as_ref(),
        &[treasury.vault_authority_bump],
    ];
    for (&recipient, &amount) in recipients.iter().zip(amounts) {
        cpi::cpi_mint_bonus(token_program, bonus_mint, recipient, vault_auth, amount, vault_auth_seeds)?;
    }

    msg!("Rebated {} bonus across {} accounts", total, amounts.len());
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 9: ClaimAndBurn
// ═══════════════════════════════════════════════════════════════

fn process_claim_and_burn(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    burn_amount: u64,
) -> ProgramResult {
    if burn_amount == 0 {
        return Err(TreasuryError::ZeroAmount.into());
    }

    let accounts_iter = &mut accounts.iter();

    let delegate = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;
    let beneficiary = next_account_info(accounts_iter)?;
    let position_pda = next_account_info(accounts_iter)?;
    let bonus_mint = next_account_info(accounts_iter)?;
    let beneficiary_bonus_ata = next_account_info(accounts_iter)?;
    let settlement_vault = next_account_info(accounts_iter)?;
    let beneficiary_settlement_ata = next_account_info(accounts_iter)?;
    let primary_mint = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;

    verify_token_program(token_program)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);

    expect_initialized(treasury)?;
    expect_delegate(treasury, delegate)?;
    verify_treasury_pda(program_id, treasury_pda, treasury)?;
    if treasury.primary_mint != primary_mint.key.to_bytes()
        || treasury.bonus_mint != bonus_mint.key.to_bytes()
    {
        return Err(TreasuryError::InvalidMint.into());
    }
    if treasury.settlement_vault != settlement_vault.key.to_bytes() {
        return Err(TreasuryError::InvalidPda.into());
    }
    verify_token_account_mint(beneficiary_bonus_ata, &treasury.bonus_mint)?;
    verify_vault_authority(
        program_id,
        treasury_pda.key,
        treasury.vault_authority_bump,
        vault_auth,
    )?;

    let mut position_data = position_pda.try_borrow_mut_data()?;
    let position: &mut StakePosition =
        bytemuck::from_bytes_mut(&mut position_data[..STAKE_POSITION_SIZE]);
    verify_position(program_id, treasury_pda.key, beneficiary.key, position_pda, position)?;

    // The global primary supply scales the endowment share
    let primary_supply = cpi::mint_supply(primary_mint)?;
    let minted_balance = cpi::token_account_amount(beneficiary_bonus_ata)?;

    let outcome = treasury.claim_and_burn(position, minted_balance, primary_supply, burn_amount)?;

    let vault_auth_seeds: &[&[u8]] = &[
        b"vault_auth",
        treasury_pda.key.as_ref(),
        &[treasury.vault_authority_bump],
    ];
    if outcome.burn_from_minted > 0 {
        cpi::cpi_burn_bonus(
            token_program,
            beneficiary_bonus_ata,
            bonus_mint,
            vault_auth,
            outcome.burn_from_minted,
            vault_auth_seeds,
        )?;
    }
    if outcome.payout > 0 {
        cpi::cpi_token_transfer_signed(
            token_program,
            settlement_vault,
            beneficiary_settlement_ata,
            vault_auth,
            outcome.payout,
            vault_auth_seeds,
        )?;
    }

    msg!(
        "Burn {} redeemed for {}: endowment {} + bonus {}",
        burn_amount,
        beneficiary.key,
        outcome.endowment_portion,
        outcome.bonus_portion,
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 10-14: Parameter setters
// ═══════════════════════════════════════════════════════════════

/// Common prologue for admin-gated treasury updates.
fn admin_treasury(
    program_id: &Pubkey,
    admin: &AccountInfo,
    treasury_pda: &AccountInfo,
) -> Result<(), ProgramError> {
    let treasury_data = treasury_pda.try_borrow_data()?;
    let treasury: &Treasury = bytemuck::from_bytes(&treasury_data[..TREASURY_SIZE]);
    expect_initialized(treasury)?;
    expect_admin(treasury, admin)?;
    verify_treasury_pda(program_id, treasury_pda, treasury)?;
    Ok(())
}

fn process_set_endowment_percent(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    value: u128,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();
    let admin = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;

    if value > PERCENT_SCALE {
        return Err(TreasuryError::InvalidParameter.into());
    }
    admin_treasury(program_id, admin, treasury_pda)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);
    treasury.endowment_percent = value;

    msg!("Endowment percent set to {}", value);
    Ok(())
}

fn process_set_burn_limit(program_id: &Pubkey, accounts: &[AccountInfo], value: u64) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();
    let admin = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;

    admin_treasury(program_id, admin, treasury_pda)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);
    treasury.burn_limit = value;

    msg!("Burn limit set to {}", value);
    Ok(())
}

fn process_set_burn_multiplier(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    value: u64,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();
    let admin = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;

    admin_treasury(program_id, admin, treasury_pda)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);
    treasury.burn_multiplier = value;

    msg!("Burn multiplier set to {}", value);
    Ok(())
}

fn process_set_pool_weights(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    primary_weight: u64,
    lp_weight: u64,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();
    let admin = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;

    admin_treasury(program_id, admin, treasury_pda)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);
    treasury.pools[state::POOL_PRIMARY].weight = primary_weight;
    treasury.pools[state::POOL_LP].weight = lp_weight;

    msg!("Pool weights set to {} / {}", primary_weight, lp_weight);
    Ok(())
}

fn process_set_delegate(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    new_delegate: &Pubkey,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();
    let admin = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;

    admin_treasury(program_id, admin, treasury_pda)?;

    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);
    treasury.delegate = new_delegate.to_bytes();

    msg!("Delegate rotated to {}", new_delegate);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 15/16: Emergency transfer (timelocked fund recovery)
// ═══════════════════════════════════════════════════════════════

fn process_set_emergency_transfer(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount: u64,
) -> ProgramResult {
    if amount == 0 {
        return Err(TreasuryError::ZeroAmount.into());
    }

    let accounts_iter = &mut accounts.iter();
    let admin = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;
    let source = next_account_info(accounts_iter)?;
    let destination = next_account_info(accounts_iter)?;
    let clock_sysvar = next_account_info(accounts_iter)?;

    admin_treasury(program_id, admin, treasury_pda)?;

    let clock = Clock::from_account_info(clock_sysvar)?;
    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);

    treasury.set_emergency_transfer(
        source.key.to_bytes(),
        destination.key.to_bytes(),
        amount,
        clock.unix_timestamp,
    );

    msg!(
        "Emergency transfer of {} queued, executable after 24h for 48h",
        amount,
    );
    Ok(())
}

fn process_execute_emergency_transfer(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();
    let admin = next_account_info(accounts_iter)?;
    let treasury_pda = next_account_info(accounts_iter)?;
    let source = next_account_info(accounts_iter)?;
    let destination = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;
    let clock_sysvar = next_account_info(accounts_iter)?;

    verify_token_program(token_program)?;
    admin_treasury(program_id, admin, treasury_pda)?;

    let clock = Clock::from_account_info(clock_sysvar)?;
    let mut treasury_data = treasury_pda.try_borrow_mut_data()?;
    let treasury: &mut Treasury = bytemuck::from_bytes_mut(&mut treasury_data[..TREASURY_SIZE]);

    verify_vault_authority(
        program_id,
        treasury_pda.key,
        treasury.vault_authority_bump,
        vault_auth,
    )?;

    // All preconditions — including the account match — before any mutation
    if treasury.emergency_set_at == 0 {
        return Err(TreasuryError::NoEmergencyRequest.into());
    }
    if treasury.emergency_token != source.key.to_bytes()
        || treasury.emergency_destination != destination.key.to_bytes()
    {
        return Err(TreasuryError::InvalidPda.into());
    }
    let (_, _, amount) = treasury.execute_emergency_transfer(clock.unix_timestamp)?;

    let vault_auth_seeds: &[&[u8]] = &[
        b"vault_auth",
        treasury_pda.key.as_ref(),
        &[treasury.vault_authority_bump],
    ];
    cpi::cpi_token_transfer_signed(
        token_program,
        source,
        destination,
        vault_auth,
        amount,
        vault_auth_seeds,
    )?;

    msg!("Emergency transfer of {} executed", amount);
    Ok(())
}
