//! CPI helpers for calling SPL Token program instructions.
//!
//! We construct raw instruction data manually since we don't depend on
//! spl-token. Instruction tags match TokenInstruction::unpack() in the
//! token program.

use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    instruction::{AccountMeta, Instruction},
    program::{invoke, invoke_signed},
    pubkey::Pubkey,
};

/// The SPL Token program: TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA
pub const TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    6, 221, 246, 225, 215, 101, 161, 147, 217, 203, 225, 70, 206, 235, 121, 172, 28, 180, 133,
    237, 95, 91, 55, 145, 58, 140, 245, 133, 126, 255, 0, 169,
]);

// ═══════════════════════════════════════════════════════════════
// Token instruction tags (from spl-token TokenInstruction)
// ═══════════════════════════════════════════════════════════════

const TAG_INITIALIZE_MINT: u8 = 0;
const TAG_INITIALIZE_ACCOUNT: u8 = 1;
const TAG_TRANSFER: u8 = 3;
const TAG_MINT_TO: u8 = 7;
const TAG_BURN: u8 = 8;

/// SPL token account data offsets (165-byte Account layout).
const TOKEN_ACCOUNT_MINT_OFFSET: usize = 0;
const TOKEN_ACCOUNT_AMOUNT_OFFSET: usize = 64;
/// SPL mint data offset of the u64 supply field (82-byte Mint layout).
const MINT_SUPPLY_OFFSET: usize = 36;

/// Read the balance of an SPL token account without an spl-token dependency.
pub fn token_account_amount(account: &AccountInfo) -> Result<u64, solana_program::program_error::ProgramError> {
    let data = account.try_borrow_data()?;
    if data.len() < TOKEN_ACCOUNT_AMOUNT_OFFSET + 8 {
        return Err(solana_program::program_error::ProgramError::InvalidAccountData);
    }
    let bytes: [u8; 8] = data[TOKEN_ACCOUNT_AMOUNT_OFFSET..TOKEN_ACCOUNT_AMOUNT_OFFSET + 8]
        .try_into()
        .unwrap();
    Ok(u64::from_le_bytes(bytes))
}

/// Read the mint an SPL token account belongs to.
pub fn token_account_mint(account: &AccountInfo) -> Result<[u8; 32], solana_program::program_error::ProgramError> {
    let data = account.try_borrow_data()?;
    if data.len() < TOKEN_ACCOUNT_MINT_OFFSET + 32 {
        return Err(solana_program::program_error::ProgramError::InvalidAccountData);
    }
    let bytes: [u8; 32] = data[TOKEN_ACCOUNT_MINT_OFFSET..TOKEN_ACCOUNT_MINT_OFFSET + 32]
        .try_into()
        .unwrap();
    Ok(bytes)
}

/// Read the global supply of an SPL mint.
pub fn mint_supply(mint: &AccountInfo) -> Result<u64, solana_program::program_error::ProgramError> {
    let data = mint.try_borrow_data()?;
    if data.len() < MINT_SUPPLY_OFFSET + 8 {
        return Err(solana_program::program_error::ProgramError::InvalidAccountData);
    }
    let bytes: [u8; 8] = data[MINT_SUPPLY_OFFSET..MINT_SUPPLY_OFFSET + 8]
        .try_into()
        .unwrap();
    Ok(u64::from_le_bytes(bytes))
}

// ═══════════════════════════════════════════════════════════════
// InitializeMint (Tag 0)
// ═══════════════════════════════════════════════════════════════
// Accounts: [mint(w), rent sysvar]
// Data: tag(1) + decimals(1) + mint_authority(32) + freeze_authority COption(1+32)

pub fn cpi_initialize_mint<'a>(
    token_program: &AccountInfo<'a>,
    mint: &AccountInfo<'a>,
    rent_sysvar: &AccountInfo<'a>,
    mint_authority: &Pubkey,
    decimals: u8,
) -> ProgramResult {
    let mut data = Vec::with_capacity(67);
    data.push(TAG_INITIALIZE_MINT);
    data.push(decimals);
    data.extend_from_slice(mint_authority.as_ref());
    data.push(1); // freeze authority = Some(mint_authority)
    data.extend_from_slice(mint_authority.as_ref());

    let ix = Instruction {
        program_id: *token_program.key,
        accounts: vec![
            AccountMeta::new(*mint.key, false),
            AccountMeta::new_readonly(*rent_sysvar.key, false),
        ],
        data,
    };

    invoke(&ix, &[mint.clone(), rent_sysvar.clone()])
}

// ═══════════════════════════════════════════════════════════════
// InitializeAccount (Tag 1)
// ═══════════════════════════════════════════════════════════════
// Accounts: [account(w), mint, owner, rent sysvar]
// Data: tag(1)

pub fn cpi_initialize_account<'a>(
    token_program: &AccountInfo<'a>,
    account: &AccountInfo<'a>,
    mint: &AccountInfo<'a>,
    owner: &AccountInfo<'a>,
    rent_sysvar: &AccountInfo<'a>,
) -> ProgramResult {
    let ix = Instruction {
        program_id: *token_program.key,
        accounts: vec![
            AccountMeta::new(*account.key, false),
            AccountMeta::new_readonly(*mint.key, false),
            AccountMeta::new_readonly(*owner.key, false),
            AccountMeta::new_readonly(*rent_sysvar.key, false),
        ],
        data: vec![TAG_INITIALIZE_ACCOUNT],
    };

    invoke(
        &ix,
        &[
            account.clone(),
            mint.clone(),
            owner.clone(),
            rent_sysvar.clone(),
        ],
    )
}

// ═══════════════════════════════════════════════════════════════
// Transfer (Tag 3)
// ═══════════════════════════════════════════════════════════════
// Accounts: [source(w), destination(w), authority(signer)]
// Data: tag(1) + amount(8)

fn transfer_instruction(
    token_program: &Pubkey,
    source: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Instruction {
    let mut data = Vec::with_capacity(9);
    data.push(TAG_TRANSFER);
    data.extend_from_slice(&amount.to_le_bytes());

    Instruction {
        program_id: *token_program,
        accounts: vec![
            AccountMeta::new(*source, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data,
    }
}

/// Transfer signed by the owner of the source account (the outer signer).
pub fn cpi_token_transfer<'a>(
    token_program: &AccountInfo<'a>,
    source: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    authority: &AccountInfo<'a>,
    amount: u64,
) -> ProgramResult {
    let ix = transfer_instruction(token_program.key, source.key, destination.key, authority.key, amount);
    invoke(
        &ix,
        &[
            source.clone(),
            destination.clone(),
            authority.clone(),
            token_program.clone(),
        ],
    )
}

/// Transfer out of a vault, signed by the vault authority PDA.
pub fn cpi_token_transfer_signed<'a>(
    token_program: &AccountInfo<'a>,
    source: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    vault_authority: &AccountInfo<'a>,
    amount: u64,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    let ix = transfer_instruction(
        token_program.key,
        source.key,
        destination.key,
        vault_authority.key,
        amount,
    );
    invoke_signed(
        &ix,
        &[
            source.clone(),
            destination.clone(),
            vault_authority.clone(),
            token_program.clone(),
        ],
        &[signer_seeds],
    )
}

// ═══════════════════════════════════════════════════════════════
// MintTo (Tag 7) — bonus mint authority is the vault authority PDA
// ═══════════════════════════════════════════════════════════════
// Accounts: [mint(w), destination(w), mint_authority(signer)]
// Data: tag(1) + amount(8)

pub fn cpi_mint_bonus<'a>(
    token_program: &AccountInfo<'a>,
    mint: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    vault_authority: &AccountInfo<'a>,
    amount: u64,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    let mut data = Vec::with_capacity(9);
    data.push(TAG_MINT_TO);
    data.extend_from_slice(&amount.to_le_bytes());

    let ix = Instruction {
        program_id: *token_program.key,
        accounts: vec![
            AccountMeta::new(*mint.key, false),
            AccountMeta::new(*destination.key, false),
            AccountMeta::new_readonly(*vault_authority.key, true),
        ],
        data,
    };

    invoke_signed(
        &ix,
        &[
            mint.clone(),
            destination.clone(),
            vault_authority.clone(),
            token_program.clone(),
        ],
        &[signer_seeds],
    )
}

// ═══════════════════════════════════════════════════════════════
// Burn (Tag 8) — tier-3 bonus spends
// ═══════════════════════════════════════════════════════════════
// Accounts: [account(w), mint(w), authority(signer)]
// Data: tag(1) + amount(8)
//
// KEY: the authority here is the vault authority PDA acting as the token
// account's APPROVED DELEGATE (the holder runs spl Approve beforehand).
// Without that approval the CPI fails and the whole spend aborts.

pub fn cpi_burn_bonus<'a>(
    token_program: &AccountInfo<'a>,
    account: &AccountInfo<'a>,
    mint: &AccountInfo<'a>,
    vault_authority: &AccountInfo<'a>,
    amount: u64,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    let mut data = Vec::with_capacity(9);
    data.push(TAG_BURN);
    data.extend_from_slice(&amount.to_le_bytes());

    let ix = Instruction {
        program_id: *token_program.key,
        accounts: vec![
            AccountMeta::new(*account.key, false),
            AccountMeta::new(*mint.key, false),
            AccountMeta::new_readonly(*vault_authority.key, true),
        ],
        data,
    };

    invoke_signed(
        &ix,
        &[
            account.clone(),
            mint.clone(),
            vault_authority.clone(),
            token_program.clone(),
        ],
        &[signer_seeds],
    )
}
