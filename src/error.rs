use solana_program::program_error::ProgramError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TreasuryError {
    /// Treasury already initialized for this primary mint
    AlreadyInitialized = 0,
    /// Treasury not initialized
    NotInitialized = 1,
    /// Unauthorized — caller lacks the required capability
    Unauthorized = 2,
    /// Withdraw exceeds the position's staked amount
    InsufficientBalance = 3,
    /// Spend exceeds total claimable bonus (pending + minted)
    InsufficientBonus = 4,
    /// Burn amount exceeds the configured cap
    BurnLimitExceeded = 5,
    /// Bulk operation input shape mismatch
    ArrayLengthMismatch = 6,
    /// Zero amount
    ZeroAmount = 7,
    /// Arithmetic overflow
    Overflow = 8,
    /// Token account or mint mismatch
    InvalidMint = 9,
    /// Invalid PDA derivation
    InvalidPda = 10,
    /// Token program account is not the SPL Token program
    InvalidTokenProgram = 11,
    /// Parameter out of range
    InvalidParameter = 12,
    /// Emergency transfer window has not opened yet
    TimelockNotElapsed = 13,
    /// Emergency transfer window has closed
    TimelockExpired = 14,
    /// No emergency transfer request is pending
    NoEmergencyRequest = 15,
}

impl From<TreasuryError> for ProgramError {
    fn from(e: TreasuryError) -> Self {
        ProgramError::Custom(e as u32)
    }
}
