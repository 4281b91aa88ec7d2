// src/programs.rs

use solana_sdk::pubkey::Pubkey;

/// Les programmes on-chain dont nous savons décoder les comptes.
/// Les programmes SPL Token / Token-2022 sont fixes et viennent des crates SPL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramIds {
    pub token_manager: Pubkey,
    pub time_invalidator: Pubkey,
    pub use_invalidator: Pubkey,
    pub paid_claim_approver: Pubkey,
    pub token_metadata: Pubkey,
}

impl ProgramIds {
    pub fn spl_token() -> Pubkey {
        spl_token::id()
    }

    pub fn token_2022() -> Pubkey {
        spl_token_2022::id()
    }

    #[cfg(test)]
    pub fn unique() -> Self {
        Self {
            token_manager: Pubkey::new_unique(),
            time_invalidator: Pubkey::new_unique(),
            use_invalidator: Pubkey::new_unique(),
            paid_claim_approver: Pubkey::new_unique(),
            token_metadata: Pubkey::new_unique(),
        }
    }
}
