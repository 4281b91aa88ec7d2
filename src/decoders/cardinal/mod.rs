// src/decoders/cardinal/mod.rs

// Les programmes de location : le token manager (custodie et cycle de vie du NFT),
// ses invalidators (temps / usage) et l'approbateur de claim payant.
pub mod paid_claim_approver;
pub mod time_invalidator;
pub mod token_manager;
pub mod use_invalidator;

pub use paid_claim_approver::DecodedPaidClaimApprover;
pub use time_invalidator::DecodedTimeInvalidator;
pub use token_manager::{
    DecodedTokenManager, InvalidationType, TokenManagerKind, TokenManagerState,
};
pub use use_invalidator::DecodedUseInvalidator;
