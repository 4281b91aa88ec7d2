// src/decoders/spl_token_decoders/account.rs

use crate::decoders::DecodeError;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use spl_token_2022::{extension::StateWithExtensions, state::Account};

pub const TOKEN_ACCOUNT_LEN: usize = 165;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedSplAccount {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub delegated_amount: u64,
    pub is_frozen: bool,
}

/// Décode les données brutes d'un compte de jeton SPL (ou Token-2022).
pub fn decode_account(address: &Pubkey, data: &[u8]) -> Result<DecodedSplAccount, DecodeError> {
    let state = StateWithExtensions::<Account>::unpack(data)
        .map_err(|e| DecodeError::Token(e.to_string()))?;
    let spl_account = state.base;
    Ok(DecodedSplAccount {
        address: *address,
        mint: spl_account.mint,
        owner: spl_account.owner,
        amount: spl_account.amount,
        delegated_amount: spl_account.delegated_amount,
        is_frozen: spl_account.is_frozen(),
    })
}

#[cfg(test)]
pub(crate) fn legacy_account_data(mint: &Pubkey, owner: &Pubkey, amount: u64) -> Vec<u8> {
    let mut data = vec![0u8; TOKEN_ACCOUNT_LEN];
    data[..32].copy_from_slice(mint.as_ref());
    data[32..64].copy_from_slice(owner.as_ref());
    data[64..72].copy_from_slice(&amount.to_le_bytes());
    // delegate: COption::None (36 octets), puis l'état
    data[108] = 1; // AccountState::Initialized
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_holder_and_amount() {
        let (mint, owner) = (Pubkey::new_unique(), Pubkey::new_unique());
        let account = decode_account(&Pubkey::new_unique(), &legacy_account_data(&mint, &owner, 1)).unwrap();
        assert_eq!(account.mint, mint);
        assert_eq!(account.owner, owner);
        assert_eq!(account.amount, 1);
        assert!(!account.is_frozen);
    }

    #[test]
    fn frozen_state_is_reported() {
        let mut data = legacy_account_data(&Pubkey::new_unique(), &Pubkey::new_unique(), 1);
        data[108] = 2; // AccountState::Frozen
        assert!(decode_account(&Pubkey::new_unique(), &data).unwrap().is_frozen);
    }
}
