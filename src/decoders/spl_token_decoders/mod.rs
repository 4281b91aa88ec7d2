// src/decoders/spl_token_decoders/mod.rs

pub mod account;
pub mod mint;

pub use account::{DecodedSplAccount, TOKEN_ACCOUNT_LEN, decode_account};
pub use mint::{DecodedMint, MINT_LEN, decode_mint};

use crate::decoders::{DecodeError, ParsedAccount};
use solana_sdk::pubkey::Pubkey;

// Token-2022 : au-delà de 165 octets, l'octet 165 porte le type de compte.
const ACCOUNT_TYPE_OFFSET: usize = TOKEN_ACCOUNT_LEN;
const ACCOUNT_TYPE_MINT: u8 = 1;
const ACCOUNT_TYPE_ACCOUNT: u8 = 2;

/// Un même programme héberge les mints et les comptes de jetons : on tranche sur la taille.
pub fn decode_token_program_account(address: &Pubkey, data: &[u8]) -> Result<ParsedAccount, DecodeError> {
    match data.len() {
        MINT_LEN => decode_mint(address, data).map(ParsedAccount::Mint),
        TOKEN_ACCOUNT_LEN => decode_account(address, data).map(ParsedAccount::TokenAccount),
        len if len > TOKEN_ACCOUNT_LEN => match data[ACCOUNT_TYPE_OFFSET] {
            ACCOUNT_TYPE_MINT => decode_mint(address, data).map(ParsedAccount::Mint),
            ACCOUNT_TYPE_ACCOUNT => decode_account(address, data).map(ParsedAccount::TokenAccount),
            other => Err(DecodeError::InvalidEnum { field: "account_type", value: other }),
        },
        len => Err(DecodeError::UnexpectedSize(len)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branches_on_payload_size() {
        let address = Pubkey::new_unique();
        assert!(matches!(
            decode_token_program_account(&address, &mint::legacy_mint_data(1, 0)),
            Ok(ParsedAccount::Mint(_))
        ));
        assert!(matches!(
            decode_token_program_account(&address, &account::legacy_account_data(&Pubkey::new_unique(), &Pubkey::new_unique(), 1)),
            Ok(ParsedAccount::TokenAccount(_))
        ));
        assert!(matches!(
            decode_token_program_account(&address, &[0u8; 100]),
            Err(DecodeError::UnexpectedSize(100))
        ));
    }
}
