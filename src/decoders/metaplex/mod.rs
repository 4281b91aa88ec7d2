// src/decoders/metaplex/mod.rs

// Le programme Token Metadata héberge plusieurs types de comptes, distingués
// par leur premier octet (`Key`). On les essaie dans l'ordre de priorité.
pub mod edition;
pub mod metadata;

pub use edition::{DecodedEdition, decode_edition};
pub use metadata::{DecodedCreator, DecodedMetadata, decode_metadata};

use crate::decoders::{DecodeError, ParsedAccount};
use solana_sdk::pubkey::Pubkey;

// Valeurs de `Key` (premier octet de chaque compte du programme).
pub const KEY_EDITION_V1: u8 = 1;
pub const KEY_MASTER_EDITION_V1: u8 = 2;
pub const KEY_METADATA_V1: u8 = 4;
pub const KEY_MASTER_EDITION_V2: u8 = 6;

type Candidate = fn(&Pubkey, &[u8]) -> Result<ParsedAccount, DecodeError>;

fn metadata_candidate(address: &Pubkey, data: &[u8]) -> Result<ParsedAccount, DecodeError> {
    decode_metadata(address, data).map(ParsedAccount::Metadata)
}

fn edition_candidate(address: &Pubkey, data: &[u8]) -> Result<ParsedAccount, DecodeError> {
    decode_edition(address, data).map(ParsedAccount::Edition)
}

const CANDIDATES: [Candidate; 2] = [metadata_candidate, edition_candidate];

/// Essaie chaque schéma du programme Token Metadata ; le premier qui parse gagne.
///
/// En cas d'échec, l'erreur rendue est celle du schéma qui reconnaissait la clé :
/// un `UnsupportedKey` d'un autre schéma ne masque pas une erreur de parsing réelle.
pub fn decode_token_metadata_account(address: &Pubkey, data: &[u8]) -> Result<ParsedAccount, DecodeError> {
    let mut error: Option<DecodeError> = None;
    for candidate in CANDIDATES {
        match candidate(address, data) {
            Ok(parsed) => return Ok(parsed),
            Err(DecodeError::UnsupportedKey(_)) if error.is_some() => {}
            Err(e) => error = Some(e),
        }
    }
    Err(error.unwrap_or(DecodeError::TooShort { expected: 1, actual: data.len() }))
}
