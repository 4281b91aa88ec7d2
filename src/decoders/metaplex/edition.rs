// src/decoders/metaplex/edition.rs

use super::{KEY_EDITION_V1, KEY_MASTER_EDITION_V1, KEY_MASTER_EDITION_V2};
use crate::decoders::{DecodeError, anchor::deserialize_prefix};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Compte d'édition : soit une master edition (l'original), soit une copie imprimée.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "edition_type")]
pub enum DecodedEdition {
    MasterEdition { address: Pubkey, supply: u64, max_supply: Option<u64> },
    Edition { address: Pubkey, parent: Pubkey, edition: u64 },
}

impl DecodedEdition {
    pub fn address(&self) -> Pubkey {
        match self {
            DecodedEdition::MasterEdition { address, .. } | DecodedEdition::Edition { address, .. } => *address,
        }
    }

    pub fn is_master(&self) -> bool {
        matches!(self, DecodedEdition::MasterEdition { .. })
    }
}

#[derive(BorshDeserialize, BorshSerialize, Debug)]
struct MasterEditionLayout {
    key: u8,
    supply: u64,
    max_supply: Option<u64>,
}

#[derive(BorshDeserialize, BorshSerialize, Debug)]
struct EditionLayout {
    key: u8,
    parent: [u8; 32],
    edition: u64,
}

pub fn decode_edition(address: &Pubkey, data: &[u8]) -> Result<DecodedEdition, DecodeError> {
    match data.first() {
        // V1 ajoute des mints d'impression après max_supply, on ne les lit pas.
        Some(&KEY_MASTER_EDITION_V1) | Some(&KEY_MASTER_EDITION_V2) => {
            let layout: MasterEditionLayout = deserialize_prefix(data)?;
            Ok(DecodedEdition::MasterEdition {
                address: *address,
                supply: layout.supply,
                max_supply: layout.max_supply,
            })
        }
        Some(&KEY_EDITION_V1) => {
            let layout: EditionLayout = deserialize_prefix(data)?;
            Ok(DecodedEdition::Edition {
                address: *address,
                parent: Pubkey::new_from_array(layout.parent),
                edition: layout.edition,
            })
        }
        Some(&other) => Err(DecodeError::UnsupportedKey(other)),
        None => Err(DecodeError::TooShort { expected: 1, actual: 0 }),
    }
}

#[cfg(test)]
impl DecodedEdition {
    pub(crate) fn to_account_data(&self) -> Vec<u8> {
        let mut data = match self {
            DecodedEdition::MasterEdition { supply, max_supply, .. } => borsh::to_vec(&MasterEditionLayout {
                key: KEY_MASTER_EDITION_V2,
                supply: *supply,
                max_supply: *max_supply,
            }),
            DecodedEdition::Edition { parent, edition, .. } => borsh::to_vec(&EditionLayout {
                key: KEY_EDITION_V1,
                parent: parent.to_bytes(),
                edition: *edition,
            }),
        }
        .expect("sérialisation borsh");
        data.extend_from_slice(&[0u8; 200]);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_master_and_printed_editions() {
        let master = DecodedEdition::MasterEdition { address: Pubkey::new_unique(), supply: 3, max_supply: Some(10) };
        assert_eq!(decode_edition(&master.address(), &master.to_account_data()).unwrap(), master);

        let printed = DecodedEdition::Edition { address: Pubkey::new_unique(), parent: Pubkey::new_unique(), edition: 4 };
        let decoded = decode_edition(&printed.address(), &printed.to_account_data()).unwrap();
        assert_eq!(decoded, printed);
        assert!(!decoded.is_master());
    }

    #[test]
    fn metadata_key_is_not_an_edition() {
        assert!(matches!(
            decode_edition(&Pubkey::new_unique(), &[super::super::KEY_METADATA_V1, 0]),
            Err(DecodeError::UnsupportedKey(4))
        ));
    }
}
