// src/decoders/metaplex/metadata.rs

use super::KEY_METADATA_V1;
use crate::decoders::{DecodeError, anchor::deserialize_prefix};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedCreator {
    pub address: Pubkey,
    pub verified: bool,
    pub share: u8,
}

/// Le compte Metadata on-chain : nom, symbole, créateurs et surtout l'URI
/// qui pointe vers le JSON off-chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedMetadata {
    pub address: Pubkey,
    pub update_authority: Pubkey,
    pub mint: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Vec<DecodedCreator>,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
    pub edition_nonce: Option<u8>,
    pub token_standard: Option<u8>,
    pub collection: Option<(Pubkey, bool)>,
}

impl DecodedMetadata {
    pub fn verified_creators(&self) -> impl Iterator<Item = &Pubkey> {
        self.creators.iter().filter(|c| c.verified).map(|c| &c.address)
    }

    /// L'URI sans le rembourrage, `None` si vide.
    pub fn offchain_uri(&self) -> Option<&str> {
        let uri = self.uri.trim();
        if uri.is_empty() { None } else { Some(uri) }
    }
}

#[derive(BorshDeserialize, BorshSerialize, Debug)]
struct CreatorLayout {
    address: [u8; 32],
    verified: bool,
    share: u8,
}

#[derive(BorshDeserialize, BorshSerialize, Debug)]
struct MetadataLayout {
    key: u8,
    update_authority: [u8; 32],
    mint: [u8; 32],
    name: String,
    symbol: String,
    uri: String,
    seller_fee_basis_points: u16,
    creators: Option<Vec<CreatorLayout>>,
    primary_sale_happened: bool,
    is_mutable: bool,
}

// Champs ajoutés au fil des versions du programme ; absents (ou à zéro) sur les anciens comptes.
#[derive(BorshDeserialize, BorshSerialize, Debug, Default)]
struct MetadataTail {
    edition_nonce: Option<u8>,
    token_standard: Option<u8>,
    collection: Option<CollectionLayout>,
}

#[derive(BorshDeserialize, BorshSerialize, Debug)]
struct CollectionLayout {
    verified: bool,
    key: [u8; 32],
}

fn trim_padding(value: String) -> String {
    value.trim_end_matches('\0').to_string()
}

pub fn decode_metadata(address: &Pubkey, data: &[u8]) -> Result<DecodedMetadata, DecodeError> {
    match data.first() {
        Some(&KEY_METADATA_V1) => {}
        Some(&other) => return Err(DecodeError::UnsupportedKey(other)),
        None => return Err(DecodeError::TooShort { expected: 1, actual: 0 }),
    }

    let mut cursor = data;
    let layout = MetadataLayout::deserialize(&mut cursor)?;
    // La queue est optionnelle : un échec ici ne rend pas le compte illisible.
    let tail: MetadataTail = deserialize_prefix(cursor).unwrap_or_default();

    Ok(DecodedMetadata {
        address: *address,
        update_authority: Pubkey::new_from_array(layout.update_authority),
        mint: Pubkey::new_from_array(layout.mint),
        name: trim_padding(layout.name),
        symbol: trim_padding(layout.symbol),
        uri: trim_padding(layout.uri),
        seller_fee_basis_points: layout.seller_fee_basis_points,
        creators: layout
            .creators
            .unwrap_or_default()
            .into_iter()
            .map(|c| DecodedCreator {
                address: Pubkey::new_from_array(c.address),
                verified: c.verified,
                share: c.share,
            })
            .collect(),
        primary_sale_happened: layout.primary_sale_happened,
        is_mutable: layout.is_mutable,
        edition_nonce: tail.edition_nonce,
        token_standard: tail.token_standard,
        collection: tail.collection.map(|c| (Pubkey::new_from_array(c.key), c.verified)),
    })
}

#[cfg(test)]
impl DecodedMetadata {
    pub(crate) fn sample(address: Pubkey, mint: Pubkey, uri: &str) -> Self {
        Self {
            address,
            update_authority: Pubkey::new_unique(),
            mint,
            name: "Rentable #1".to_string(),
            symbol: "RENT".to_string(),
            uri: uri.to_string(),
            seller_fee_basis_points: 500,
            creators: vec![],
            primary_sale_happened: true,
            is_mutable: true,
            edition_nonce: Some(255),
            token_standard: None,
            collection: None,
        }
    }

    /// Encode comme le programme : chaînes rembourrées de zéros et compte plus grand que son contenu.
    pub(crate) fn to_account_data(&self) -> Vec<u8> {
        let pad = |s: &str, len: usize| {
            let mut padded = s.to_string();
            while padded.len() < len {
                padded.push('\0');
            }
            padded
        };
        let layout = MetadataLayout {
            key: KEY_METADATA_V1,
            update_authority: self.update_authority.to_bytes(),
            mint: self.mint.to_bytes(),
            name: pad(&self.name, 32),
            symbol: pad(&self.symbol, 10),
            uri: pad(&self.uri, 200),
            seller_fee_basis_points: self.seller_fee_basis_points,
            creators: if self.creators.is_empty() {
                None
            } else {
                Some(
                    self.creators
                        .iter()
                        .map(|c| CreatorLayout { address: c.address.to_bytes(), verified: c.verified, share: c.share })
                        .collect(),
                )
            },
            primary_sale_happened: self.primary_sale_happened,
            is_mutable: self.is_mutable,
        };
        let tail = MetadataTail {
            edition_nonce: self.edition_nonce,
            token_standard: self.token_standard,
            collection: self.collection.map(|(key, verified)| CollectionLayout { verified, key: key.to_bytes() }),
        };
        let mut data = borsh::to_vec(&layout).expect("sérialisation borsh");
        data.extend(borsh::to_vec(&tail).expect("sérialisation borsh"));
        data.extend_from_slice(&[0u8; 64]);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_is_stripped_from_strings() {
        let mut metadata = DecodedMetadata::sample(Pubkey::new_unique(), Pubkey::new_unique(), "https://example.com/1.json");
        metadata.creators = vec![
            DecodedCreator { address: Pubkey::new_unique(), verified: true, share: 100 },
            DecodedCreator { address: Pubkey::new_unique(), verified: false, share: 0 },
        ];
        metadata.collection = Some((Pubkey::new_unique(), true));

        let decoded = decode_metadata(&metadata.address, &metadata.to_account_data()).unwrap();
        assert_eq!(decoded, metadata);
        assert_eq!(decoded.offchain_uri(), Some("https://example.com/1.json"));
        assert_eq!(decoded.verified_creators().count(), 1);
    }

    #[test]
    fn legacy_account_without_tail_still_decodes() {
        let metadata = DecodedMetadata::sample(Pubkey::new_unique(), Pubkey::new_unique(), "");
        let layout = MetadataLayout {
            key: KEY_METADATA_V1,
            update_authority: metadata.update_authority.to_bytes(),
            mint: metadata.mint.to_bytes(),
            name: metadata.name.clone(),
            symbol: metadata.symbol.clone(),
            uri: String::new(),
            seller_fee_basis_points: 0,
            creators: None,
            primary_sale_happened: false,
            is_mutable: false,
        };
        let data = borsh::to_vec(&layout).unwrap();

        let decoded = decode_metadata(&metadata.address, &data).unwrap();
        assert_eq!(decoded.edition_nonce, None);
        assert_eq!(decoded.offchain_uri(), None);
    }

    #[test]
    fn other_keys_are_rejected() {
        assert!(matches!(
            decode_metadata(&Pubkey::new_unique(), &[super::super::KEY_MASTER_EDITION_V2, 0, 0]),
            Err(DecodeError::UnsupportedKey(6))
        ));
    }
}
