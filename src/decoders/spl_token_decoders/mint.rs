// src/decoders/spl_token_decoders/mint.rs

use crate::decoders::DecodeError;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use spl_token_2022::{
    extension::{BaseStateWithExtensions, StateWithExtensions},
    extension::transfer_fee::TransferFeeConfig,
    state::Mint,
};

pub const MINT_LEN: usize = 82;

// --- STRUCTURE DE SORTIE PROPRE ---
// Contient les informations que nous extrayons d'un compte de mint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedMint {
    pub address: Pubkey,
    pub supply: u64,
    pub decimals: u8,
    pub transfer_fee_basis_points: u16, // Les frais en points de base (100 = 1%)
    pub max_transfer_fee: u64,          // Le montant maximum de frais prélevables
}

impl DecodedMint {
    /// Un NFT : offre de 1, aucune décimale.
    pub fn is_nft(&self) -> bool {
        self.supply == 1 && self.decimals == 0
    }
}

/// Décode les données brutes d'un compte de mint (SPL Token ou Token-2022)
/// et en extrait les informations essentielles, y compris la taxe de transfert.
pub fn decode_mint(address: &Pubkey, data: &[u8]) -> Result<DecodedMint, DecodeError> {
    // `StateWithExtensions` lit aussi bien les anciens mints que ceux de Token-2022.
    let mint_state = StateWithExtensions::<Mint>::unpack(data)
        .map_err(|e| DecodeError::Token(e.to_string()))?;
    let base_mint = mint_state.base;

    // Si l'extension TransferFee n'existe pas, les frais sont de 0.
    let (transfer_fee_basis_points, max_transfer_fee) =
        match mint_state.get_extension::<TransferFeeConfig>() {
            Ok(config) => (
                config.newer_transfer_fee.transfer_fee_basis_points.into(),
                config.newer_transfer_fee.maximum_fee.into(),
            ),
            Err(_) => (0, 0),
        };

    Ok(DecodedMint {
        address: *address,
        supply: base_mint.supply,
        decimals: base_mint.decimals,
        transfer_fee_basis_points,
        max_transfer_fee,
    })
}

#[cfg(test)]
pub(crate) fn legacy_mint_data(supply: u64, decimals: u8) -> Vec<u8> {
    let mut data = vec![0u8; MINT_LEN];
    // mint_authority: COption::None (tag 0 + 32 octets)
    data[36..44].copy_from_slice(&supply.to_le_bytes());
    data[44] = decimals;
    data[45] = 1; // is_initialized
    data
}
