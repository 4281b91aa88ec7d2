// src/decoders/cardinal/paid_claim_approver.rs

use crate::decoders::{DecodeError, anchor::strip_discriminator};
use bytemuck::{Pod, Zeroable, from_bytes};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

pub const ACCOUNT_NAME: &str = "PaidClaimApprover";

// --- STRUCTURE DE SORTIE PROPRE ---
// Le prix à payer pour réclamer la location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedPaidClaimApprover {
    pub address: Pubkey,
    pub bump: u8,
    pub payment_amount: u64,
    pub payment_mint: Pubkey,
    pub payment_manager: Pubkey,
    pub collector: Pubkey,
    pub token_manager: Pubkey,
}

// --- STRUCTURE DE DONNÉES BRUTES (taille fixe, lue sans copie) ---
#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
struct PaidClaimApproverData {
    pub bump: u8,
    pub payment_amount: u64,
    pub payment_mint: [u8; 32],
    pub payment_manager: [u8; 32],
    pub collector: [u8; 32],
    pub token_manager: [u8; 32],
}

/// Tente de décoder les données brutes d'un compte PaidClaimApprover.
pub fn decode_paid_claim_approver(address: &Pubkey, data: &[u8]) -> Result<DecodedPaidClaimApprover, DecodeError> {
    // Étape 1: Vérifier le discriminator
    let data_slice = strip_discriminator(data, ACCOUNT_NAME)?;

    // Étape 2: Vérifier que les données sont AU MOINS assez longues.
    let size = std::mem::size_of::<PaidClaimApproverData>();
    if data_slice.len() < size {
        return Err(DecodeError::TooShort { expected: size, actual: data_slice.len() });
    }

    // Étape 3: "Caster" les données
    let approver: &PaidClaimApproverData = from_bytes(&data_slice[..size]);

    Ok(DecodedPaidClaimApprover {
        address: *address,
        bump: approver.bump,
        payment_amount: approver.payment_amount,
        payment_mint: Pubkey::new_from_array(approver.payment_mint),
        payment_manager: Pubkey::new_from_array(approver.payment_manager),
        collector: Pubkey::new_from_array(approver.collector),
        token_manager: Pubkey::new_from_array(approver.token_manager),
    })
}

#[cfg(test)]
impl DecodedPaidClaimApprover {
    pub(crate) fn sample(address: Pubkey, token_manager: Pubkey, payment_mint: Pubkey) -> Self {
        Self {
            address,
            bump: 252,
            payment_amount: 5_000_000,
            payment_mint,
            payment_manager: Pubkey::new_unique(),
            collector: Pubkey::new_unique(),
            token_manager,
        }
    }

    pub(crate) fn to_account_data(&self) -> Vec<u8> {
        let raw = PaidClaimApproverData {
            bump: self.bump,
            payment_amount: self.payment_amount,
            payment_mint: self.payment_mint.to_bytes(),
            payment_manager: self.payment_manager.to_bytes(),
            collector: self.collector.to_bytes(),
            token_manager: self.token_manager.to_bytes(),
        };
        crate::decoders::anchor::with_discriminator(ACCOUNT_NAME, bytemuck::bytes_of(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_packed() {
        assert_eq!(std::mem::size_of::<PaidClaimApproverData>(), 1 + 8 + 4 * 32);
    }

    #[test]
    fn decodes_payment_terms() {
        let pca = DecodedPaidClaimApprover::sample(Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let decoded = decode_paid_claim_approver(&pca.address, &pca.to_account_data()).unwrap();
        assert_eq!(decoded, pca);
    }

    #[test]
    fn short_payload_is_rejected() {
        let pca = DecodedPaidClaimApprover::sample(Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let data = pca.to_account_data();
        assert!(matches!(
            decode_paid_claim_approver(&pca.address, &data[..50]),
            Err(DecodeError::TooShort { .. })
        ));
    }
}
