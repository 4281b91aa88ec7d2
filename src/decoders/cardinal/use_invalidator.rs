// src/decoders/cardinal/use_invalidator.rs

use crate::decoders::{
    DecodeError,
    anchor::{deserialize_prefix, strip_discriminator},
};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

pub const ACCOUNT_NAME: &str = "UseInvalidator";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedUseInvalidator {
    pub address: Pubkey,
    pub bump: u8,
    pub token_manager: Pubkey,
    pub payment_manager: Pubkey,
    pub collector: Pubkey,
    pub usages: u64,
    pub use_authority: Option<Pubkey>,
    pub total_usages: Option<u64>,
    pub extension_payment_amount: Option<u64>,
    pub extension_payment_mint: Option<Pubkey>,
    pub extension_usages: Option<u64>,
    pub max_usages: Option<u64>,
}

impl DecodedUseInvalidator {
    /// Utilisations restantes, `None` si la location n'est pas plafonnée.
    pub fn remaining_usages(&self) -> Option<u64> {
        self.total_usages.map(|total| total.saturating_sub(self.usages))
    }
}

#[derive(BorshDeserialize, BorshSerialize, Debug)]
struct UseInvalidatorLayout {
    bump: u8,
    token_manager: [u8; 32],
    payment_manager: [u8; 32],
    collector: [u8; 32],
    usages: u64,
    use_authority: Option<[u8; 32]>,
    total_usages: Option<u64>,
    extension_payment_amount: Option<u64>,
    extension_payment_mint: Option<[u8; 32]>,
    extension_usages: Option<u64>,
    max_usages: Option<u64>,
}

pub fn decode_use_invalidator(address: &Pubkey, data: &[u8]) -> Result<DecodedUseInvalidator, DecodeError> {
    let payload = strip_discriminator(data, ACCOUNT_NAME)?;
    let layout: UseInvalidatorLayout = deserialize_prefix(payload)?;

    Ok(DecodedUseInvalidator {
        address: *address,
        bump: layout.bump,
        token_manager: Pubkey::new_from_array(layout.token_manager),
        payment_manager: Pubkey::new_from_array(layout.payment_manager),
        collector: Pubkey::new_from_array(layout.collector),
        usages: layout.usages,
        use_authority: layout.use_authority.map(Pubkey::new_from_array),
        total_usages: layout.total_usages,
        extension_payment_amount: layout.extension_payment_amount,
        extension_payment_mint: layout.extension_payment_mint.map(Pubkey::new_from_array),
        extension_usages: layout.extension_usages,
        max_usages: layout.max_usages,
    })
}

#[cfg(test)]
impl DecodedUseInvalidator {
    pub(crate) fn sample(address: Pubkey, token_manager: Pubkey) -> Self {
        Self {
            address,
            bump: 253,
            token_manager,
            payment_manager: Pubkey::new_unique(),
            collector: Pubkey::new_unique(),
            usages: 2,
            use_authority: None,
            total_usages: Some(10),
            extension_payment_amount: None,
            extension_payment_mint: None,
            extension_usages: None,
            max_usages: None,
        }
    }

    pub(crate) fn to_account_data(&self) -> Vec<u8> {
        let layout = UseInvalidatorLayout {
            bump: self.bump,
            token_manager: self.token_manager.to_bytes(),
            payment_manager: self.payment_manager.to_bytes(),
            collector: self.collector.to_bytes(),
            usages: self.usages,
            use_authority: self.use_authority.map(|k| k.to_bytes()),
            total_usages: self.total_usages,
            extension_payment_amount: self.extension_payment_amount,
            extension_payment_mint: self.extension_payment_mint.map(|k| k.to_bytes()),
            extension_usages: self.extension_usages,
            max_usages: self.max_usages,
        };
        let payload = borsh::to_vec(&layout).expect("sérialisation borsh");
        crate::decoders::anchor::with_discriminator(ACCOUNT_NAME, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_usage_counters() {
        let ui = DecodedUseInvalidator::sample(Pubkey::new_unique(), Pubkey::new_unique());
        let decoded = decode_use_invalidator(&ui.address, &ui.to_account_data()).unwrap();
        assert_eq!(decoded, ui);
        assert_eq!(decoded.remaining_usages(), Some(8));
    }

    #[test]
    fn time_invalidator_bytes_are_not_a_use_invalidator() {
        let ti = crate::decoders::cardinal::DecodedTimeInvalidator::sample(Pubkey::new_unique(), Pubkey::new_unique());
        assert!(matches!(
            decode_use_invalidator(&ti.address, &ti.to_account_data()),
            Err(DecodeError::InvalidDiscriminator { .. })
        ));
    }
}
