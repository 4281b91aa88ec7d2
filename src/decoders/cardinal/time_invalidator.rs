// src/decoders/cardinal/time_invalidator.rs

use crate::decoders::{
    DecodeError,
    anchor::{deserialize_prefix, strip_discriminator},
};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

pub const ACCOUNT_NAME: &str = "TimeInvalidator";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedTimeInvalidator {
    pub address: Pubkey,
    pub bump: u8,
    pub token_manager: Pubkey,
    pub payment_manager: Pubkey,
    pub collector: Pubkey,
    pub expiration: Option<i64>,
    pub duration_seconds: Option<i64>,
    pub extension_payment_amount: Option<u64>,
    pub extension_duration_seconds: Option<u64>,
    pub extension_payment_mint: Option<Pubkey>,
    pub max_expiration: Option<i64>,
    pub disable_partial_extension: Option<bool>,
}

impl DecodedTimeInvalidator {
    /// Date d'expiration effective : l'expiration fixe si elle existe, sinon
    /// `state_changed_at + duration_seconds` (la durée court à partir du claim).
    pub fn effective_expiration(&self, state_changed_at: i64) -> Option<i64> {
        self.expiration
            .or_else(|| self.duration_seconds.map(|d| state_changed_at.saturating_add(d)))
    }
}

#[derive(BorshDeserialize, BorshSerialize, Debug)]
struct TimeInvalidatorLayout {
    bump: u8,
    token_manager: [u8; 32],
    payment_manager: [u8; 32],
    collector: [u8; 32],
    expiration: Option<i64>,
    duration_seconds: Option<i64>,
    extension_payment_amount: Option<u64>,
    extension_duration_seconds: Option<u64>,
    extension_payment_mint: Option<[u8; 32]>,
    max_expiration: Option<i64>,
    disable_partial_extension: Option<bool>,
}

pub fn decode_time_invalidator(address: &Pubkey, data: &[u8]) -> Result<DecodedTimeInvalidator, DecodeError> {
    let payload = strip_discriminator(data, ACCOUNT_NAME)?;
    let layout: TimeInvalidatorLayout = deserialize_prefix(payload)?;

    Ok(DecodedTimeInvalidator {
        address: *address,
        bump: layout.bump,
        token_manager: Pubkey::new_from_array(layout.token_manager),
        payment_manager: Pubkey::new_from_array(layout.payment_manager),
        collector: Pubkey::new_from_array(layout.collector),
        expiration: layout.expiration,
        duration_seconds: layout.duration_seconds,
        extension_payment_amount: layout.extension_payment_amount,
        extension_duration_seconds: layout.extension_duration_seconds,
        extension_payment_mint: layout.extension_payment_mint.map(Pubkey::new_from_array),
        max_expiration: layout.max_expiration,
        disable_partial_extension: layout.disable_partial_extension,
    })
}

#[cfg(test)]
impl DecodedTimeInvalidator {
    pub(crate) fn sample(address: Pubkey, token_manager: Pubkey) -> Self {
        Self {
            address,
            bump: 254,
            token_manager,
            payment_manager: Pubkey::new_unique(),
            collector: Pubkey::new_unique(),
            expiration: None,
            duration_seconds: Some(86_400),
            extension_payment_amount: None,
            extension_duration_seconds: None,
            extension_payment_mint: None,
            max_expiration: None,
            disable_partial_extension: None,
        }
    }

    pub(crate) fn to_account_data(&self) -> Vec<u8> {
        let layout = TimeInvalidatorLayout {
            bump: self.bump,
            token_manager: self.token_manager.to_bytes(),
            payment_manager: self.payment_manager.to_bytes(),
            collector: self.collector.to_bytes(),
            expiration: self.expiration,
            duration_seconds: self.duration_seconds,
            extension_payment_amount: self.extension_payment_amount,
            extension_duration_seconds: self.extension_duration_seconds,
            extension_payment_mint: self.extension_payment_mint.map(|k| k.to_bytes()),
            max_expiration: self.max_expiration,
            disable_partial_extension: self.disable_partial_extension,
        };
        let payload = borsh::to_vec(&layout).expect("sérialisation borsh");
        crate::decoders::anchor::with_discriminator(ACCOUNT_NAME, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_extension_fields() {
        let mut ti = DecodedTimeInvalidator::sample(Pubkey::new_unique(), Pubkey::new_unique());
        ti.extension_payment_amount = Some(1_000_000);
        ti.extension_payment_mint = Some(Pubkey::new_unique());
        ti.max_expiration = Some(1_800_000_000);

        let decoded = decode_time_invalidator(&ti.address, &ti.to_account_data()).unwrap();
        assert_eq!(decoded, ti);
    }

    #[test]
    fn expiration_prefers_the_fixed_date() {
        let mut ti = DecodedTimeInvalidator::sample(Pubkey::new_unique(), Pubkey::new_unique());
        assert_eq!(ti.effective_expiration(1_000), Some(87_400));
        ti.expiration = Some(5_000);
        assert_eq!(ti.effective_expiration(1_000), Some(5_000));
        ti.expiration = None;
        ti.duration_seconds = None;
        assert_eq!(ti.effective_expiration(1_000), None);
    }
}
