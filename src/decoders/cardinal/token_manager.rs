// src/decoders/cardinal/token_manager.rs

use crate::decoders::{
    DecodeError,
    anchor::{DISCRIMINATOR_LEN, deserialize_prefix, strip_discriminator},
};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

pub const ACCOUNT_NAME: &str = "TokenManager";

// Offsets (discriminator inclus) utilisés par les filtres memcmp des scans.
// discriminator(8) + version(1) + bump(1) + count(8) + num_invalidators(1)
pub const ISSUER_OFFSET: usize = DISCRIMINATOR_LEN + 1 + 1 + 8 + 1;
// + issuer(32) + mint(32) + amount(8) + kind(1)
pub const STATE_OFFSET: usize = ISSUER_OFFSET + 32 + 32 + 8 + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenManagerState {
    Initialized,
    Issued,
    Claimed,
    Invalidated,
}

impl TokenManagerState {
    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(Self::Initialized),
            1 => Ok(Self::Issued),
            2 => Ok(Self::Claimed),
            3 => Ok(Self::Invalidated),
            _ => Err(DecodeError::InvalidEnum { field: "state", value }),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Initialized => 0,
            Self::Issued => 1,
            Self::Claimed => 2,
            Self::Invalidated => 3,
        }
    }

    /// Le cycle de vie n'avance que dans un sens :
    /// Initialized -> Issued -> Claimed -> Invalidated, ou Issued -> Invalidated.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Initialized, Self::Issued)
                | (Self::Issued, Self::Claimed)
                | (Self::Issued, Self::Invalidated)
                | (Self::Claimed, Self::Invalidated)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenManagerKind {
    Managed,
    Unmanaged,
    Edition,
    Permissioned,
}

impl TokenManagerKind {
    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        match value {
            1 => Ok(Self::Managed),
            2 => Ok(Self::Unmanaged),
            3 => Ok(Self::Edition),
            4 => Ok(Self::Permissioned),
            _ => Err(DecodeError::InvalidEnum { field: "kind", value }),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Managed => 1,
            Self::Unmanaged => 2,
            Self::Edition => 3,
            Self::Permissioned => 4,
        }
    }
}

/// Ce qui arrive au NFT quand la location est invalidée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidationType {
    Return,
    Invalidate,
    Release,
    Reissue,
    Vest,
}

impl InvalidationType {
    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        match value {
            1 => Ok(Self::Return),
            2 => Ok(Self::Invalidate),
            3 => Ok(Self::Release),
            4 => Ok(Self::Reissue),
            5 => Ok(Self::Vest),
            _ => Err(DecodeError::InvalidEnum { field: "invalidation_type", value }),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Return => 1,
            Self::Invalidate => 2,
            Self::Release => 3,
            Self::Reissue => 4,
            Self::Vest => 5,
        }
    }
}

// --- STRUCTURE DE SORTIE PROPRE ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedTokenManager {
    pub address: Pubkey,
    pub version: u8,
    pub bump: u8,
    pub count: u64,
    pub num_invalidators: u8,
    pub issuer: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
    pub kind: TokenManagerKind,
    pub state: TokenManagerState,
    pub state_changed_at: i64,
    pub invalidation_type: InvalidationType,
    pub recipient_token_account: Pubkey,
    pub receipt_mint: Option<Pubkey>,
    pub claim_approver: Option<Pubkey>,
    pub transfer_authority: Option<Pubkey>,
    /// Pointeurs déclarés : à recouper avec les adresses canoniques avant usage.
    pub invalidators: Vec<Pubkey>,
}

// --- STRUCTURE DE DONNÉES BRUTES (ordre borsh du programme) ---
#[derive(BorshDeserialize, BorshSerialize, Debug)]
struct TokenManagerLayout {
    version: u8,
    bump: u8,
    count: u64,
    num_invalidators: u8,
    issuer: [u8; 32],
    mint: [u8; 32],
    amount: u64,
    kind: u8,
    state: u8,
    state_changed_at: i64,
    invalidation_type: u8,
    recipient_token_account: [u8; 32],
    receipt_mint: Option<[u8; 32]>,
    claim_approver: Option<[u8; 32]>,
    transfer_authority: Option<[u8; 32]>,
    invalidators: Vec<[u8; 32]>,
}

/// Tente de décoder les données brutes d'un compte TokenManager.
pub fn decode_token_manager(address: &Pubkey, data: &[u8]) -> Result<DecodedTokenManager, DecodeError> {
    let payload = strip_discriminator(data, ACCOUNT_NAME)?;
    let layout: TokenManagerLayout = deserialize_prefix(payload)?;

    Ok(DecodedTokenManager {
        address: *address,
        version: layout.version,
        bump: layout.bump,
        count: layout.count,
        num_invalidators: layout.num_invalidators,
        issuer: Pubkey::new_from_array(layout.issuer),
        mint: Pubkey::new_from_array(layout.mint),
        amount: layout.amount,
        kind: TokenManagerKind::from_u8(layout.kind)?,
        state: TokenManagerState::from_u8(layout.state)?,
        state_changed_at: layout.state_changed_at,
        invalidation_type: InvalidationType::from_u8(layout.invalidation_type)?,
        recipient_token_account: Pubkey::new_from_array(layout.recipient_token_account),
        receipt_mint: layout.receipt_mint.map(Pubkey::new_from_array),
        claim_approver: layout.claim_approver.map(Pubkey::new_from_array),
        transfer_authority: layout.transfer_authority.map(Pubkey::new_from_array),
        invalidators: layout.invalidators.into_iter().map(Pubkey::new_from_array).collect(),
    })
}

#[cfg(test)]
impl DecodedTokenManager {
    pub(crate) fn sample(address: Pubkey, mint: Pubkey, issuer: Pubkey) -> Self {
        Self {
            address,
            version: 0,
            bump: 255,
            count: 1,
            num_invalidators: 0,
            issuer,
            mint,
            amount: 1,
            kind: TokenManagerKind::Edition,
            state: TokenManagerState::Claimed,
            state_changed_at: 1_700_000_000,
            invalidation_type: InvalidationType::Return,
            recipient_token_account: Pubkey::new_unique(),
            receipt_mint: None,
            claim_approver: None,
            transfer_authority: None,
            invalidators: vec![],
        }
    }

    pub(crate) fn to_account_data(&self) -> Vec<u8> {
        let layout = TokenManagerLayout {
            version: self.version,
            bump: self.bump,
            count: self.count,
            num_invalidators: self.num_invalidators,
            issuer: self.issuer.to_bytes(),
            mint: self.mint.to_bytes(),
            amount: self.amount,
            kind: self.kind.as_u8(),
            state: self.state.as_u8(),
            state_changed_at: self.state_changed_at,
            invalidation_type: self.invalidation_type.as_u8(),
            recipient_token_account: self.recipient_token_account.to_bytes(),
            receipt_mint: self.receipt_mint.map(|k| k.to_bytes()),
            claim_approver: self.claim_approver.map(|k| k.to_bytes()),
            transfer_authority: self.transfer_authority.map(|k| k.to_bytes()),
            invalidators: self.invalidators.iter().map(|k| k.to_bytes()).collect(),
        };
        let payload = borsh::to_vec(&layout).expect("sérialisation borsh");
        crate::decoders::anchor::with_discriminator(ACCOUNT_NAME, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_round_tripped_account_with_padding() {
        let mut tm = DecodedTokenManager::sample(Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        tm.claim_approver = Some(Pubkey::new_unique());
        tm.invalidators = vec![Pubkey::new_unique(), Pubkey::new_unique()];
        tm.num_invalidators = 2;

        let mut data = tm.to_account_data();
        data.extend_from_slice(&[0u8; 64]);

        assert_eq!(decode_token_manager(&tm.address, &data).unwrap(), tm);
    }

    #[test]
    fn memcmp_offsets_point_at_issuer_and_state() {
        let tm = DecodedTokenManager::sample(Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let data = tm.to_account_data();
        assert_eq!(&data[ISSUER_OFFSET..ISSUER_OFFSET + 32], tm.issuer.as_ref());
        assert_eq!(data[STATE_OFFSET], TokenManagerState::Claimed.as_u8());
    }

    #[test]
    fn unknown_state_is_a_decode_error() {
        let tm = DecodedTokenManager::sample(Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let mut data = tm.to_account_data();
        data[STATE_OFFSET] = 9;
        assert!(matches!(
            decode_token_manager(&tm.address, &data),
            Err(DecodeError::InvalidEnum { field: "state", value: 9 })
        ));
    }

    #[test]
    fn truncated_account_is_a_decode_error() {
        let tm = DecodedTokenManager::sample(Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let data = tm.to_account_data();
        assert!(decode_token_manager(&tm.address, &data[..40]).is_err());
    }

    #[test]
    fn state_only_moves_forward() {
        use TokenManagerState::*;
        assert!(Initialized.can_transition_to(Issued));
        assert!(Issued.can_transition_to(Claimed));
        assert!(Issued.can_transition_to(Invalidated));
        assert!(Claimed.can_transition_to(Invalidated));
        assert!(!Claimed.can_transition_to(Issued));
        assert!(!Invalidated.can_transition_to(Initialized));
        assert!(!Initialized.can_transition_to(Claimed));
    }
}
