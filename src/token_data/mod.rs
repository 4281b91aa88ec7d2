// src/token_data/mod.rs

use crate::data_pipeline::OffchainMetadata;
use crate::decoders::{
    DecodedAccount, ParsedAccount,
    cardinal::{DecodedPaidClaimApprover, DecodedTimeInvalidator, DecodedTokenManager, DecodedUseInvalidator},
    metaplex::{DecodedEdition, DecodedMetadata},
    spl_token_decoders::{DecodedMint, DecodedSplAccount},
};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

pub mod resolver;

pub use resolver::{InvalidatorPolicy, TokenDataResolver, TokenFilter};

/// Vue composite d'un NFT loué : le token manager et tous les comptes qui en dépendent.
/// Construite uniquement par `TokenDataBuilder`, en lecture seule ensuite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenData {
    token_manager: DecodedTokenManager,
    mint: Option<DecodedMint>,
    metadata: Option<DecodedMetadata>,
    edition: Option<DecodedEdition>,
    claim_approver: Option<DecodedPaidClaimApprover>,
    time_invalidator: Option<DecodedTimeInvalidator>,
    use_invalidator: Option<DecodedUseInvalidator>,
    recipient_token_account: Option<DecodedSplAccount>,
    offchain_metadata: Option<OffchainMetadata>,
}

impl TokenData {
    pub fn address(&self) -> Pubkey {
        self.token_manager.address
    }

    pub fn token_manager(&self) -> &DecodedTokenManager {
        &self.token_manager
    }

    pub fn mint(&self) -> Option<&DecodedMint> {
        self.mint.as_ref()
    }

    pub fn metadata(&self) -> Option<&DecodedMetadata> {
        self.metadata.as_ref()
    }

    pub fn edition(&self) -> Option<&DecodedEdition> {
        self.edition.as_ref()
    }

    pub fn claim_approver(&self) -> Option<&DecodedPaidClaimApprover> {
        self.claim_approver.as_ref()
    }

    pub fn time_invalidator(&self) -> Option<&DecodedTimeInvalidator> {
        self.time_invalidator.as_ref()
    }

    pub fn use_invalidator(&self) -> Option<&DecodedUseInvalidator> {
        self.use_invalidator.as_ref()
    }

    pub fn recipient_token_account(&self) -> Option<&DecodedSplAccount> {
        self.recipient_token_account.as_ref()
    }

    pub fn offchain_metadata(&self) -> Option<&OffchainMetadata> {
        self.offchain_metadata.as_ref()
    }

    /// Tous les mints de paiement exposés par la vue (claim payant et extensions).
    pub fn payment_mints(&self) -> Vec<Pubkey> {
        let mut mints = Vec::new();
        if let Some(approver) = &self.claim_approver {
            mints.push(approver.payment_mint);
        }
        if let Some(mint) = self.time_invalidator.as_ref().and_then(|t| t.extension_payment_mint) {
            mints.push(mint);
        }
        if let Some(mint) = self.use_invalidator.as_ref().and_then(|u| u.extension_payment_mint) {
            mints.push(mint);
        }
        mints
    }
}

/// Les champs dépendants d'une `TokenData`, chacun attendant un type de compte précis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenDataField {
    Mint,
    Metadata,
    Edition,
    ClaimApprover,
    TimeInvalidator,
    UseInvalidator,
    RecipientTokenAccount,
}

#[derive(Debug, Clone)]
pub struct TokenDataBuilder {
    token_manager: DecodedTokenManager,
    mint: Option<DecodedMint>,
    metadata: Option<DecodedMetadata>,
    edition: Option<DecodedEdition>,
    claim_approver: Option<DecodedPaidClaimApprover>,
    time_invalidator: Option<DecodedTimeInvalidator>,
    use_invalidator: Option<DecodedUseInvalidator>,
    recipient_token_account: Option<DecodedSplAccount>,
    offchain_metadata: Option<OffchainMetadata>,
}

impl TokenDataBuilder {
    pub fn new(token_manager: DecodedTokenManager) -> Self {
        Self {
            token_manager,
            mint: None,
            metadata: None,
            edition: None,
            claim_approver: None,
            time_invalidator: None,
            use_invalidator: None,
            recipient_token_account: None,
            offchain_metadata: None,
        }
    }

    pub fn token_manager(&self) -> &DecodedTokenManager {
        &self.token_manager
    }

    pub fn metadata(&self) -> Option<&DecodedMetadata> {
        self.metadata.as_ref()
    }

    /// Remplit `field` si le compte a le type attendu pour ce champ.
    /// Renvoie `false` (et ne touche à rien) sinon : un compte `Unknown` ou d'un autre type
    /// à l'adresse dérivée laisse simplement le champ vide.
    pub fn fill(&mut self, field: TokenDataField, account: &DecodedAccount) -> bool {
        match (field, &account.parsed) {
            (TokenDataField::Mint, ParsedAccount::Mint(m)) => self.mint = Some(m.clone()),
            (TokenDataField::Metadata, ParsedAccount::Metadata(m)) => self.metadata = Some(m.clone()),
            (TokenDataField::Edition, ParsedAccount::Edition(e)) => self.edition = Some(e.clone()),
            (TokenDataField::ClaimApprover, ParsedAccount::PaidClaimApprover(p)) => {
                self.claim_approver = Some(p.clone())
            }
            (TokenDataField::TimeInvalidator, ParsedAccount::TimeInvalidator(t)) => {
                self.time_invalidator = Some(t.clone())
            }
            (TokenDataField::UseInvalidator, ParsedAccount::UseInvalidator(u)) => {
                self.use_invalidator = Some(u.clone())
            }
            (TokenDataField::RecipientTokenAccount, ParsedAccount::TokenAccount(a)) => {
                self.recipient_token_account = Some(a.clone())
            }
            _ => return false,
        }
        true
    }

    pub fn offchain_metadata(&mut self, metadata: Option<OffchainMetadata>) {
        self.offchain_metadata = metadata;
    }

    pub fn build(self) -> TokenData {
        TokenData {
            token_manager: self.token_manager,
            mint: self.mint,
            metadata: self.metadata,
            edition: self.edition,
            claim_approver: self.claim_approver,
            time_invalidator: self.time_invalidator,
            use_invalidator: self.use_invalidator,
            recipient_token_account: self.recipient_token_account,
            offchain_metadata: self.offchain_metadata,
        }
    }
}

#[cfg(test)]
impl TokenData {
    pub(crate) fn with_parts(
        token_manager: DecodedTokenManager,
        metadata: Option<DecodedMetadata>,
        claim_approver: Option<DecodedPaidClaimApprover>,
        time_invalidator: Option<DecodedTimeInvalidator>,
    ) -> Self {
        let mut data = TokenDataBuilder::new(token_manager).build();
        data.metadata = metadata;
        data.claim_approver = claim_approver;
        data.time_invalidator = time_invalidator;
        data
    }
}
