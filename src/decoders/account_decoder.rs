// DANS : src/decoders/account_decoder.rs

use crate::decoders::{
    DecodeError, DecodedAccount, ParsedAccount, RawAccount, cardinal, metaplex, spl_token_decoders,
};
use crate::monitoring::metrics::DECODE_OUTCOMES;
use crate::programs::ProgramIds;
use crate::utils::unix_millis;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use tracing::debug;

/// Famille de schémas binaires associée à un programme propriétaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountFamily {
    TokenManager,
    TimeInvalidator,
    UseInvalidator,
    PaidClaimApprover,
    TokenMetadata,
    /// SPL Token et Token-2022 : mint ou compte de jetons selon la taille.
    TokenProgram,
}

/// L'AccountDecoder centralise le mappage entre les ID de programme et les bons décodeurs.
/// Il ne renvoie jamais d'erreur : un compte illisible devient `ParsedAccount::Unknown`.
#[derive(Debug, Clone)]
pub struct AccountDecoder {
    families: HashMap<Pubkey, AccountFamily>,
}

impl AccountDecoder {
    pub fn new(programs: &ProgramIds) -> Self {
        let families = HashMap::from([
            (programs.token_manager, AccountFamily::TokenManager),
            (programs.time_invalidator, AccountFamily::TimeInvalidator),
            (programs.use_invalidator, AccountFamily::UseInvalidator),
            (programs.paid_claim_approver, AccountFamily::PaidClaimApprover),
            (programs.token_metadata, AccountFamily::TokenMetadata),
            (ProgramIds::spl_token(), AccountFamily::TokenProgram),
            (ProgramIds::token_2022(), AccountFamily::TokenProgram),
        ]);
        Self { families }
    }

    pub fn family_of(&self, owner: &Pubkey) -> Option<AccountFamily> {
        self.families.get(owner).copied()
    }

    /// Décode un compte brut. Toute erreur est absorbée ici et convertie en `Unknown`,
    /// pour qu'un compte malformé n'empêche jamais le traitement de ses voisins.
    pub fn decode(&self, raw: RawAccount) -> DecodedAccount {
        let parsed = match self.try_decode(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(address = %raw.address, owner = %raw.owner, error = %e, "[Decoder] Compte non reconnu");
                ParsedAccount::Unknown { reason: e.to_string() }
            }
        };
        DECODE_OUTCOMES.with_label_values(&[parsed.kind_name()]).inc();

        DecodedAccount {
            raw,
            decoded_at_ms: unix_millis(),
            parsed,
        }
    }

    /// Version "stricte" : renvoie l'erreur de décodage au lieu de la masquer.
    pub fn try_decode(&self, raw: &RawAccount) -> Result<ParsedAccount, DecodeError> {
        let address = &raw.address;
        let data = raw.data.as_slice();
        match self.family_of(&raw.owner) {
            Some(AccountFamily::TokenManager) => {
                cardinal::token_manager::decode_token_manager(address, data).map(ParsedAccount::TokenManager)
            }
            Some(AccountFamily::TimeInvalidator) => {
                cardinal::time_invalidator::decode_time_invalidator(address, data).map(ParsedAccount::TimeInvalidator)
            }
            Some(AccountFamily::UseInvalidator) => {
                cardinal::use_invalidator::decode_use_invalidator(address, data).map(ParsedAccount::UseInvalidator)
            }
            Some(AccountFamily::PaidClaimApprover) => {
                cardinal::paid_claim_approver::decode_paid_claim_approver(address, data)
                    .map(ParsedAccount::PaidClaimApprover)
            }
            Some(AccountFamily::TokenMetadata) => metaplex::decode_token_metadata_account(address, data),
            Some(AccountFamily::TokenProgram) => spl_token_decoders::decode_token_program_account(address, data),
            None => Err(DecodeError::UnknownOwner(raw.owner)),
        }
    }
}
