// src/pda.rs

//! Dérivation déterministe des adresses (PDA) liées à un NFT loué.
//! Aucune requête réseau : on retrouve les comptes liés en recalculant
//! leurs adresses au lieu de suivre des pointeurs stockés on-chain.

use crate::programs::ProgramIds;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

pub const TOKEN_MANAGER_SEED: &[u8] = b"token-manager";
pub const TIME_INVALIDATOR_SEED: &[u8] = b"time-invalidator";
pub const USE_INVALIDATOR_SEED: &[u8] = b"use-invalidator";
pub const PAID_CLAIM_APPROVER_SEED: &[u8] = b"paid-claim-approver";
pub const METADATA_SEED: &[u8] = b"metadata";
pub const EDITION_SEED: &[u8] = b"edition";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivedKind {
    /// seeds: [mint]
    TokenManager,
    /// seeds: [token_manager]
    TimeInvalidator,
    /// seeds: [token_manager]
    UseInvalidator,
    /// seeds: [token_manager]
    PaidClaimApprover,
    /// seeds: [mint]
    Metadata,
    /// seeds: [mint]
    Edition,
}

/// Calcule l'adresse canonique d'un compte de type `kind`.
/// `seeds` contient les identifiants propres à l'instance (mint ou token manager),
/// le préfixe et le programme propriétaire sont fixés par le type.
pub fn derive(kind: DerivedKind, seeds: &[Pubkey], programs: &ProgramIds) -> Pubkey {
    let ids: Vec<&[u8]> = seeds.iter().map(|s| s.as_ref()).collect();
    let (program_id, mut full_seeds): (&Pubkey, Vec<&[u8]>) = match kind {
        DerivedKind::TokenManager => (&programs.token_manager, vec![TOKEN_MANAGER_SEED]),
        DerivedKind::TimeInvalidator => (&programs.time_invalidator, vec![TIME_INVALIDATOR_SEED]),
        DerivedKind::UseInvalidator => (&programs.use_invalidator, vec![USE_INVALIDATOR_SEED]),
        DerivedKind::PaidClaimApprover => (&programs.paid_claim_approver, vec![PAID_CLAIM_APPROVER_SEED]),
        DerivedKind::Metadata | DerivedKind::Edition => {
            (&programs.token_metadata, vec![METADATA_SEED, programs.token_metadata.as_ref()])
        }
    };
    full_seeds.extend(ids);
    if kind == DerivedKind::Edition {
        full_seeds.push(EDITION_SEED);
    }
    let (address, _bump) = Pubkey::find_program_address(&full_seeds, program_id);
    address
}

pub fn find_token_manager_address(mint: &Pubkey, programs: &ProgramIds) -> Pubkey {
    derive(DerivedKind::TokenManager, &[*mint], programs)
}

pub fn find_time_invalidator_address(token_manager: &Pubkey, programs: &ProgramIds) -> Pubkey {
    derive(DerivedKind::TimeInvalidator, &[*token_manager], programs)
}

pub fn find_use_invalidator_address(token_manager: &Pubkey, programs: &ProgramIds) -> Pubkey {
    derive(DerivedKind::UseInvalidator, &[*token_manager], programs)
}

pub fn find_paid_claim_approver_address(token_manager: &Pubkey, programs: &ProgramIds) -> Pubkey {
    derive(DerivedKind::PaidClaimApprover, &[*token_manager], programs)
}

pub fn find_metadata_address(mint: &Pubkey, programs: &ProgramIds) -> Pubkey {
    derive(DerivedKind::Metadata, &[*mint], programs)
}

pub fn find_edition_address(mint: &Pubkey, programs: &ProgramIds) -> Pubkey {
    derive(DerivedKind::Edition, &[*mint], programs)
}
