// src/decoders/mod.rs

use serde::Serialize;
use solana_sdk::{account::Account, pubkey::Pubkey};
use thiserror::Error;

// --- 1. Les familles de comptes que nous savons lire ---
pub mod account_decoder;
pub mod anchor;
pub mod cardinal;
pub mod metaplex;
pub mod spl_token_decoders;

pub use account_decoder::{AccountDecoder, AccountFamily};

// --- 2. L'enveloppe brute, telle que renvoyée par le RPC ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAccount {
    pub address: Pubkey,
    pub owner: Pubkey,
    pub data: Vec<u8>,
    pub lamports: u64,
    pub executable: bool,
}

impl RawAccount {
    pub fn from_account(address: Pubkey, account: Account) -> Self {
        Self {
            address,
            owner: account.owner,
            data: account.data,
            lamports: account.lamports,
            executable: account.executable,
        }
    }
}

// --- 3. Les erreurs internes au décodage ---
// Elles ne sortent jamais de `AccountDecoder::decode` : elles deviennent `ParsedAccount::Unknown`.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("programme propriétaire inconnu: {0}")]
    UnknownOwner(Pubkey),
    #[error("discriminator invalide: attendu {expected}, trouvé {found}")]
    InvalidDiscriminator { expected: String, found: String },
    #[error("données trop courtes: attendu au moins {expected} octets, reçu {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("taille de compte inattendue: {0} octets")]
    UnexpectedSize(usize),
    #[error("clé de compte non supportée: {0}")]
    UnsupportedKey(u8),
    #[error("valeur {value} invalide pour le champ {field}")]
    InvalidEnum { field: &'static str, value: u8 },
    #[error("erreur borsh: {0}")]
    Borsh(#[from] std::io::Error),
    #[error("erreur spl-token: {0}")]
    Token(String),
}

// --- 4. Le résultat typé ---
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "parsed")]
pub enum ParsedAccount {
    TokenManager(cardinal::DecodedTokenManager),
    PaidClaimApprover(cardinal::DecodedPaidClaimApprover),
    TimeInvalidator(cardinal::DecodedTimeInvalidator),
    UseInvalidator(cardinal::DecodedUseInvalidator),
    Mint(spl_token_decoders::DecodedMint),
    TokenAccount(spl_token_decoders::DecodedSplAccount),
    Metadata(metaplex::DecodedMetadata),
    Edition(metaplex::DecodedEdition),
    Unknown { reason: String },
}

impl ParsedAccount {
    /// Nom stable du variant, utilisé comme label Prometheus.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ParsedAccount::TokenManager(_) => "TokenManager",
            ParsedAccount::PaidClaimApprover(_) => "PaidClaimApprover",
            ParsedAccount::TimeInvalidator(_) => "TimeInvalidator",
            ParsedAccount::UseInvalidator(_) => "UseInvalidator",
            ParsedAccount::Mint(_) => "Mint",
            ParsedAccount::TokenAccount(_) => "TokenAccount",
            ParsedAccount::Metadata(_) => "Metadata",
            ParsedAccount::Edition(_) => "Edition",
            ParsedAccount::Unknown { .. } => "Unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ParsedAccount::Unknown { .. })
    }
}

/// Un compte décodé : le résultat typé, l'enveloppe brute et l'instant du décodage.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAccount {
    pub raw: RawAccount,
    pub decoded_at_ms: u64,
    pub parsed: ParsedAccount,
}

impl DecodedAccount {
    pub fn address(&self) -> Pubkey {
        self.raw.address
    }

    pub fn as_token_manager(&self) -> Option<&cardinal::DecodedTokenManager> {
        match &self.parsed {
            ParsedAccount::TokenManager(tm) => Some(tm),
            _ => None,
        }
    }

    pub fn as_mint(&self) -> Option<&spl_token_decoders::DecodedMint> {
        match &self.parsed {
            ParsedAccount::Mint(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_token_account(&self) -> Option<&spl_token_decoders::DecodedSplAccount> {
        match &self.parsed {
            ParsedAccount::TokenAccount(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_metadata(&self) -> Option<&metaplex::DecodedMetadata> {
        match &self.parsed {
            ParsedAccount::Metadata(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_edition(&self) -> Option<&metaplex::DecodedEdition> {
        match &self.parsed {
            ParsedAccount::Edition(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_time_invalidator(&self) -> Option<&cardinal::DecodedTimeInvalidator> {
        match &self.parsed {
            ParsedAccount::TimeInvalidator(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_use_invalidator(&self) -> Option<&cardinal::DecodedUseInvalidator> {
        match &self.parsed {
            ParsedAccount::UseInvalidator(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_paid_claim_approver(&self) -> Option<&cardinal::DecodedPaidClaimApprover> {
        match &self.parsed {
            ParsedAccount::PaidClaimApprover(p) => Some(p),
            _ => None,
        }
    }
}
