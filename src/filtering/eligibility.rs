// DANS : src/filtering/eligibility.rs

use crate::token_data::TokenData;
use anyhow::{Context, Result};
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::{collections::HashSet, fs::File, io::BufReader, path::Path, str::FromStr};
use tracing::info;

/// Listes d'autorisation appliquées aux vues composites.
/// `None` pour une liste = pas de contrainte de ce côté.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilityFilter {
    pub allowed_creators: Option<HashSet<Pubkey>>,
    pub allowed_issuers: Option<HashSet<Pubkey>>,
    pub allowed_payment_mints: Option<HashSet<Pubkey>>,
}

// Format fichier : adresses en base58, plus lisibles que les tableaux d'octets.
#[derive(Deserialize)]
struct EligibilityFile {
    #[serde(default)]
    allowed_creators: Option<Vec<String>>,
    #[serde(default)]
    allowed_issuers: Option<Vec<String>>,
    #[serde(default)]
    allowed_payment_mints: Option<Vec<String>>,
}

fn parse_list(field: &str, values: Option<Vec<String>>) -> Result<Option<HashSet<Pubkey>>> {
    values
        .map(|list| {
            list.iter()
                .map(|v| Pubkey::from_str(v).with_context(|| format!("{}: adresse invalide '{}'", field, v)))
                .collect::<Result<HashSet<Pubkey>>>()
        })
        .transpose()
}

impl EligibilityFilter {
    /// Charge les listes depuis un fichier JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Impossible d'ouvrir le fichier d'éligibilité '{}'", path.display()))?;
        let raw: EligibilityFile = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Erreur de désérialisation du fichier '{}'", path.display()))?;

        let filter = Self {
            allowed_creators: parse_list("allowed_creators", raw.allowed_creators)?,
            allowed_issuers: parse_list("allowed_issuers", raw.allowed_issuers)?,
            allowed_payment_mints: parse_list("allowed_payment_mints", raw.allowed_payment_mints)?,
        };
        info!(path = %path.display(), "[Eligibility] Listes d'autorisation chargées");
        Ok(filter)
    }

    pub fn is_eligible(&self, data: &TokenData) -> bool {
        if let Some(creators) = &self.allowed_creators {
            let has_allowed_creator = data
                .metadata()
                .map(|m| m.verified_creators().any(|c| creators.contains(c)))
                .unwrap_or(false);
            if !has_allowed_creator {
                return false;
            }
        }
        if let Some(issuers) = &self.allowed_issuers {
            if !issuers.contains(&data.token_manager().issuer) {
                return false;
            }
        }
        if let Some(mints) = &self.allowed_payment_mints {
            // Une vue sans mint de paiement passe.
            if !data.payment_mints().iter().all(|m| mints.contains(m)) {
                return false;
            }
        }
        true
    }

    /// Pur : l'entrée n'est jamais modifiée, l'ordre est conservé.
    pub fn apply<'a>(&self, datas: &'a [TokenData]) -> Vec<&'a TokenData> {
        datas.iter().filter(|data| self.is_eligible(data)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoders::cardinal::{DecodedPaidClaimApprover, DecodedTimeInvalidator, DecodedTokenManager};
    use crate::decoders::metaplex::{DecodedCreator, DecodedMetadata};

    fn view(issuer: Pubkey, creator: Option<(Pubkey, bool)>, payment_mint: Option<Pubkey>) -> TokenData {
        let tm = DecodedTokenManager::sample(Pubkey::new_unique(), Pubkey::new_unique(), issuer);
        let metadata = creator.map(|(address, verified)| {
            let mut m = DecodedMetadata::sample(Pubkey::new_unique(), tm.mint, "");
            m.creators = vec![DecodedCreator { address, verified, share: 100 }];
            m
        });
        let approver = payment_mint.map(|mint| DecodedPaidClaimApprover::sample(Pubkey::new_unique(), tm.address, mint));
        TokenData::with_parts(tm, metadata, approver, None)
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let datas = vec![view(Pubkey::new_unique(), None, None), view(Pubkey::new_unique(), None, None)];
        assert_eq!(EligibilityFilter::default().apply(&datas).len(), 2);
    }

    #[test]
    fn creators_must_be_verified_and_allowed() {
        let artist = Pubkey::new_unique();
        let datas = vec![
            view(Pubkey::new_unique(), Some((artist, true)), None),
            view(Pubkey::new_unique(), Some((artist, false)), None),
            view(Pubkey::new_unique(), Some((Pubkey::new_unique(), true)), None),
            view(Pubkey::new_unique(), None, None),
        ];
        let filter = EligibilityFilter { allowed_creators: Some(HashSet::from([artist])), ..Default::default() };
        let kept = filter.apply(&datas);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].address(), datas[0].address());
    }

    #[test]
    fn issuers_are_matched_on_the_token_manager() {
        let issuer = Pubkey::new_unique();
        let datas = vec![view(Pubkey::new_unique(), None, None), view(issuer, None, None)];
        let filter = EligibilityFilter { allowed_issuers: Some(HashSet::from([issuer])), ..Default::default() };
        let kept = filter.apply(&datas);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].token_manager().issuer, issuer);
    }

    #[test]
    fn every_payment_mint_must_be_allowed() {
        let usdc = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let free = view(Pubkey::new_unique(), None, None);
        let paid_usdc = view(Pubkey::new_unique(), None, Some(usdc));
        let paid_other = view(Pubkey::new_unique(), None, Some(other));

        // Claim en USDC, mais extension payable dans un autre mint.
        let tm = DecodedTokenManager::sample(Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let mut time = DecodedTimeInvalidator::sample(Pubkey::new_unique(), tm.address);
        time.extension_payment_mint = Some(other);
        let approver = DecodedPaidClaimApprover::sample(Pubkey::new_unique(), tm.address, usdc);
        let mixed = TokenData::with_parts(tm, None, Some(approver), Some(time));

        let datas = vec![free, paid_usdc, paid_other, mixed];
        let filter = EligibilityFilter { allowed_payment_mints: Some(HashSet::from([usdc])), ..Default::default() };
        let kept: Vec<Pubkey> = filter.apply(&datas).iter().map(|d| d.address()).collect();
        assert_eq!(kept, vec![datas[0].address(), datas[1].address()]);
        assert_eq!(datas.len(), 4);
    }

    #[test]
    fn loads_base58_lists_from_json() {
        let creator = Pubkey::new_unique();
        let path = std::env::temp_dir().join(format!("eligibility-{}.json", Pubkey::new_unique()));
        std::fs::write(&path, format!(r#"{{"allowed_creators":["{}"]}}"#, creator)).unwrap();

        let filter = EligibilityFilter::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(filter.allowed_creators, Some(HashSet::from([creator])));
        assert_eq!(filter.allowed_issuers, None);
    }

    #[test]
    fn invalid_address_in_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("eligibility-{}.json", Pubkey::new_unique()));
        std::fs::write(&path, r#"{"allowed_issuers":["pas-une-adresse"]}"#).unwrap();
        let result = EligibilityFilter::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.unwrap_err().to_string().contains("allowed_issuers"));
    }
}
