// DANS : src/token_data/resolver.rs

use super::{TokenData, TokenDataBuilder, TokenDataField};
use crate::data_pipeline::OffchainMetadataClient;
use crate::decoders::{
    RawAccount,
    anchor::account_discriminator,
    cardinal::{
        DecodedTokenManager, TokenManagerState,
        token_manager::{ACCOUNT_NAME, ISSUER_OFFSET, STATE_OFFSET},
    },
};
use crate::monitoring::metrics::UNKNOWN_INVALIDATOR_EXCLUSIONS;
use crate::pda::{self, DerivedKind};
use crate::programs::ProgramIds;
use crate::rpc::MemcmpFilter;
use crate::state::AccountCache;
use anyhow::{Context, Result};
use futures::future::join_all;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Quels types d'invalidators sont reconnus lors du recoupement, et que faire des autres.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidatorPolicy {
    /// Types dont l'adresse canonique (dérivée du token manager) est acceptée.
    pub checked_kinds: Vec<DerivedKind>,
    /// Garde les token managers dont un invalidator déclaré n'est pas reconnu.
    pub show_unknown_invalidators: bool,
}

impl Default for InvalidatorPolicy {
    fn default() -> Self {
        Self {
            checked_kinds: vec![DerivedKind::TimeInvalidator, DerivedKind::UseInvalidator],
            show_unknown_invalidators: false,
        }
    }
}

impl InvalidatorPolicy {
    /// Vrai si tous les invalidators déclarés correspondent à une adresse canonique.
    pub fn recognizes_all(&self, token_manager: &DecodedTokenManager, programs: &ProgramIds) -> bool {
        let canonical: Vec<Pubkey> = self
            .checked_kinds
            .iter()
            .map(|kind| pda::derive(*kind, &[token_manager.address], programs))
            .collect();
        token_manager.invalidators.iter().all(|declared| canonical.contains(declared))
    }
}

/// Filtre métier appliqué pendant la résolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenFilter {
    /// Appliqué dès l'étape 2, avant tout fetch de dépendances.
    Issuer(Vec<Pubkey>),
    /// Appliqué en dernier, sur les créateurs vérifiés du compte Metadata.
    Creators(Vec<Pubkey>),
}

// Les adresses dépendantes d'un token manager, calculées à l'étape 3.
struct Dependents {
    targets: Vec<(TokenDataField, Pubkey)>,
    declared_invalidators: Vec<Pubkey>,
}

pub struct TokenDataResolver {
    cache: Arc<AccountCache>,
    programs: ProgramIds,
    metadata_client: OffchainMetadataClient,
    policy: InvalidatorPolicy,
}

impl TokenDataResolver {
    pub fn new(
        cache: Arc<AccountCache>,
        programs: ProgramIds,
        metadata_client: OffchainMetadataClient,
        policy: InvalidatorPolicy,
    ) -> Self {
        Self { cache, programs, metadata_client, policy }
    }

    pub fn cache(&self) -> &Arc<AccountCache> {
        &self.cache
    }

    pub fn policy(&self) -> &InvalidatorPolicy {
        &self.policy
    }

    pub async fn get_token_data(&self, token_manager_id: &Pubkey) -> Result<Option<TokenData>> {
        Ok(self.get_token_datas(std::slice::from_ref(token_manager_id), None).await?.pop())
    }

    /// Dérive d'abord l'adresse du token manager à partir du mint.
    pub async fn get_token_data_by_mint(&self, mint: &Pubkey) -> Result<Option<TokenData>> {
        let token_manager_id = pda::find_token_manager_address(mint, &self.programs);
        self.get_token_data(&token_manager_id).await
    }

    /// Résout une liste de token managers en vues composites, dans l'ordre des identifiants
    /// (doublons ignorés). Seul un échec de transport au niveau d'un lot fait échouer l'appel.
    #[instrument(skip_all, fields(seeds = ids.len()))]
    pub async fn get_token_datas(&self, ids: &[Pubkey], filter: Option<&TokenFilter>) -> Result<Vec<TokenData>> {
        // Étape 1: Les token managers eux-mêmes.
        let seeds = self
            .cache
            .get_or_fetch_many(ids)
            .await
            .context("Échec de la récupération des token managers")?;
        let mut seen = HashSet::new();
        let mut token_managers: Vec<DecodedTokenManager> = ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| seeds.get(id).and_then(|account| account.as_token_manager()).cloned())
            .collect();

        // Étape 2: Filtre par émetteur, avant de payer le fetch des dépendances.
        if let Some(TokenFilter::Issuer(issuers)) = filter {
            token_managers.retain(|tm| issuers.contains(&tm.issuer));
        }

        // Étape 3: Dérivation des adresses dépendantes.
        let dependents: Vec<Dependents> = token_managers.iter().map(|tm| self.dependents_of(tm)).collect();

        // Étape 4: Un seul fetch combiné pour toutes les dépendances.
        let all_targets: Vec<Pubkey> = dependents
            .iter()
            .flat_map(|d| d.targets.iter().map(|(_, address)| *address).chain(d.declared_invalidators.iter().copied()))
            .collect();
        let fetched = self
            .cache
            .get_or_fetch_many(&all_targets)
            .await
            .context("Échec de la récupération des comptes dépendants")?;

        // Étapes 5 & 6: Recoupement des invalidators puis assemblage.
        let mut builders = Vec::with_capacity(token_managers.len());
        for (tm, deps) in token_managers.into_iter().zip(dependents) {
            if !self.policy.recognizes_all(&tm, &self.programs) {
                if !self.policy.show_unknown_invalidators {
                    UNKNOWN_INVALIDATOR_EXCLUSIONS.inc();
                    debug!(token_manager = %tm.address, invalidators = ?tm.invalidators, "[Resolver] Invalidator inconnu, token manager écarté");
                    continue;
                }
                debug!(token_manager = %tm.address, "[Resolver] Invalidator inconnu, conservé (show_unknown_invalidators)");
            }

            let mut builder = TokenDataBuilder::new(tm);
            for (field, address) in &deps.targets {
                if let Some(account) = fetched.get(address) {
                    builder.fill(*field, account);
                }
            }
            builders.push(builder);
        }

        // Étape 7: Métadonnées off-chain, en parallèle ; un échec laisse le champ vide.
        let offchain = join_all(builders.iter().map(|builder| {
            let uri = builder.metadata().and_then(|m| m.offchain_uri()).map(str::to_string);
            async move {
                match uri {
                    Some(uri) => self.metadata_client.fetch_optional(&uri).await,
                    None => None,
                }
            }
        }))
        .await;
        let mut token_datas: Vec<TokenData> = builders
            .into_iter()
            .zip(offchain)
            .map(|(mut builder, metadata)| {
                builder.offchain_metadata(metadata);
                builder.build()
            })
            .collect();

        // Étape 8: Filtre par créateurs vérifiés.
        if let Some(TokenFilter::Creators(creators)) = filter {
            token_datas.retain(|data| {
                data.metadata()
                    .map(|m| m.verified_creators().any(|c| creators.contains(c)))
                    .unwrap_or(false)
            });
        }

        info!(requested = ids.len(), resolved = token_datas.len(), "[Resolver] Passe terminée");
        Ok(token_datas)
    }

    fn dependents_of(&self, tm: &DecodedTokenManager) -> Dependents {
        let mut targets = vec![
            (TokenDataField::Mint, tm.mint),
            (TokenDataField::Metadata, pda::find_metadata_address(&tm.mint, &self.programs)),
            (TokenDataField::Edition, pda::find_edition_address(&tm.mint, &self.programs)),
            (TokenDataField::RecipientTokenAccount, tm.recipient_token_account),
        ];
        if let Some(claim_approver) = tm.claim_approver {
            targets.push((TokenDataField::ClaimApprover, claim_approver));
        }
        // Seule l'adresse canonique d'un type remplit le champ correspondant.
        let time_invalidator = pda::find_time_invalidator_address(&tm.address, &self.programs);
        if tm.invalidators.contains(&time_invalidator) {
            targets.push((TokenDataField::TimeInvalidator, time_invalidator));
        }
        let use_invalidator = pda::find_use_invalidator_address(&tm.address, &self.programs);
        if tm.invalidators.contains(&use_invalidator) {
            targets.push((TokenDataField::UseInvalidator, use_invalidator));
        }
        Dependents { targets, declared_invalidators: tm.invalidators.clone() }
    }

    /// Scanne le programme token manager (filtres memcmp) et renvoie les adresses trouvées,
    /// triées, prêtes pour `get_token_datas`. Les comptes décodés réchauffent le cache au passage.
    #[instrument(skip(self))]
    pub async fn find_token_managers(
        &self,
        issuer: Option<&Pubkey>,
        state: Option<TokenManagerState>,
    ) -> Result<Vec<Pubkey>> {
        let mut filters = vec![MemcmpFilter::new(0, account_discriminator(ACCOUNT_NAME))];
        if let Some(issuer) = issuer {
            filters.push(MemcmpFilter::new(ISSUER_OFFSET, issuer.to_bytes()));
        }
        if let Some(state) = state {
            filters.push(MemcmpFilter::new(STATE_OFFSET, vec![state.as_u8()]));
        }

        let fetcher = self.cache.fetcher();
        let accounts = fetcher
            .source()
            .get_program_accounts(&self.programs.token_manager, &filters)
            .await
            .context("Échec du scan des token managers")?;

        let mut addresses = Vec::with_capacity(accounts.len());
        for (address, account) in accounts {
            let decoded = self.cache.decoder().decode(RawAccount::from_account(address, account));
            if decoded.as_token_manager().is_some() {
                addresses.push(address);
                self.cache.insert(address, decoded);
            }
        }
        addresses.sort();

        info!(found = addresses.len(), "[Resolver] Scan des token managers terminé");
        Ok(addresses)
    }
}
