// DANS : src/monitoring/metrics.rs

use anyhow::Result;
use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, TextEncoder,
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
};

lazy_static! {
    // --- RPC ---
    pub static ref RPC_REQUEST_LATENCY: HistogramVec = register_histogram_vec!(
        "rental_rpc_request_latency_seconds",
        "Latence des appels RPC vers le nœud Solana",
        &["method"] // Labels: "get_multiple_accounts", "get_program_accounts", ...
    ).unwrap();
    pub static ref RPC_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "rental_rpc_requests_total",
        "Compteur total des requêtes RPC, segmenté par méthode et statut",
        &["method", "status"]
    ).unwrap();
    pub static ref FETCH_BATCHES_TOTAL: IntCounter = register_int_counter!(
        "rental_fetch_batches_total", "Nombre de lots getMultipleAccounts émis par le fetcher"
    ).unwrap();

    // --- Cache ---
    pub static ref CACHE_HITS: IntCounter = register_int_counter!(
        "rental_cache_hits_total", "Lectures servies par le cache de comptes"
    ).unwrap();
    pub static ref CACHE_MISSES: IntCounter = register_int_counter!(
        "rental_cache_misses_total", "Lectures qui ont nécessité un fetch"
    ).unwrap();
    pub static ref CACHE_EVICTIONS: IntCounter = register_int_counter!(
        "rental_cache_evictions_total", "Entrées évincées du cache (capacité dépassée)"
    ).unwrap();
    pub static ref CACHE_SIZE: IntGauge = register_int_gauge!(
        "rental_cache_size", "Nombre d'entrées actuellement dans le cache"
    ).unwrap();

    // --- Décodage & Résolution ---
    pub static ref DECODE_OUTCOMES: IntCounterVec = register_int_counter_vec!(
        "rental_decode_outcomes_total",
        "Résultats du décodage, segmentés par type de compte",
        &["kind"] // Labels: "TokenManager", "Mint", "Unknown", ...
    ).unwrap();
    pub static ref UNKNOWN_INVALIDATOR_EXCLUSIONS: IntCounter = register_int_counter!(
        "rental_unknown_invalidator_exclusions_total",
        "Token managers écartés car un invalidator déclaré ne correspond à aucune adresse canonique"
    ).unwrap();
    pub static ref OFFCHAIN_METADATA_FAILURES: IntCounter = register_int_counter!(
        "rental_offchain_metadata_failures_total", "Échecs de récupération des métadonnées off-chain"
    ).unwrap();
}

/// Rend toutes les métriques enregistrées au format texte Prometheus.
pub fn gather() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gathered_text_exposes_cache_counters() {
        CACHE_HITS.inc();
        let text = gather().unwrap();
        assert!(text.contains("rental_cache_hits_total"));
    }
}
