// src/data_pipeline/offchain_metadata.rs

use crate::monitoring::metrics::OFFCHAIN_METADATA_FAILURES;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    // Les valeurs sont tantôt des chaînes, tantôt des nombres.
    pub value: serde_json::Value,
}

/// Le JSON pointé par l'URI du compte Metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffchainMetadata {
    pub image: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl OffchainMetadata {
    pub fn attribute(&self, trait_type: &str) -> Option<&serde_json::Value> {
        self.attributes.iter().find(|a| a.trait_type == trait_type).map(|a| &a.value)
    }
}

/// Client HTTP pour les métadonnées off-chain. Aucune authentification.
#[derive(Clone)]
pub struct OffchainMetadataClient {
    client: reqwest::Client,
}

impl OffchainMetadataClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// GET + parse JSON. Un statut non-2xx ou un JSON malformé est une erreur.
    pub async fn fetch(&self, uri: &str) -> Result<OffchainMetadata> {
        let response = self.client.get(uri).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Erreur HTTP {} pour {}", response.status(), uri));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text)
            .map_err(|e| anyhow!("Erreur de décodage JSON pour {}: {}", uri, e))
    }

    /// Comme `fetch`, mais un échec donne simplement `None` : les métadonnées manquantes
    /// ne doivent jamais faire échouer la vue.
    pub async fn fetch_optional(&self, uri: &str) -> Option<OffchainMetadata> {
        match self.fetch(uri).await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                OFFCHAIN_METADATA_FAILURES.inc();
                warn!(uri, error = %e, "[Metadata] Métadonnées off-chain indisponibles");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> OffchainMetadataClient {
        OffchainMetadataClient::new(Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn parses_image_and_attributes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"image":"https://img/1.png","name":"Rentable #1","attributes":[{"trait_type":"Rarity","value":"Epic"},{"trait_type":"Level","value":3}]}"#,
            ))
            .mount(&server)
            .await;

        let metadata = client().fetch(&format!("{}/1.json", server.uri())).await.unwrap();
        assert_eq!(metadata.image, "https://img/1.png");
        assert_eq!(metadata.attribute("Rarity"), Some(&serde_json::json!("Epic")));
        assert_eq!(metadata.attribute("Level"), Some(&serde_json::json!(3)));
        assert_eq!(metadata.description, None);
    }

    #[tokio::test]
    async fn server_error_and_bad_json_degrade_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/500.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bad.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{ pas du json"))
            .mount(&server)
            .await;

        let client = client();
        assert!(client.fetch(&format!("{}/500.json", server.uri())).await.is_err());
        assert!(client.fetch_optional(&format!("{}/500.json", server.uri())).await.is_none());
        assert!(client.fetch_optional(&format!("{}/bad.json", server.uri())).await.is_none());
    }

    #[tokio::test]
    async fn unreachable_host_degrades_to_none() {
        assert!(client().fetch_optional("http://127.0.0.1:1/never.json").await.is_none());
    }
}
