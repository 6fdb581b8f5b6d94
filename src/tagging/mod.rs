//! # Service Tagging Module
//!
//! This module hands the aggregated corpus of a crawl to a language model
//! and turns its answer into a list of services the crawled company offers.
//!
//! ## Key Components
//!
//! - `ServiceTagger`: Anything that can tag a corpus against known services
//! - `CompletionTagger`: A tagger backed by a `rig` completion model
//! - `KnownService`: A service name and description from the catalogue
//! - `ServiceTags`: The reconciled tagging result
//!
//! ## Features
//!
//! - Reconciliation of model output against the known service catalogue
//! - Tolerant parsing of fenced or "N/A" model responses
//! - JSON loading of the catalogue and JSON output of the result

mod error;
mod prompt;

pub use error::TaggingError;
pub use prompt::{PREAMBLE, build_prompt, strip_code_fences};

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::Path;

use rig::{
    agent::{Agent, AgentBuilder},
    completion::{AssistantContent, Completion as _, CompletionModel},
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, instrument};

/// A service from the known catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownService {
    /// Service name, matched exactly against model output
    pub name: String,

    /// What the service covers
    #[serde(alias = "definition")]
    pub description: String,
}

impl KnownService {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Services identified for a company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceTags {
    /// Identified services that exist in the known catalogue
    #[serde(default, deserialize_with = "list_or_marker")]
    pub provided_services: Vec<String>,

    /// Identified services missing from the known catalogue
    #[serde(default, deserialize_with = "list_or_marker")]
    pub additional_services: Vec<String>,

    /// Confidence (0-100) per identified service
    #[serde(default, deserialize_with = "scores_or_marker")]
    pub confidence_scores: HashMap<String, f64>,
}

/// Models answer "N/A" for unrelated sites instead of empty collections
#[derive(Deserialize)]
#[serde(untagged)]
enum OrMarker<T> {
    Value(T),
    Marker(#[allow(dead_code)] String),
}

fn list_or_marker<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OrMarker::<Vec<String>>::deserialize(deserializer)? {
        OrMarker::Value(list) => list,
        OrMarker::Marker(_) => Vec::new(),
    })
}

fn scores_or_marker<'de, D>(deserializer: D) -> Result<HashMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OrMarker::<HashMap<String, f64>>::deserialize(deserializer)? {
        OrMarker::Value(scores) => scores,
        OrMarker::Marker(_) => HashMap::new(),
    })
}

/// Sort identified services against the catalogue.
///
/// Every service named by the model, from either list, lands in
/// `provided_services` when the catalogue contains it and in
/// `additional_services` otherwise. Order is preserved and repeats dropped.
pub fn reconcile(tags: ServiceTags, known_services: &[KnownService]) -> ServiceTags {
    let known: HashSet<&str> = known_services.iter().map(|s| s.name.as_str()).collect();
    let mut seen = HashSet::new();
    let mut provided = Vec::new();
    let mut additional = Vec::new();

    for service in tags
        .provided_services
        .into_iter()
        .chain(tags.additional_services)
    {
        if !seen.insert(service.clone()) {
            continue;
        }
        if known.contains(service.as_str()) {
            provided.push(service);
        } else {
            additional.push(service);
        }
    }

    ServiceTags {
        provided_services: provided,
        additional_services: additional,
        confidence_scores: tags.confidence_scores,
    }
}

/// Parse a raw model response into tags
pub fn parse_response(response: &str) -> Result<ServiceTags, TaggingError> {
    let body = strip_code_fences(response);
    serde_json::from_str(body).map_err(|e| {
        debug!("Unparseable model response: {}", body);
        TaggingError::InvalidResponse(e.to_string())
    })
}

/// Something that can identify the services described by a corpus
pub trait ServiceTagger: Send + Sync {
    /// Tag a corpus against the known services. The result is reconciled.
    fn tag(
        &self,
        corpus: &str,
        known_services: &[KnownService],
    ) -> impl Future<Output = Result<ServiceTags, TaggingError>> + Send;
}

/// A tagger that prompts a completion model
pub struct CompletionTagger<M: CompletionModel> {
    agent: Agent<M>,
}

impl<M: CompletionModel> CompletionTagger<M> {
    /// Build a tagger around a completion model
    pub fn new(model: M) -> Self {
        let agent = AgentBuilder::new(model)
            .preamble(PREAMBLE)
            .temperature(0.0)
            .build();
        Self { agent }
    }
}

impl<M: CompletionModel> ServiceTagger for CompletionTagger<M> {
    #[instrument(skip_all, fields(corpus_len = corpus.len(), known = known_services.len()))]
    async fn tag(
        &self,
        corpus: &str,
        known_services: &[KnownService],
    ) -> Result<ServiceTags, TaggingError> {
        let prompt = build_prompt(corpus, known_services);
        let response = self.agent.completion(prompt.as_str(), vec![]).await?.send().await?;

        let text = response
            .choice
            .into_iter()
            .filter_map(|content| match content {
                AssistantContent::Text(text) => Some(text.text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        let tags = reconcile(parse_response(&text)?, known_services);
        info!(
            "Tagged {} provided and {} additional services",
            tags.provided_services.len(),
            tags.additional_services.len()
        );
        Ok(tags)
    }
}

/// Load the known service catalogue from a JSON array of `{name, description}`
pub async fn load_known_services(path: &Path) -> Result<Vec<KnownService>, TaggingError> {
    let content = tokio::fs::read_to_string(path).await?;
    let services: Vec<KnownService> = serde_json::from_str(&content)?;
    info!("Loaded {} known services from {}", services.len(), path.display());
    Ok(services)
}

/// Write tags as pretty JSON, replacing any existing file
pub async fn write_tags(tags: &ServiceTags, path: &Path) -> Result<(), TaggingError> {
    let json = serde_json::to_string_pretty(tags)?;
    tokio::fs::write(path, json).await?;
    info!("Tagging result written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mock_model::MockCompletionModel;
    use tokio_test::{assert_err, assert_ok};

    fn catalogue() -> Vec<KnownService> {
        vec![
            KnownService::new("Clinical Data Management", "Trial data collection"),
            KnownService::new("Biostatistics", "Statistical analysis"),
        ]
    }

    #[test]
    fn test_reconcile_moves_services() {
        let tags = ServiceTags {
            provided_services: vec!["Clinical Data Management".into(), "Toxicology".into()],
            additional_services: vec!["Biostatistics".into(), "Clinical Data Management".into()],
            confidence_scores: HashMap::from([("Toxicology".to_string(), 40.0)]),
        };

        let tags = reconcile(tags, &catalogue());
        assert_eq!(
            tags.provided_services,
            vec!["Clinical Data Management", "Biostatistics"]
        );
        assert_eq!(tags.additional_services, vec!["Toxicology"]);
        assert_eq!(tags.confidence_scores["Toxicology"], 40.0);
    }

    #[test]
    fn test_parse_response_not_applicable() {
        let tags = assert_ok!(parse_response(
            r#"{"provided_services": "N/A", "additional_services": "N/A", "confidence_scores": "N/A"}"#,
        ));
        assert_eq!(tags, ServiceTags::default());
    }

    #[test]
    fn test_parse_response_invalid() {
        let err = assert_err!(parse_response("I could not find any services."));
        assert!(matches!(err, TaggingError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_completion_tagger() {
        let model = MockCompletionModel::new();
        model
            .set_text_response(
                "```json\n{\"provided_services\": [\"Biostatistics\", \"Phase I Unit\"], \
                 \"additional_services\": [], \
                 \"confidence_scores\": {\"Biostatistics\": 90, \"Phase I Unit\": 55}}\n```",
            )
            .await;

        let tagger = CompletionTagger::new(model);
        let tags = tagger
            .tag("We analyse trial results.", &catalogue())
            .await
            .unwrap();

        assert_eq!(tags.provided_services, vec!["Biostatistics"]);
        assert_eq!(tags.additional_services, vec!["Phase I Unit"]);
        assert_eq!(tags.confidence_scores["Biostatistics"], 90.0);
    }

    #[tokio::test]
    async fn test_known_services_and_output_files() {
        let dir = tempfile::tempdir().unwrap();
        let services_path = dir.path().join("services.json");
        std::fs::write(
            &services_path,
            r#"[{"name": "Biostatistics", "definition": "Statistical analysis"}]"#,
        )
        .unwrap();

        let services = load_known_services(&services_path).await.unwrap();
        assert_eq!(services, vec![KnownService::new("Biostatistics", "Statistical analysis")]);

        let output_path = dir.path().join("output.json");
        let tags = ServiceTags {
            provided_services: vec!["Biostatistics".into()],
            ..Default::default()
        };
        write_tags(&tags, &output_path).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
        assert_eq!(written["provided_services"][0], "Biostatistics");
        assert!(written["additional_services"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_known_services_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_known_services(&dir.path().join("missing.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, TaggingError::Io(_)));
    }
}
