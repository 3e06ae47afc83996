//! Text generation gateway.
//!
//! Stateless call-and-response wrapper around a remote text generation
//! backend. Two operations: draft a body for a content type, and adapt an
//! existing body for a list of target audiences.
//!
//! ## Failure policy
//!
//! A failed generation is never retried. The caller substitutes
//! [`GENERATION_FAILED_PLACEHOLDER`] into the body. Adaptation is
//! all-or-nothing: either one version per requested audience or an error.

mod http;

pub use http::HttpGenerationGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{ContentType, Version, WorkspaceContext};

/// Body text substituted when generation fails.
pub const GENERATION_FAILED_PLACEHOLDER: &str =
    "Content generation failed. Please try again or write your content manually.";

/// Knobs passed along with a generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Desired tone ("professional", "urgent", ...)
    pub tone: String,
    /// Target audience identifiers
    #[serde(default)]
    pub audiences: Vec<String>,
    /// Whether the backend should weave in supporting data
    #[serde(default)]
    pub include_data: bool,
}

impl GenerationOptions {
    pub fn new(tone: impl Into<String>) -> Self {
        Self { tone: tone.into(), ..Default::default() }
    }

    pub fn with_audiences(mut self, audiences: Vec<String>) -> Self {
        self.audiences = audiences;
        self
    }

    pub fn with_data(mut self, include_data: bool) -> Self {
        self.include_data = include_data;
        self
    }
}

/// A request to draft a body for one content type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub content_type: ContentType,
    pub context: WorkspaceContext,
    pub options: GenerationOptions,
    pub prompt: String,
}

impl GenerationRequest {
    /// Build a request whose prompt is derived from the context.
    pub fn new(
        content_type: ContentType,
        context: WorkspaceContext,
        options: GenerationOptions,
    ) -> Self {
        let prompt = build_prompt(content_type, &context, &options);
        Self { content_type, context, options, prompt }
    }

    /// Append user instructions to the derived prompt.
    pub fn with_instructions(mut self, instructions: &str) -> Self {
        let instructions = instructions.trim();
        if !instructions.is_empty() {
            self.prompt.push_str("\n\nAdditional instructions:\n");
            self.prompt.push_str(instructions);
        }
        self
    }
}

/// Successful generation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContent {
    pub content: String,
}

/// A request to adapt a body for several audiences.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptationRequest {
    pub source_text: String,
    pub audiences: Vec<String>,
    pub context: WorkspaceContext,
}

/// One adapted version as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptedVersion {
    pub audience: String,
    #[serde(alias = "body", alias = "text")]
    pub content: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub language: String,
}

impl From<AdaptedVersion> for Version {
    fn from(adapted: AdaptedVersion) -> Self {
        Self::new(adapted.audience, adapted.content)
            .with_tone(adapted.tone)
            .with_language(adapted.language)
    }
}

/// Generation gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Generation unsuccessful: {0}")]
    Unsuccessful(String),

    #[error("Expected {expected} adapted versions, got {actual}")]
    VersionCountMismatch { expected: usize, actual: usize },

    #[error("Generation endpoint not configured")]
    NotConfigured,
}

/// Trait for text generation backends.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Draft a body for the requested content type.
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, GatewayError>;

    /// Adapt source text for each requested audience.
    async fn adapt(&self, request: &AdaptationRequest) -> Result<Vec<AdaptedVersion>, GatewayError>;

    /// Get the gateway name.
    fn name(&self) -> &str;
}

/// Adapt for every audience, or fail as a whole.
///
/// Returns exactly one [`Version`] per requested audience.
pub async fn adapt_for_audiences(
    gateway: &dyn GenerationGateway,
    request: &AdaptationRequest,
) -> Result<Vec<Version>, GatewayError> {
    let adapted = gateway.adapt(request).await?;

    if adapted.len() != request.audiences.len() {
        return Err(GatewayError::VersionCountMismatch {
            expected: request.audiences.len(),
            actual: adapted.len(),
        });
    }

    Ok(adapted.into_iter().map(Version::from).collect())
}

/// Compose a generation prompt from the context bundle.
pub fn build_prompt(
    content_type: ContentType,
    context: &WorkspaceContext,
    options: &GenerationOptions,
) -> String {
    let mut prompt = format!(
        "Write a {} for {}.",
        content_type.display_name().to_lowercase(),
        if context.organization.name.is_empty() {
            "the organization"
        } else {
            context.organization.name.as_str()
        }
    );

    if let Some(industry) = &context.organization.industry {
        prompt.push_str(&format!(" Industry: {industry}."));
    }

    if let Some(framework) = &context.framework {
        if !framework.objective.is_empty() {
            prompt.push_str(&format!("\n\nObjective: {}", framework.objective));
        }
        if !framework.narrative.is_empty() {
            prompt.push_str(&format!("\nNarrative: {}", framework.narrative));
        }
        if !framework.proof_points.is_empty() {
            prompt.push_str("\nProof points:");
            for point in &framework.proof_points {
                prompt.push_str(&format!("\n- {point}"));
            }
        }
    }

    if options.include_data {
        if let Some(intelligence) = &context.intelligence {
            if !intelligence.highlights.is_empty() {
                prompt.push_str("\n\nSupporting intelligence:");
                for highlight in &intelligence.highlights {
                    prompt.push_str(&format!("\n- {highlight}"));
                }
            }
            if let Some(opportunity) = &intelligence.opportunity {
                prompt.push_str(&format!("\nOpportunity: {opportunity}"));
            }
        }
    }

    if !options.tone.is_empty() {
        prompt.push_str(&format!("\n\nTone: {}", options.tone));
    }
    if !options.audiences.is_empty() {
        prompt.push_str(&format!("\nAudience: {}", options.audiences.join(", ")));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Framework, Intelligence, Organization};

    struct FixedAdapter {
        versions: Vec<AdaptedVersion>,
    }

    #[async_trait]
    impl GenerationGateway for FixedAdapter {
        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<GeneratedContent, GatewayError> {
            Err(GatewayError::NotConfigured)
        }

        async fn adapt(
            &self,
            _request: &AdaptationRequest,
        ) -> Result<Vec<AdaptedVersion>, GatewayError> {
            Ok(self.versions.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn adapted(audience: &str) -> AdaptedVersion {
        AdaptedVersion {
            audience: audience.to_string(),
            content: format!("for {audience}"),
            tone: "plain".to_string(),
            language: "en".to_string(),
        }
    }

    fn adaptation_request(audiences: &[&str]) -> AdaptationRequest {
        AdaptationRequest {
            source_text: "source".to_string(),
            audiences: audiences.iter().map(|a| (*a).to_string()).collect(),
            context: WorkspaceContext::default(),
        }
    }

    #[test]
    fn test_prompt_includes_framework() {
        let context = WorkspaceContext::new(Organization::new("org", "Acme")).with_framework(
            Framework::new("fw", "Launch")
                .with_objective("Announce the product")
                .with_proof_points(vec!["First to market".to_string()]),
        );
        let prompt =
            build_prompt(ContentType::PressRelease, &context, &GenerationOptions::new("bold"));

        assert!(prompt.starts_with("Write a press release for Acme."));
        assert!(prompt.contains("Objective: Announce the product"));
        assert!(prompt.contains("- First to market"));
        assert!(prompt.contains("Tone: bold"));
    }

    #[test]
    fn test_prompt_only_uses_intelligence_when_requested() {
        let context = WorkspaceContext::new(Organization::new("org", "Acme")).with_intelligence(
            Intelligence { highlights: vec!["Competitor recall".to_string()], opportunity: None },
        );

        let without = build_prompt(ContentType::Email, &context, &GenerationOptions::default());
        let with = build_prompt(
            ContentType::Email,
            &context,
            &GenerationOptions::default().with_data(true),
        );

        assert!(!without.contains("Competitor recall"));
        assert!(with.contains("Competitor recall"));
    }

    #[test]
    fn test_instructions_are_appended() {
        let request = GenerationRequest::new(
            ContentType::SocialPost,
            WorkspaceContext::default(),
            GenerationOptions::default(),
        )
        .with_instructions("  keep it short ");

        assert!(request.prompt.contains("the organization"));
        assert!(request.prompt.ends_with("keep it short"));
    }

    #[test]
    fn test_generation_request_wire_shape() {
        let request = GenerationRequest::new(
            ContentType::PressRelease,
            WorkspaceContext::new(Organization::new("org-1", "Acme")),
            GenerationOptions::new("urgent")
                .with_audiences(vec!["press".to_string()])
                .with_data(true),
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contentType"], "press-release");
        assert_eq!(json["context"]["organization"]["id"], "org-1");
        assert_eq!(json["options"]["tone"], "urgent");
        assert_eq!(json["options"]["includeData"], true);
        assert_eq!(json["options"]["audiences"][0], "press");
        assert!(json["prompt"].as_str().unwrap().starts_with("Write a press release for Acme."));
        assert!(json.get("content_type").is_none());
    }

    #[test]
    fn test_adaptation_request_wire_shape() {
        let json = serde_json::to_value(adaptation_request(&["investors", "staff"])).unwrap();

        assert_eq!(json["sourceText"], "source");
        assert_eq!(json["audiences"], serde_json::json!(["investors", "staff"]));
        assert!(json["context"].is_object());
        assert!(json.get("source_text").is_none());
    }

    #[test]
    fn test_adapted_version_accepts_body_alias() {
        let adapted: AdaptedVersion =
            serde_json::from_str(r#"{"audience": "investors", "body": "text"}"#).unwrap();
        assert_eq!(adapted.content, "text");
        assert!(adapted.tone.is_empty());
    }

    #[tokio::test]
    async fn test_adapt_for_audiences_returns_one_version_each() {
        let gateway = FixedAdapter { versions: vec![adapted("press"), adapted("investors")] };
        let versions = adapt_for_audiences(&gateway, &adaptation_request(&["press", "investors"]))
            .await
            .unwrap();

        assert_eq!(versions.len(), 2);
        assert_eq!(versions[1].audience, "investors");
        assert_eq!(versions[1].tone, "plain");
    }

    #[tokio::test]
    async fn test_adapt_for_audiences_rejects_partial_response() {
        let gateway = FixedAdapter { versions: vec![adapted("press")] };
        let result =
            adapt_for_audiences(&gateway, &adaptation_request(&["press", "investors"])).await;

        assert!(matches!(
            result,
            Err(GatewayError::VersionCountMismatch { expected: 2, actual: 1 })
        ));
    }
}
