//! Workspace context.
//!
//! The organization, the active strategic framework and any gathered
//! intelligence. Passed explicitly into the workspace and into every
//! generation request rather than read from shared global state.

use serde::{Deserialize, Serialize};

use super::content::ContentType;

/// The organization content is authored for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl Organization {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), industry: None }
    }
}

/// A piece of content a framework says it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNeed {
    pub content_type: ContentType,
    /// What the piece should accomplish
    #[serde(default)]
    pub description: String,
}

impl ContentNeed {
    pub fn new(content_type: ContentType, description: impl Into<String>) -> Self {
        Self { content_type, description: description.into() }
    }
}

/// Externally supplied strategic context that seeds generation prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Framework {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub proof_points: Vec<String>,
    #[serde(default)]
    pub content_needs: Vec<ContentNeed>,
}

impl Framework {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), ..Default::default() }
    }

    pub fn with_objective(mut self, objective: impl Into<String>) -> Self {
        self.objective = objective.into();
        self
    }

    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = narrative.into();
        self
    }

    pub fn with_proof_points(mut self, proof_points: Vec<String>) -> Self {
        self.proof_points = proof_points;
        self
    }

    pub fn with_content_needs(mut self, needs: Vec<ContentNeed>) -> Self {
        self.content_needs = needs;
        self
    }
}

/// Optional market/media intelligence gathered for the organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intelligence {
    #[serde(default)]
    pub highlights: Vec<String>,
    /// Opportunity the content responds to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<String>,
}

/// Context bundle injected into the workspace and sent with generation requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceContext {
    pub organization: Organization,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<Framework>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intelligence: Option<Intelligence>,
}

impl WorkspaceContext {
    pub fn new(organization: Organization) -> Self {
        Self { organization, framework: None, intelligence: None }
    }

    pub fn with_framework(mut self, framework: Framework) -> Self {
        self.framework = Some(framework);
        self
    }

    pub fn with_intelligence(mut self, intelligence: Intelligence) -> Self {
        self.intelligence = Some(intelligence);
        self
    }

    /// The organization identifier used to scope library reads.
    pub fn organization_id(&self) -> &str {
        &self.organization.id
    }
}
