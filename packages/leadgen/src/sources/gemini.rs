//! Gemini implementation of the record source.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::GeminiClient;
//! use leadgen::sources::{GeminiLeadSource, GeminiSourceConfig};
//!
//! let source = GeminiLeadSource::new(GeminiClient::from_env()?, GeminiSourceConfig::default());
//! let batch = source.fetch_batch(ToolKind::Yelp, "Italian Restaurants in NYC", 0).await?;
//! ```

use async_trait::async_trait;
use gemini_client::{GeminiClient, GeminiError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};
use crate::traits::source::RecordSource;
use crate::types::{lead::Lead, tool::ToolKind};

const SYSTEM_PROMPT: &str = "You are an expert high-volume lead generation and web intelligence agent. \
Respond in JSON format ONLY, as a flat array of objects.";

/// Settings for [`GeminiLeadSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiSourceConfig {
    /// Model name (default: gemini-3-flash-preview)
    pub model: String,
    /// Leads requested per call (default: 50)
    pub leads_per_batch: usize,
    /// Attach the Google Search tool (default: true)
    pub grounded: bool,
}

impl Default for GeminiSourceConfig {
    fn default() -> Self {
        Self {
            model: "gemini-3-flash-preview".to_string(),
            leads_per_batch: 50,
            grounded: true,
        }
    }
}

impl GeminiSourceConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_leads_per_batch(mut self, n: usize) -> Self {
        self.leads_per_batch = n;
        self
    }

    pub fn with_grounding(mut self, grounded: bool) -> Self {
        self.grounded = grounded;
        self
    }
}

/// One lead as the model returns it.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LeadCandidate {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub handle: Option<String>,
    pub followers: Option<String>,
    pub engagement: Option<String>,
    pub bio: Option<String>,
    pub source: Option<String>,
}

impl From<LeadCandidate> for Lead {
    fn from(c: LeadCandidate) -> Self {
        Lead {
            id: c.id,
            name: Some(c.name),
            email: c.email,
            phone: c.phone,
            company: c.company,
            title: c.title,
            location: c.location,
            website: c.website,
            industry: c.industry,
            handle: c.handle,
            followers: c.followers,
            engagement: c.engagement,
            bio: c.bio,
            source: c.source,
            details: Default::default(),
        }
    }
}

/// Record source that asks Gemini to generate leads.
#[derive(Clone)]
pub struct GeminiLeadSource {
    client: GeminiClient,
    config: GeminiSourceConfig,
}

impl GeminiLeadSource {
    pub fn new(client: GeminiClient, config: GeminiSourceConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &GeminiSourceConfig {
        &self.config
    }

    fn user_prompt(&self, tool: ToolKind, query: &str, batch_index: usize) -> String {
        let mut prompt = format!(
            r#"Task: Extract or find potential leads based on the user's input for the service: {tool}.
Input provided: "{query}"

Goal: MAXIMIZE RESULTS. Provide a comprehensive list of up to {n} high-quality leads.

If the input is a URL, simulate a deep, multi-page crawl of that platform.
If the input is a query (like "plumbers in LA"), use your search capabilities and internal dataset to generate the largest possible verified sample list.

For each lead, ensure details like 'email' and 'phone' follow realistic business patterns.
Focus on accuracy for 'company', 'website', and 'industry'."#,
            tool = tool.display_name(),
            n = self.config.leads_per_batch,
        );

        if tool.is_social() {
            prompt.push_str(
                "\nInclude the creator's 'handle', 'followers', 'engagement' rate and a short 'bio'.",
            );
        }
        if batch_index > 0 {
            prompt.push_str(&format!(
                "\n\nThis is batch {} of an ongoing extraction. Return leads that are distinct from earlier batches.",
                batch_index + 1
            ));
        }
        prompt
    }
}

#[async_trait]
impl RecordSource for GeminiLeadSource {
    async fn fetch_batch(
        &self,
        tool: ToolKind,
        query: &str,
        batch_index: usize,
    ) -> SourceResult<Vec<Lead>> {
        let prompt = self.user_prompt(tool, query, batch_index);

        let result = self
            .client
            .extract::<Vec<LeadCandidate>>(
                &self.config.model,
                SYSTEM_PROMPT,
                prompt,
                self.config.grounded,
            )
            .await;

        match result {
            Ok(candidates) => {
                debug!(
                    tool = %tool,
                    batch = batch_index,
                    count = candidates.len(),
                    "Gemini returned leads"
                );
                Ok(candidates.into_iter().map(Lead::from).collect())
            }
            // Unusable output counts as an empty batch.
            Err(e @ (GeminiError::Parse(_) | GeminiError::Blocked(_))) => {
                warn!(batch = batch_index, error = %e, "Failed to parse Gemini response");
                Ok(Vec::new())
            }
            Err(e) if e.is_transient() => Err(SourceError::Transient(Box::new(e))),
            Err(e) => Err(SourceError::Model(Box::new(e))),
        }
    }
}
