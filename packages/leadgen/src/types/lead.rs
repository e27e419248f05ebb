//! The lead record and its named fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One generated contact/business record.
///
/// Every field except `id` is optional; which ones matter depends on the
/// tool that produced the lead (see [`ToolConfig::columns`](crate::ToolConfig)).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Tool-specific extras (rating, asking price, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl Lead {
    /// Create a lead with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Value of a named field, if populated with non-blank text.
    pub fn field(&self, field: LeadField) -> Option<&str> {
        let value = match field {
            LeadField::Name => &self.name,
            LeadField::Email => &self.email,
            LeadField::Phone => &self.phone,
            LeadField::Company => &self.company,
            LeadField::Title => &self.title,
            LeadField::Location => &self.location,
            LeadField::Website => &self.website,
            LeadField::Industry => &self.industry,
            LeadField::Handle => &self.handle,
            LeadField::Followers => &self.followers,
            LeadField::Engagement => &self.engagement,
            LeadField::Bio => &self.bio,
            LeadField::Source => &self.source,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }

    /// Iterate populated named fields in canonical order, then details.
    pub fn populated(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        LeadField::ALL
            .into_iter()
            .filter_map(move |f| self.field(f).map(|v| (f.key(), v)))
            .chain(
                self.details
                    .iter()
                    .filter(|(_, v)| !v.trim().is_empty())
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            )
    }
}

/// Named lead fields, in canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadField {
    Name,
    Email,
    Phone,
    Company,
    Title,
    Location,
    Website,
    Industry,
    Handle,
    Followers,
    Engagement,
    Bio,
    Source,
}

impl LeadField {
    pub const ALL: [LeadField; 13] = [
        LeadField::Name,
        LeadField::Email,
        LeadField::Phone,
        LeadField::Company,
        LeadField::Title,
        LeadField::Location,
        LeadField::Website,
        LeadField::Industry,
        LeadField::Handle,
        LeadField::Followers,
        LeadField::Engagement,
        LeadField::Bio,
        LeadField::Source,
    ];

    /// Serialized field key (also the CSV header).
    pub fn key(&self) -> &'static str {
        match self {
            LeadField::Name => "name",
            LeadField::Email => "email",
            LeadField::Phone => "phone",
            LeadField::Company => "company",
            LeadField::Title => "title",
            LeadField::Location => "location",
            LeadField::Website => "website",
            LeadField::Industry => "industry",
            LeadField::Handle => "handle",
            LeadField::Followers => "followers",
            LeadField::Engagement => "engagement",
            LeadField::Bio => "bio",
            LeadField::Source => "source",
        }
    }

    /// Table header label.
    pub fn label(&self) -> &'static str {
        match self {
            LeadField::Name => "Name",
            LeadField::Email => "Email",
            LeadField::Phone => "Phone",
            LeadField::Company => "Company",
            LeadField::Title => "Title",
            LeadField::Location => "Location",
            LeadField::Website => "Website",
            LeadField::Industry => "Industry",
            LeadField::Handle => "Handle",
            LeadField::Followers => "Followers",
            LeadField::Engagement => "Engagement",
            LeadField::Bio => "Bio",
            LeadField::Source => "Source",
        }
    }
}

/// Normalize an identity value for dedup comparison: trim and lowercase.
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_not_populated() {
        let lead = Lead::new("1").with_name("  ").with_email("a@b.com");

        assert_eq!(lead.field(LeadField::Name), None);
        assert_eq!(lead.field(LeadField::Email), Some("a@b.com"));
    }

    #[test]
    fn populated_orders_named_fields_before_details() {
        let lead = Lead::new("1")
            .with_detail("rating", "4.8")
            .with_phone("555-0100")
            .with_name("Ada");

        let keys: Vec<&str> = lead.populated().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["name", "phone", "rating"]);
    }

    #[test]
    fn deserializes_sparse_json() {
        let lead: Lead = serde_json::from_str(r#"{"id": "x", "email": "e@x.io"}"#).unwrap();

        assert_eq!(lead.id, "x");
        assert_eq!(lead.email.as_deref(), Some("e@x.io"));
        assert!(lead.details.is_empty());
    }

    #[test]
    fn normalize_key_trims_and_lowercases() {
        assert_eq!(normalize_key("  Ada@Example.COM "), "ada@example.com");
    }
}
