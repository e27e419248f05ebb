//! Tool kinds and their display catalog.
//!
//! A tool kind only themes a run: it shapes the prompt sent to the record
//! source and picks the columns shown for the results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::lead::LeadField;

/// The platform or service a run is themed around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    Apollo,
    EmailFinder,
    GoogleMaps,
    SkipTrace,
    EmailValidator,
    Youtube,
    Instagram,
    Tiktok,
    Airbnb,
    BizBuySell,
    Property,
    Angi,
    Yelp,
    People,
}

impl ToolKind {
    pub const ALL: [ToolKind; 14] = [
        ToolKind::Apollo,
        ToolKind::EmailFinder,
        ToolKind::GoogleMaps,
        ToolKind::SkipTrace,
        ToolKind::EmailValidator,
        ToolKind::Youtube,
        ToolKind::Instagram,
        ToolKind::Tiktok,
        ToolKind::Airbnb,
        ToolKind::BizBuySell,
        ToolKind::Property,
        ToolKind::Angi,
        ToolKind::Yelp,
        ToolKind::People,
    ];

    /// Human-facing name, also interpolated into the prompt.
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Apollo => "Apollo Scraper",
            ToolKind::EmailFinder => "Email Finder Tool",
            ToolKind::GoogleMaps => "Google Maps Scraper",
            ToolKind::SkipTrace => "Skip Trace Service",
            ToolKind::EmailValidator => "Email Validator",
            ToolKind::Youtube => "YouTuber Email Finder",
            ToolKind::Instagram => "Instagram Scraper",
            ToolKind::Tiktok => "TikTok Scraper",
            ToolKind::Airbnb => "Airbnb Email Scraper",
            ToolKind::BizBuySell => "BizBuySell Scraper",
            ToolKind::Property => "Property Search",
            ToolKind::Angi => "Angi Scraper",
            ToolKind::Yelp => "Yelp Scraper",
            ToolKind::People => "People Finder",
        }
    }

    /// Command-line identifier.
    pub fn slug(&self) -> &'static str {
        match self {
            ToolKind::Apollo => "apollo",
            ToolKind::EmailFinder => "email-finder",
            ToolKind::GoogleMaps => "google-maps",
            ToolKind::SkipTrace => "skip-trace",
            ToolKind::EmailValidator => "email-validator",
            ToolKind::Youtube => "youtube",
            ToolKind::Instagram => "instagram",
            ToolKind::Tiktok => "tiktok",
            ToolKind::Airbnb => "airbnb",
            ToolKind::BizBuySell => "biz-buy-sell",
            ToolKind::Property => "property",
            ToolKind::Angi => "angi",
            ToolKind::Yelp => "yelp",
            ToolKind::People => "people",
        }
    }

    /// Whether leads from this tool are keyed by social handle rather than email.
    pub fn is_social(&self) -> bool {
        matches!(
            self,
            ToolKind::Youtube | ToolKind::Instagram | ToolKind::Tiktok
        )
    }

    /// Catalog entry for this tool.
    pub fn config(&self) -> ToolConfig {
        use LeadField::*;

        let (description, placeholder, columns): (&str, &str, &[LeadField]) = match self {
            ToolKind::Apollo => (
                "Turn any search into a ready-to-use CSV of prospects.",
                "https://apollo.io/search/results?...",
                &[Name, Email, Title, Company, Website, Location],
            ),
            ToolKind::EmailFinder => (
                "Find verified email addresses from any company domain.",
                "example.com",
                &[Name, Email, Title, Company],
            ),
            ToolKind::GoogleMaps => (
                "Export Google Maps business details to CSV in one click.",
                "Dentists in Los Angeles",
                &[Company, Phone, Location, Website, Industry],
            ),
            ToolKind::SkipTrace => (
                "Find contact info and addresses from names or phones.",
                "John Doe, 123 Main St, Springfield",
                &[Name, Phone, Email, Location],
            ),
            ToolKind::EmailValidator => (
                "Verify email deliverability and quality scores in bulk.",
                "user@example.com, test@corp.com",
                &[Email, Name, Company, Source],
            ),
            ToolKind::Youtube => (
                "Find business contact emails from YouTube channels.",
                "https://youtube.com/@channelname",
                &[Name, Handle, Followers, Email, Location],
            ),
            ToolKind::Instagram => (
                "Find creators and their contact details from Instagram.",
                "Fitness coaches in Miami",
                &[Name, Handle, Followers, Engagement, Email, Bio],
            ),
            ToolKind::Tiktok => (
                "Find TikTok creators with audience and engagement stats.",
                "https://tiktok.com/@creator",
                &[Name, Handle, Followers, Engagement, Email, Bio],
            ),
            ToolKind::Airbnb => (
                "Extract host emails and property details from listings.",
                "https://airbnb.com/rooms/123456...",
                &[Name, Title, Email, Location, Website],
            ),
            ToolKind::BizBuySell => (
                "Find businesses for sale with financials and broker contacts.",
                "https://bizbuysell.com/listings/...",
                &[Company, Industry, Location, Name, Phone, Email],
            ),
            ToolKind::Property => (
                "Get home values, tax history, and owner contact info.",
                "1600 Amphitheatre Pkwy, Mountain View, CA",
                &[Name, Location, Phone, Email],
            ),
            ToolKind::Angi => (
                "Find verified home service professionals with ratings.",
                "Plumbers in Chicago",
                &[Company, Phone, Industry, Location, Website],
            ),
            ToolKind::Yelp => (
                "Extract business listings with reviews and ratings.",
                "Italian Restaurants in NYC",
                &[Company, Phone, Industry, Location, Website],
            ),
            ToolKind::People => (
                "Find anyone by name, phone, or address instantly.",
                "Jane Smith, New York",
                &[Name, Location, Phone, Email],
            ),
        };

        ToolConfig {
            kind: *self,
            description,
            placeholder,
            columns,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ToolKind {
    type Err = UnknownToolKind;

    /// Accepts a slug (`google-maps`) or the display name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        ToolKind::ALL
            .into_iter()
            .find(|k| k.slug() == needle || k.display_name().to_lowercase() == needle)
            .ok_or_else(|| UnknownToolKind(s.to_string()))
    }
}

/// Returned when a tool name does not match any [`ToolKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool kind: {0}")]
pub struct UnknownToolKind(pub String);

/// Display metadata for a tool kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub kind: ToolKind,
    pub description: &'static str,
    pub placeholder: &'static str,
    /// Columns shown in the results table, in display order.
    pub columns: &'static [LeadField],
}
