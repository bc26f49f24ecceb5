//! Requester profile and trip request
//!
//! The profile is opaque text that only shapes prompt wording. Validation is
//! limited to non-empty fields.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ConceptNode};
use crate::error::RequestError;

/// Suggested roles offered by the search form
pub const ROLES: &[&str] = &["CMO", "VP", "Manager", "Content"];

pub const INDUSTRIES: &[&str] = &["Finance", "Healthcare", "Manufacturing", "Retail"];

pub const COMPANY_TYPES: &[&str] = &["B2B", "B2C", "Other"];

/// Employee-count buckets
pub const COMPANY_SIZES: &[&str] = &["1-100", "100-500", "500-1000", "1000-5000", "5000+"];

pub const REVENUE_BANDS: &[&str] = &[
    "Under $5M",
    "$5M - $50M",
    "$50M - $100M",
    "$100M - $500M",
    "$500M - $1B",
    "$1B+",
];

pub const JOURNEY_PURPOSES: &[&str] = &[
    "Improve pipeline quality",
    "Reduce CAC",
    "Increase retention",
    "Launch ABM",
    "Optimize tech stack",
    "Build content engine",
    "Improve attribution",
];

/// Who is asking, used to tailor stops and rationale text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequesterProfile {
    pub role: String,
    pub industry: String,
    /// Employee-count bucket
    pub company_size: String,
    pub revenue: String,
    /// B2B / B2C / Other
    pub company_type: String,
    pub journey_purpose: String,
}

impl Default for RequesterProfile {
    fn default() -> Self {
        Self {
            role: "CMO".to_string(),
            industry: "Finance".to_string(),
            company_size: "100-500".to_string(),
            revenue: "$50M - $100M".to_string(),
            company_type: "B2B".to_string(),
            journey_purpose: "Improve pipeline quality".to_string(),
        }
    }
}

impl RequesterProfile {
    /// Check that every field carries some text
    pub fn validate(&self) -> Result<(), RequestError> {
        let fields = [
            ("role", &self.role),
            ("industry", &self.industry),
            ("companySize", &self.company_size),
            ("revenue", &self.revenue),
            ("companyType", &self.company_type),
            ("journeyPurpose", &self.journey_purpose),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(RequestError::EmptyProfileField(name));
            }
        }
        Ok(())
    }
}

/// One user-initiated search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin: ConceptNode,
    pub destination: ConceptNode,
    pub profile: RequesterProfile,
}

impl TripRequest {
    pub fn new(origin: ConceptNode, destination: ConceptNode, profile: RequesterProfile) -> Self {
        Self {
            origin,
            destination,
            profile,
        }
    }

    /// Resolve origin and destination by name or short code against `catalog`
    pub fn resolve(
        catalog: &Catalog,
        origin: &str,
        destination: &str,
        profile: RequesterProfile,
    ) -> Result<Self, RequestError> {
        profile.validate()?;
        let origin = catalog
            .lookup(origin)
            .cloned()
            .ok_or_else(|| RequestError::UnknownNode(origin.to_string()))?;
        let destination = catalog
            .lookup(destination)
            .cloned()
            .ok_or_else(|| RequestError::UnknownNode(destination.to_string()))?;
        Ok(Self::new(origin, destination, profile))
    }
}
