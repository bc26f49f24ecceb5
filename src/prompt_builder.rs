//! Request Builder
//!
//! Turns (origin, destination, profile) into the instruction text and the
//! structural output schema for one generation call. Pure and deterministic
//! for a given catalog.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::catalog::{Catalog, ConceptNode};
use crate::profile::RequesterProfile;

/// Everything the generation client needs for one call
#[derive(Debug, Clone, PartialEq)]
pub struct TripPrompt {
    pub system_instruction: String,
    pub user_prompt: String,
    /// JSON Schema the response must conform to, passed through unmodified
    pub schema: Value,
}

impl TripPrompt {
    /// System instruction and user prompt as a single text
    pub fn instruction_text(&self) -> String {
        format!("{}\n\n{}", self.system_instruction, self.user_prompt)
    }
}

/// Builds trip prompts against a fixed catalog
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    catalog: Arc<Catalog>,
}

impl PromptBuilder {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn build(
        &self,
        origin: &ConceptNode,
        destination: &ConceptNode,
        profile: &RequesterProfile,
    ) -> TripPrompt {
        TripPrompt {
            system_instruction: self.build_system_instruction(),
            user_prompt: Self::build_user_prompt(origin, destination, profile),
            schema: output_schema(),
        }
    }

    fn build_system_instruction(&self) -> String {
        let available = self
            .catalog
            .nodes()
            .iter()
            .map(|n| format!("{} ({})", n.name, n.function))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"You are an expert Marketing Strategist acting as a Travel Agent.
In this world, Cities represent Marketing Functions.
Users "book flights" to solve marketing problems.
Moving from an Origin City (current state or problem) to a Destination City (desired goal) requires "Layovers": the intermediate strategic steps needed to bridge the gap.

You will receive a traveler profile with Role, Industry, Company Size, Revenue, Company Type and Purpose.
YOU MUST CUSTOMIZE THE STRATEGY BASED ON THIS PROFILE.

For example:
- A start-up under $5M needs scrappy, growth-hacked strategies (shorter, cheaper).
- An enterprise at $1B+ needs governance, operations and scalable systems (longer, more expensive, more stops).
- A B2B company needs different layovers (e.g. ABM, Sales Enablement) than a B2C company (e.g. Social Media, Influencer).

Your task is to generate exactly 3 distinct flight itineraries (strategies) from the Origin to the Destination:

1. Direct/Fastest: minimal stops, high-level strategy (good for executives).
2. Recommended: the ideal path for their specific industry and company size.
3. Detailed/Scenic: a deep-dive path with rigorous steps (good for operations and managers).

For each stop (layover) select a valid City from the list below that represents a necessary marketing step, and explain the "marketingTask" for that stop: why are we stopping there?

Use ONLY the following Cities/Functions for layovers.

Available Cities/Functions:
{available}"#
        )
    }

    fn build_user_prompt(
        origin: &ConceptNode,
        destination: &ConceptNode,
        profile: &RequesterProfile,
    ) -> String {
        let mut prompt = format!(
            "Create 3 flight itineraries from {} ({}) to {} ({}).\n\n",
            origin.name, origin.function, destination.name, destination.function
        );

        prompt.push_str("Traveler profile:\n");
        prompt.push_str(&format!("- Role: {}\n", profile.role));
        prompt.push_str(&format!("- Industry: {}\n", profile.industry));
        prompt.push_str(&format!("- Company Type: {}\n", profile.company_type));
        prompt.push_str(&format!("- Size: {} employees\n", profile.company_size));
        prompt.push_str(&format!("- Revenue: {}\n", profile.revenue));
        prompt.push_str(&format!(
            "- Purpose of Journey: {}\n\n",
            profile.journey_purpose
        ));

        prompt.push_str(
            "Customize the marketingTask descriptions and the choice of layover cities to fit this profile's industry, size, company type and purpose.\n\n",
        );

        prompt.push_str("For each itinerary:\n");
        prompt.push_str(
            "- Assign a realistic price in USD. Enterprise solutions are expensive, start-up solutions cheap.\n",
        );
        prompt.push_str(
            "- Assign a totalDuration (e.g. \"3 months\") representing time to implement.\n",
        );
        prompt.push_str(&format!(
            "- List the segments in order: start with {}, then the layovers, end with {}.\n",
            origin.name, destination.name
        ));
        prompt.push_str(
            "- For each segment give the city exactly as listed, its marketingFunction, a marketingTask tailored to the traveler, and a duration.\n",
        );
        prompt.push_str("- Add short tags (e.g. \"Best Value\", \"Fastest Strategy\") and a one-line summary.\n\n");

        prompt.push_str(
            "Respond with a JSON object with a property 'itineraries' containing an array. No markdown, no text outside the JSON.",
        );

        prompt
    }
}

/// Structural contract for generator output
///
/// Declares field names and primitive types only; semantic checks happen in
/// the normalizer.
pub fn output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "itineraries": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "tags": { "type": "array", "items": { "type": "string" } },
                        "summary": { "type": "string" },
                        "price": { "type": "number" },
                        "totalDuration": { "type": "string" },
                        "segments": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "city": { "type": "string" },
                                    "marketingFunction": { "type": "string" },
                                    "marketingTask": { "type": "string" },
                                    "duration": { "type": "string" }
                                },
                                "required": ["city", "marketingFunction", "marketingTask", "duration"]
                            }
                        }
                    },
                    "required": ["id", "tags", "summary", "price", "totalDuration", "segments"]
                }
            }
        },
        "required": ["itineraries"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> PromptBuilder {
        PromptBuilder::new(Catalog::default_catalog())
    }

    fn endpoints() -> (ConceptNode, ConceptNode) {
        let catalog = Catalog::default_catalog();
        (
            catalog.find("London, UK").unwrap().clone(),
            catalog.find("San Francisco, USA").unwrap().clone(),
        )
    }

    #[test]
    fn test_system_instruction_lists_full_catalog() {
        let (origin, destination) = endpoints();
        let prompt = builder().build(&origin, &destination, &RequesterProfile::default());
        for node in Catalog::default_catalog().nodes() {
            let entry = format!("{} ({})", node.name, node.function);
            assert!(prompt.system_instruction.contains(&entry), "missing {}", entry);
        }
    }

    #[test]
    fn test_system_instruction_names_three_archetypes() {
        let (origin, destination) = endpoints();
        let prompt = builder().build(&origin, &destination, &RequesterProfile::default());
        assert!(prompt.system_instruction.contains("exactly 3"));
        assert!(prompt.system_instruction.contains("Direct/Fastest"));
        assert!(prompt.system_instruction.contains("Recommended"));
        assert!(prompt.system_instruction.contains("Detailed/Scenic"));
    }

    #[test]
    fn test_user_prompt_carries_endpoints_and_profile() {
        let (origin, destination) = endpoints();
        let profile = RequesterProfile {
            industry: "Healthcare".to_string(),
            company_type: "B2C".to_string(),
            journey_purpose: "Reduce CAC".to_string(),
            ..Default::default()
        };
        let prompt = builder().build(&origin, &destination, &profile);
        assert!(prompt
            .user_prompt
            .contains("from London, UK (Demand Generation) to San Francisco, USA (AI in Marketing)"));
        assert!(prompt.user_prompt.contains("- Industry: Healthcare"));
        assert!(prompt.user_prompt.contains("- Company Type: B2C"));
        assert!(prompt.user_prompt.contains("- Size: 100-500 employees"));
        assert!(prompt.user_prompt.contains("- Purpose of Journey: Reduce CAC"));
        assert!(prompt.instruction_text().starts_with(&prompt.system_instruction));
    }

    #[test]
    fn test_build_is_deterministic() {
        let (origin, destination) = endpoints();
        let profile = RequesterProfile::default();
        let a = builder().build(&origin, &destination, &profile);
        let b = builder().build(&origin, &destination, &profile);
        assert_eq!(a, b);
    }

    #[test]
    fn test_same_origin_and_destination_is_allowed() {
        let (origin, _) = endpoints();
        let prompt = builder().build(&origin, &origin, &RequesterProfile::default());
        assert!(prompt.user_prompt.contains("from London, UK"));
        assert!(prompt.user_prompt.contains("to London, UK"));
    }

    #[test]
    fn test_schema_shape() {
        let schema = output_schema();
        assert_eq!(schema["required"], json!(["itineraries"]));
        let item = &schema["properties"]["itineraries"]["items"];
        assert_eq!(item["properties"]["price"]["type"], "number");
        let segment = &item["properties"]["segments"]["items"];
        assert_eq!(segment["properties"]["city"]["type"], "string");
        assert!(segment["required"]
            .as_array()
            .unwrap()
            .contains(&json!("marketingTask")));
    }
}
