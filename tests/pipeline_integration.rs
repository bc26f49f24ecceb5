//! End-to-end pipeline tests against a scripted generation client.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;

use itinerary_pipeline::error::GenerationError;
use itinerary_pipeline::{
    CannedLlmClient, Catalog, Enricher, ItineraryPipeline, LlmClient, PipelineOutcome,
    RequesterProfile, TripPrompt, TripRequest, DEFAULT_PROVIDERS, UNKNOWN_CODE,
};

/// Answers based on the prompt it receives, like a real service would
struct EchoRouteClient;

#[async_trait]
impl LlmClient for EchoRouteClient {
    async fn generate(&self, prompt: &TripPrompt) -> Result<String, GenerationError> {
        let tailored = if prompt.user_prompt.contains("B2C") {
            "Los Angeles, USA"
        } else {
            "Toronto, Canada"
        };
        Ok(json!({
            "itineraries": [
                {"id": "fast", "price": 5000, "totalDuration": "1 month", "tags": ["Fastest Strategy"], "summary": "Direct.",
                 "segments": [{"city": "London, UK"}, {"city": "Chicago, USA"}]},
                {"id": "recommended", "price": 15000, "totalDuration": "3 months", "tags": ["Best Value"], "summary": "Tailored.",
                 "segments": [{"city": "London, UK"}, {"city": tailored}, {"city": "Chicago, USA"}]}
            ]
        })
        .to_string())
    }
}

/// Simulates a broken network
struct TransportDown;

#[async_trait]
impl LlmClient for TransportDown {
    async fn generate(&self, _prompt: &TripPrompt) -> Result<String, GenerationError> {
        Err(GenerationError::Api {
            status: 503,
            body: "upstream unavailable".to_string(),
        })
    }
}

const THREE_STRATEGIES: &str = r#"```json
{
  "itineraries": [
    {
      "id": "exec",
      "tags": ["Fastest Strategy", "Executive"],
      "summary": "Straight from demand to AI.",
      "price": 4500,
      "totalDuration": "6 weeks",
      "segments": [
        {"city": "London, UK", "marketingFunction": "Demand Generation", "marketingTask": "Baseline the funnel", "duration": "1 week"},
        {"city": "San Francisco, USA", "marketingFunction": "AI in Marketing", "marketingTask": "Predictive scoring", "duration": "5 weeks"}
      ]
    },
    {
      "tags": ["Best Value"],
      "summary": "Research first, then automate.",
      "price": "$18,000",
      "totalDuration": "3 months",
      "segments": [
        {"city": "London, UK", "marketingFunction": "Demand Generation", "marketingTask": "Audit", "duration": "1 week"},
        {"city": "Berlin, Germany", "marketingFunction": "Market Research", "marketingTask": "ICP research", "duration": "1 month"},
        {"city": "Atlantis", "marketingFunction": "Mystery", "marketingTask": "Invented stop", "duration": "2 weeks"},
        {"city": "San Francisco, USA", "marketingFunction": "AI in Marketing", "marketingTask": "Deploy", "duration": "1 month"}
      ]
    },
    {
      "id": "deep",
      "tags": ["Detailed"],
      "summary": "Missing its segments.",
      "price": 90000,
      "totalDuration": "1 year"
    },
    {
      "id": "deep-2",
      "tags": ["Detailed"],
      "summary": "Operations heavy.",
      "price": -1,
      "totalDuration": "9 months",
      "segments": [
        {"city": "Tallinn, Estonia", "marketingFunction": "Marketing Automation", "marketingTask": "Automate nurture", "duration": "2 months"},
        {"city": "Stockholm, Sweden", "marketingFunction": "Marketing Operations", "marketingTask": "Ops model", "duration": "2 months"}
      ]
    }
  ]
}
```"#;

fn at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .unwrap()
        .and_hms_opt(14, 5, 0)
        .unwrap()
}

fn request(origin: &str, destination: &str) -> TripRequest {
    TripRequest::resolve(
        &Catalog::default_catalog(),
        origin,
        destination,
        RequesterProfile::default(),
    )
    .unwrap()
}

fn pipeline_with(client: Arc<dyn LlmClient>) -> ItineraryPipeline {
    ItineraryPipeline::new(client, Catalog::default_catalog())
}

#[tokio::test]
async fn test_full_run_upholds_invariants() {
    let pipeline = pipeline_with(Arc::new(CannedLlmClient::ok(THREE_STRATEGIES)));
    let request = request("London, UK", "San Francisco, USA");
    let itineraries = pipeline.run_at(&request, at()).await;

    assert_eq!(itineraries.len(), 3);
    for (i, itinerary) in itineraries.iter().enumerate() {
        assert!(itinerary.steps.len() >= 2);
        assert_eq!(itinerary.steps.first().unwrap().node_name, "London, UK");
        assert_eq!(
            itinerary.steps.last().unwrap().node_name,
            "San Francisco, USA"
        );
        assert_eq!(itinerary.provider, DEFAULT_PROVIDERS[i % DEFAULT_PROVIDERS.len()]);

        for pair in itinerary.steps.windows(2) {
            assert!(pair[0].departure_at <= pair[0].arrival_at);
            assert!(pair[0].arrival_at <= pair[1].departure_at);
        }
        for step in &itinerary.steps {
            let catalog = Catalog::default_catalog();
            assert_eq!(step.code, catalog.code_or_unknown(&step.node_name));
        }
    }
}

#[tokio::test]
async fn test_full_run_coerces_defects_in_place() {
    let pipeline = pipeline_with(Arc::new(CannedLlmClient::ok(THREE_STRATEGIES)));
    let report = pipeline
        .run_detailed(&request("London, UK", "San Francisco, USA"), at())
        .await;

    assert_eq!(report.outcome, PipelineOutcome::Completed);
    assert_eq!(report.rejected_records, 1);

    let ids: Vec<_> = report.itineraries.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["exec", "itinerary-2", "deep-2"]);

    let researched = &report.itineraries[1];
    assert_eq!(researched.formatted_price(), "$18,000");
    assert_eq!(researched.route_codes(), "LHR → BER → UNK → SFO");
    assert_eq!(researched.steps[2].code, UNKNOWN_CODE);
    assert_eq!(researched.steps[2].rationale, "Invented stop");

    // Negative price passes through untouched
    assert!(report.itineraries[2].price.is_sign_negative());

    // Off-route generator output gets both endpoints anchored
    let ops = &report.itineraries[2];
    assert_eq!(ops.route_codes(), "LHR → TLL → ARN → SFO");
    assert_eq!(ops.steps[1].departure_time, "12:00");
}

#[tokio::test]
async fn test_transport_error_returns_empty_list() {
    let pipeline = pipeline_with(Arc::new(TransportDown));
    let request = request("London, UK", "San Francisco, USA");

    assert!(pipeline.run_at(&request, at()).await.is_empty());

    let report = pipeline.run_detailed(&request, at()).await;
    match report.outcome {
        PipelineOutcome::GenerationFailed(reason) => assert!(reason.contains("503")),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_batch() {
    let pipeline = pipeline_with(Arc::new(CannedLlmClient::ok(r#"{"itineraries": []}"#)));
    let report = pipeline
        .run_detailed(&request("London, UK", "San Francisco, USA"), at())
        .await;
    assert!(report.itineraries.is_empty());
    assert_eq!(report.outcome, PipelineOutcome::Completed);
}

#[tokio::test]
async fn test_prompt_reflects_profile() {
    let client = Arc::new(CannedLlmClient::ok(r#"{"itineraries": []}"#));
    let pipeline = pipeline_with(client.clone());
    let mut request = request("London, UK", "Chicago, USA");
    request.profile.company_type = "B2C".to_string();
    request.profile.industry = "Retail".to_string();

    pipeline.run_at(&request, at()).await;

    let prompts = client.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].user_prompt.contains("- Company Type: B2C"));
    assert!(prompts[0].user_prompt.contains("- Industry: Retail"));
    assert!(prompts[0].system_instruction.contains("Chicago, USA (Sales Enablement)"));
}

#[tokio::test]
async fn test_concurrent_runs_are_independent() {
    let pipeline = pipeline_with(Arc::new(EchoRouteClient));

    let b2b = request("London, UK", "Chicago, USA");
    let mut b2c = request("London, UK", "Chicago, USA");
    b2c.profile.company_type = "B2C".to_string();

    let (first, second) = tokio::join!(pipeline.run_at(&b2b, at()), pipeline.run_at(&b2c, at()));

    assert_eq!(first[1].steps[1].node_name, "Toronto, Canada");
    assert_eq!(second[1].steps[1].node_name, "Los Angeles, USA");
    assert_eq!(first[0].provider, second[0].provider);
}

#[tokio::test]
async fn test_custom_providers_cycle_from_first() {
    let raw = json!({
        "itineraries": (0..5).map(|i| json!({
            "id": format!("r{}", i),
            "segments": [{"city": "London, UK"}, {"city": "Chicago, USA"}]
        })).collect::<Vec<_>>()
    })
    .to_string();

    let catalog = Catalog::default_catalog();
    let enricher = Enricher::new(catalog.clone())
        .with_providers(["P0", "P1"])
        .unwrap();
    let pipeline = ItineraryPipeline::new(Arc::new(CannedLlmClient::ok(raw)), catalog)
        .with_enricher(enricher);

    let providers: Vec<_> = pipeline
        .run_at(&request("London, UK", "Chicago, USA"), at())
        .await
        .into_iter()
        .map(|i| i.provider)
        .collect();
    assert_eq!(providers, vec!["P0", "P1", "P0", "P1", "P0"]);
}

#[tokio::test]
async fn test_identical_origin_and_destination() {
    let raw = r#"{"itineraries": [{"id": "stay", "segments": [{"city": "Singapore"}]}]}"#;
    let pipeline = pipeline_with(Arc::new(CannedLlmClient::ok(raw)));
    let out = pipeline.run_at(&request("Singapore", "Singapore"), at()).await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].route_codes(), "SIN → SIN");
    assert!(out[0].is_direct());
}

#[tokio::test]
async fn test_runs_are_reproducible_with_fixed_baseline() {
    let pipeline = pipeline_with(Arc::new(CannedLlmClient::ok(THREE_STRATEGIES)));
    let request = request("London, UK", "San Francisco, USA");
    let a = pipeline.run_at(&request, at()).await;
    let b = pipeline.run_at(&request, at()).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_demo_replay_payload() {
    let raw = include_str!("../demos/sample_response.json");
    let pipeline = pipeline_with(Arc::new(CannedLlmClient::ok(raw)));
    let out = pipeline.run_at(&request("LHR", "SFO"), at()).await;

    let stops: Vec<_> = out.iter().map(|i| i.stop_count()).collect();
    assert_eq!(stops, vec![0, 1, 3]);
    assert!(out.iter().all(|i| !i.steps.iter().any(|s| s.is_unknown())));
}
