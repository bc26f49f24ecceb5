//! Enrichment Stage
//!
//! Adds the fields the generator is not trusted to produce: a round-robin
//! provider label, per-step short codes from the catalog, and synthetic
//! departure/arrival times. Enrichment only annotates; step order is never
//! changed. The time baseline is an explicit argument so identical input
//! always produces identical output.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::catalog::Catalog;
use crate::error::ConfigError;
use crate::model::{Itinerary, ItineraryCandidate, Step, StepCandidate};

/// Provider labels assigned in rotation
pub const DEFAULT_PROVIDERS: [&str; 5] = [
    "Strategic Airways",
    "Growth Jet",
    "Funnel Fly",
    "Conversion Air",
    "Pipeline Express",
];

/// Synthetic per-step timetable
///
/// Step `i` departs at `baseline_hour + i * stride_hours` on the baseline
/// date and arrives `leg_hours` later. Times past midnight roll onto the
/// next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSchedule {
    baseline_hour: u32,
    stride_hours: u32,
    leg_hours: u32,
}

impl Default for TimeSchedule {
    fn default() -> Self {
        Self {
            baseline_hour: 8,
            stride_hours: 4,
            leg_hours: 3,
        }
    }
}

impl TimeSchedule {
    /// `stride_hours` must be positive so departures strictly increase, and
    /// `leg_hours` may not exceed it, otherwise a step would arrive after the
    /// next one departs.
    pub fn new(
        baseline_hour: u32,
        stride_hours: u32,
        leg_hours: u32,
    ) -> Result<Self, ConfigError> {
        if baseline_hour > 23 {
            return Err(ConfigError::Schedule(format!(
                "baseline hour {} is not a time of day",
                baseline_hour
            )));
        }
        if stride_hours == 0 {
            return Err(ConfigError::Schedule("stride must be at least one hour".into()));
        }
        if leg_hours > stride_hours {
            return Err(ConfigError::Schedule(format!(
                "leg of {}h overlaps stride of {}h",
                leg_hours, stride_hours
            )));
        }
        Ok(Self {
            baseline_hour,
            stride_hours,
            leg_hours,
        })
    }

    pub fn departure(&self, date: NaiveDate, index: usize) -> NaiveDateTime {
        let hours = i64::from(self.baseline_hour) + i64::from(self.stride_hours) * index as i64;
        date.and_time(NaiveTime::default()) + Duration::hours(hours)
    }

    pub fn arrival(&self, date: NaiveDate, index: usize) -> NaiveDateTime {
        self.departure(date, index) + Duration::hours(i64::from(self.leg_hours))
    }
}

/// `HH:MM`, with a `+Nd` suffix when `at` falls after `baseline`'s day
pub fn time_label(at: NaiveDateTime, baseline: NaiveDate) -> String {
    let days = (at.date() - baseline).num_days();
    if days > 0 {
        format!("{} +{}d", at.format("%H:%M"), days)
    } else {
        at.format("%H:%M").to_string()
    }
}

/// Deterministic post-processing of normalized candidates
#[derive(Debug, Clone)]
pub struct Enricher {
    catalog: Arc<Catalog>,
    providers: Vec<String>,
    schedule: TimeSchedule,
}

impl Enricher {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            providers: DEFAULT_PROVIDERS.iter().map(|p| p.to_string()).collect(),
            schedule: TimeSchedule::default(),
        }
    }

    pub fn with_providers<I, S>(mut self, providers: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let providers: Vec<String> = providers.into_iter().map(Into::into).collect();
        if providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }
        self.providers = providers;
        Ok(self)
    }

    pub fn with_schedule(mut self, schedule: TimeSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn providers(&self) -> &[String] {
        &self.providers
    }

    /// Provider for the itinerary at batch position `index`
    pub fn provider_for(&self, index: usize) -> &str {
        &self.providers[index % self.providers.len()]
    }

    pub fn enrich(
        &self,
        candidates: Vec<ItineraryCandidate>,
        generated_at: NaiveDateTime,
    ) -> Vec<Itinerary> {
        let baseline = generated_at.date();
        candidates
            .into_iter()
            .enumerate()
            .map(|(index, candidate)| Itinerary {
                provider: self.provider_for(index).to_string(),
                steps: candidate
                    .steps
                    .into_iter()
                    .enumerate()
                    .map(|(i, step)| self.enrich_step(i, step, baseline))
                    .collect(),
                id: candidate.id,
                price: candidate.price,
                total_duration: candidate.total_duration,
                tags: candidate.tags,
                summary: candidate.summary,
            })
            .collect()
    }

    fn enrich_step(&self, index: usize, step: StepCandidate, baseline: NaiveDate) -> Step {
        let departure_at = self.schedule.departure(baseline, index);
        let arrival_at = self.schedule.arrival(baseline, index);

        let function = if step.function.is_empty() {
            self.catalog
                .find(&step.node_name)
                .map(|n| n.function.clone())
                .unwrap_or_default()
        } else {
            step.function
        };

        Step {
            code: self.catalog.code_or_unknown(&step.node_name).to_string(),
            node_name: step.node_name,
            function,
            rationale: step.rationale,
            duration: step.duration,
            departure_time: time_label(departure_at, baseline),
            arrival_time: time_label(arrival_at, baseline),
            departure_at,
            arrival_at,
        }
    }
}
