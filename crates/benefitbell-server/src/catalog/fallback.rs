//! Bundled benefit list served when the live API and caches have nothing

use benefitbell_common::BenefitCategory;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::welfare::deadline::{d_day, status};
use crate::welfare::transform::{DEFAULT_APPLY_URL, SEE_DETAILS};
use crate::welfare::{Benefit, Contact, Homepage, WelfareDetail};

const BUNDLED_JSON: &str = include_str!("../../data/fallback_benefits.json");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FallbackEntry {
    id: String,
    title: String,
    category: BenefitCategory,
    ministry: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    amount: String,
    description: String,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    income_level: Option<String>,
    #[serde(default)]
    application_start: String,
    #[serde(default)]
    application_end: String,
    #[serde(default)]
    apply_url: Option<String>,
    #[serde(default)]
    steps: Vec<String>,
    #[serde(default)]
    documents: Vec<String>,
    #[serde(default)]
    popular: bool,
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

impl FallbackEntry {
    fn apply_url(&self) -> String {
        self.apply_url
            .clone()
            .unwrap_or_else(|| DEFAULT_APPLY_URL.to_string())
    }

    fn to_benefit(&self, today: NaiveDate) -> Benefit {
        let start = non_empty(&self.application_start);
        let end = non_empty(&self.application_end);

        Benefit {
            id: self.id.clone(),
            title: self.title.clone(),
            category: self.category,
            category_label: self.category.label_ko().to_string(),
            category_label_en: self.category.label_en().to_string(),
            amount: if self.amount.is_empty() {
                SEE_DETAILS.to_string()
            } else {
                self.amount.clone()
            },
            description: self.description.clone(),
            target: self.target.clone(),
            income_level: self.income_level.clone(),
            application_start: self.application_start.clone(),
            application_end: self.application_end.clone(),
            d_day: d_day(end, today),
            status: status(start, end, today),
            apply_url: self.apply_url(),
            ministry: self.ministry.clone(),
            steps: self.steps.clone(),
            documents: self.documents.clone(),
            popular: self.popular,
            is_new: false,
        }
    }

    fn to_detail(&self, fetched_at: DateTime<Utc>) -> WelfareDetail {
        WelfareDetail {
            serv_id: self.id.clone(),
            title: self.title.clone(),
            ministry: self.ministry.clone(),
            phone: self.phone.clone(),
            year: String::new(),
            support_cycle: String::new(),
            support_type: String::new(),
            overview: self.description.clone(),
            target_detail: self.target.clone().unwrap_or_default(),
            selection_criteria: self.income_level.clone().unwrap_or_default(),
            support_content: self.amount.clone(),
            apply_bgn_dt: self.application_start.clone(),
            apply_end_dt: self.application_end.clone(),
            life_stages: String::new(),
            target_groups: String::new(),
            themes: String::new(),
            application_methods: self.steps.clone(),
            application_links: Vec::new(),
            contacts: non_empty(&self.phone)
                .map(|phone| {
                    vec![Contact {
                        name: self.ministry.clone(),
                        address: phone.to_string(),
                    }]
                })
                .unwrap_or_default(),
            required_docs: self.documents.clone(),
            related_laws: Vec::new(),
            homepages: vec![Homepage {
                name: self.ministry.clone(),
                url: self.apply_url(),
            }],
            fetched_at,
        }
    }
}

/// Static benefit list compiled into the binary
#[derive(Debug, Clone)]
pub struct StaticFallback {
    entries: Vec<FallbackEntry>,
}

impl StaticFallback {
    pub fn bundled() -> Result<Self, serde_json::Error> {
        Self::from_json(BUNDLED_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            entries: serde_json::from_str(json)?,
        })
    }

    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    /// Every entry with D-Day and status computed for `today`
    pub fn benefits(&self, today: NaiveDate) -> Vec<Benefit> {
        self.entries.iter().map(|e| e.to_benefit(today)).collect()
    }

    pub fn detail(&self, id: &str, fetched_at: DateTime<Utc>) -> Option<WelfareDetail> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.to_detail(fetched_at))
    }
}
