//! Rule-based ranking of benefits against a user profile

use benefitbell_common::BenefitCategory;
use serde::{Deserialize, Serialize};

use crate::welfare::Benefit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmploymentStatus {
    JobSeeking,
    SelfEmployed,
    Student,
    Employed,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HousingType {
    /// 월세
    Monthly,
    /// 전세
    Deposit,
    Owned,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecialStatus {
    Disability,
    SingleParent,
    Multicultural,
    Veteran,
}

impl SpecialStatus {
    fn keyword(self) -> &'static str {
        match self {
            SpecialStatus::Disability => "장애",
            SpecialStatus::SingleParent => "한부모",
            SpecialStatus::Multicultural => "다문화",
            SpecialStatus::Veteran => "국가유공자",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub birth_year: i32,
    /// e.g. `서울특별시 강남구`
    #[serde(default)]
    pub region: String,
    pub employment_status: EmploymentStatus,
    pub housing_type: HousingType,
    #[serde(default)]
    pub special_status: Vec<SpecialStatus>,
    /// Household income as a percentage of the median income
    pub income_percent: u32,
}

const AGE_POINTS: u32 = 10;
const PROVINCE_POINTS: u32 = 15;
const DISTRICT_POINTS: u32 = 20;
const EMPLOYMENT_POINTS: u32 = 15;
const HOUSING_POINTS: u32 = 10;
const SPECIAL_STATUS_POINTS: u32 = 20;
const LOW_INCOME_POINTS: u32 = 15;
const LOW_INCOME_PERCENT: u32 = 50;
const MAX_AGE: i32 = 150;

/// Relevance of one benefit; 0 means unrelated.
pub fn score(benefit: &Benefit, profile: &UserProfile, current_year: i32) -> u32 {
    let text = format!("{} {}", benefit.title, benefit.description).to_lowercase();
    let has = |kw: &str| text.contains(kw);
    let is = |c: BenefitCategory| benefit.category == c;
    // birth years outside a human lifetime earn no age points
    let age = current_year
        .checked_sub(profile.birth_year)
        .filter(|age| (0..=MAX_AGE).contains(age));
    let mut score = 0;

    if let Some(age) = age {
        if age < 35 && (is(BenefitCategory::Youth) || has("청년")) {
            score += AGE_POINTS;
        }
        if age >= 60 && (is(BenefitCategory::Senior) || has("노인") || has("고령")) {
            score += AGE_POINTS;
        }
        if (40..60).contains(&age) && (is(BenefitCategory::MiddleAged) || has("중장년")) {
            score += AGE_POINTS;
        }
    }

    let mut region = profile.region.split_whitespace();
    if let Some(province) = region.next() {
        let province = province.replace("광역시", "").replace("특별시", "");
        if !province.is_empty() && has(&province) {
            score += PROVINCE_POINTS;
        }
    }
    if let Some(district) = region.next() {
        if has(district) {
            score += DISTRICT_POINTS;
        }
    }

    let employment_match = match profile.employment_status {
        EmploymentStatus::JobSeeking => is(BenefitCategory::Employment) || has("구직") || has("취업"),
        EmploymentStatus::SelfEmployed => {
            is(BenefitCategory::SmallBiz)
                || is(BenefitCategory::Startup)
                || has("소상공인")
                || has("자영업")
        },
        EmploymentStatus::Student => is(BenefitCategory::Education) || has("학생") || has("장학"),
        EmploymentStatus::Employed | EmploymentStatus::Other => false,
    };
    if employment_match {
        score += EMPLOYMENT_POINTS;
    }

    let housing_match = match profile.housing_type {
        HousingType::Monthly => has("월세"),
        HousingType::Deposit => has("전세"),
        HousingType::Owned | HousingType::Other => false,
    };
    if housing_match {
        score += HOUSING_POINTS;
    }

    for status in &profile.special_status {
        if has(status.keyword()) {
            score += SPECIAL_STATUS_POINTS;
        }
    }

    if profile.income_percent <= LOW_INCOME_PERCENT
        && (is(BenefitCategory::BasicLiving) || is(BenefitCategory::NearPoverty))
    {
        score += LOW_INCOME_POINTS;
    }

    score
}

/// Matching benefits, best first; ties keep their input order.
pub fn recommend(benefits: Vec<Benefit>, profile: Option<&UserProfile>, current_year: i32) -> Vec<Benefit> {
    let Some(profile) = profile else {
        return benefits;
    };

    let mut scored: Vec<(u32, Benefit)> = benefits
        .into_iter()
        .map(|b| (score(&b, profile, current_year), b))
        .filter(|(s, _)| *s > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, b)| b).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use benefitbell_common::BenefitStatus;

    const YEAR: i32 = 2026;

    fn benefit(id: &str, title: &str, category: BenefitCategory) -> Benefit {
        Benefit {
            id: id.to_string(),
            title: title.to_string(),
            category,
            category_label: category.label_ko().to_string(),
            category_label_en: category.label_en().to_string(),
            amount: String::new(),
            description: String::new(),
            target: None,
            income_level: None,
            application_start: String::new(),
            application_end: String::new(),
            d_day: 365,
            status: BenefitStatus::Open,
            apply_url: String::new(),
            ministry: String::new(),
            steps: vec![],
            documents: vec![],
            popular: false,
            is_new: false,
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            birth_year: 1998,
            region: "서울특별시 강남구".to_string(),
            employment_status: EmploymentStatus::JobSeeking,
            housing_type: HousingType::Monthly,
            special_status: vec![],
            income_percent: 80,
        }
    }

    #[test]
    fn test_youth_renter_scores() {
        let b = benefit("A", "청년월세 특별지원", BenefitCategory::Youth);
        // age 28 → +10, 월세 → +10
        assert_eq!(score(&b, &profile(), YEAR), 20);
    }

    #[test]
    fn test_implausible_birth_year_skips_age() {
        let youth = benefit("A", "청년 지원", BenefitCategory::Youth);
        let senior = benefit("B", "노인 돌봄", BenefitCategory::Senior);

        for birth_year in [i32::MIN, i32::MAX, YEAR + 1, YEAR - 200] {
            let mut p = profile();
            p.birth_year = birth_year;
            p.housing_type = HousingType::Owned;
            assert_eq!(score(&youth, &p, YEAR), 0, "birth year {birth_year}");
            assert_eq!(score(&senior, &p, YEAR), 0, "birth year {birth_year}");
        }
    }

    #[test]
    fn test_region_tokens() {
        let b = benefit("A", "서울 강남구 일자리 지원", BenefitCategory::Employment);
        // province 15 + district 20 + job seeking 15
        assert_eq!(score(&b, &profile(), YEAR), 50);
    }

    #[test]
    fn test_special_status_and_low_income() {
        let mut p = profile();
        p.birth_year = 1980;
        p.employment_status = EmploymentStatus::Employed;
        p.housing_type = HousingType::Owned;
        p.region.clear();
        p.special_status = vec![SpecialStatus::SingleParent, SpecialStatus::Disability];
        p.income_percent = 40;

        let b = benefit("A", "한부모가족 생계 지원", BenefitCategory::BasicLiving);
        assert_eq!(score(&b, &p, YEAR), 20 + 15);
    }

    #[test]
    fn test_recommend_orders_and_drops_unrelated() {
        let benefits = vec![
            benefit("senior", "기초연금", BenefitCategory::Senior),
            benefit("youth", "청년 도약계좌", BenefitCategory::Youth),
            benefit("rent", "청년월세 지원", BenefitCategory::Housing),
        ];

        let ids: Vec<_> = recommend(benefits, Some(&profile()), YEAR)
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["rent", "youth"]);
    }

    #[test]
    fn test_no_profile_keeps_order() {
        let benefits = vec![
            benefit("b", "기초연금", BenefitCategory::Senior),
            benefit("a", "청년 도약계좌", BenefitCategory::Youth),
        ];
        let ids: Vec<_> = recommend(benefits, None, YEAR).into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_profile_deserializes_camel_case() {
        let json = r#"{
            "birthYear": 1960, "region": "부산광역시 해운대구",
            "employmentStatus": "selfEmployed", "housingType": "deposit",
            "specialStatus": ["veteran"], "incomePercent": 45
        }"#;
        let p: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(p.employment_status, EmploymentStatus::SelfEmployed);
        assert_eq!(p.special_status, vec![SpecialStatus::Veteran]);
    }
}
