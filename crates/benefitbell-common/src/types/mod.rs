//! Domain types shared by the server and its tooling

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CommonError;

/// Welfare benefit category.
///
/// Declaration order is classification priority: when a record matches
/// keywords of several categories, the earliest one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BenefitCategory {
    BasicLiving,
    NearPoverty,
    Youth,
    MiddleAged,
    Senior,
    Housing,
    Medical,
    Education,
    Employment,
    SmallBiz,
    Startup,
    ClosureRestart,
    DebtRelief,
}

impl BenefitCategory {
    /// Every category in priority order
    pub const ALL: [BenefitCategory; 13] = [
        BenefitCategory::BasicLiving,
        BenefitCategory::NearPoverty,
        BenefitCategory::Youth,
        BenefitCategory::MiddleAged,
        BenefitCategory::Senior,
        BenefitCategory::Housing,
        BenefitCategory::Medical,
        BenefitCategory::Education,
        BenefitCategory::Employment,
        BenefitCategory::SmallBiz,
        BenefitCategory::Startup,
        BenefitCategory::ClosureRestart,
        BenefitCategory::DebtRelief,
    ];

    /// Kebab-case slug used in URLs and JSON
    pub fn as_str(self) -> &'static str {
        match self {
            BenefitCategory::BasicLiving => "basic-living",
            BenefitCategory::NearPoverty => "near-poverty",
            BenefitCategory::Youth => "youth",
            BenefitCategory::MiddleAged => "middle-aged",
            BenefitCategory::Senior => "senior",
            BenefitCategory::Housing => "housing",
            BenefitCategory::Medical => "medical",
            BenefitCategory::Education => "education",
            BenefitCategory::Employment => "employment",
            BenefitCategory::SmallBiz => "small-biz",
            BenefitCategory::Startup => "startup",
            BenefitCategory::ClosureRestart => "closure-restart",
            BenefitCategory::DebtRelief => "debt-relief",
        }
    }

    pub fn label_ko(self) -> &'static str {
        match self {
            BenefitCategory::BasicLiving => "기초생활수급",
            BenefitCategory::NearPoverty => "차상위계층",
            BenefitCategory::Youth => "청년 지원",
            BenefitCategory::MiddleAged => "장년 지원",
            BenefitCategory::Senior => "노인 복지",
            BenefitCategory::Housing => "주거 지원",
            BenefitCategory::Medical => "의료 지원",
            BenefitCategory::Education => "교육 지원",
            BenefitCategory::Employment => "취업 지원",
            BenefitCategory::SmallBiz => "소상공인 지원",
            BenefitCategory::Startup => "창업 지원",
            BenefitCategory::ClosureRestart => "폐업·재창업",
            BenefitCategory::DebtRelief => "채무조정·회생",
        }
    }

    pub fn label_en(self) -> &'static str {
        match self {
            BenefitCategory::BasicLiving => "Basic Living",
            BenefitCategory::NearPoverty => "Near Poverty",
            BenefitCategory::Youth => "Youth Support",
            BenefitCategory::MiddleAged => "Middle-Aged",
            BenefitCategory::Senior => "Senior Welfare",
            BenefitCategory::Housing => "Housing",
            BenefitCategory::Medical => "Medical",
            BenefitCategory::Education => "Education",
            BenefitCategory::Employment => "Employment",
            BenefitCategory::SmallBiz => "Small Biz",
            BenefitCategory::Startup => "Startup",
            BenefitCategory::ClosureRestart => "Closure & Restart",
            BenefitCategory::DebtRelief => "Debt Relief",
        }
    }
}

impl FromStr for BenefitCategory {
    type Err = CommonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        BenefitCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CommonError::UnknownCategory(s.to_string()))
    }
}

impl std::fmt::Display for BenefitCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application window state of a benefit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenefitStatus {
    Open,
    Upcoming,
    Closed,
}

impl BenefitStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BenefitStatus::Open => "open",
            BenefitStatus::Upcoming => "upcoming",
            BenefitStatus::Closed => "closed",
        }
    }
}

impl FromStr for BenefitStatus {
    type Err = CommonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "open" => Ok(BenefitStatus::Open),
            "upcoming" => Ok(BenefitStatus::Upcoming),
            "closed" => Ok(BenefitStatus::Closed),
            _ => Err(CommonError::UnknownStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for BenefitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
