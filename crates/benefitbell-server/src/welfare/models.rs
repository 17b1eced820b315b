//! Welfare API records and the normalized benefit model

use benefitbell_common::{BenefitCategory, BenefitStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::xml::{child_pairs, child_values, clean_text, tag_value};

/// Block tag wrapping each record of the list endpoint
pub const LIST_ITEM_TAG: &str = "servList";

/// One record of `NationalWelfarelistV001`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelfareListItem {
    pub serv_id: String,
    pub serv_nm: String,
    pub serv_dgst: String,
    /// Responsible ministry
    pub jur_mnof_nm: String,
    /// Life stages, comma separated
    pub life_array: String,
    /// Interest themes, comma separated
    pub intrs_thema_array: String,
    /// Household situations, comma separated
    pub trgter_indvdl_array: String,
    /// Link to the bokjiro.go.kr detail page
    pub serv_dtl_link: String,
    /// View count
    pub inq_num: i64,
    /// First registration timestamp
    pub svcfrst_reg_ts: String,
    pub last_mod_ymd: String,
}

impl WelfareListItem {
    /// Parse the inner text of a `<servList>` block.
    pub fn from_block(block: &str) -> Self {
        Self {
            serv_id: tag_value(block, "servId"),
            serv_nm: tag_value(block, "servNm"),
            serv_dgst: tag_value(block, "servDgst"),
            jur_mnof_nm: tag_value(block, "jurMnofNm"),
            life_array: tag_value(block, "lifeArray"),
            intrs_thema_array: tag_value(block, "intrsThemaArray"),
            trgter_indvdl_array: tag_value(block, "trgterIndvdlArray"),
            serv_dtl_link: tag_value(block, "servDtlLink"),
            inq_num: tag_value(block, "inqNum").parse().unwrap_or(0),
            svcfrst_reg_ts: tag_value(block, "svcfrstRegTs"),
            last_mod_ymd: tag_value(block, "lastModYmd"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Homepage {
    pub name: String,
    pub url: String,
}

/// Parsed `NationalWelfaredetailedV001` record, also the detail cache row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelfareDetail {
    pub serv_id: String,
    pub title: String,
    pub ministry: String,
    pub phone: String,
    pub year: String,
    pub support_cycle: String,
    pub support_type: String,
    pub overview: String,
    pub target_detail: String,
    pub selection_criteria: String,
    pub support_content: String,
    pub apply_bgn_dt: String,
    pub apply_end_dt: String,
    pub life_stages: String,
    pub target_groups: String,
    pub themes: String,
    pub application_methods: Vec<String>,
    pub application_links: Vec<String>,
    pub contacts: Vec<Contact>,
    pub required_docs: Vec<String>,
    pub related_laws: Vec<String>,
    pub homepages: Vec<Homepage>,
    pub fetched_at: DateTime<Utc>,
}

impl WelfareDetail {
    pub fn from_xml(serv_id: &str, xml: &str, fetched_at: DateTime<Utc>) -> Self {
        Self {
            serv_id: serv_id.to_string(),
            title: tag_value(xml, "servNm"),
            ministry: tag_value(xml, "jurMnofNm"),
            phone: tag_value(xml, "rprsCtadr"),
            year: tag_value(xml, "crtrYr"),
            support_cycle: tag_value(xml, "sprtCycNm"),
            support_type: tag_value(xml, "srvPvsnNm"),
            overview: clean_text(&tag_value(xml, "wlfareInfoOutlCn")),
            target_detail: clean_text(&tag_value(xml, "tgtrDtlCn")),
            selection_criteria: clean_text(&tag_value(xml, "slctCritCn")),
            support_content: clean_text(&tag_value(xml, "alwServCn")),
            apply_bgn_dt: tag_value(xml, "aplyBgnDd"),
            apply_end_dt: tag_value(xml, "aplyEndDd"),
            life_stages: tag_value(xml, "lifeArray"),
            target_groups: tag_value(xml, "trgterIndvdlArray"),
            themes: tag_value(xml, "intrsThemaArray"),
            application_methods: child_values(xml, "applmetList", "servSeDetailNm"),
            application_links: child_values(xml, "applmetList", "servSeDetailLink"),
            contacts: child_pairs(xml, "inqplCtadrList", "servSeDetailNm", "servSeDetailLink")
                .into_iter()
                .map(|(name, address)| Contact { name, address })
                .collect(),
            required_docs: child_values(xml, "basfrmList", "servSeDetailNm"),
            related_laws: child_values(xml, "baslawList", "servSeDetailNm"),
            homepages: child_pairs(xml, "inqplHmpgReldList", "servSeDetailNm", "servSeDetailLink")
                .into_iter()
                .map(|(name, url)| Homepage { name, url })
                .collect(),
            fetched_at,
        }
    }
}

/// Normalized benefit served to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Benefit {
    pub id: String,
    pub title: String,
    pub category: BenefitCategory,
    pub category_label: String,
    pub category_label_en: String,
    pub amount: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_level: Option<String>,
    pub application_start: String,
    pub application_end: String,
    pub d_day: i64,
    pub status: BenefitStatus,
    pub apply_url: String,
    pub ministry: String,
    pub steps: Vec<String>,
    pub documents: Vec<String>,
    pub popular: bool,
    #[serde(rename = "new")]
    pub is_new: bool,
}
