//! Conversion of raw API records into [`Benefit`]s

use chrono::NaiveDate;

use super::category::classify;
use super::deadline::{d_day, is_recently_registered, status, YEAR_ROUND_D_DAY};
use super::models::{Benefit, WelfareDetail, WelfareListItem};
use benefitbell_common::BenefitStatus;

pub const DEFAULT_APPLY_URL: &str = "https://www.bokjiro.go.kr";
pub const UNTITLED: &str = "(제목 없음)";
pub const SEE_DETAILS: &str = "상세 페이지 확인";
pub const UNKNOWN_MINISTRY: &str = "미정";

/// Views above which a benefit is flagged popular
pub const POPULAR_VIEW_THRESHOLD: i64 = 1000;

const AMOUNT_PREVIEW_CHARS: usize = 60;
const MAX_DERIVED_STEPS: usize = 4;
const GENERATED_ID_PREFIX: &str = "api-";

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// List records carry no application window, so D-Day is year-round.
pub fn list_item_to_benefit(item: &WelfareListItem, index: usize, today: NaiveDate) -> Benefit {
    let category = classify(&item.serv_nm, &item.serv_dgst);

    Benefit {
        id: if item.serv_id.is_empty() {
            format!("{GENERATED_ID_PREFIX}{index}")
        } else {
            item.serv_id.clone()
        },
        title: or_default(&item.serv_nm, UNTITLED),
        category,
        category_label: category.label_ko().to_string(),
        category_label_en: category.label_en().to_string(),
        amount: or_default(&item.serv_dgst, SEE_DETAILS),
        description: item.serv_dgst.clone(),
        target: non_empty(&item.trgter_indvdl_array),
        income_level: None,
        application_start: String::new(),
        application_end: String::new(),
        d_day: YEAR_ROUND_D_DAY,
        status: BenefitStatus::Open,
        apply_url: or_default(&item.serv_dtl_link, DEFAULT_APPLY_URL),
        ministry: or_default(&item.jur_mnof_nm, UNKNOWN_MINISTRY),
        steps: Vec::new(),
        documents: Vec::new(),
        popular: item.inq_num > POPULAR_VIEW_THRESHOLD,
        is_new: is_recently_registered(&item.svcfrst_reg_ts, today),
    }
}

/// Up to four sentences of the support text, split on `.` and newlines.
fn derive_steps(text: &str) -> Vec<String> {
    text.split(['.', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_DERIVED_STEPS)
        .map(str::to_string)
        .collect()
}

pub fn detail_to_benefit(detail: &WelfareDetail, today: NaiveDate) -> Benefit {
    let category = classify(
        &detail.title,
        &format!("{} {}", detail.target_detail, detail.support_content),
    );

    let amount: String = detail.support_content.chars().take(AMOUNT_PREVIEW_CHARS).collect();
    let description = if detail.support_content.is_empty() {
        detail.overview.clone()
    } else {
        detail.support_content.clone()
    };
    let steps = if detail.application_methods.is_empty() {
        derive_steps(&detail.support_content)
    } else {
        detail.application_methods.clone()
    };
    let apply_url = detail
        .application_links
        .iter()
        .chain(detail.homepages.iter().map(|h| &h.url))
        .find(|link| link.starts_with("http"))
        .cloned()
        .unwrap_or_else(|| DEFAULT_APPLY_URL.to_string());

    let start = non_empty(&detail.apply_bgn_dt);
    let end = non_empty(&detail.apply_end_dt);

    Benefit {
        id: detail.serv_id.clone(),
        title: or_default(&detail.title, UNTITLED),
        category,
        category_label: category.label_ko().to_string(),
        category_label_en: category.label_en().to_string(),
        amount: or_default(&amount, SEE_DETAILS),
        description,
        target: non_empty(&detail.target_detail),
        income_level: non_empty(&detail.selection_criteria),
        d_day: d_day(end.as_deref(), today),
        status: status(start.as_deref(), end.as_deref(), today),
        application_start: detail.apply_bgn_dt.clone(),
        application_end: detail.apply_end_dt.clone(),
        apply_url,
        ministry: or_default(&detail.ministry, UNKNOWN_MINISTRY),
        steps,
        documents: detail.required_docs.clone(),
        popular: false,
        is_new: false,
    }
}

/// Strip the `api-` prefix of generated ids; `None` when nothing remains.
pub fn normalize_benefit_id(id: &str) -> Option<&str> {
    let id = id.trim();
    let serv_id = id.strip_prefix(GENERATED_ID_PREFIX).unwrap_or(id);
    (!serv_id.is_empty()).then_some(serv_id)
}
