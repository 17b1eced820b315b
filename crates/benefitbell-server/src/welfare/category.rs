//! Keyword classifier mapping welfare records to a [`BenefitCategory`]

use benefitbell_common::BenefitCategory;

/// Keywords per category, in priority order.
const CATEGORY_KEYWORDS: [(BenefitCategory, &[&str]); 13] = [
    (BenefitCategory::BasicLiving, &["기초생활", "생계급여", "기초수급", "긴급복지"]),
    (BenefitCategory::NearPoverty, &["차상위", "저소득"]),
    (BenefitCategory::Youth, &["청년", "청소년", "대학생", "도약계좌"]),
    (BenefitCategory::MiddleAged, &["장년", "중장년", "경력단절"]),
    (BenefitCategory::Senior, &["노인", "어르신", "기초연금", "노령"]),
    (BenefitCategory::Housing, &["주거", "월세", "임대", "전세", "주택"]),
    (BenefitCategory::Medical, &["의료", "건강", "보건", "치료", "간병"]),
    (BenefitCategory::Education, &["교육", "장학", "학비", "학자금", "돌봄"]),
    (BenefitCategory::Employment, &["취업", "고용", "일자리", "직업훈련", "취창업"]),
    (BenefitCategory::SmallBiz, &["소상공인", "소공인", "자영업", "경영안정", "정책자금"]),
    (BenefitCategory::Startup, &["창업", "예비창업", "스타트업", "벤처"]),
    (BenefitCategory::ClosureRestart, &["폐업", "재창업", "재기", "희망리턴"]),
    (BenefitCategory::DebtRelief, &["채무", "회생", "파산", "신용회복", "새출발", "워크아웃"]),
];

/// First category whose keywords appear in the title or content.
///
/// Falls back to [`BenefitCategory::BasicLiving`].
pub fn classify(title: &str, content: &str) -> BenefitCategory {
    let combined = format!("{title} {content}").to_lowercase();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, kws)| kws.iter().any(|kw| combined.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or(BenefitCategory::BasicLiving)
}
