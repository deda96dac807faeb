//! Buyer-question answerability
//!
//! Classifies how well a product's own text answers ten common buyer
//! questions. Matching is sentence based: a sentence counts as evidence for a
//! question when it contains one of that question's cue phrases.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::snapshot::{non_blank, word_count, ProductRecord};

/// Evidence below this many words is always weak
pub const MIN_EVIDENCE_WORDS: usize = 8;
/// Evidence at or above this many words is strong
pub const STRONG_EVIDENCE_WORDS: usize = 15;
/// Marketing-phrase density at which evidence is downgraded to weak
pub const VAGUE_DENSITY_LIMIT: f64 = 0.10;

const ANSWERED_FLOOR: usize = 3;
const READY_STRONG_MIN: usize = 8;
const PROJECT_READY_SHARE: f64 = 0.80;
const PROJECT_READY_SCORE: f64 = 70.0;
const PROJECT_NEEDS_SHARE: f64 = 0.50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyerQuestion {
    WhatIsIt,
    WhoIsItFor,
    WhyChooseThis,
    KeyFeatures,
    HowIsItUsed,
    ProblemsSolved,
    WhatMakesItDifferent,
    WhatsIncluded,
    MaterialsAndSpecs,
    CareSafetyInstructions,
}

impl BuyerQuestion {
    pub const ALL: [BuyerQuestion; 10] = [
        BuyerQuestion::WhatIsIt,
        BuyerQuestion::WhoIsItFor,
        BuyerQuestion::WhyChooseThis,
        BuyerQuestion::KeyFeatures,
        BuyerQuestion::HowIsItUsed,
        BuyerQuestion::ProblemsSolved,
        BuyerQuestion::WhatMakesItDifferent,
        BuyerQuestion::WhatsIncluded,
        BuyerQuestion::MaterialsAndSpecs,
        BuyerQuestion::CareSafetyInstructions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuyerQuestion::WhatIsIt => "what_is_it",
            BuyerQuestion::WhoIsItFor => "who_is_it_for",
            BuyerQuestion::WhyChooseThis => "why_choose_this",
            BuyerQuestion::KeyFeatures => "key_features",
            BuyerQuestion::HowIsItUsed => "how_is_it_used",
            BuyerQuestion::ProblemsSolved => "problems_solved",
            BuyerQuestion::WhatMakesItDifferent => "what_makes_it_different",
            BuyerQuestion::WhatsIncluded => "whats_included",
            BuyerQuestion::MaterialsAndSpecs => "materials_and_specs",
            BuyerQuestion::CareSafetyInstructions => "care_safety_instructions",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.as_str() == id.trim())
    }

    fn cue_phrases(&self) -> &'static [&'static str] {
        match self {
            BuyerQuestion::WhatIsIt => &["is a", "is an", "this is", "a type of", "made to", "designed to"],
            BuyerQuestion::WhoIsItFor => &[
                "ideal for", "perfect for", "designed for", "suitable for", "great for",
                "for anyone", "for people", "for those who", "for beginners", "for kids",
            ],
            BuyerQuestion::WhyChooseThis => &["because", "benefit", "benefits", "you will love", "helps you", "advantage"],
            BuyerQuestion::KeyFeatures => &["features", "feature", "equipped with", "built-in", "built in"],
            BuyerQuestion::HowIsItUsed => &["how to use", "to use", "use it", "simply", "apply", "install", "step"],
            BuyerQuestion::ProblemsSolved => &["solves", "prevents", "no more", "eliminates", "reduces", "relief", "keeps your"],
            BuyerQuestion::WhatMakesItDifferent => &["unlike", "unique", "exclusive", "patented", "compared to", "different from"],
            BuyerQuestion::WhatsIncluded => &["included", "includes", "in the box", "comes with", "set of", "package contains", "kit"],
            BuyerQuestion::MaterialsAndSpecs => &[
                "made of", "made from", "material", "cotton", "steel", "dimensions", "weight",
                "capacity", "inches", "cm", "mm", "oz",
            ],
            BuyerQuestion::CareSafetyInstructions => &[
                "care", "wash", "clean", "dishwasher", "safe", "warning", "store in", "avoid",
            ],
        }
    }
}

const VAGUE_PHRASES: &[&str] = &[
    "high quality", "high-quality", "top quality", "top-notch", "best", "amazing", "perfect",
    "must-have", "must have", "world-class", "premium", "great", "awesome", "incredible",
    "second to none", "love it",
];

static SENTENCE_BREAK: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[.!?;\n]+").ok());

static QUESTION_CUES: Lazy<Vec<(BuyerQuestion, Regex)>> = Lazy::new(|| {
    BuyerQuestion::ALL
        .into_iter()
        .filter_map(|q| phrase_regex(q.cue_phrases()).map(|re| (q, re)))
        .collect()
});

static VAGUE_CUES: Lazy<Option<Regex>> = Lazy::new(|| phrase_regex(VAGUE_PHRASES));

fn phrase_regex(phrases: &[&str]) -> Option<Regex> {
    let alternation = phrases
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerCoverage {
    Missing,
    Weak,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerabilityStatus {
    AnswerReady,
    PartiallyAnswerReady,
    NeedsAnswers,
}

impl AnswerabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerabilityStatus::AnswerReady => "answer_ready",
            AnswerabilityStatus::PartiallyAnswerReady => "partially_answer_ready",
            AnswerabilityStatus::NeedsAnswers => "needs_answers",
        }
    }
}

impl std::fmt::Display for AnswerabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerabilityResult {
    pub coverage: BTreeMap<BuyerQuestion, AnswerCoverage>,
    pub strong: usize,
    pub weak: usize,
    pub missing: usize,
    pub score: u8,
    pub status: AnswerabilityStatus,
}

impl AnswerabilityResult {
    pub fn answered(&self) -> usize {
        self.strong + self.weak
    }
}

/// Split text into trimmed, non-empty sentences
pub fn sentences(text: &str) -> Vec<&str> {
    match SENTENCE_BREAK.as_ref() {
        Some(re) => re.split(text).map(str::trim).filter(|s| !s.is_empty()).collect(),
        None => vec![text.trim()],
    }
}

/// Generic marketing phrases per word; 0.0 for empty text
pub fn vague_phrase_density(text: &str) -> f64 {
    let words = word_count(text);
    if words == 0 {
        return 0.0;
    }
    let hits = VAGUE_CUES.as_ref().map_or(0, |re| re.find_iter(text).count());
    hits as f64 / words as f64
}

fn grade(matched: &[&str]) -> AnswerCoverage {
    if matched.is_empty() {
        return AnswerCoverage::Missing;
    }
    let evidence = matched.join(". ");
    if vague_phrase_density(&evidence) >= VAGUE_DENSITY_LIMIT {
        return AnswerCoverage::Weak;
    }
    let words = word_count(&evidence);
    if words < MIN_EVIDENCE_WORDS {
        AnswerCoverage::Weak
    } else if words >= STRONG_EVIDENCE_WORDS || matched.len() >= 2 {
        AnswerCoverage::Strong
    } else {
        AnswerCoverage::Weak
    }
}

/// Coverage of every buyer question by the given text
pub fn classify_text(text: &str) -> BTreeMap<BuyerQuestion, AnswerCoverage> {
    let sentences = sentences(text);
    let mut coverage: BTreeMap<BuyerQuestion, AnswerCoverage> = BuyerQuestion::ALL
        .into_iter()
        .map(|q| (q, AnswerCoverage::Missing))
        .collect();

    for (question, cue) in QUESTION_CUES.iter() {
        let matched: Vec<&str> = sentences.iter().copied().filter(|s| cue.is_match(s)).collect();
        coverage.insert(*question, grade(&matched));
    }
    coverage
}

pub fn score(strong: usize, weak: usize) -> u8 {
    let total = BuyerQuestion::ALL.len() as f64;
    let coverage = (strong + weak) as f64 / total;
    let quality = (strong as f64 + 0.5 * weak as f64) / total;
    (40.0 * coverage + 60.0 * quality).round().clamp(0.0, 100.0) as u8
}

pub fn status_for(strong: usize, weak: usize, missing: usize) -> AnswerabilityStatus {
    if strong >= READY_STRONG_MIN && missing == 0 {
        AnswerabilityStatus::AnswerReady
    } else if strong + weak < ANSWERED_FLOOR {
        AnswerabilityStatus::NeedsAnswers
    } else {
        AnswerabilityStatus::PartiallyAnswerReady
    }
}

/// Classify title, body description and SEO description together
pub fn classify_product(product: &ProductRecord) -> AnswerabilityResult {
    let text = [
        non_blank(Some(product.title.as_str())),
        non_blank(product.description.as_deref()),
        non_blank(product.seo_description.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(". ");

    let coverage = classify_text(&text);
    let count = |level: AnswerCoverage| coverage.values().filter(|c| **c == level).count();
    let (strong, weak, missing) = (
        count(AnswerCoverage::Strong),
        count(AnswerCoverage::Weak),
        count(AnswerCoverage::Missing),
    );

    AnswerabilityResult {
        score: score(strong, weak),
        status: status_for(strong, weak, missing),
        coverage,
        strong,
        weak,
        missing,
    }
}

/// Catalog-level status; an empty catalog needs answers
pub fn project_status<'a>(
    results: impl IntoIterator<Item = &'a AnswerabilityResult>,
) -> AnswerabilityStatus {
    let (mut total, mut ready, mut needs, mut score_sum) = (0usize, 0usize, 0usize, 0u64);
    for result in results {
        total += 1;
        score_sum += u64::from(result.score);
        match result.status {
            AnswerabilityStatus::AnswerReady => ready += 1,
            AnswerabilityStatus::NeedsAnswers => needs += 1,
            AnswerabilityStatus::PartiallyAnswerReady => {}
        }
    }
    if total == 0 {
        return AnswerabilityStatus::NeedsAnswers;
    }

    let total_f = total as f64;
    let avg_score = score_sum as f64 / total_f;
    if ready as f64 / total_f >= PROJECT_READY_SHARE && avg_score >= PROJECT_READY_SCORE {
        AnswerabilityStatus::AnswerReady
    } else if needs as f64 / total_f > PROJECT_NEEDS_SHARE {
        AnswerabilityStatus::NeedsAnswers
    } else {
        AnswerabilityStatus::PartiallyAnswerReady
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const RICH_DESCRIPTION: &str = "This is an insulated steel water bottle designed to keep drinks cold through a long working day outdoors. \
        It is ideal for hikers, commuters and anyone who spends long hours away from a kitchen tap. \
        Choose it because the double wall keeps condensation off your bag and your hands dry all day. \
        Key features include a leak-proof lid, a carry loop and a wide mouth that fits standard ice cubes. \
        To use it, simply fill it with water, twist the lid until it clicks and drop it into your bag. \
        It prevents warm, stale water on long trips and reduces the number of plastic bottles you buy. \
        Unlike thin single-wall bottles, it stays cool to the touch and does not sweat on your desk. \
        The box includes the bottle, a spare silicone seal and a narrow cleaning brush for the neck. \
        Made from food-grade stainless steel, it holds 750 ml and weighs 380 grams when it is empty. \
        Wash the lid by hand with warm soapy water and avoid putting the painted body in the dishwasher.";

    #[test]
    fn empty_text_is_all_missing() {
        let coverage = classify_text("");
        assert_eq!(coverage.len(), 10);
        assert!(coverage.values().all(|c| *c == AnswerCoverage::Missing));
    }

    #[test]
    fn short_match_is_weak() {
        let coverage = classify_text("Ideal for kids.");
        assert_eq!(coverage[&BuyerQuestion::WhoIsItFor], AnswerCoverage::Weak);
    }

    #[test]
    fn long_specific_match_is_strong() {
        let coverage = classify_text(
            "Made from recycled cotton canvas with a waxed finish that sheds light rain during the walk home.",
        );
        assert_eq!(coverage[&BuyerQuestion::MaterialsAndSpecs], AnswerCoverage::Strong);
    }

    #[test]
    fn vague_marketing_downgrades_to_weak() {
        let coverage = classify_text(
            "Perfect for everyone, the best premium amazing gift with great high quality and awesome looks for you.",
        );
        assert_eq!(coverage[&BuyerQuestion::WhoIsItFor], AnswerCoverage::Weak);
    }

    #[test]
    fn rich_product_is_answer_ready() {
        let mut product = ProductRecord::new("p1", "Trail Bottle 750");
        product.description = Some(RICH_DESCRIPTION.into());
        let result = classify_product(&product);
        assert!(result.strong >= 8, "coverage: {:?}", result.coverage);
        assert_eq!(result.missing, 0);
        assert_eq!(result.status, AnswerabilityStatus::AnswerReady);
        assert!(result.score >= 70);
    }

    #[test]
    fn bare_title_needs_answers() {
        let result = classify_product(&ProductRecord::new("p2", "Mug"));
        assert_eq!(result.status, AnswerabilityStatus::NeedsAnswers);
        assert_eq!(result.score, 0);
    }

    #[rstest]
    #[case(10, 0, 100)]
    #[case(0, 10, 70)]
    #[case(0, 0, 0)]
    #[case(5, 0, 50)]
    fn score_formula(#[case] strong: usize, #[case] weak: usize, #[case] expected: u8) {
        assert_eq!(score(strong, weak), expected);
    }

    #[rstest]
    #[case(8, 2, 0, AnswerabilityStatus::AnswerReady)]
    #[case(8, 1, 1, AnswerabilityStatus::PartiallyAnswerReady)]
    #[case(1, 1, 8, AnswerabilityStatus::NeedsAnswers)]
    #[case(0, 3, 7, AnswerabilityStatus::PartiallyAnswerReady)]
    fn status_rules(
        #[case] strong: usize,
        #[case] weak: usize,
        #[case] missing: usize,
        #[case] expected: AnswerabilityStatus,
    ) {
        assert_eq!(status_for(strong, weak, missing), expected);
    }

    fn result(status: AnswerabilityStatus, score: u8) -> AnswerabilityResult {
        AnswerabilityResult {
            coverage: BTreeMap::new(),
            strong: 0,
            weak: 0,
            missing: 0,
            score,
            status,
        }
    }

    #[test]
    fn empty_catalog_needs_answers() {
        assert_eq!(project_status(&Vec::<AnswerabilityResult>::new()), AnswerabilityStatus::NeedsAnswers);
    }

    #[test]
    fn project_status_thresholds() {
        use AnswerabilityStatus::*;
        let ready: Vec<_> = (0..4).map(|_| result(AnswerReady, 90)).chain([result(NeedsAnswers, 10)]).collect();
        assert_eq!(project_status(&ready), AnswerReady);

        let mostly_missing = vec![result(NeedsAnswers, 0), result(NeedsAnswers, 0), result(PartiallyAnswerReady, 40)];
        assert_eq!(project_status(&mostly_missing), NeedsAnswers);

        let half = vec![result(NeedsAnswers, 0), result(PartiallyAnswerReady, 40)];
        assert_eq!(project_status(&half), PartiallyAnswerReady);
    }

    #[test]
    fn question_ids_round_trip() {
        for q in BuyerQuestion::ALL {
            assert_eq!(BuyerQuestion::from_id(q.as_str()), Some(q));
        }
        assert_eq!(BuyerQuestion::from_id("shipping"), None);
    }
}
