//! Structured answer quality
//!
//! Products may carry merchant-written answer blocks for buyer questions.
//! Each block is checked for five defect kinds; a product is affected by a
//! kind when any of its blocks shows it. Every triggered kind becomes its own
//! `answer_<kind>` issue through the shared ratio rule.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::catalog::issue_types;
use crate::domain::services::answerability::{sentences, vague_phrase_density, BuyerQuestion, VAGUE_DENSITY_LIMIT};
use crate::domain::services::evidence::{AffectedAssets, DetectedIssue};
use crate::domain::services::issue_builders::ratio_issue;
use crate::domain::severity::RatioThresholds;
use crate::domain::snapshot::{word_count, AnswerBlock, ProductRecord, SiteSnapshot};

const ANSWER_DEFECTS: RatioThresholds = RatioThresholds::new(0.50, 0.25, 0.0);

/// Opening sentence shorter than this does not answer the question
pub const DIRECT_ANSWER_MIN_WORDS: usize = 4;
/// A single sentence longer than this reads as a wall of text
pub const RUN_ON_SENTENCE_WORDS: usize = 60;
pub const PROMOTIONAL_EXCLAMATIONS: usize = 2;

const PROMOTIONAL_PHRASES: &[&str] = &[
    "buy now", "order now", "order today", "shop now", "limited time", "don't miss",
    "act fast", "while supplies last", "best price", "free shipping", "sale",
];

const EXAMPLE_CUES: &[&str] = &["for example", "for instance", "such as", "e.g.", "like a", "like the"];

static PROMOTIONAL_CUES: Lazy<Option<Regex>> = Lazy::new(|| {
    let alternation = PROMOTIONAL_PHRASES
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).ok()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerDefectKind {
    MissingDirectAnswer,
    TooVague,
    PoorStructure,
    OverlyPromotional,
    MissingExamples,
}

impl AnswerDefectKind {
    pub const ALL: [AnswerDefectKind; 5] = [
        AnswerDefectKind::MissingDirectAnswer,
        AnswerDefectKind::TooVague,
        AnswerDefectKind::PoorStructure,
        AnswerDefectKind::OverlyPromotional,
        AnswerDefectKind::MissingExamples,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnswerDefectKind::MissingDirectAnswer => "missing_direct_answer",
            AnswerDefectKind::TooVague => "too_vague",
            AnswerDefectKind::PoorStructure => "poor_structure",
            AnswerDefectKind::OverlyPromotional => "overly_promotional",
            AnswerDefectKind::MissingExamples => "missing_examples",
        }
    }

    pub fn issue_type(self) -> &'static str {
        match self {
            AnswerDefectKind::MissingDirectAnswer => issue_types::ANSWER_MISSING_DIRECT_ANSWER,
            AnswerDefectKind::TooVague => issue_types::ANSWER_TOO_VAGUE,
            AnswerDefectKind::PoorStructure => issue_types::ANSWER_POOR_STRUCTURE,
            AnswerDefectKind::OverlyPromotional => issue_types::ANSWER_OVERLY_PROMOTIONAL,
            AnswerDefectKind::MissingExamples => issue_types::ANSWER_MISSING_EXAMPLES,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            AnswerDefectKind::MissingDirectAnswer => "do not open with a direct answer",
            AnswerDefectKind::TooVague => "rely on generic marketing language",
            AnswerDefectKind::PoorStructure => "are written as run-on walls of text",
            AnswerDefectKind::OverlyPromotional => "read as sales copy rather than answers",
            AnswerDefectKind::MissingExamples => "explain usage or features without a concrete example",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerQualityError {
    #[error("Malformed answer unit on product {product_id}: {reason}")]
    MalformedAnswerUnit { product_id: String, reason: String },
}

/// Defect kinds shown by a single answer block
pub fn block_defects(block: &AnswerBlock) -> BTreeSet<AnswerDefectKind> {
    let mut defects = BTreeSet::new();
    let text = block.answer_text.trim();
    let parts = sentences(text);

    let direct = !opens_with_question(text)
        && parts.first().is_some_and(|first| word_count(first) >= DIRECT_ANSWER_MIN_WORDS);
    if !direct {
        defects.insert(AnswerDefectKind::MissingDirectAnswer);
    }
    if text.is_empty() {
        return defects;
    }

    if vague_phrase_density(text) >= VAGUE_DENSITY_LIMIT {
        defects.insert(AnswerDefectKind::TooVague);
    }
    if parts.iter().any(|s| word_count(s) > RUN_ON_SENTENCE_WORDS) {
        defects.insert(AnswerDefectKind::PoorStructure);
    }

    let exclamations = text.matches('!').count();
    let promo = PROMOTIONAL_CUES.as_ref().is_some_and(|re| re.is_match(text));
    if promo || exclamations >= PROMOTIONAL_EXCLAMATIONS {
        defects.insert(AnswerDefectKind::OverlyPromotional);
    }

    if needs_example(&block.question_id) && !has_example(text) {
        defects.insert(AnswerDefectKind::MissingExamples);
    }
    defects
}

/// The opening sentence ends in a question mark
fn opens_with_question(text: &str) -> bool {
    text.find(['.', '!', '?', ';', '\n'])
        .is_some_and(|i| text[i..].starts_with('?'))
}

fn needs_example(question_id: &str) -> bool {
    matches!(
        BuyerQuestion::from_id(question_id),
        Some(BuyerQuestion::HowIsItUsed | BuyerQuestion::KeyFeatures | BuyerQuestion::ProblemsSolved)
    )
}

fn has_example(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.chars().any(|c| c.is_ascii_digit()) || EXAMPLE_CUES.iter().any(|cue| lower.contains(cue))
}

fn product_defects(product: &ProductRecord) -> Result<BTreeSet<AnswerDefectKind>, AnswerQualityError> {
    let mut defects = BTreeSet::new();
    for block in &product.answer_blocks {
        if block.question_id.trim().is_empty() {
            return Err(AnswerQualityError::MalformedAnswerUnit {
                product_id: product.id.clone(),
                reason: "answer block has a blank question id".to_string(),
            });
        }
        defects.extend(block_defects(block));
    }
    Ok(defects)
}

/// One issue per triggered defect kind, in kind order.
///
/// The denominator is the number of products carrying at least one answer
/// block. A malformed block fails the whole evaluation.
pub fn evaluate(snapshot: &SiteSnapshot) -> Result<Vec<DetectedIssue>, AnswerQualityError> {
    let answered: Vec<&ProductRecord> = snapshot
        .products
        .iter()
        .filter(|p| !p.answer_blocks.is_empty())
        .collect();

    let mut affected: BTreeMap<AnswerDefectKind, Vec<String>> = BTreeMap::new();
    for product in &answered {
        for kind in product_defects(product)? {
            affected.entry(kind).or_default().push(product.id.clone());
        }
    }

    let total = answered.len();
    Ok(affected
        .into_iter()
        .filter_map(|(kind, ids)| {
            ratio_issue(
                kind.issue_type(),
                ANSWER_DEFECTS,
                AffectedAssets::products(ids),
                total,
                |n, total| format!("{n} of {total} products with written answers {}.", kind.describe()),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::severity::IssueSeverity;

    fn block(question_id: &str, text: &str) -> AnswerBlock {
        AnswerBlock {
            question_id: question_id.into(),
            answer_text: text.into(),
        }
    }

    fn product(id: &str, blocks: Vec<AnswerBlock>) -> ProductRecord {
        let mut p = ProductRecord::new(id, format!("Product {id}"));
        p.answer_blocks = blocks;
        p
    }

    #[test]
    fn clean_answer_has_no_defects() {
        let b = block(
            "how_is_it_used",
            "Fill the kettle to the 1 litre line and set it on any hob. It whistles once the water boils.",
        );
        assert!(block_defects(&b).is_empty());
    }

    #[test]
    fn blank_answer_misses_direct_answer_only() {
        let defects = block_defects(&block("what_is_it", "  "));
        assert_eq!(defects.into_iter().collect::<Vec<_>>(), vec![AnswerDefectKind::MissingDirectAnswer]);
    }

    #[test]
    fn question_opener_is_not_a_direct_answer() {
        let defects = block_defects(&block(
            "what_is_it",
            "Wondering what this little mug really is? It is a stoneware mug.",
        ));
        assert!(defects.contains(&AnswerDefectKind::MissingDirectAnswer));

        let later_question = block_defects(&block(
            "what_is_it",
            "It is a stoneware mug glazed by hand. Why stoneware? It keeps coffee hot.",
        ));
        assert!(!later_question.contains(&AnswerDefectKind::MissingDirectAnswer));
    }

    #[test]
    fn promotional_and_vague_copy_is_flagged() {
        let defects = block_defects(&block("why_choose_this", "The best amazing premium gift ever! Buy now!"));
        assert!(defects.contains(&AnswerDefectKind::OverlyPromotional));
        assert!(defects.contains(&AnswerDefectKind::TooVague));
    }

    #[test]
    fn usage_answer_without_example_is_flagged() {
        let defects = block_defects(&block("how_is_it_used", "You use it in the normal way every morning."));
        assert!(defects.contains(&AnswerDefectKind::MissingExamples));
        let fine = block_defects(&block("what_is_it", "It is a stoneware mug glazed by hand."));
        assert!(!fine.contains(&AnswerDefectKind::MissingExamples));
    }

    #[test]
    fn run_on_sentence_is_poor_structure() {
        let text = std::iter::repeat("word").take(70).collect::<Vec<_>>().join(" ");
        let defects = block_defects(&block("what_is_it", &text));
        assert!(defects.contains(&AnswerDefectKind::PoorStructure));
    }

    #[test]
    fn denominator_counts_only_products_with_answers() {
        let products = vec![
            product("p1", vec![block("what_is_it", "Buy now!")]),
            product("p2", vec![block("what_is_it", "It is a cast iron pan for everyday frying.")]),
            product("p3", vec![]),
            product("p4", vec![]),
        ];
        let snapshot = SiteSnapshot::new("s", vec![], products, Default::default());
        let issues = evaluate(&snapshot).unwrap();

        let direct = issues
            .iter()
            .find(|d| d.issue.id == issue_types::ANSWER_MISSING_DIRECT_ANSWER)
            .unwrap();
        assert_eq!(direct.issue.count, 1);
        assert_eq!(direct.issue.severity, IssueSeverity::Warning);
        assert_eq!(direct.affected.product_ids, vec!["p1".to_string()]);
    }

    #[test]
    fn blank_question_id_fails_evaluation() {
        let products = vec![product("p1", vec![block(" ", "It is a lamp.")])];
        let snapshot = SiteSnapshot::new("s", vec![], products, Default::default());
        assert_eq!(
            evaluate(&snapshot).unwrap_err(),
            AnswerQualityError::MalformedAnswerUnit {
                product_id: "p1".into(),
                reason: "answer block has a blank question id".into(),
            }
        );
    }

    #[test]
    fn no_answer_blocks_means_no_issues() {
        let snapshot = SiteSnapshot::new("s", vec![], vec![product("p1", vec![])], Default::default());
        assert!(evaluate(&snapshot).unwrap().is_empty());
    }
}
