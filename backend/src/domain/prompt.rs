//! Advisor prompt rendering.
//!
//! Pure string construction: identical inputs always produce byte-identical
//! prompt text. The history is passed through unbounded; the hosted model's
//! own context window is the only cap.

use std::fmt::Write as _;

use crate::domain::chat::{AdvisorQuestion, ChatTurn};
use crate::domain::loan::Product;

const PREAMBLE: &str = "You are a helpful loan product assistant. Answer questions ONLY using \
the information below. If the question is outside this data, say you can only answer questions \
related to this loan product.";

/// Render the full prompt for one advisor call.
///
/// Structure, in order: restriction preamble, enumerated product attribute
/// block, FAQ block (omitted entirely when the product has none), prior
/// turns as `User:`/`Assistant:` lines, the new user turn, and a trailing
/// `Assistant:` cue.
#[must_use]
pub fn render_advisor_prompt(
    product: &Product,
    history: &[ChatTurn],
    question: &AdvisorQuestion,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n");
    push_product_block(&mut prompt, product);
    if !product.faq.is_empty() {
        prompt.push('\n');
        push_faq_block(&mut prompt, product);
    }
    prompt.push('\n');
    for turn in history {
        let _ = writeln!(prompt, "{}: {}", turn.role.prompt_label(), turn.content);
    }
    let _ = write!(prompt, "User: {}\nAssistant:", question.as_ref());
    prompt
}

fn push_product_block(prompt: &mut String, product: &Product) {
    let summary = product.summary.as_deref().unwrap_or("N/A");
    let prepayment = if product.prepayment_allowed { "Yes" } else { "No" };
    let _ = writeln!(prompt, "Product Details:");
    let _ = writeln!(prompt, "- Name: {}", product.name);
    let _ = writeln!(prompt, "- Bank: {}", product.bank);
    let _ = writeln!(prompt, "- Type: {}", product.loan_type);
    let _ = writeln!(prompt, "- Interest Rate (APR): {}%", product.rate_apr);
    let _ = writeln!(
        prompt,
        "- Minimum Income Required: \u{20b9}{}",
        format_inr(product.min_income)
    );
    let _ = writeln!(
        prompt,
        "- Minimum Credit Score Required: {}",
        product.min_credit_score
    );
    let _ = writeln!(
        prompt,
        "- Loan Tenure: {} to {} months",
        product.tenure_min_months, product.tenure_max_months
    );
    let _ = writeln!(prompt, "- Processing Fee: {}%", product.processing_fee_pct);
    let _ = writeln!(prompt, "- Prepayment Allowed: {prepayment}");
    let _ = writeln!(prompt, "- Disbursal Speed: {}", product.disbursal_speed);
    let _ = writeln!(prompt, "- Documentation Level: {}", product.docs_level);
    let _ = writeln!(prompt, "- Summary: {summary}");
}

fn push_faq_block(prompt: &mut String, product: &Product) {
    prompt.push_str("FAQs:\n");
    let mut first = true;
    for entry in &product.faq {
        if !first {
            prompt.push('\n');
        }
        first = false;
        let _ = writeln!(prompt, "Q: {}", entry.question);
        let _ = writeln!(prompt, "A: {}", entry.answer);
    }
}

/// Format a rupee amount with Indian digit grouping (3,00,000 style).
#[must_use]
pub fn format_inr(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2 + 1);
    let len = digits.len();
    for (position, digit) in digits.chars().enumerate() {
        let remaining = len - position;
        if position > 0 && remaining >= 3 && (remaining - 3) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    //! Determinism and formatting coverage for the prompt builder.

    use super::*;
    use crate::domain::chat::ChatRole;
    use crate::domain::loan::test_fixtures::product_spec;
    use crate::domain::loan::{Faq, Product};
    use rstest::rstest;

    fn question(text: &str) -> AdvisorQuestion {
        AdvisorQuestion::new(text).expect("valid question")
    }

    #[rstest]
    #[case(0, "0")]
    #[case(999, "999")]
    #[case(1_000, "1,000")]
    #[case(300_000, "3,00,000")]
    #[case(600_000, "6,00,000")]
    #[case(12_345_678, "1,23,45,678")]
    #[case(100_000_000, "10,00,00,000")]
    #[case(-300_000, "-3,00,000")]
    fn formats_indian_digit_grouping(#[case] amount: i64, #[case] expected: &str) {
        assert_eq!(format_inr(amount), expected);
    }

    #[rstest]
    fn prompt_contains_prepayment_line_and_cue() {
        let product =
            Product::try_new(product_spec("Flexi Personal Loan", 10.5, 300_000)).expect("valid");
        let prompt = render_advisor_prompt(&product, &[], &question("Can I prepay?"));

        assert!(prompt.contains("- Prepayment Allowed: Yes\n"));
        assert!(prompt.ends_with("User: Can I prepay?\nAssistant:"));
    }

    #[rstest]
    fn prompt_is_deterministic() {
        let product =
            Product::try_new(product_spec("Flexi Personal Loan", 10.5, 300_000)).expect("valid");
        let history = vec![
            ChatTurn {
                role: ChatRole::User,
                content: "What is the tenure?".to_owned(),
            },
            ChatTurn {
                role: ChatRole::Assistant,
                content: "6 to 60 months.".to_owned(),
            },
        ];
        let q = question("And the fee?");
        let first = render_advisor_prompt(&product, &history, &q);
        let second = render_advisor_prompt(&product, &history, &q);
        assert_eq!(first, second);
        assert!(first.contains("User: What is the tenure?\nAssistant: 6 to 60 months.\n"));
    }

    #[rstest]
    fn empty_faq_list_omits_the_block_entirely() {
        let product =
            Product::try_new(product_spec("Flexi Personal Loan", 10.5, 300_000)).expect("valid");
        let prompt = render_advisor_prompt(&product, &[], &question("Hello?"));
        assert!(!prompt.contains("FAQs:"));
    }

    #[rstest]
    fn faq_block_renders_question_answer_pairs() {
        let mut spec = product_spec("Flexi Personal Loan", 10.5, 300_000);
        spec.faq = vec![
            Faq {
                question: "Can I prepay?".to_owned(),
                answer: "Yes, after six months.".to_owned(),
            },
            Faq {
                question: "Is there a fee?".to_owned(),
                answer: "1% of principal.".to_owned(),
            },
        ];
        let product = Product::try_new(spec).expect("valid");
        let prompt = render_advisor_prompt(&product, &[], &question("Hello?"));
        assert!(prompt.contains("FAQs:\nQ: Can I prepay?\nA: Yes, after six months.\n\nQ: Is there a fee?\nA: 1% of principal.\n"));
    }

    #[rstest]
    fn whole_number_rates_render_without_decimals() {
        let product = Product::try_new(product_spec("Flexi", 10.0, 300_000)).expect("valid");
        let prompt = render_advisor_prompt(&product, &[], &question("Rate?"));
        assert!(prompt.contains("- Interest Rate (APR): 10%\n"));
    }

    #[rstest]
    fn income_line_uses_rupee_grouping() {
        let product = Product::try_new(product_spec("Flexi", 10.5, 300_000)).expect("valid");
        let prompt = render_advisor_prompt(&product, &[], &question("Income?"));
        assert!(prompt.contains("- Minimum Income Required: \u{20b9}3,00,000\n"));
    }
}
