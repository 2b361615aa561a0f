//! Wire DTOs for the Gemini `generateContent` REST API.
//!
//! Only the fields this adapter reads are modelled; the real responses carry
//! additional metadata that is ignored during decoding.

use serde::{Deserialize, Serialize};

/// Request payload: one user turn carrying the fully rendered prompt.
#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest<'a> {
    pub contents: Vec<ContentDto<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    /// Wrap a rendered prompt as a single-part request.
    pub fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![ContentDto {
                parts: vec![PartDto { text: prompt }],
            }],
        }
    }
}

/// One content block in the request.
#[derive(Debug, Serialize)]
pub(crate) struct ContentDto<'a> {
    pub parts: Vec<PartDto<'a>>,
}

/// One text part in the request.
#[derive(Debug, Serialize)]
pub(crate) struct PartDto<'a> {
    pub text: &'a str,
}

/// Response payload: candidates with text parts.
#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<CandidateDto>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any.
    pub fn into_first_text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let parts = candidate.content?.parts;
        let text: String = parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() { None } else { Some(text) }
    }
}

/// One candidate completion.
#[derive(Debug, Deserialize)]
pub(crate) struct CandidateDto {
    pub content: Option<CandidateContentDto>,
}

/// Content block of a candidate.
#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContentDto {
    #[serde(default)]
    pub parts: Vec<CandidatePartDto>,
}

/// One part of a candidate's content.
#[derive(Debug, Deserialize)]
pub(crate) struct CandidatePartDto {
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wraps_the_prompt_as_one_part() {
        let request = GenerateContentRequest::from_prompt("Can I prepay?");
        let json = serde_json::to_value(&request).expect("serialises");
        assert_eq!(
            json["contents"][0]["parts"][0]["text"],
            serde_json::json!("Can I prepay?")
        );
    }

    #[test]
    fn response_yields_the_first_candidate_text() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    { "content": { "parts": [ { "text": "Yes, " }, { "text": "prepayment is allowed." } ] } }
                ]
            }"#,
        )
        .expect("decodes");
        assert_eq!(
            response.into_first_text().as_deref(),
            Some("Yes, prepayment is allowed.")
        );
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{ "candidates": [] }"#).expect("decodes");
        assert!(response.into_first_text().is_none());
    }

    #[test]
    fn missing_content_yields_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{ "candidates": [ { "finishReason": "SAFETY" } ] }"#)
                .expect("decodes");
        assert!(response.into_first_text().is_none());
    }
}
