//! Two-stage summarization pipeline: extractive pre-filter + chunked
//! abstractive summarization.

use crate::acquire::SourceGrade;
use crate::providers::{SummaryModel, Translator};
use crate::{text, ErrorSignal};

pub mod abstractive;
pub mod extractive;

pub use abstractive::{AbstractiveSummarizer, ModelChoice, CHUNK_WIDTH};
pub use extractive::ExtractiveCondenser;

/// Inputs at or below this many characters skip summarization entirely
pub const SHORT_INPUT_LIMIT: usize = 150;

/// Final summary value: one string, or an ordered pair when both models ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryResult {
    Single(String),
    Pair(String, String),
}

impl SummaryResult {
    /// Labelled (model, text) views for output formatting
    pub fn parts(&self) -> Vec<(&'static str, &str)> {
        match self {
            SummaryResult::Single(summary) => vec![("summary", summary.as_str())],
            SummaryResult::Pair(fast, news) => {
                vec![("fast", fast.as_str()), ("news", news.as_str())]
            }
        }
    }
}

/// Top-level coordinator for condensation and abstractive summarization.
///
/// Linear state machine: short inputs are only normalized; caption-grade
/// transcripts are condensed before the abstractive pass; speech-grade
/// transcripts go to the abstractive pass directly.
pub struct SummarizationPipeline {
    condenser: ExtractiveCondenser,
    abstractive: AbstractiveSummarizer,
}

impl SummarizationPipeline {
    pub fn new(fast: Box<dyn SummaryModel>, news: Box<dyn SummaryModel>) -> Self {
        Self {
            condenser: ExtractiveCondenser::new(),
            abstractive: AbstractiveSummarizer::new(fast, news),
        }
    }

    pub async fn summarize(
        &self,
        input: &str,
        source_grade: SourceGrade,
        choice: ModelChoice,
    ) -> Result<SummaryResult, ErrorSignal> {
        if input.chars().count() <= SHORT_INPUT_LIMIT {
            tracing::debug!("Input below short-circuit limit, normalizing only");
            return Ok(SummaryResult::Single(text::clean(input)));
        }

        // The extractive pre-filter only helps on well-segmented caption text
        let condensed;
        let stage_input = match source_grade {
            SourceGrade::Caption => {
                condensed = self.condenser.condense(input);
                condensed.as_str()
            }
            SourceGrade::Speech => input,
        };

        self.abstractive
            .summarize(stage_input, choice)
            .await
            .map_err(|e| {
                tracing::warn!("Abstractive summarization failed: {}", e);
                ErrorSignal::SummarizationFailed
            })
    }
}

/// Translate every part of a summary, preserving its shape.
///
/// Translated text keeps its script: only a trim and leading capitalization
/// are applied. Running the ASCII fold here would gut any non-Latin target
/// language.
pub async fn translate_summary(
    translator: &dyn Translator,
    result: &SummaryResult,
    lang: &str,
) -> Result<SummaryResult, ErrorSignal> {
    match result {
        SummaryResult::Single(summary) => Ok(SummaryResult::Single(
            translate_part(translator, summary, lang).await?,
        )),
        SummaryResult::Pair(fast, news) => Ok(SummaryResult::Pair(
            translate_part(translator, fast, lang).await?,
            translate_part(translator, news, lang).await?,
        )),
    }
}

async fn translate_part(
    translator: &dyn Translator,
    input: &str,
    lang: &str,
) -> Result<String, ErrorSignal> {
    translator
        .translate(input, lang)
        .await
        .map(|translated| text::capitalize(translated.trim()))
        .map_err(|e| {
            tracing::warn!("Translation failed: {}", e);
            ErrorSignal::TranslationFailed
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{MockSummaryModel, MockTranslator, ProviderError};

    fn silent_model() -> MockSummaryModel {
        let mut model = MockSummaryModel::new();
        model.expect_summarize().times(0);
        model
    }

    #[tokio::test]
    async fn test_short_input_is_only_normalized() {
        let pipeline = SummarizationPipeline::new(Box::new(silent_model()), Box::new(silent_model()));

        let result = pipeline
            .summarize("hello world. this is great!!", SourceGrade::Caption, ModelChoice::Fast)
            .await
            .expect("short input should short-circuit");

        assert_eq!(
            result,
            SummaryResult::Single("Hello world. This is great!!".to_string())
        );
    }

    #[tokio::test]
    async fn test_short_circuit_applies_to_both_grades() {
        for grade in [SourceGrade::Caption, SourceGrade::Speech] {
            let pipeline =
                SummarizationPipeline::new(Box::new(silent_model()), Box::new(silent_model()));
            let result = pipeline
                .summarize("short input.", grade, ModelChoice::Both)
                .await
                .unwrap();
            assert_eq!(result, SummaryResult::Single("Short input.".to_string()));
        }
    }

    #[tokio::test]
    async fn test_model_failure_maps_to_summarization_failed() {
        let mut fast = MockSummaryModel::new();
        fast.expect_name().return_const("fast");
        fast.expect_summarize()
            .returning(|_, _| Err(ProviderError::Other(anyhow::anyhow!("model offline"))));

        let pipeline = SummarizationPipeline::new(Box::new(fast), Box::new(silent_model()));
        let long_input = "this sentence repeats to pass the limit. ".repeat(10);

        let result = pipeline
            .summarize(&long_input, SourceGrade::Speech, ModelChoice::Fast)
            .await;
        assert_eq!(result.unwrap_err(), ErrorSignal::SummarizationFailed);
    }

    #[tokio::test]
    async fn test_speech_grade_skips_condensation() {
        // With ten identical sentences, condensation would shrink the input;
        // a speech-grade transcript must reach the model at full length.
        let long_input = "every sentence looks exactly like this one here. ".repeat(10);
        let expected_chars = long_input.chars().count();

        let mut fast = MockSummaryModel::new();
        fast.expect_name().return_const("fast");
        fast.expect_summarize()
            .withf(move |chunk, _| chunk.chars().count() <= expected_chars)
            .returning(|_, _| Ok("a summary.".to_string()));

        let pipeline = SummarizationPipeline::new(Box::new(fast), Box::new(silent_model()));
        let result = pipeline
            .summarize(&long_input, SourceGrade::Speech, ModelChoice::Fast)
            .await
            .unwrap();

        assert!(matches!(result, SummaryResult::Single(_)));
    }

    #[tokio::test]
    async fn test_translated_summary_keeps_non_latin_script() {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .withf(|_, lang: &str| lang == "ru")
            .returning(|_, _| Ok("\u{43a}\u{440}\u{430}\u{442}\u{43a}\u{43e}\u{435} \u{441}\u{43e}\u{434}\u{435}\u{440}\u{436}\u{430}\u{43d}\u{438}\u{435}.".to_string()));

        let result = SummaryResult::Single("a short summary.".to_string());
        let translated = translate_summary(&translator, &result, "ru").await.unwrap();

        assert_eq!(
            translated,
            SummaryResult::Single(
                "\u{41a}\u{440}\u{430}\u{442}\u{43a}\u{43e}\u{435} \u{441}\u{43e}\u{434}\u{435}\u{440}\u{436}\u{430}\u{43d}\u{438}\u{435}.".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_translation_failure_maps_to_translation_failed() {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .returning(|_, _| Err(ProviderError::Other(anyhow::anyhow!("endpoint down"))));

        let result = SummaryResult::Single("a short summary.".to_string());
        let outcome = translate_summary(&translator, &result, "fr").await;
        assert_eq!(outcome.unwrap_err(), ErrorSignal::TranslationFailed);
    }

    #[tokio::test]
    async fn test_pair_translates_both_parts() {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .times(2)
            .returning(|input, _| Ok(format!("fr: {}", input)));

        let result = SummaryResult::Pair("fast out.".to_string(), "news out.".to_string());
        let translated = translate_summary(&translator, &result, "fr").await.unwrap();

        assert_eq!(
            translated,
            SummaryResult::Pair("Fr: fast out.".to_string(), "Fr: news out.".to_string())
        );
    }

    #[test]
    fn test_summary_result_parts() {
        let single = SummaryResult::Single("one".to_string());
        assert_eq!(single.parts(), vec![("summary", "one")]);

        let pair = SummaryResult::Pair("a".to_string(), "b".to_string());
        assert_eq!(pair.parts(), vec![("fast", "a"), ("news", "b")]);
    }
}
