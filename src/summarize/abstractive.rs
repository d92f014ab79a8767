//! Chunked abstractive summarization over external seq2seq models.

use crate::providers::{ProviderError, SummaryModel};
use crate::text;

use super::SummaryResult;

/// Fixed chunk window width, in characters
pub const CHUNK_WIDTH: usize = 1200;

/// Which summarization model to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    /// Fast, shorter-focus model
    Fast,
    /// News-style, longer-context model
    News,
    /// Run both independently and return an ordered pair, fast first
    Both,
}

impl From<u8> for ModelChoice {
    fn from(choice: u8) -> Self {
        match choice {
            1 => ModelChoice::Fast,
            2 => ModelChoice::News,
            // Unrecognized choices multiplex across both models by design
            _ => ModelChoice::Both,
        }
    }
}

/// One contiguous character window of the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub start_offset: usize,
}

/// Split text into fixed-width character windows; the last window is a
/// short remainder. A sentence may be cut at a window boundary; the loss is
/// accepted for compatibility with the original chunking behavior.
pub fn chunk_windows(input: &str, width: usize) -> Vec<Chunk> {
    let chars: Vec<char> = input.chars().collect();
    chars
        .chunks(width)
        .enumerate()
        .map(|(i, window)| Chunk {
            text: window.iter().collect(),
            start_offset: i * width,
        })
        .collect()
}

/// Per-chunk target summary length, tiered on total input length.
///
/// Longer inputs accumulate more chunks, so the per-chunk target shrinks to
/// keep the concatenated summary roughly length-stable.
fn target_length(total_chars: usize) -> usize {
    if total_chars < 2000 {
        80
    } else if total_chars > 20000 {
        60
    } else {
        70
    }
}

/// Chunks text to respect model input limits and summarizes per chunk
pub struct AbstractiveSummarizer {
    fast: Box<dyn SummaryModel>,
    news: Box<dyn SummaryModel>,
}

impl AbstractiveSummarizer {
    pub fn new(fast: Box<dyn SummaryModel>, news: Box<dyn SummaryModel>) -> Self {
        Self { fast, news }
    }

    pub async fn summarize(
        &self,
        input: &str,
        choice: ModelChoice,
    ) -> Result<SummaryResult, ProviderError> {
        match choice {
            ModelChoice::Fast => Ok(SummaryResult::Single(
                self.run_model(self.fast.as_ref(), input).await?,
            )),
            ModelChoice::News => Ok(SummaryResult::Single(
                self.run_model(self.news.as_ref(), input).await?,
            )),
            ModelChoice::Both => {
                let fast = self.run_model(self.fast.as_ref(), input).await?;
                let news = self.run_model(self.news.as_ref(), input).await?;
                Ok(SummaryResult::Pair(fast, news))
            }
        }
    }

    /// Summarize every window in order and concatenate the results
    async fn run_model(
        &self,
        model: &dyn SummaryModel,
        input: &str,
    ) -> Result<String, ProviderError> {
        let total_chars = input.chars().count();
        let target = target_length(total_chars);
        tracing::debug!(
            model = model.name(),
            total_chars,
            target,
            "Running abstractive summarization"
        );

        let mut full_summary = String::new();
        for chunk in chunk_windows(input, CHUNK_WIDTH) {
            let summary = model.summarize(&chunk.text, target).await?;
            full_summary.push_str(&summary);
        }

        Ok(text::clean(&full_summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockSummaryModel;

    fn echo_model(label: &'static str) -> MockSummaryModel {
        let mut model = MockSummaryModel::new();
        model.expect_name().return_const(label);
        model.expect_summarize().returning(move |chunk, _| {
            Ok(format!("{}:{} ", label, chunk.chars().count()))
        });
        model
    }

    #[test]
    fn test_chunk_windows_exact_split() {
        let input = "a".repeat(2400);
        let chunks = chunk_windows(&input, CHUNK_WIDTH);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text.len(), 1200);
        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks[1].text.len(), 1200);
        assert_eq!(chunks[1].start_offset, 1200);
    }

    #[test]
    fn test_chunk_windows_short_remainder() {
        let input = "b".repeat(1300);
        let chunks = chunk_windows(&input, CHUNK_WIDTH);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].text.len(), 100);
        assert_eq!(chunks[1].start_offset, 1200);
    }

    #[test]
    fn test_target_length_tiers() {
        assert_eq!(target_length(1999), 80);
        assert_eq!(target_length(2000), 70);
        assert_eq!(target_length(20000), 70);
        assert_eq!(target_length(20001), 60);
    }

    #[test]
    fn test_model_choice_from_u8() {
        assert_eq!(ModelChoice::from(1), ModelChoice::Fast);
        assert_eq!(ModelChoice::from(2), ModelChoice::News);
        assert_eq!(ModelChoice::from(0), ModelChoice::Both);
        assert_eq!(ModelChoice::from(7), ModelChoice::Both);
    }

    #[tokio::test]
    async fn test_exactly_two_chunks_for_2400_chars() {
        let mut model = MockSummaryModel::new();
        model.expect_name().return_const("fast");
        model
            .expect_summarize()
            .withf(|chunk, _| chunk.chars().count() == 1200)
            .times(2)
            .returning(|_, _| Ok("summary part. ".to_string()));

        let summarizer = AbstractiveSummarizer::new(Box::new(model), Box::new(echo_model("news")));
        let input = "c".repeat(2400);
        summarizer
            .summarize(&input, ModelChoice::Fast)
            .await
            .expect("summarization should succeed");
    }

    #[tokio::test]
    async fn test_unrecognized_choice_runs_both_fast_first() {
        let input = "word ".repeat(300);

        let fast_only =
            AbstractiveSummarizer::new(Box::new(echo_model("fast")), Box::new(echo_model("news")));
        let single = fast_only
            .summarize(&input, ModelChoice::Fast)
            .await
            .unwrap();

        let both =
            AbstractiveSummarizer::new(Box::new(echo_model("fast")), Box::new(echo_model("news")));
        let pair = both.summarize(&input, ModelChoice::Both).await.unwrap();

        match (single, pair) {
            (SummaryResult::Single(fast), SummaryResult::Pair(first, second)) => {
                assert_eq!(first, fast);
                assert!(second.starts_with("News"));
            }
            other => panic!("unexpected result shape: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chunks_concatenate_in_window_order() {
        let mut model = MockSummaryModel::new();
        model.expect_name().return_const("fast");
        let mut call = 0;
        model.expect_summarize().returning(move |_, _| {
            call += 1;
            Ok(format!("part{}. ", call))
        });

        let summarizer = AbstractiveSummarizer::new(Box::new(model), Box::new(echo_model("news")));
        let input = "d".repeat(2500);
        let result = summarizer
            .summarize(&input, ModelChoice::Fast)
            .await
            .unwrap();

        match result {
            SummaryResult::Single(summary) => {
                assert_eq!(summary, "Part1. Part2. Part3.");
            }
            other => panic!("unexpected result shape: {:?}", other),
        }
    }
}
