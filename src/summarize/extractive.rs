//! Graph-based extractive condensation (TextRank over sentences).

use std::collections::HashSet;

use crate::text;

/// Share of sentences retained by rank
const RETENTION_RATIO: f64 = 0.70;

/// PageRank damping factor
const DAMPING: f64 = 0.85;

const MAX_ITERATIONS: usize = 50;
const CONVERGENCE: f64 = 1e-4;

/// Reduces long caption-grade transcripts to their most salient sentences.
///
/// Retained sentences are concatenated in ranked order, not document order;
/// the downstream abstractive pass reads the string sequentially either way.
pub struct ExtractiveCondenser;

impl ExtractiveCondenser {
    pub fn new() -> Self {
        Self
    }

    pub fn condense(&self, input: &str) -> String {
        let sentences = text::split_sentences(input);
        if sentences.len() < 2 {
            return input.to_string();
        }

        let scores = rank_sentences(&sentences);

        // Round to the nearest whole sentence count, never below one
        let retain = ((sentences.len() as f64 * RETENTION_RATIO).round() as usize).max(1);

        let mut ranked: Vec<usize> = (0..sentences.len()).collect();
        ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        ranked.truncate(retain);

        ranked
            .iter()
            .map(|&idx| sentences[idx].as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for ExtractiveCondenser {
    fn default() -> Self {
        Self::new()
    }
}

/// Power-iterate PageRank over the sentence similarity graph
fn rank_sentences(sentences: &[String]) -> Vec<f64> {
    let n = sentences.len();
    let words: Vec<HashSet<String>> = sentences.iter().map(|s| tokenize(s)).collect();

    let mut weights = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let w = similarity(&words[i], &words[j]);
            weights[i][j] = w;
            weights[j][i] = w;
        }
    }

    let out_sums: Vec<f64> = weights.iter().map(|row| row.iter().sum()).collect();
    let mut scores = vec![1.0 / n as f64; n];

    for _ in 0..MAX_ITERATIONS {
        let mut next = vec![(1.0 - DAMPING) / n as f64; n];
        for i in 0..n {
            for j in 0..n {
                if weights[j][i] > 0.0 && out_sums[j] > 0.0 {
                    next[i] += DAMPING * scores[j] * weights[j][i] / out_sums[j];
                }
            }
        }

        let delta: f64 = next
            .iter()
            .zip(&scores)
            .map(|(a, b)| (a - b).abs())
            .sum();
        scores = next;

        if delta < CONVERGENCE {
            break;
        }
    }

    scores
}

/// Word-overlap similarity normalized by log sentence lengths
fn similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.len() <= 1 || b.len() <= 1 {
        return 0.0;
    }

    let common = a.intersection(b).count() as f64;
    if common == 0.0 {
        return 0.0;
    }

    common / ((a.len() as f64).ln() + (b.len() as f64).ln())
}

fn tokenize(sentence: &str) -> HashSet<String> {
    sentence
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .collect()
}
