//! Batch formatting across threads.

use crate::config::FormattingConfig;
use crate::normalize::format_markdown;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// One document to format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInput {
    /// Document identifier (typically the file path).
    pub id: String,
    /// Markdown source.
    pub text: String,
}

/// Formatting result for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    /// Identifier matching the input.
    pub id: String,
    /// Formatted text.
    pub text: String,
    /// Whether the text differs from the input.
    pub changed: bool,
}

/// Statistics for a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Number of documents processed.
    pub total: usize,
    /// Number of documents that changed.
    pub changed: usize,
    /// Wall-clock time in milliseconds.
    pub processing_time_ms: f64,
}

/// Options for batch formatting.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOptions {
    /// Maximum number of threads. Defaults to rayon's global pool.
    pub max_threads: Option<usize>,
}

/// Results in input order, plus statistics.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    /// One result per input, same order.
    pub results: Vec<BatchResult>,
    /// Aggregate statistics.
    pub stats: BatchStats,
}

/// Format every input in parallel on the global pool.
pub fn format_batch(inputs: &[BatchInput], config: &FormattingConfig) -> BatchOutcome {
    format_batch_with_options(inputs, config, &BatchOptions::default())
}

/// Format every input in parallel, optionally on a dedicated pool.
pub fn format_batch_with_options(
    inputs: &[BatchInput],
    config: &FormattingConfig,
    options: &BatchOptions,
) -> BatchOutcome {
    let start = Instant::now();

    // Falls back to the global pool if the dedicated one cannot be built.
    let pool = options.max_threads.and_then(|threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .ok()
    });

    let process_input = |input: &BatchInput| -> BatchResult {
        let text = format_markdown(&input.text, config);
        BatchResult {
            id: input.id.clone(),
            changed: text != input.text,
            text,
        }
    };

    let results: Vec<BatchResult> = match pool {
        Some(pool) => pool.install(|| inputs.par_iter().map(process_input).collect()),
        None => inputs.par_iter().map(process_input).collect(),
    };

    let changed = results.iter().filter(|r| r.changed).count();
    log::debug!("formatted {} documents, {} changed", results.len(), changed);

    BatchOutcome {
        stats: BatchStats {
            total: inputs.len(),
            changed,
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        },
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: &str, text: &str) -> BatchInput {
        BatchInput {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn keeps_input_order_and_counts_changes() {
        let inputs = vec![
            input("a.md", "你好,世界"),
            input("b.md", "plain text"),
            input("c.md", "中文English"),
        ];
        let outcome = format_batch(&inputs, &FormattingConfig::default());

        let ids: Vec<&str> = outcome.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a.md", "b.md", "c.md"]);
        assert_eq!(outcome.results[0].text, "你好，世界");
        assert!(!outcome.results[1].changed);
        assert_eq!(outcome.results[2].text, "中文 English");
        assert_eq!(outcome.stats.total, 3);
        assert_eq!(outcome.stats.changed, 2);
    }

    #[test]
    fn matches_sequential_formatting_on_a_dedicated_pool() {
        let inputs: Vec<BatchInput> = (0..32)
            .map(|i| input(&format!("{i}.md"), &format!("第{i}章,内容Text{i}")))
            .collect();
        let config = FormattingConfig::default();
        let outcome =
            format_batch_with_options(&inputs, &config, &BatchOptions { max_threads: Some(2) });

        for (input, result) in inputs.iter().zip(&outcome.results) {
            assert_eq!(result.text, format_markdown(&input.text, &config));
        }
    }

    #[test]
    fn empty_batch() {
        let outcome = format_batch(&[], &FormattingConfig::default());
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.stats.total, 0);
    }
}
