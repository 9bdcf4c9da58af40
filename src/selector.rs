//! Strategy selection.
//!
//! `Auto` runs the strategies as a fallback chain; an explicit method runs
//! exactly one strategy.

use dom_query::Document;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::options::{Method, Options};
use crate::strategy::{ExtractionResult, PrecisionStrategy, Strategy, StructuralStrategy};

/// Picks and runs extraction strategies.
#[derive(Debug, Clone)]
pub struct StrategySelector {
    precision: PrecisionStrategy,
    structural: StructuralStrategy,
    min_accept_len: usize,
}

impl StrategySelector {
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            precision: PrecisionStrategy::new(options.precision.clone()),
            structural: StructuralStrategy::new(options.structural.clone()),
            min_accept_len: options.min_accept_len,
        }
    }

    /// Strategies tried for `method`, in order.
    fn chain(&self, method: Method) -> Vec<&dyn Strategy> {
        match method {
            Method::Auto => vec![&self.precision as &dyn Strategy, &self.structural],
            Method::Precision => vec![&self.precision],
            Method::Structural => vec![&self.structural],
        }
    }

    /// Run the strategies for `method` and return the accepted result.
    ///
    /// In a chain, every strategy but the last must also reach
    /// `min_accept_len` characters; the last is accepted on success alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExtractionFailed`] when no strategy is accepted.
    pub fn select<'a>(&self, doc: &'a Document, method: Method) -> Result<ExtractionResult<'a>> {
        let chain = self.chain(method);
        let mut attempts: Vec<String> = Vec::with_capacity(chain.len());

        for (i, strategy) in chain.iter().enumerate() {
            let is_last = i + 1 == chain.len();
            let result = strategy.extract(doc);
            let text_len = result.text_len();

            if result.success && (is_last || text_len >= self.min_accept_len) {
                info!(strategy = strategy.name(), text_len, "content extracted");
                return Ok(result);
            }

            let attempt = if result.success {
                format!(
                    "{} found {text_len} characters, below the {} needed to skip the fallback",
                    strategy.name(),
                    self.min_accept_len
                )
            } else {
                format!(
                    "{} found no block with at least {} characters",
                    strategy.name(),
                    strategy.min_text_len()
                )
            };
            debug!(strategy = strategy.name(), text_len, "strategy rejected");
            attempts.push(attempt);
        }

        Err(Error::extraction_failed(method, attempts.join("; ")))
    }
}
