//! Price lookup sources and the background update worker
//!
//! `PriceSource` is the seam where a real distributor API would plug in. The
//! worker runs lookups on its own thread and posts `WorkerEvent` messages
//! over a channel; the owning thread drains the channel and applies the
//! successful quotes to the store in one batch, so a concurrent reader never
//! observes a half-written update.

use std::sync::mpsc;
use std::thread;

use rand::Rng;
use thiserror::Error;

use crate::store::Lifecycle;

/// Maximum components handled per update run
pub const BATCH_LIMIT: usize = 10;

/// A price and lifecycle observation from an external source
#[derive(Debug, Clone, Copy)]
pub struct PriceQuote {
    pub price: f64,
    pub lifecycle: Lifecycle,
}

/// Failure to obtain a quote for one part. Never aborts a batch; the worker
/// reports it and moves on.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no listing found for {mpn}")]
    NoListing { mpn: String },

    #[error("price source unavailable: {0}")]
    Unavailable(String),
}

/// An external source of component pricing.
///
/// The production contract: given an MPN and manufacturer, return a quote or
/// fail for that part. Request shape, auth, and rate limiting belong to the
/// concrete implementation.
pub trait PriceSource {
    /// Label recorded in price history for updates from this source
    fn name(&self) -> &'static str;

    fn lookup(&self, mpn: &str, manufacturer: &str) -> Result<PriceQuote, LookupError>;
}

/// Stand-in source that fabricates quotes. Prices are random, lifecycle is
/// mostly Active, and a small fraction of lookups fail so callers exercise
/// the per-item error path.
pub struct SimulatedSource;

impl PriceSource for SimulatedSource {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn lookup(&self, mpn: &str, _manufacturer: &str) -> Result<PriceQuote, LookupError> {
        let mut rng = rand::rng();

        // Roughly one in ten parts has no listing
        if rng.random_range(0..10) == 0 {
            return Err(LookupError::NoListing {
                mpn: mpn.to_string(),
            });
        }

        let price = (rng.random_range(0.01f64..25.0) * 100.0).round() / 100.0;
        let lifecycle = match rng.random_range(0..20) {
            0 => Lifecycle::Nrnd,
            1 => Lifecycle::Eol,
            2 => Lifecycle::Obsolete,
            _ => Lifecycle::Active,
        };
        Ok(PriceQuote { price, lifecycle })
    }
}

/// One component queued for a price check
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub component_id: i64,
    pub mpn: String,
    pub manufacturer: String,
}

/// Messages posted by the worker thread
#[derive(Debug)]
pub enum WorkerEvent {
    /// A lookup succeeded
    Quoted {
        component_id: i64,
        mpn: String,
        quote: PriceQuote,
    },
    /// A lookup failed; the batch continues
    Failed { mpn: String, error: LookupError },
    /// The batch finished
    Done { succeeded: usize, failed: usize },
}

/// Run lookups for a batch on a background thread.
///
/// Events arrive on the returned receiver, ending with `Done`. The worker
/// never touches the store; applying quotes is the receiver's job, on its
/// own thread.
pub fn spawn_batch<S>(items: Vec<BatchItem>, source: S) -> mpsc::Receiver<WorkerEvent>
where
    S: PriceSource + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let mut succeeded = 0;
        let mut failed = 0;

        for item in items {
            match source.lookup(&item.mpn, &item.manufacturer) {
                Ok(quote) => {
                    succeeded += 1;
                    // A closed receiver means the caller is gone; stop quietly.
                    if tx
                        .send(WorkerEvent::Quoted {
                            component_id: item.component_id,
                            mpn: item.mpn,
                            quote,
                        })
                        .is_err()
                    {
                        return;
                    }
                }
                Err(error) => {
                    failed += 1;
                    if tx
                        .send(WorkerEvent::Failed {
                            mpn: item.mpn,
                            error,
                        })
                        .is_err()
                    {
                        return;
                    }
                }
            }
        }

        let _ = tx.send(WorkerEvent::Done { succeeded, failed });
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scripted source: fails every `fail_every`-th lookup
    struct ScriptedSource {
        calls: Arc<AtomicUsize>,
        fail_every: usize,
    }

    impl PriceSource for ScriptedSource {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn lookup(&self, mpn: &str, _manufacturer: &str) -> Result<PriceQuote, LookupError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n % self.fail_every == 0 {
                Err(LookupError::NoListing {
                    mpn: mpn.to_string(),
                })
            } else {
                Ok(PriceQuote {
                    price: n as f64,
                    lifecycle: Lifecycle::Active,
                })
            }
        }
    }

    fn items(n: usize) -> Vec<BatchItem> {
        (0..n)
            .map(|i| BatchItem {
                component_id: i as i64 + 1,
                mpn: format!("PART-{}", i),
                manufacturer: "ACME".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let source = ScriptedSource {
            calls: Arc::new(AtomicUsize::new(0)),
            fail_every: 3, // lookup 3 of 5 fails
        };
        let rx = spawn_batch(items(5), source);

        let mut quoted = 0;
        let mut failed = 0;
        let mut done = None;
        for event in rx {
            match event {
                WorkerEvent::Quoted { .. } => quoted += 1,
                WorkerEvent::Failed { .. } => failed += 1,
                WorkerEvent::Done { succeeded, failed } => done = Some((succeeded, failed)),
            }
        }

        assert_eq!(quoted, 4);
        assert_eq!(failed, 1);
        assert_eq!(done, Some((4, 1)));
    }

    #[test]
    fn test_empty_batch_reports_done() {
        let source = ScriptedSource {
            calls: Arc::new(AtomicUsize::new(0)),
            fail_every: 2,
        };
        let rx = spawn_batch(Vec::new(), source);
        let events: Vec<WorkerEvent> = rx.into_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            WorkerEvent::Done {
                succeeded: 0,
                failed: 0
            }
        ));
    }

    #[test]
    fn test_simulated_source_quotes_are_sane() {
        let source = SimulatedSource;
        let mut quotes = 0;
        for i in 0..100 {
            if let Ok(quote) = source.lookup(&format!("PART-{}", i), "ACME") {
                assert!(quote.price >= 0.01 && quote.price <= 25.0);
                // Rounded to whole cents
                assert_eq!((quote.price * 100.0).round() / 100.0, quote.price);
                quotes += 1;
            }
        }
        // Most lookups succeed
        assert!(quotes > 50);
    }
}
