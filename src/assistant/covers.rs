//! Cover warm-up
//!
//! Generates cover artwork for catalog guides one at a time in a background task, publishing
//! each finished cover as soon as it is ready. Generation is slow and rate limited, so the task
//! pauses between requests and pauses longer after a failure.

use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use tracing::{debug, info, warn};

use crate::{
    assistant::CoverGenerator,
    catalog::{Catalog, GuideId},
};

/// Wrap a theme in the cover-art instruction sent to the image model.
pub fn cover_prompt(theme: &str) -> String {
    format!(
        "Create a high-quality, visually appealing cover image for a digital guide. The theme is: \"{theme}\". The image should be abstract and symbolic, suitable for a book cover. Avoid text."
    )
}

/// One cover to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverJob {
    /// Guide the cover is for
    pub id: GuideId,

    /// Keywords or title the cover should depict
    pub theme: String,
}

/// Jobs for every guide in the catalog that has no artwork yet, in catalog order.
pub fn jobs_for(catalog: &Catalog<'_>) -> Vec<CoverJob> {
    catalog
        .iter()
        .filter(|item| item.artwork_url().is_none())
        .map(|item| CoverJob {
            id: item.id(),
            theme: item.cover_theme().to_string(),
        })
        .collect()
}

/// A generated cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverUpdate {
    /// Guide the cover is for
    pub id: GuideId,

    /// Image URL
    pub url: String,
}

/// Pauses between generation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmupDelays {
    /// Pause after a cover was generated
    pub success: Duration,

    /// Pause after a request failed
    pub failure: Duration,
}

impl Default for WarmupDelays {
    fn default() -> Self {
        Self {
            success: Duration::from_millis(1500),
            failure: Duration::from_millis(3000),
        }
    }
}

/// What a warm-up run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmupSummary {
    /// Covers generated and published
    pub generated: usize,

    /// Requests that failed
    pub failed: usize,

    /// True if the run stopped early because nobody was listening
    pub cancelled: bool,
}

/// Sequential cover generator.
#[derive(Debug)]
pub struct CoverWarmup<G> {
    generator: Arc<G>,
    delays: WarmupDelays,
}

impl<G: CoverGenerator + 'static> CoverWarmup<G> {
    /// Create a warm-up with the default delays.
    pub fn new(generator: Arc<G>) -> Self {
        Self::with_delays(generator, WarmupDelays::default())
    }

    /// Create a warm-up with custom delays.
    pub fn with_delays(generator: Arc<G>, delays: WarmupDelays) -> Self {
        Self { generator, delays }
    }

    /// Run the warm-up in a background task.
    ///
    /// Updates arrive on the returned receiver in job order. Dropping the receiver stops the
    /// task after the request in flight.
    pub fn spawn(
        self,
        jobs: Vec<CoverJob>,
    ) -> (mpsc::Receiver<CoverUpdate>, JoinHandle<WarmupSummary>) {
        let (updates, receiver) = mpsc::channel(jobs.len().max(1));

        let handle = tokio::spawn(async move { self.run(jobs, updates).await });

        (receiver, handle)
    }

    /// Generate covers for `jobs` in order, sending each one on `updates` as it completes.
    pub async fn run(&self, jobs: Vec<CoverJob>, updates: mpsc::Sender<CoverUpdate>) -> WarmupSummary {
        let mut summary = WarmupSummary::default();
        let total = jobs.len();

        info!(jobs = total, "cover warm-up started");

        for (idx, job) in jobs.into_iter().enumerate() {
            if updates.is_closed() {
                summary.cancelled = true;
                break;
            }

            let pause = match self.generator.generate_cover(&cover_prompt(&job.theme)).await {
                Ok(url) => {
                    debug!(guide = %job.id, "cover generated");

                    if updates.send(CoverUpdate { id: job.id, url }).await.is_err() {
                        summary.cancelled = true;
                        break;
                    }

                    summary.generated += 1;
                    self.delays.success
                }
                Err(err) => {
                    warn!(guide = %job.id, error = %err, "cover generation failed");

                    summary.failed += 1;
                    self.delays.failure
                }
            };

            if idx + 1 < total {
                sleep(pause).await;
            }
        }

        info!(
            generated = summary.generated,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "cover warm-up finished"
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;
    use tokio::time::Instant;

    use crate::{
        assistant::{AssistantError, MockCoverGenerator},
        catalog::CatalogItem,
    };

    use super::*;

    fn job(id: u32, theme: &str) -> CoverJob {
        CoverJob {
            id: GuideId::new(id),
            theme: theme.to_string(),
        }
    }

    #[test]
    fn prompt_wraps_theme() {
        assert_eq!(
            cover_prompt("sleep,science"),
            "Create a high-quality, visually appealing cover image for a digital guide. The theme is: \"sleep,science\". The image should be abstract and symbolic, suitable for a book cover. Avoid text."
        );
    }

    #[test]
    fn jobs_skip_guides_with_artwork() -> TestResult {
        let mut catalog = Catalog::with_items(
            [
                CatalogItem::new(GuideId::new(1), "Sleep", Money::from_minor(1000, USD))
                    .with_image_keywords("sleep,moon"),
                CatalogItem::new(GuideId::new(2), "Habits", Money::from_minor(1000, USD)),
                CatalogItem::new(GuideId::new(3), "Focus", Money::from_minor(1000, USD)),
            ],
            USD,
        )?;

        catalog.set_artwork(GuideId::new(2), "https://img/2.jpg")?;

        assert_eq!(
            jobs_for(&catalog),
            vec![job(1, "sleep,moon"), job(3, "Focus")]
        );

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_in_order_and_survives_failures() -> TestResult {
        let mut generator = MockCoverGenerator::new();

        generator.expect_generate_cover().times(3).returning(|prompt| {
            if prompt.contains("\"broken\"") {
                Err(AssistantError::EmptyResponse)
            } else if prompt.contains("\"first\"") {
                Ok("url-1".to_string())
            } else {
                Ok("url-3".to_string())
            }
        });

        let warmup = CoverWarmup::new(Arc::new(generator));
        let (mut updates, handle) =
            warmup.spawn(vec![job(1, "first"), job(2, "broken"), job(3, "third")]);

        let mut received = Vec::new();

        while let Some(update) = updates.recv().await {
            received.push(update);
        }

        assert_eq!(
            received,
            vec![
                CoverUpdate {
                    id: GuideId::new(1),
                    url: "url-1".to_string()
                },
                CoverUpdate {
                    id: GuideId::new(3),
                    url: "url-3".to_string()
                },
            ]
        );

        assert_eq!(
            handle.await?,
            WarmupSummary {
                generated: 2,
                failed: 1,
                cancelled: false
            }
        );

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn waits_longer_after_failure() -> TestResult {
        let mut generator = MockCoverGenerator::new();

        generator
            .expect_generate_cover()
            .times(3)
            .returning(|prompt| {
                if prompt.contains("\"broken\"") {
                    Err(AssistantError::EmptyResponse)
                } else {
                    Ok("url".to_string())
                }
            });

        let (updates, _receiver) = mpsc::channel(4);
        let warmup = CoverWarmup::new(Arc::new(generator));
        let started = Instant::now();

        warmup
            .run(
                vec![job(1, "ok"), job(2, "broken"), job(3, "ok")],
                updates,
            )
            .await;

        let elapsed = started.elapsed();

        assert!(
            elapsed >= Duration::from_millis(4500) && elapsed < Duration::from_millis(5000),
            "elapsed {elapsed:?}"
        );

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_receiver_is_dropped() -> TestResult {
        let mut generator = MockCoverGenerator::new();

        generator.expect_generate_cover().never();

        let warmup = CoverWarmup::new(Arc::new(generator));
        let (updates, handle) = warmup.spawn(vec![job(1, "a"), job(2, "b"), job(3, "c")]);

        drop(updates);

        let summary = handle.await?;

        assert!(summary.cancelled);
        assert_eq!(summary.generated, 0);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn empty_job_list_finishes_immediately() -> TestResult {
        let generator = MockCoverGenerator::new();

        let (mut updates, handle) = CoverWarmup::new(Arc::new(generator)).spawn(Vec::new());

        assert_eq!(updates.recv().await, None);
        assert_eq!(handle.await?, WarmupSummary::default());

        Ok(())
    }
}
