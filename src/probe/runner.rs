use tracing::{debug, info};

use super::classifier::StatusClassifier;
use crate::logging;
use crate::models::{ReportDataset, ReportRow, Site};

/// Probes a roster sequentially and assembles the report dataset.
///
/// Produces exactly one row per roster entry, in roster order. The classifier
/// never fails, so a down site cannot cut the run short.
#[derive(Debug, Clone)]
pub struct SiteProbeRunner {
    classifier: StatusClassifier,
}

impl SiteProbeRunner {
    pub fn new(classifier: StatusClassifier) -> Self {
        Self { classifier }
    }

    pub async fn run(&self, roster: &[Site]) -> ReportDataset {
        debug!(sites = roster.len(), "Probing roster");

        let mut rows = Vec::with_capacity(roster.len());
        for site in roster {
            let outcome = self.classifier.classify(&site.url).await;
            let row = ReportRow::new(site.clone(), outcome);
            logging::log_probe_result(&row);
            rows.push(row);
        }

        let dataset = ReportDataset::new(rows);
        info!(
            sites = dataset.len(),
            up = dataset.up_count(),
            down = dataset.down_count(),
            "Roster probed"
        );
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DownReason, StatusOutcome};
    use crate::probe::{HttpProbe, ProbeObservation, TransportFailure};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct MapProbe {
        by_url: HashMap<String, ProbeObservation>,
    }

    #[async_trait]
    impl HttpProbe for MapProbe {
        async fn fetch(&self, url: &str) -> ProbeObservation {
            self.by_url
                .get(url)
                .cloned()
                .unwrap_or_else(|| ProbeObservation::Failure(TransportFailure::new("unmapped")))
        }

        fn name(&self) -> &'static str {
            "map"
        }
    }

    #[tokio::test]
    async fn test_single_site_up() {
        let probe = MapProbe {
            by_url: HashMap::from([(
                "https://scpl.biz/".to_string(),
                ProbeObservation::Response { status: 200 },
            )]),
        };
        let runner = SiteProbeRunner::new(StatusClassifier::new(Arc::new(probe)));

        let dataset = runner.run(&[Site::new("SCPL", "https://scpl.biz/")]).await;

        assert_eq!(dataset.len(), 1);
        let row = &dataset.rows()[0];
        assert_eq!(row.site.name, "SCPL");
        assert_eq!(row.outcome, StatusOutcome::Up);
        assert_eq!(row.rendered_status_text, "Up");
    }

    #[tokio::test]
    async fn test_down_site_does_not_stop_the_roster() {
        let probe = MapProbe {
            by_url: HashMap::from([
                (
                    "https://a.test/".to_string(),
                    ProbeObservation::Failure(TransportFailure::new("refused").connection_refused()),
                ),
                (
                    "https://c.test/".to_string(),
                    ProbeObservation::Response { status: 200 },
                ),
            ]),
        };
        let runner = SiteProbeRunner::new(StatusClassifier::new(Arc::new(probe)));
        let roster = vec![
            Site::new("a", "https://a.test/"),
            Site::new("b", "https://b.test/"),
            Site::new("c", "https://c.test/"),
        ];

        let dataset = runner.run(&roster).await;

        let outcomes: Vec<StatusOutcome> = dataset.rows().iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                StatusOutcome::Down(DownReason::ConnectionRefused),
                StatusOutcome::Down(DownReason::UnknownError),
                StatusOutcome::Up,
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_roster_yields_empty_dataset() {
        let probe = MapProbe {
            by_url: HashMap::new(),
        };
        let runner = SiteProbeRunner::new(StatusClassifier::new(Arc::new(probe)));
        assert!(runner.run(&[]).await.is_empty());
    }
}
