//! HTTP surface: the scrape endpoint and a landing page.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use torque_collector::TorqueCollector;

/// Content type of the Prometheus text exposition.
const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

const LANDING_PAGE: &str = "<html>
<head><title>Torque Exporter</title></head>
<body>
<h1>Torque Exporter</h1>
<p><a href=\"/metrics\">Metrics</a></p>
</body>
</html>
";

pub fn router(collector: Arc<TorqueCollector>) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/metrics", get(metrics))
        .with_state(collector)
}

async fn landing() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// Every scrape runs one collection cycle and serves that cycle's samples.
/// A failed cycle still answers with the reset registry.
async fn metrics(State(collector): State<Arc<TorqueCollector>>) -> Response {
    match collector.collect_and_encode().await {
        Ok((_, body)) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            tracing::error!("Encoding metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use torque_collector::CollectorConfig;
    use torque_remote::{CommandOutput, Connector, RemoteError, RemoteSession};

    const QSTAT_U: &str = "
headnode.cluster:
                                                                                  Req'd       Req'd       Elap
Job ID                  Username    Queue    Jobname          SessID  NDS   TSK   Memory      Time    S   Time
----------------------- ----------- -------- ---------------- ------ ----- ------ --------- --------- - ---------
4807.headnode           alice       batch    align_s1          20931     1      8       4gb  24:00:00 R  01:12:40
";

    struct Host {
        reachable: bool,
    }

    struct Session;

    #[async_trait]
    impl Connector for Host {
        async fn connect(&self) -> Result<Box<dyn RemoteSession>, RemoteError> {
            if !self.reachable {
                return Err(RemoteError::Connect {
                    host: "headnode:22".to_string(),
                    error: "connection refused".to_string(),
                });
            }
            Ok(Box::new(Session))
        }
    }

    #[async_trait]
    impl RemoteSession for Session {
        async fn run(&mut self, command: &str) -> Result<CommandOutput, RemoteError> {
            let stdout = if command.starts_with("qstat -u") {
                QSTAT_U
            } else {
                ""
            };
            Ok(CommandOutput {
                stdout: stdout.to_string(),
                ..Default::default()
            })
        }

        async fn close(self: Box<Self>) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    fn collector(reachable: bool) -> Arc<TorqueCollector> {
        let config = CollectorConfig::new(chrono_tz::Europe::Madrid, "alice");
        Arc::new(TorqueCollector::new(Box::new(Host { reachable }), config).unwrap())
    }

    async fn body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_metrics_runs_a_cycle() {
        let response = metrics(State(collector(true))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_FORMAT);

        let text = body(response).await;
        assert!(text.contains("te_up 1"));
        let sample = text
            .lines()
            .find(|line| line.starts_with("te_qstat_u{"))
            .unwrap();
        assert!(sample.contains(r#"jobid="4807.headnode""#));
    }

    #[tokio::test]
    async fn test_unreachable_host_still_answers() {
        let response = metrics(State(collector(false))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let text = body(response).await;
        assert!(text.contains("te_up 0"));
        assert!(!text.lines().any(|line| line.starts_with("te_qstat_u{")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_scrapes_each_see_their_samples() {
        let collector = collector(true);
        let handles: Vec<_> = (0..64)
            .map(|_| tokio::spawn(metrics(State(collector.clone()))))
            .collect();

        for handle in handles {
            let text = body(handle.await.unwrap()).await;
            assert!(text.contains("te_up 1"));
            let jobs = text.lines().filter(|l| l.starts_with("te_qstat_u{")).count();
            assert_eq!(jobs, 1);
        }
    }

    #[tokio::test]
    async fn test_landing_page_links_metrics() {
        let Html(page) = landing().await;
        assert!(page.contains("href=\"/metrics\""));
    }
}
