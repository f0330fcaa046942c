//! Control loop regression tests.
//!
//! Wires the health monitor and autoscaler the way the daemon does, against
//! a canned cluster, and checks what the HTTP surface reports.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tokio::sync::watch;
use tower::ServiceExt;

use kubepulse_api::{ApiState, build_router};
use kubepulse_autoscale::{AutoscaleEngine, ScriptedSampler};
use kubepulse_core::config::AutoscaleConfig;
use kubepulse_core::*;
use kubepulse_health::HealthMonitor;
use kubepulse_metrics::GaugeRegistry;

/// Four nodes (three ready) and ten pods (6 running, 2 failed, 2 pending).
struct CannedCluster {
    up: AtomicBool,
}

#[async_trait]
impl ClusterStatusSource for CannedCluster {
    async fn list_nodes(&self) -> Result<Vec<NodeStatus>, QueryError> {
        if !self.up.load(Ordering::SeqCst) {
            return Err(QueryError::Api {
                resource: Resource::Nodes,
                message: "connection refused".to_string(),
            });
        }
        let mut nodes: Vec<_> = (0..3)
            .map(|i| NodeStatus::new(format!("ready-{i}"), vec![NodeCondition::new("Ready", "True")]))
            .collect();
        nodes.push(NodeStatus::new(
            "cordoned",
            vec![NodeCondition::new("Ready", "False")],
        ));
        Ok(nodes)
    }

    async fn list_pods(&self) -> Result<Vec<PodStatus>, QueryError> {
        let mut pods = Vec::new();
        for (phase, n) in [
            (PodPhase::Running, 6),
            (PodPhase::Failed, 2),
            (PodPhase::Pending, 2),
        ] {
            for i in 0..n {
                pods.push(PodStatus::new("default", format!("{phase}-{i}"), phase));
            }
        }
        Ok(pods)
    }
}

struct Harness {
    router: axum::Router,
    cluster: Arc<CannedCluster>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<tokio::task::JoinHandle<()>>,
}

fn start(loads: Vec<f64>) -> Harness {
    let registry = Arc::new(GaugeRegistry::new());
    let sink: Arc<dyn MetricsSink> = registry.clone();
    let cluster = Arc::new(CannedCluster {
        up: AtomicBool::new(true),
    });

    let mut monitor = HealthMonitor::new(
        cluster.clone(),
        sink.clone(),
        Duration::from_millis(5),
        Duration::from_millis(40),
    );
    let health = monitor.handle();

    let autoscaler =
        Arc::new(AutoscaleEngine::from_config(&AutoscaleConfig::default(), sink).unwrap());
    let sampler: Arc<dyn LoadSampler> = Arc::new(ScriptedSampler::loads(loads));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let health_shutdown = shutdown_rx.clone();
    let autoscale_shutdown = shutdown_rx;

    let engine = autoscaler.clone();
    let tasks = vec![
        tokio::spawn(async move { monitor.run(health_shutdown).await }),
        tokio::spawn(async move {
            engine
                .run(sampler, Duration::from_millis(5), autoscale_shutdown)
                .await
        }),
    ];

    let router = build_router(ApiState {
        registry,
        health,
        autoscaler,
    });

    Harness {
        router,
        cluster,
        shutdown_tx,
        tasks,
    }
}

async fn get(router: &axum::Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn stop(harness: Harness) {
    harness.shutdown_tx.send(true).unwrap();
    for task in harness.tasks {
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("loop did not stop on shutdown")
            .unwrap();
    }
}

#[tokio::test]
async fn metrics_endpoint_reports_both_loops() {
    let harness = start(vec![90.0, 90.0, 50.0]);
    tokio::time::sleep(Duration::from_millis(80)).await;

    let (status, body) = get(&harness.router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("kubepulse_node_count 4\n"), "{body}");
    assert!(body.contains("kubepulse_node_ready_total 3\n"));
    assert!(body.contains("kubepulse_pod_count 10\n"));
    assert!(body.contains("kubepulse_pod_running_total 6\n"));
    assert!(body.contains("kubepulse_pod_failed_total 2\n"));
    assert!(body.contains("kubepulse_cpu_utilization_percent 50.00\n"));
    // 3 → 4 → 5, then the load settles inside the band.
    assert!(body.contains("kubepulse_desired_replicas_total 5\n"));

    stop(harness).await;
}

#[tokio::test]
async fn autoscaler_holds_bounds_under_sustained_load() {
    let harness = start(vec![99.0]);
    tokio::time::sleep(Duration::from_millis(150)).await;

    let (_, body) = get(&harness.router, "/api/v1/autoscaler").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["data"]["current_replicas"], 10);

    stop(harness).await;
}

#[tokio::test]
async fn outage_keeps_last_snapshot_and_loops_alive() {
    let harness = start(vec![50.0]);
    tokio::time::sleep(Duration::from_millis(30)).await;

    harness.cluster.up.store(false, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(60)).await;

    let (status, body) = get(&harness.router, "/api/v1/cluster").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["data"]["stale"], true);
    assert_eq!(json["data"]["last"]["ready_node_count"], 3);
    assert!(json["data"]["consecutive_failures"].as_u64().unwrap() >= 1);

    // Gauges still carry the last good counts.
    let (_, metrics) = get(&harness.router, "/metrics").await;
    assert!(metrics.contains("kubepulse_node_ready_total 3\n"));

    for task in &harness.tasks {
        assert!(!task.is_finished());
    }
    stop(harness).await;
}

#[tokio::test]
async fn healthz_is_always_ok() {
    let harness = start(vec![50.0]);
    let (status, body) = get(&harness.router, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
    stop(harness).await;
}
