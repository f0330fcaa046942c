//! Conversion from Kubernetes API objects to kubepulse status types.

use k8s_openapi::api::core::v1::{Node, Pod};

use kubepulse_core::{NodeCondition, NodeStatus, PodPhase, PodStatus};

/// Extract name and conditions from a `Node`.
pub fn node_status(node: &Node) -> NodeStatus {
    let conditions = node
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .map(|conds| {
            conds
                .iter()
                .map(|c| NodeCondition::new(c.type_.clone(), c.status.clone()))
                .collect()
        })
        .unwrap_or_default();

    NodeStatus::new(node.metadata.name.clone().unwrap_or_default(), conditions)
}

/// Extract namespace, name and phase from a `Pod`. A pod with no reported
/// phase is `Unknown`.
pub fn pod_status(pod: &Pod) -> PodStatus {
    let phase = pod
        .status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .map(PodPhase::parse)
        .unwrap_or(PodPhase::Unknown);

    PodStatus::new(
        pod.metadata.namespace.clone().unwrap_or_default(),
        pod.metadata.name.clone().unwrap_or_default(),
        phase,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{
        NodeCondition as K8sNodeCondition, NodeStatus as K8sNodeStatus, PodStatus as K8sPodStatus,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn node(name: &str, conditions: Option<Vec<(&str, &str)>>) -> Node {
        Node {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            status: Some(K8sNodeStatus {
                conditions: conditions.map(|cs| {
                    cs.into_iter()
                        .map(|(t, s)| K8sNodeCondition {
                            type_: t.to_string(),
                            status: s.to_string(),
                            ..Default::default()
                        })
                        .collect()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn pod(ns: &str, name: &str, phase: Option<&str>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(ns.to_string()),
                ..Default::default()
            },
            status: Some(K8sPodStatus {
                phase: phase.map(str::to_string),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn ready_node_converts() {
        let status = node_status(&node(
            "worker-1",
            Some(vec![("MemoryPressure", "False"), ("Ready", "True")]),
        ));
        assert_eq!(status.name, "worker-1");
        assert_eq!(status.conditions.len(), 2);
        assert!(status.is_ready());
    }

    #[test]
    fn not_ready_node_converts() {
        let status = node_status(&node("worker-2", Some(vec![("Ready", "Unknown")])));
        assert!(!status.is_ready());
    }

    #[test]
    fn node_without_status_has_no_conditions() {
        let mut n = node("worker-3", None);
        assert!(node_status(&n).conditions.is_empty());

        n.status = None;
        let status = node_status(&n);
        assert!(status.conditions.is_empty());
        assert!(!status.is_ready());
    }

    #[test]
    fn pod_phases_convert() {
        assert_eq!(pod_status(&pod("default", "a", Some("Running"))).phase, PodPhase::Running);
        assert_eq!(pod_status(&pod("default", "b", Some("Failed"))).phase, PodPhase::Failed);
        assert_eq!(pod_status(&pod("default", "c", Some("Pending"))).phase, PodPhase::Pending);
        assert_eq!(pod_status(&pod("default", "d", None)).phase, PodPhase::Unknown);
    }

    #[test]
    fn pod_keeps_namespace_and_name() {
        let status = pod_status(&pod("kube-system", "coredns-abc", Some("Running")));
        assert_eq!(status.namespace, "kube-system");
        assert_eq!(status.name, "coredns-abc");
    }
}
