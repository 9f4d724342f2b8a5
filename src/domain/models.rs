use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Typed view of the per-platform download descriptor. The same key path
/// may terminate at a URL string or descend into another mapping, so the
/// tree is a tagged union rather than raw JSON. `BTreeMap` keeps iteration
/// in lexicographic key order, which makes the resolver's fallback scan
/// deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadNode {
    Leaf(String),
    Branch(BTreeMap<String, DownloadNode>),
}

impl DownloadNode {
    /// Builds a tree from raw JSON, dropping values that are neither
    /// strings nor objects. Absent and empty subtrees are valid and mean
    /// "no artifact".
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(DownloadNode::Leaf(s.clone())),
            Value::Object(map) => {
                let children = map
                    .iter()
                    .filter_map(|(k, v)| DownloadNode::from_value(v).map(|node| (k.clone(), node)))
                    .collect();
                Some(DownloadNode::Branch(children))
            }
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&DownloadNode> {
        match self {
            DownloadNode::Branch(children) => children.get(key),
            DownloadNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            DownloadNode::Leaf(s) => Some(s),
            DownloadNode::Branch(_) => None,
        }
    }
}

/// Terminal state of one application inside one emitter run. Structural
/// failures travel as errors and are recorded as FAILED by the
/// orchestrator.
#[derive(Debug)]
pub enum AppOutcome {
    Written { files: Vec<PathBuf> },
    Skipped { reason: String },
}

#[derive(Debug, Serialize)]
pub struct TargetSummary {
    pub target: String,
    pub platform: String,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub success: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub targets: Vec<TargetSummary>,
}

impl RunSummary {
    /// A target succeeds when it wrote at least one application; the run
    /// succeeds when every selected target did.
    pub fn all_succeeded(&self) -> bool {
        self.targets.iter().all(|t| t.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_keeps_strings_and_maps_only() {
        let tree = DownloadNode::from_value(&json!({
            "apk": "https://x/app.apk",
            "nested": {"x86_64": "https://x/a", "count": 3},
            "bogus": 17
        }))
        .unwrap();
        assert_eq!(tree.get("apk").and_then(DownloadNode::as_leaf), Some("https://x/app.apk"));
        let nested = tree.get("nested").unwrap();
        assert_eq!(nested.get("x86_64").and_then(DownloadNode::as_leaf), Some("https://x/a"));
        assert!(nested.get("count").is_none());
        assert!(tree.get("bogus").is_none());
    }

    #[test]
    fn from_value_rejects_scalars() {
        assert!(DownloadNode::from_value(&json!(42)).is_none());
        assert!(DownloadNode::from_value(&json!(null)).is_none());
    }

    #[test]
    fn summary_requires_every_target_to_succeed() {
        let mut summary = RunSummary::default();
        summary.targets.push(TargetSummary {
            target: "altstore".into(),
            platform: "iOS".into(),
            written: 2,
            skipped: 1,
            failed: 0,
            success: true,
        });
        assert!(summary.all_succeeded());
        summary.targets.push(TargetSummary {
            target: "winget".into(),
            platform: "Windows".into(),
            written: 0,
            skipped: 0,
            failed: 3,
            success: false,
        });
        assert!(!summary.all_succeeded());
    }
}
