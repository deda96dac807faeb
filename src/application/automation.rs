//! Fire-and-forget automation dispatch
//!
//! The engine enqueues product ids onto a bounded channel and returns. A
//! spawned worker drains the channel and calls the downstream trigger; its
//! failures are logged and dropped. A full queue drops the run.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::asset::{AssetType, STORE_WIDE_MEMBER};
use crate::domain::repositories::AutomationTrigger;
use crate::domain::services::IssueSet;
use crate::infrastructure::config::{AutomationConfig, MAX_AUTOMATION_ITEMS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationItem {
    pub product_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationRun {
    pub site_id: String,
    pub actor_id: String,
    pub items: Vec<AutomationItem>,
}

/// Products with an AI-fixable defect, deduplicated in issue order.
///
/// Reads the full evidence, so products past the preview cap still qualify.
pub fn automation_candidates(set: &IssueSet, limit: usize) -> Vec<AutomationItem> {
    let product_prefix = format!("{}:", AssetType::Products.as_str());
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for issue in set.issues.iter().filter(|i| i.ai_fixable && i.actionable_now()) {
        let reason = format!("issue_detected:{}", issue.type_key());
        for key in set.evidence.keys_for(issue) {
            let Some(product_id) = key.strip_prefix(&product_prefix) else {
                continue;
            };
            if product_id == STORE_WIDE_MEMBER || !seen.insert(product_id.to_string()) {
                continue;
            }
            items.push(AutomationItem {
                product_id: product_id.to_string(),
                reason: reason.clone(),
            });
            if items.len() >= limit {
                return items;
            }
        }
    }
    items
}

/// Sending half of the automation queue
#[derive(Debug, Clone)]
pub struct AutomationDispatcher {
    tx: mpsc::Sender<AutomationRun>,
    max_items: usize,
}

impl AutomationDispatcher {
    /// Start the worker on the current tokio runtime
    pub fn spawn(trigger: Arc<dyn AutomationTrigger>, config: &AutomationConfig) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let handle = tokio::spawn(run_worker(trigger, rx));
        let dispatcher = Self {
            tx,
            max_items: config.max_items_per_run.clamp(1, MAX_AUTOMATION_ITEMS),
        };
        (dispatcher, handle)
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Enqueue without waiting. Returns whether the run was accepted.
    pub fn enqueue(&self, mut run: AutomationRun) -> bool {
        if run.items.is_empty() {
            return false;
        }
        run.items.truncate(self.max_items);
        let count = run.items.len();
        let site_id = run.site_id.clone();

        match self.tx.try_send(run) {
            Ok(()) => {
                debug!(site_id = %site_id, count, "📤 Automation run enqueued");
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(site_id = %site_id, count, "⚠️ Automation queue full, dropping run");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(site_id = %site_id, count, "⚠️ Automation worker stopped, dropping run");
                false
            }
        }
    }
}

async fn run_worker(trigger: Arc<dyn AutomationTrigger>, mut rx: mpsc::Receiver<AutomationRun>) {
    while let Some(run) = rx.recv().await {
        let mut failed = 0usize;
        for item in &run.items {
            if let Err(e) = trigger.trigger(&item.product_id, &run.actor_id, &item.reason).await {
                failed += 1;
                warn!(
                    site_id = %run.site_id,
                    product_id = %item.product_id,
                    error = %e,
                    "⚠️ Automation trigger failed"
                );
            }
        }
        info!(site_id = %run.site_id, total = run.items.len(), failed, "🤖 Automation run processed");
    }
    debug!("Automation worker stopped");
}
