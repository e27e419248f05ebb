//! Cross-batch uniqueness filter.

use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use crate::types::lead::{normalize_key, Lead};

/// Identities already accepted during one run.
///
/// Email is the primary identity; handle is used only when a lead has no
/// email. Leads with neither but a non-empty name always pass.
#[derive(Debug, Default)]
pub struct SeenSet {
    emails: HashSet<String>,
    handles: HashSet<String>,
    ids: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Accept,
    Reject,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct emails accepted so far.
    pub fn email_count(&self) -> usize {
        self.emails.len()
    }

    /// Number of distinct handles accepted so far.
    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    fn verdict(&self, email: Option<&str>, handle: Option<&str>, lead: &Lead) -> Verdict {
        if let Some(email) = email {
            return if self.emails.contains(email) {
                Verdict::Reject
            } else {
                Verdict::Accept
            };
        }
        if let Some(handle) = handle {
            return if self.handles.contains(handle) {
                Verdict::Reject
            } else {
                Verdict::Accept
            };
        }
        match lead.name.as_deref() {
            Some(name) if !name.trim().is_empty() => Verdict::Accept,
            _ => Verdict::Reject,
        }
    }

    /// Admit a single lead, recording its identities if accepted.
    ///
    /// Accepted leads whose id is empty or was already used in this run get
    /// a fresh one so ids stay unique in the result list.
    pub fn admit(&mut self, mut lead: Lead) -> Option<Lead> {
        let email = lead.email.as_deref().map(normalize_key).filter(|e| !e.is_empty());
        let handle = lead.handle.as_deref().map(normalize_key).filter(|h| !h.is_empty());

        if self.verdict(email.as_deref(), handle.as_deref(), &lead) == Verdict::Reject {
            return None;
        }

        if let Some(email) = email {
            self.emails.insert(email);
        }
        if let Some(handle) = handle {
            self.handles.insert(handle);
        }

        if lead.id.trim().is_empty() || self.ids.contains(&lead.id) {
            let fresh = Uuid::new_v4().to_string();
            debug!(old_id = %lead.id, new_id = %fresh, "Re-keyed lead with duplicate id");
            lead.id = fresh;
        }
        self.ids.insert(lead.id.clone());

        Some(lead)
    }

    /// Filter a batch, preserving the source's order.
    pub fn filter_batch(&mut self, batch: Vec<Lead>) -> Vec<Lead> {
        batch.into_iter().filter_map(|lead| self.admit(lead)).collect()
    }
}
