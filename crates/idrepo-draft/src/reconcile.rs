//! Reconciliation of canonical file metadata into draft entries.
//!
//! Entries are matched on their natural key (biometric file type or document
//! category). Matching entries whose storage reference changed are refreshed
//! in place, keeping their creation audit. Unmatched canonical entries are
//! appended. Draft entries with no canonical counterpart are left alone.

use crate::mapping;
use crate::types::*;
use std::collections::HashSet;

/// Who and when to stamp on refreshed entries
#[derive(Debug, Clone, Copy)]
pub struct Stamp<'a> {
    pub registration_id: &'a str,
    pub user: &'a str,
    pub now: u64,
}

/// A canonical row with a draft-side counterpart
pub trait DraftCounterpart {
    type Draft;

    fn natural_key(&self) -> &str;

    fn storage_ref(&self) -> &str;

    fn draft_key(draft: &Self::Draft) -> &str;

    fn draft_ref(draft: &Self::Draft) -> &str;

    /// Overwrite the draft's reference, display fields and hash
    fn refresh(&self, draft: &mut Self::Draft, stamp: &Stamp<'_>);

    fn to_draft(&self, registration_id: &str) -> Self::Draft;

    fn set_registration_id(draft: &mut Self::Draft, registration_id: &str);
}

/// Counts reported by [`reconcile`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub refreshed: usize,
    pub unchanged: usize,
    pub appended: usize,
}

/// Bring `drafts` in line with `canonical`
pub fn reconcile<C: DraftCounterpart>(
    canonical: &[C],
    drafts: &mut Vec<C::Draft>,
    stamp: &Stamp<'_>,
) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();
    let mut consumed = HashSet::new();

    for (index, source) in canonical.iter().enumerate() {
        if let Some(draft) = drafts
            .iter_mut()
            .find(|d| C::draft_key(d) == source.natural_key())
        {
            if C::draft_ref(draft) != source.storage_ref() {
                source.refresh(draft, stamp);
                summary.refreshed += 1;
            } else {
                summary.unchanged += 1;
            }
            consumed.insert(index);
        }
    }

    for (index, source) in canonical.iter().enumerate() {
        if consumed.contains(&index) {
            continue;
        }
        // Duplicate keys in the source collapse onto the entry appended first.
        match drafts
            .iter_mut()
            .find(|d| C::draft_key(d) == source.natural_key())
        {
            Some(draft) => source.refresh(draft, stamp),
            None => {
                drafts.push(source.to_draft(stamp.registration_id));
                summary.appended += 1;
            }
        }
    }

    for draft in drafts.iter_mut() {
        C::set_registration_id(draft, stamp.registration_id);
    }

    summary
}

impl DraftCounterpart for CanonicalBiometric {
    type Draft = BiometricDraftEntry;

    fn natural_key(&self) -> &str {
        &self.file_type
    }

    fn storage_ref(&self) -> &str {
        &self.file_ref
    }

    fn draft_key(draft: &BiometricDraftEntry) -> &str {
        &draft.file_type
    }

    fn draft_ref(draft: &BiometricDraftEntry) -> &str {
        &draft.file_ref
    }

    fn refresh(&self, draft: &mut BiometricDraftEntry, stamp: &Stamp<'_>) {
        draft.file_ref = self.file_ref.clone();
        draft.file_name = self.file_name.clone();
        draft.file_hash = self.file_hash.clone();
        draft.registration_id = stamp.registration_id.to_string();
        draft.audit.touch(stamp.user, stamp.now);
    }

    fn to_draft(&self, registration_id: &str) -> BiometricDraftEntry {
        mapping::biometric_to_draft(self, registration_id)
    }

    fn set_registration_id(draft: &mut BiometricDraftEntry, registration_id: &str) {
        draft.registration_id = registration_id.to_string();
    }
}

impl DraftCounterpart for CanonicalDocument {
    type Draft = DocumentDraftEntry;

    fn natural_key(&self) -> &str {
        &self.category_code
    }

    fn storage_ref(&self) -> &str {
        &self.doc_ref
    }

    fn draft_key(draft: &DocumentDraftEntry) -> &str {
        &draft.category_code
    }

    fn draft_ref(draft: &DocumentDraftEntry) -> &str {
        &draft.doc_ref
    }

    fn refresh(&self, draft: &mut DocumentDraftEntry, stamp: &Stamp<'_>) {
        draft.doc_ref = self.doc_ref.clone();
        draft.type_code = self.type_code.clone();
        draft.doc_name = self.doc_name.clone();
        draft.format_code = self.format_code.clone();
        draft.doc_hash = self.doc_hash.clone();
        draft.registration_id = stamp.registration_id.to_string();
        draft.audit.touch(stamp.user, stamp.now);
    }

    fn to_draft(&self, registration_id: &str) -> DocumentDraftEntry {
        mapping::document_to_draft(self, registration_id)
    }

    fn set_registration_id(draft: &mut DocumentDraftEntry, registration_id: &str) {
        draft.registration_id = registration_id.to_string();
    }
}
