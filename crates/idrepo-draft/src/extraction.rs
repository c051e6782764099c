//! Derived biometric file naming and the no-op extractor.

use crate::errors::Result;
use crate::traits::BiometricExtractor;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::debug;

/// Name of the file derived from `file_ref` for one extraction format.
///
/// `"{ref up to the first '.'}.{format key without suffix}.{format value}"`
pub fn derived_file_name(file_ref: &str, format_key: &str, format_value: &str, suffix: &str) -> String {
    let base = file_ref.split_once('.').map_or(file_ref, |(base, _)| base);
    let modality = if suffix.is_empty() {
        format_key.to_string()
    } else {
        format_key.replace(suffix, "")
    };
    format!("{}.{}.{}", base, modality, format_value)
}

/// Extractor for deployments without template extraction
pub struct NoopExtractor;

#[async_trait]
impl BiometricExtractor for NoopExtractor {
    async fn derive(
        &self,
        _object_hash: &str,
        file_ref: &str,
        formats: &BTreeMap<String, String>,
        _raw: &[u8],
    ) -> Result<()> {
        debug!("Skipping extraction of {} for {} formats", file_ref, formats.len());
        Ok(())
    }
}
