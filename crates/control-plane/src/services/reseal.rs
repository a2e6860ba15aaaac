// Sealing of credentials left in plaintext by older revisions
//
// This is the only caller that opts into StoredCredential::classify; every
// other read path opens credentials strictly.

use modelgate_core::Result;
use modelgate_storage::{EncryptionService, StorageBackend, StoredCredential, ENVELOPE_VERSION};
use uuid::Uuid;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResealReport {
    pub scanned: u64,
    /// Rows holding a valid envelope under the current key
    pub sealed: u64,
    pub empty: u64,
    /// Legacy plaintext rows sealed (or that would be, in a dry run)
    pub resealed: u64,
    /// Rows whose credential is a broken envelope or was sealed under another key
    pub unreadable: Vec<Uuid>,
}

pub async fn reseal_legacy_credentials(
    db: &StorageBackend,
    encryption: &EncryptionService,
    dry_run: bool,
) -> Result<ResealReport> {
    let mut report = ResealReport::default();
    let envelope_prefix = format!("{}:", ENVELOPE_VERSION);

    for row in db.list_model_configs().await? {
        report.scanned += 1;

        match StoredCredential::classify(&row.api_key) {
            None => report.empty += 1,
            Some(StoredCredential::Envelope(envelope)) => match encryption.open_envelope(&envelope) {
                Ok(_) => report.sealed += 1,
                Err(e) => {
                    tracing::warn!(id = %row.id, name = %row.name, error = %e, "Credential envelope does not open under the current key");
                    report.unreadable.push(row.id);
                }
            },
            // Looks like an envelope but failed to parse: corrupted, not legacy
            Some(StoredCredential::RawLegacyCredential(raw)) if raw.starts_with(&envelope_prefix) => {
                tracing::warn!(id = %row.id, name = %row.name, "Credential is a malformed envelope");
                report.unreadable.push(row.id);
            }
            Some(StoredCredential::RawLegacyCredential(raw)) => {
                if dry_run {
                    tracing::info!(id = %row.id, name = %row.name, "Would seal legacy plaintext credential");
                } else {
                    let sealed = encryption.seal_credential(&raw)?;
                    db.update_model_config_credential(row.id, &sealed).await?;
                    tracing::info!(id = %row.id, name = %row.name, "Sealed legacy plaintext credential");
                }
                report.resealed += 1;
            }
        }
    }

    Ok(report)
}
