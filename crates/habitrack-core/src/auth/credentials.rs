use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "habitrack";

/// OS keychain storage for the identity service session credential,
/// keyed by project id so several backends can coexist.
pub struct CredentialStore;

impl CredentialStore {
    /// Store the session credential in the OS keychain
    pub fn store(project_id: &str, credential: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, project_id)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(credential)
            .context("Failed to store session in keychain")?;
        Ok(())
    }

    /// Retrieve the stored session credential, if there is one
    pub fn load(project_id: &str) -> Result<Option<String>> {
        let entry = Entry::new(SERVICE_NAME, project_id)
            .context("Failed to create keyring entry")?;
        match entry.get_password() {
            Ok(credential) => Ok(Some(credential)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve session from keychain"),
        }
    }

    /// Delete the stored session credential. Deleting a missing entry is not an error.
    pub fn delete(project_id: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, project_id)
            .context("Failed to create keyring entry")?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete session from keychain"),
        }
    }
}
