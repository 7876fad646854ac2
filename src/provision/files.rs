//! Loading of files injected into new instances.

use std::collections::BTreeMap;

use camino::Utf8PathBuf;

use super::ProvisionError;
use crate::backend::InjectedFile;
use crate::local_fs::read_ambient;

/// Reads every local source named in `files` into memory, in remote path
/// order.
///
/// # Errors
///
/// Returns [`ProvisionError::Io`] naming the first local path that cannot be
/// read.
pub fn load_injected_files<E>(
    files: &BTreeMap<String, Utf8PathBuf>,
) -> Result<Vec<InjectedFile>, ProvisionError<E>>
where
    E: std::error::Error + 'static,
{
    files
        .iter()
        .map(|(remote, local)| -> Result<InjectedFile, ProvisionError<E>> {
            let contents = read_ambient(local).map_err(|message| ProvisionError::Io {
                path: local.clone(),
                message,
            })?;
            Ok(InjectedFile {
                path: remote.clone(),
                contents,
            })
        })
        .collect()
}
