// ── VM credential extraction ──
//
// Skytap stores VM credentials as free text. The inventory expects them
// as `<user><delimiter><password>`; anything that doesn't fit yields no
// credentials rather than a guess.

use skytap_api::Vm;

use crate::config::EnvironmentSettings;

/// SSH login parsed from a VM credential entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshCredentials {
    pub user: String,
    pub pass: String,
}

impl SshCredentials {
    /// Split `text` once on the first `delimiter`, trimming both halves.
    ///
    /// The password is everything after the first delimiter, so it may
    /// itself contain the delimiter. Returns `None` when the delimiter is
    /// absent.
    pub fn parse(text: &str, delimiter: &str) -> Option<Self> {
        let (user, pass) = text.split_once(delimiter)?;
        Some(Self {
            user: user.trim().to_owned(),
            pass: pass.trim().to_owned(),
        })
    }
}

/// Pick and parse the credentials to attach to every host of `vm`.
///
/// Nothing is returned unless `use_api_credentials` is on. A lone entry is
/// used as-is when no `skytap_vm_username` is configured; otherwise the
/// first entry whose user token matches that username wins.
pub fn extract_credentials(vm: &Vm, settings: &EnvironmentSettings) -> Option<SshCredentials> {
    if !settings.use_api_credentials || vm.credentials.is_empty() {
        return None;
    }

    let delimiter = settings.api_credential_delimiter.as_str();
    let username = settings.skytap_vm_username.as_deref();

    let selected = match (vm.credentials.as_slice(), username) {
        ([only], None) => only,
        (_, Some(wanted)) => vm
            .credentials
            .iter()
            .find(|cred| user_token(&cred.text, delimiter) == wanted)?,
        (_, None) => return None,
    };

    SshCredentials::parse(&selected.text, delimiter)
}

fn user_token<'a>(text: &'a str, delimiter: &str) -> &'a str {
    text.split_once(delimiter).map_or(text, |(user, _)| user).trim()
}
