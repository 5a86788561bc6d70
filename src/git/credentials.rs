//! SSH credentials and certificate policy handed to remote fetches

use git2::{CertificateCheckStatus, Cred, CredentialType, RemoteCallbacks};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Username used for every SSH key credential
pub const SSH_USERNAME: &str = "git";

/// Public key file name inside the credentials directory
pub const PUBLIC_KEY_FILE: &str = "id_rsa.pub";

/// Private key file name inside the credentials directory
pub const PRIVATE_KEY_FILE: &str = "id_rsa";

/// Supplies SSH key material and the certificate policy for a fetch
///
/// The key pair is always `<directory>/id_rsa{,.pub}` with an empty
/// passphrase. Key files are not checked here; libgit2 reports a missing or
/// unreadable key when the transport tries to authenticate with it.
#[derive(Debug, Clone)]
pub struct SshCredentials {
    directory: PathBuf,
    trust_all_certificates: bool,
}

impl SshCredentials {
    /// Create credentials rooted at `directory`, trusting all certificates
    #[must_use]
    #[inline]
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            trust_all_certificates: true,
        }
    }

    /// Set whether remote certificates are accepted without validation
    #[must_use]
    #[inline]
    pub const fn trust_all_certificates(mut self, trust: bool) -> Self {
        self.trust_all_certificates = trust;
        self
    }

    #[must_use]
    #[inline]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the public key. An empty directory yields a bare file name.
    #[must_use]
    #[inline]
    pub fn public_key_path(&self) -> PathBuf {
        self.directory.join(PUBLIC_KEY_FILE)
    }

    /// Path of the private key. An empty directory yields a bare file name.
    #[must_use]
    #[inline]
    pub fn private_key_path(&self) -> PathBuf {
        self.directory.join(PRIVATE_KEY_FILE)
    }

    /// Build the credential for a remote
    ///
    /// The URL, the username embedded in it and the credential types the
    /// remote allows are all ignored: an SSH key credential for `git` is
    /// always returned.
    ///
    /// # Errors
    ///
    /// Returns an error if libgit2 was built without SSH support
    #[inline]
    pub fn credential(
        &self,
        url: &str,
        _username_from_url: Option<&str>,
        _allowed_types: CredentialType,
    ) -> Result<Cred, git2::Error> {
        debug!(
            "Using ssh key {} for {url}",
            self.private_key_path().display()
        );
        Cred::ssh_key(
            SSH_USERNAME,
            Some(self.public_key_path().as_path()),
            self.private_key_path().as_path(),
            None,
        )
    }

    /// Decide whether the certificate presented by `host` is accepted
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` matches the libgit2 callback signature
    #[inline]
    pub fn certificate_check(&self, host: &str) -> Result<CertificateCheckStatus, git2::Error> {
        if self.trust_all_certificates {
            debug!("Accepting certificate for {host} without validation");
            Ok(CertificateCheckStatus::CertificateOk)
        } else {
            Ok(CertificateCheckStatus::CertificatePassthrough)
        }
    }

    /// Wire credentials, certificate policy and transfer progress into
    /// libgit2 remote callbacks
    #[must_use]
    #[inline]
    pub fn remote_callbacks<'cb>(&'cb self, progress: &'cb ProgressBar) -> RemoteCallbacks<'cb> {
        let mut attempts = 0_usize;
        let mut callbacks = RemoteCallbacks::new();

        callbacks.credentials(move |url, username_from_url, allowed_types| {
            attempts += 1;
            if attempts > 1 {
                // libgit2 asks again after a rejected key; the same key would be rejected forever
                warn!("SSH key authentication for {url} was rejected");
                return Err(git2::Error::from_str(&format!(
                    "authentication with {} was rejected",
                    self.private_key_path().display()
                )));
            }
            self.credential(url, username_from_url, allowed_types)
        });

        callbacks.certificate_check(move |_cert, host| self.certificate_check(host));

        callbacks.transfer_progress(move |stats| {
            progress.set_length(u64::try_from(stats.total_objects()).unwrap_or(u64::MAX));
            progress.set_position(u64::try_from(stats.received_objects()).unwrap_or(u64::MAX));
            true
        });

        callbacks
    }
}
