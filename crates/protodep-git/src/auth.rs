//! Authentication strategies for reaching remote repositories

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use git2::{Cred, CredentialType, RemoteCallbacks};
use protodep_fs::NormalizedPath;

use crate::Result;

/// How to authenticate against a remote, chosen once per dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// HTTPS, optionally with basic auth. Without a username the git
    /// credential helper is consulted.
    Https {
        username: Option<String>,
        password: Option<String>,
    },

    /// SSH with an explicit private key.
    Ssh {
        identity_file: PathBuf,
        passphrase: Option<String>,
    },

    /// SSH through a running ssh-agent.
    SshAgent,
}

impl AuthMethod {
    /// HTTPS strategy; empty strings count as unset.
    pub fn https(username: &str, password: &str) -> Self {
        AuthMethod::Https {
            username: non_empty(username),
            password: non_empty(password),
        }
    }

    /// SSH strategy for `identity_file` under `home_dir/.ssh`.
    ///
    /// Without an identity file or passphrase the agent is used. A configured
    /// identity file that does not exist falls back to the agent with a warning.
    pub fn ssh(home_dir: &NormalizedPath, identity_file: &str, passphrase: &str) -> Result<Self> {
        if identity_file.is_empty() && passphrase.is_empty() {
            return Ok(AuthMethod::SshAgent);
        }

        let identity_path = home_dir.join(".ssh").join(identity_file).to_native();
        if is_available_ssh(&identity_path)? {
            Ok(AuthMethod::Ssh {
                identity_file: identity_path,
                passphrase: non_empty(passphrase),
            })
        } else {
            tracing::warn!(
                identity_file = %identity_path.display(),
                "The identity file path has been passed but is not available. \
                 Falling back to ssh-agent, the default authentication method."
            );
            Ok(AuthMethod::SshAgent)
        }
    }

    /// Remote URL for a repository identifier such as `github.com/org/repo`.
    pub fn repository_url(&self, repository: &str) -> String {
        match self {
            AuthMethod::Https { .. } => format!("https://{repository}.git"),
            AuthMethod::Ssh { .. } | AuthMethod::SshAgent => match repository.split_once('/') {
                Some((host, path)) => format!("git@{host}:{path}.git"),
                None => format!("ssh://git@{repository}.git"),
            },
        }
    }

    /// Callbacks supplying credentials to git2 transfers.
    ///
    /// libgit2 re-invokes the credentials callback after a rejected attempt;
    /// the second invocation fails so a bad credential cannot loop forever.
    pub fn remote_callbacks(&self) -> RemoteCallbacks<'_> {
        let mut callbacks = RemoteCallbacks::new();
        let mut attempted = false;

        callbacks.credentials(move |url, username_from_url, allowed| {
            if attempted {
                return Err(git2::Error::from_str("authentication rejected by remote"));
            }
            attempted = true;

            let user = username_from_url.unwrap_or("git");
            match self {
                AuthMethod::Https {
                    username: Some(username),
                    password,
                } if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) => {
                    Cred::userpass_plaintext(username, password.as_deref().unwrap_or(""))
                }
                AuthMethod::Https { .. } => {
                    let config = git2::Config::open_default()?;
                    Cred::credential_helper(&config, url, username_from_url)
                }
                AuthMethod::Ssh {
                    identity_file,
                    passphrase,
                } => Cred::ssh_key(user, None, identity_file, passphrase.as_deref()),
                AuthMethod::SshAgent => Cred::ssh_key_from_agent(user),
            }
        });

        callbacks
    }
}

/// Whether an identity file exists at `path`.
pub fn is_available_ssh(path: &Path) -> Result<bool> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(protodep_fs::Error::io(path, e).into()),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
