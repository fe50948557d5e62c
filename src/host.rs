//! Host identity lookup (username, uid, group name, gid).

use std::time::Duration;

use crate::errors::LaunchError;
use crate::util::{reject_newlines, ExecRequest, ExecService};

/// Identity of the invoking host user, as reported by `id`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HostInfo {
    pub username: String,
    pub uid: u32,
    pub groupname: String,
    pub gid: u32,
}

impl HostInfo {
    /// Validate raw `id` output. Every field must be present, ids must be numeric, and no
    /// field may span lines (they are embedded verbatim into the build recipe).
    pub fn from_raw(
        username: &str,
        uid: &str,
        groupname: &str,
        gid: &str,
    ) -> Result<HostInfo, LaunchError> {
        let fields = [
            ("username", username),
            ("uid", uid),
            ("group name", groupname),
            ("gid", gid),
        ];
        for (what, value) in fields {
            let value = value.trim();
            if value.is_empty() {
                return Err(LaunchError::IdentityProbeFailed(format!("empty {what}")));
            }
            reject_newlines(value, what).map_err(LaunchError::IdentityProbeFailed)?;
        }
        let parse_id = |what: &str, v: &str| {
            v.trim().parse::<u32>().map_err(|_| {
                LaunchError::IdentityProbeFailed(format!("{what} '{}' is not numeric", v.trim()))
            })
        };
        Ok(HostInfo {
            username: username.trim().to_string(),
            uid: parse_id("uid", uid)?,
            groupname: groupname.trim().to_string(),
            gid: parse_id("gid", gid)?,
        })
    }
}

/// Source of the host identity; invoked fresh on every launch.
pub trait IdentityProbe {
    fn fetch(&self) -> Result<HostInfo, LaunchError>;
}

/// Runs `id -un`, `id -u`, `id -gn` and `id -g`.
#[derive(Debug, Clone)]
pub struct IdCommandProbe {
    exec: ExecService,
}

impl IdCommandProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            exec: ExecService::with_allowed_env(timeout, ["PATH", "LANG", "LC_ALL"]),
        }
    }

    fn query(&self, flag: &str) -> Result<String, LaunchError> {
        let out = self
            .exec
            .run(ExecRequest::new("id").arg(flag).capture_output(true))
            .map_err(|e| LaunchError::IdentityProbeFailed(format!("id {flag}: {e:#}")))?;
        if !out.status.success() {
            return Err(LaunchError::IdentityProbeFailed(format!(
                "id {flag} exited with {}: {}",
                out.status,
                out.stderr.trim()
            )));
        }
        Ok(out.stdout.trim().to_string())
    }
}

impl IdentityProbe for IdCommandProbe {
    fn fetch(&self) -> Result<HostInfo, LaunchError> {
        let username = self.query("-un")?;
        let uid = self.query("-u")?;
        let groupname = self.query("-gn")?;
        let gid = self.query("-g")?;
        HostInfo::from_raw(&username, &uid, &groupname, &gid)
    }
}
