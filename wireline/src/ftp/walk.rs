//! Recursive walk of a remote directory tree

use super::FtpStream;
use crate::status::Status;
use crate::types::{FtpError, FtpResult};

impl FtpStream {
    /// Collect the path of every file below `path`.
    ///
    /// Entries are told apart by trying to enter them: those accepting `CWD` are directories and
    /// get walked, everything else is a file. The working directory is restored afterwards,
    /// also when the walk fails; a failed restore is only reported for an otherwise
    /// successful walk.
    pub fn subpaths_at_path<S: AsRef<str>>(&mut self, path: S) -> FtpResult<Vec<String>> {
        debug!("Walking {}", path.as_ref());
        let origin = self.pwd()?;
        let walk = self.walk_from(path.as_ref());
        let restore = self.cwd(origin.as_str());
        if let Err(err) = &restore {
            warn!("Cannot restore working directory {origin}: {err}");
        }
        let leaves = walk?;
        restore?;
        debug!("Found {} files below {}", leaves.len(), path.as_ref());
        Ok(leaves)
    }

    fn walk_from(&mut self, path: &str) -> FtpResult<Vec<String>> {
        self.cwd(path)?;
        let base = self.pwd()?;
        let mut leaves = Vec::new();
        self.collect_subpaths(&base, &mut leaves)?;
        Ok(leaves)
    }

    fn collect_subpaths(&mut self, dir: &str, leaves: &mut Vec<String>) -> FtpResult<()> {
        for entry in self.entries_of(dir)? {
            // some servers answer NLST with full paths
            let name = entry
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default();
            if name.is_empty() || name == "." || name == ".." {
                continue;
            }
            let child = join_path(dir, name);
            if self.do_cwd(child.as_str())?.is_positive_completion() {
                trace!("{child} is a directory");
                self.collect_subpaths(&child, leaves)?;
            } else {
                leaves.push(child);
            }
        }
        Ok(())
    }

    /// `NLST` of a directory already entered with `CWD`. Servers such as ProFTPD refuse to list
    /// an empty directory with `450` or `550`; that means no entries here.
    fn entries_of(&mut self, dir: &str) -> FtpResult<Vec<String>> {
        match self.nlst(Some(dir)) {
            Err(FtpError::UnexpectedResponse { reply, .. })
                if reply.is(Status::RequestFileActionIgnored)
                    || reply.is(Status::FileUnavailable) =>
            {
                debug!("No entries in {dir}: {reply}");
                Ok(Vec::new())
            }
            result => result,
        }
    }
}

fn join_path(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
