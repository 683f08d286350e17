use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure to produce ownership for a single file. The run continues with
/// the next file.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("blame {}: {reason}", .path.display())]
    Blame { path: PathBuf, reason: String },

    #[error("blame {}: timed out after {:?}", .path.display(), .timeout)]
    Timeout { path: PathBuf, timeout: Duration },
}
