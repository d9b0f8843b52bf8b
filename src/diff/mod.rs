//! JSON snapshot differ.
//!
//! Turns a stream of JSON documents (from stdin, or the `object` of each event
//! of an HTTP watch endpoint) into a sequence of unified-style diffs, each
//! snapshot against the one before it.
//!
//! ```bash
//! kubectl get -w -o json svc hostnames | linkwatch json-diff
//! linkwatch watch-diff http://localhost:8001/api/v1/watch/namespaces/default/services/kubernetes
//! ```

mod error;
mod lines;
mod snapshot;
mod stream;

pub use error::{DiffError, DiffResult};
pub use lines::{LineChange, diff_lines, render};
pub use snapshot::{SnapshotDiffer, pretty};
pub use stream::{StreamDecoder, WatchEvent, diff_reader, follow_watch};
