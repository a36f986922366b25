//! External retrieval tool integration
//!
//! ytsub-dl never downloads media itself. Channel metadata and item retrieval are
//! both delegated to `yt-dlp`, behind two traits so the orchestration can be
//! exercised without the real tool:
//!
//! - [`ChannelResolver`]: turns a user-supplied URL into a channel id and name
//! - [`Retriever`]: retrieves one item with a [`RetrievalRequest`]
//!
//! [`YtDlp`] implements both by spawning the `yt-dlp` binary.
//!
//! ## Exit codes
//!
//! | code | probe         | download                          |
//! |------|---------------|-----------------------------------|
//! | 0    | ok            | ok                                |
//! | 101  | ok            | ok                                |
//! | 1    | resolution error | item failure, batch continues  |
//! | other / signal | resolution error | tool error, run aborts |

mod cli;
mod parser;
mod request;
mod traits;

pub use cli::YtDlp;
pub use parser::{ExitStatus, check_download_status, parse_probe_output};
pub use request::RetrievalRequest;
pub use traits::{ChannelResolver, Retriever};
