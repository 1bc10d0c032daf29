//! Retrieval tool seam: the trait the installer drives and its `git` implementation

mod cli;
mod progress;
mod traits;

pub use cli::GitCli;
pub use progress::{parse_progress_line, ProgressLines};
pub use traits::RetrievalTool;
