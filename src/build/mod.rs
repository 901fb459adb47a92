mod core;
mod discover;
mod feedback;
mod runner;
mod stream;
pub mod utils;

pub use self::core::{OUTPUT_FLAG, build, compile_args, prepare_dist_dir};
pub use discover::{SourceFileSet, discover};
pub use feedback::FeedbackAnalyzer;
pub use runner::{Artifact, RunReport, locate_and_run, locate_artifact, run_artifact};
pub use stream::{
    CompilerSink, OutputSink, PassthroughSink, ProcessOutcome, RecordingSink, stream_child,
};
pub use utils::load_document;
