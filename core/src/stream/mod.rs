pub mod cancel;
pub mod io;
pub mod parallelism;
pub mod pipe;
pub mod pipeline;
pub mod reorder;
pub mod worker;

pub use cancel::CancellationToken;
pub use parallelism::ParallelismProfile;
pub use pipe::PipeReader;
pub use pipeline::{run_decrypt_pipeline, run_encrypt_pipeline};
pub use reorder::{ReorderError, ReorderWindow};
