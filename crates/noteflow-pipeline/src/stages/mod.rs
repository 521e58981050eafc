//! Model-call stages.
//!
//! Every stage follows the same contract: build an instruction, declare the
//! expected JSON output shape, invoke the generation backend once, and parse
//! the response into the stage's typed struct. A remote error or a shape
//! mismatch aborts the pipeline with a stage-tagged error; there are no
//! retries and no partial results. The diagram stage is the one exception,
//! degrading to an empty list instead of failing.

pub mod classifier;
pub mod diagram;
pub mod formatter;
pub mod layout;
pub mod segmenter;

pub use classifier::classify;
pub use diagram::generate_diagrams;
pub use formatter::format_notes;
pub use layout::design_layout;
pub use segmenter::segment;
