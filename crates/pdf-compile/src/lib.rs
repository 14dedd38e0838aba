pub mod capture;
pub mod compile;
pub mod constants;
pub mod interchange;
pub mod layout;
mod project;
pub mod render;
mod settings;
pub mod store;
mod types;

pub use capture::EncodedImage;
pub use compile::{
    CompilePhase, CompileProgress, CompiledDocument, compile, compile_project, compile_to_dir,
    output_filename, sanitize_name,
};
pub use interchange::{ExportEnvelope, export_filename, export_project, import_project};
pub use layout::{Geometry, LayoutPlan, PageKind, TocEntry};
pub use project::*;
pub use settings::*;
pub use store::{FileStore, MemoryStore, ProjectMap, ProjectStore, Session};
pub use types::*;
