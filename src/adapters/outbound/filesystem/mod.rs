/// Filesystem adapters: knowledge base loading, input files and output writing
mod input_reader;
mod knowledge_base_loader;
mod result_writer;

pub use input_reader::FileSystemReader;
pub use knowledge_base_loader::KnowledgeBaseLoader;
pub use result_writer::{
    manifest_file_name, present_json, write_manifests, write_static_partial, FileSystemWriter,
    StdoutPresenter, STATIC_RESULTS_FILE,
};
