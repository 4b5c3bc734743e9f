pub mod file_reader;
pub mod keyword_qa;
pub mod summary_template;

pub use file_reader::{format_file_size, FileFilter, TextFileReader};
pub use keyword_qa::KeywordQaAdapter;
pub use summary_template::TemplateSummaryAdapter;
