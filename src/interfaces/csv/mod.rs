pub mod operation_reader;
pub mod project_writer;
