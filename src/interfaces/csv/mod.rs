pub mod operation_reader;
pub mod view_writer;
