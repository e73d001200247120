pub mod event_writer;
pub mod script_reader;
