pub mod payslip_writer;
pub mod record_reader;
pub mod rows;
