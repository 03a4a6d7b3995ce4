//! Report generation: the console text report and its JSON form.

pub mod generator;
pub mod table;

pub use generator::{
    generate_completion_banner, generate_json_report, generate_section_heading,
    generate_text_report, ReportOptions,
};
