pub mod config_json;
pub mod csv_export;
pub mod motion_file;
pub mod project;
