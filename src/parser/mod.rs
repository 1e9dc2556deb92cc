pub mod reverse;
pub mod zone_file;
