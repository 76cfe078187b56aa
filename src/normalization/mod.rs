pub mod archive_name;
