pub mod environment;
pub mod logging;
pub mod paths;
pub mod text;

pub use environment::{API_URL_ENV, DATA_DIR_ENV, DEFAULT_API_URL, get_data_dir};
pub use paths::{format_path_with_tilde, validate_file_size};
pub use text::{html_to_text, plain_text, strip_ansi_codes};
