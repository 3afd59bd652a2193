use crate::api::client::DEFAULT_BASE_URL;

/// Execute version command
pub fn execute() {
    println!("citizens {}", env!("CARGO_PKG_VERSION"));
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("Default API: {}", DEFAULT_BASE_URL);
    println!("License: {}", env!("CARGO_PKG_LICENSE"));
}
