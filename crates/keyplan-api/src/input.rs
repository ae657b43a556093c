//! Loading modeling requests for the command-line tool.

use std::io::Read;
use std::path::Path;

use keyplan_core::{ModelingRequest, Result};

/// Read and parse a request document from a path, or from stdin when the
/// path is `-`.
pub fn read_request(input: &str) -> Result<ModelingRequest> {
    let raw = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(Path::new(input))?
    };
    parse_request(&raw)
}

/// Parse a request document.
pub fn parse_request(raw: &str) -> Result<ModelingRequest> {
    Ok(serde_json::from_str(raw)?)
}
