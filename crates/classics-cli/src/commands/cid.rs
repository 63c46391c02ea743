//! Cid command implementation.

use crate::output;
use classics_canonical::generate_cid;
use serde_json::Value;
use std::io::{self, Read};

pub fn run(input: Option<String>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let json_str = if let Some(path) = input {
        std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read file {}: {}", path, e))?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let value: Value =
        serde_json::from_str(&json_str).map_err(|e| format!("Invalid JSON: {}", e))?;

    let result = generate_cid(&value).map_err(|e| format!("Canonicalization failed: {}", e))?;

    if json {
        println!("{}", output::cid_result_json(&result));
    } else {
        output::print_cid_result(&result);
    }
    Ok(())
}
