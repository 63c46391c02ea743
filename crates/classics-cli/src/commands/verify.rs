//! Verify command implementation.

use classics_canonical::{dag_cbor, dag_json, Cid, CidResult};

pub fn run(
    cid: String,
    binary: String,
    text: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let cid = Cid::parse(cid)?;

    let canonical_text = match text {
        Some(text) => text,
        None => {
            // No stored text: render it from the binary.
            let stored = CidResult {
                cid: cid.clone(),
                canonical_text: String::new(),
                canonical_binary_b64: binary.clone(),
            };
            let node = dag_cbor::decode(&stored.canonical_binary()?)?;
            dag_json::encode(&node)?
        }
    };

    let stored = CidResult {
        cid,
        canonical_text,
        canonical_binary_b64: binary,
    };
    stored
        .verify()
        .map_err(|e| format!("Verification failed: {}", e))?;

    println!("OK {}", stored.cid);
    println!("{}", stored.canonical_text);
    Ok(())
}
