//! Output formatting utilities.

use classics_anchor::AnchorReceipt;
use classics_canonical::CidResult;
use serde_json::json;

/// Prints a CID result as labelled lines.
pub fn print_cid_result(result: &CidResult) {
    println!("{:<8} {}", "cid", result.cid);
    println!("{:<8} {}", "text", result.canonical_text);
    println!("{:<8} {}", "binary", result.canonical_binary_b64);
}

/// Formats a CID result as a JSON object.
pub fn cid_result_json(result: &CidResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
}

/// Prints an anchoring receipt as labelled lines.
pub fn print_receipt(receipt: &AnchorReceipt) {
    println!("{:<8} {}", "kind", receipt.kind);
    println!("{:<8} {}", "asset", receipt.asset_id);
    println!("{:<8} {}", "txn", receipt.txn_id);
    println!("{:<8} {}", "cid", receipt.cid);
}

/// Formats an anchoring receipt as a JSON object.
pub fn receipt_json(receipt: &AnchorReceipt) -> String {
    let value = json!({
        "kind": receipt.kind.as_str(),
        "asset_id": receipt.asset_id,
        "txn_id": receipt.txn_id,
        "cid": receipt.cid.as_str(),
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}
