//! Note command implementation.

use classics_canonical::Cid;
use classics_core::{LedgerNote, NoteKind, MAX_NOTE_SIZE};

pub fn run(kind: String, cid: String) -> Result<(), Box<dyn std::error::Error>> {
    let kind: NoteKind = kind.parse()?;
    let cid = Cid::parse(cid)?;
    let note = LedgerNote::new(kind, cid);

    let size = note.to_bytes().len();
    if size > MAX_NOTE_SIZE {
        return Err(format!("Note of {} bytes exceeds maximum {}", size, MAX_NOTE_SIZE).into());
    }
    println!("{}", note);
    Ok(())
}
