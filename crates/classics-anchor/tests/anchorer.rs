use std::cell::{Cell, RefCell};

use classics_anchor::{
    AnchorConfig, AnchorError, Anchorer, AssetParams, EventRepository, LedgerClient, LedgerError,
    RepositoryError, VehicleRepository,
};
use classics_core::{
    AnchorState, Event, EventRecord, EventType, LedgerNote, NoteKind, Vehicle, VehicleRecord,
};
use serde_json::json;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    CreateAsset(AssetParams),
    SelfTransfer { asset_id: u64, note: String },
}

#[derive(Default)]
struct RecordingLedger {
    calls: RefCell<Vec<Call>>,
    next_asset: Cell<u64>,
    fail_with: RefCell<Option<LedgerError>>,
}

impl RecordingLedger {
    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn failing(err: LedgerError) -> Self {
        let ledger = Self::default();
        *ledger.fail_with.borrow_mut() = Some(err);
        ledger
    }
}

impl LedgerClient for RecordingLedger {
    fn create_asset(&self, params: &AssetParams) -> Result<(u64, String), LedgerError> {
        self.calls.borrow_mut().push(Call::CreateAsset(params.clone()));
        if let Some(err) = self.fail_with.borrow().clone() {
            return Err(err);
        }
        let asset_id = 1000 + self.next_asset.get();
        self.next_asset.set(self.next_asset.get() + 1);
        Ok((asset_id, format!("CREATE{}", asset_id)))
    }

    fn self_transfer_asset(&self, asset_id: u64, note: &[u8]) -> Result<String, LedgerError> {
        self.calls.borrow_mut().push(Call::SelfTransfer {
            asset_id,
            note: String::from_utf8(note.to_vec()).unwrap(),
        });
        if let Some(err) = self.fail_with.borrow().clone() {
            return Err(err);
        }
        Ok(format!("XFER{}", self.calls.borrow().len()))
    }
}

#[derive(Default)]
struct MemoryRepo {
    vehicles: RefCell<Vec<Vehicle>>,
    events: RefCell<Vec<Event>>,
    broken: bool,
}

impl VehicleRepository for MemoryRepo {
    fn update_vehicle(&self, vehicle: &Vehicle) -> Result<(), RepositoryError> {
        if self.broken {
            return Err(RepositoryError::Other("database unavailable".into()));
        }
        self.vehicles.borrow_mut().push(vehicle.clone());
        Ok(())
    }
}

impl EventRepository for MemoryRepo {
    fn update_event(&self, event: &Event) -> Result<(), RepositoryError> {
        if self.broken {
            return Err(RepositoryError::Other("database unavailable".into()));
        }
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}

fn civic() -> Vehicle {
    let mut vehicle = Vehicle::new("Honda", "Civic", 2010);
    vehicle.chassis_number = Some("VIN123456".into());
    vehicle
}

#[test]
fn genesis_then_event_end_to_end() {
    let ledger = RecordingLedger::default();
    let repo = MemoryRepo::default();
    let anchorer = Anchorer::new(&ledger, &repo, &repo);

    let mut vehicle = civic();
    let asset_id = anchorer.vehicle_genesis(&mut vehicle).unwrap();
    assert_eq!(vehicle.anchor_state(), AnchorState::Anchored { asset_id });

    let vehicle_cid = vehicle.cid.clone().unwrap();
    assert_eq!(
        vehicle_cid,
        VehicleRecord::from(&vehicle).cid().unwrap().cid
    );
    vehicle.snapshot().unwrap().verify().unwrap();

    let mut event = Event::new(vehicle.id, EventType::Maintenance, "Oil change");
    let receipt = anchorer.anchor_event(&mut vehicle, &mut event).unwrap();
    let event_cid = event.cid.clone().unwrap();
    assert_ne!(event_cid, vehicle_cid);
    assert_eq!(receipt.asset_id, asset_id);
    assert_eq!(receipt.cid, event_cid);
    assert_eq!(event.blockchain_tx_id.as_deref(), Some(receipt.txn_id.as_str()));

    let calls = ledger.calls();
    assert_eq!(calls.len(), 2);
    match &calls[0] {
        Call::CreateAsset(params) => {
            assert_eq!(
                String::from_utf8(params.note.clone()).unwrap(),
                format!("type=genesis|cid={}", vehicle_cid)
            );
            assert_eq!(params.total, 1);
            assert_eq!(params.unit_name, "CCV");
            assert!(params.asset_name.starts_with("CC_"));
            assert_eq!(
                params.url,
                format!("https://vehicle.classicschain.com/{}", vehicle.id)
            );
        }
        other => panic!("unexpected call {:?}", other),
    }
    assert_eq!(
        calls[1],
        Call::SelfTransfer {
            asset_id,
            note: format!("type=new_event|cid={}", event_cid),
        }
    );

    assert_eq!(repo.vehicles.borrow().len(), 1);
    let stored = repo.events.borrow()[0].anchor_record().unwrap();
    assert_eq!(stored.cid, event_cid);
    assert_eq!(stored.ledger_txn_id, receipt.txn_id);
}

#[test]
fn anchored_vehicle_only_self_transfers() {
    let ledger = RecordingLedger::default();
    let repo = MemoryRepo::default();
    let anchorer = Anchorer::new(&ledger, &repo, &repo);

    let mut vehicle = civic();
    vehicle.blockchain_asset_id = Some(77);
    let mut event = Event::new(vehicle.id, EventType::CarShow, "Concours");
    anchorer.anchor_event(&mut vehicle, &mut event).unwrap();

    let calls = ledger.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0], Call::SelfTransfer { asset_id: 77, .. }));
    assert!(repo.vehicles.borrow().is_empty());
}

#[test]
fn event_on_unanchored_vehicle_performs_genesis_first() {
    let ledger = RecordingLedger::default();
    let repo = MemoryRepo::default();
    let anchorer = Anchorer::new(&ledger, &repo, &repo);

    let mut vehicle = civic();
    let mut event = Event::new(vehicle.id, EventType::Restoration, "Body-off restoration");
    let receipt = anchorer.anchor_event(&mut vehicle, &mut event).unwrap();

    let calls = ledger.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], Call::CreateAsset(_)));
    assert_eq!(Some(receipt.asset_id), vehicle.blockchain_asset_id);
    assert_eq!(repo.vehicles.borrow().len(), 1);
    assert_eq!(repo.events.borrow().len(), 1);
}

#[test]
fn notes_parse_back_to_their_kind() {
    let ledger = RecordingLedger::default();
    let repo = MemoryRepo::default();
    let anchorer = Anchorer::new(&ledger, &repo, &repo);

    let mut vehicle = civic();
    let mut event = Event::new(vehicle.id, EventType::Rally, "Targa Florio");
    anchorer.anchor_event(&mut vehicle, &mut event).unwrap();

    let kinds: Vec<NoteKind> = ledger
        .calls()
        .into_iter()
        .map(|call| {
            let note = match call {
                Call::CreateAsset(params) => String::from_utf8(params.note).unwrap(),
                Call::SelfTransfer { note, .. } => note,
            };
            note.parse::<LedgerNote>().unwrap().kind
        })
        .collect();
    assert_eq!(kinds, vec![NoteKind::Genesis, NoteKind::NewEvent]);
}

#[test]
fn unsupported_metadata_issues_no_ledger_calls() {
    let ledger = RecordingLedger::default();
    let repo = MemoryRepo::default();
    let anchorer = Anchorer::new(&ledger, &repo, &repo);

    let mut vehicle = civic();
    let mut event = Event::new(vehicle.id, EventType::Maintenance, "Odometer reading");
    event.metadata = json!({"odometer": u64::MAX}).as_object().cloned();

    let err = anchorer.anchor_event(&mut vehicle, &mut event).unwrap_err();
    assert!(matches!(err, AnchorError::Canonicalization(_)));
    assert!(ledger.calls().is_empty());
    assert_eq!(vehicle.anchor_state(), AnchorState::Unanchored);
    assert!(repo.vehicles.borrow().is_empty());
    assert!(event.cid.is_none());
}

#[test]
fn second_genesis_is_refused() {
    let ledger = RecordingLedger::default();
    let repo = MemoryRepo::default();
    let anchorer = Anchorer::new(&ledger, &repo, &repo);

    let mut vehicle = civic();
    anchorer.vehicle_genesis(&mut vehicle).unwrap();
    let err = anchorer.vehicle_genesis(&mut vehicle).unwrap_err();
    assert!(matches!(err, AnchorError::AlreadyAnchored { .. }));
    assert_eq!(ledger.calls().len(), 1);
}

#[test]
fn confirmation_timeout_is_surfaced() {
    let ledger = RecordingLedger::failing(LedgerError::ConfirmationTimeout {
        txn_id: "PENDING1".into(),
        rounds: 4,
    });
    let repo = MemoryRepo::default();
    let anchorer = Anchorer::new(&ledger, &repo, &repo);

    let mut vehicle = civic();
    let err = anchorer.vehicle_genesis(&mut vehicle).unwrap_err();
    match &err {
        AnchorError::LedgerConfirmationTimeout { txn_id, rounds } => {
            assert_eq!(txn_id, "PENDING1");
            assert_eq!(*rounds, 4);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(err.needs_reconciliation());
    assert_eq!(vehicle.anchor_state(), AnchorState::Unanchored);
    assert!(repo.vehicles.borrow().is_empty());
}

#[test]
fn unknown_outcome_needs_reconciliation() {
    let ledger = RecordingLedger::failing(LedgerError::Unconfirmed {
        txn_id: "LOST1".into(),
        reason: "connection reset".into(),
    });
    let repo = MemoryRepo::default();
    let anchorer = Anchorer::new(&ledger, &repo, &repo);

    let mut vehicle = civic();
    vehicle.blockchain_asset_id = Some(5);
    let mut event = Event::new(vehicle.id, EventType::Auction, "Spring sale");
    let err = anchorer.anchor_event(&mut vehicle, &mut event).unwrap_err();
    assert!(matches!(err, AnchorError::LedgerOutcomeUnknown { ref txn_id, .. } if txn_id == "LOST1"));
    assert!(err.needs_reconciliation());
    assert!(event.blockchain_tx_id.is_none());
    assert!(repo.events.borrow().is_empty());
}

#[test]
fn anchored_event_is_not_anchored_twice() {
    let ledger = RecordingLedger::default();
    let repo = MemoryRepo::default();
    let anchorer = Anchorer::new(&ledger, &repo, &repo);

    let mut vehicle = civic();
    vehicle.blockchain_asset_id = Some(9);
    let mut event = Event::new(vehicle.id, EventType::CarShow, "Concours");
    let first = anchorer.anchor_event(&mut vehicle, &mut event).unwrap();

    let err = anchorer.anchor_event(&mut vehicle, &mut event).unwrap_err();
    match &err {
        AnchorError::EventAlreadyAnchored { event_id, txn_id } => {
            assert_eq!(*event_id, event.id);
            assert_eq!(*txn_id, first.txn_id);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(!err.needs_reconciliation());
    assert_eq!(ledger.calls().len(), 1);
    assert_eq!(event.blockchain_tx_id.as_deref(), Some(first.txn_id.as_str()));
}

#[test]
fn foreign_event_is_refused_before_genesis() {
    let ledger = RecordingLedger::default();
    let repo = MemoryRepo::default();
    let anchorer = Anchorer::new(&ledger, &repo, &repo);

    let mut vehicle = civic();
    let other = civic();
    let mut event = Event::new(other.id, EventType::Maintenance, "Oil change");
    let err = anchorer.anchor_event(&mut vehicle, &mut event).unwrap_err();
    match &err {
        AnchorError::VehicleMismatch {
            event_vehicle_id,
            vehicle_id,
            ..
        } => {
            assert_eq!(*event_vehicle_id, other.id);
            assert_eq!(*vehicle_id, vehicle.id);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(err.to_string().contains("belongs to vehicle"));
    assert!(ledger.calls().is_empty());
    assert_eq!(vehicle.anchor_state(), AnchorState::Unanchored);
    assert!(repo.vehicles.borrow().is_empty());
}

#[test]
fn submission_failure_leaves_no_state() {
    let ledger = RecordingLedger::failing(LedgerError::Submission("overspend".into()));
    let repo = MemoryRepo::default();
    let anchorer = Anchorer::new(&ledger, &repo, &repo);

    let mut vehicle = civic();
    vehicle.blockchain_asset_id = Some(5);
    let mut event = Event::new(vehicle.id, EventType::Auction, "Spring sale");
    let err = anchorer.anchor_event(&mut vehicle, &mut event).unwrap_err();
    assert!(matches!(err, AnchorError::LedgerSubmission(ref m) if m == "overspend"));
    assert!(!err.needs_reconciliation());
    assert!(event.blockchain_tx_id.is_none());
    assert!(repo.events.borrow().is_empty());
}

#[test]
fn repository_failure_carries_receipt() {
    let ledger = RecordingLedger::default();
    let repo = MemoryRepo {
        broken: true,
        ..MemoryRepo::default()
    };
    let anchorer = Anchorer::new(&ledger, &repo, &repo);

    let mut vehicle = civic();
    vehicle.blockchain_asset_id = Some(9);
    let mut event = Event::new(vehicle.id, EventType::Workshop, "Carburettor rebuild");
    let err = anchorer.anchor_event(&mut vehicle, &mut event).unwrap_err();
    match err {
        AnchorError::RepositoryUpdate { receipt, source } => {
            assert_eq!(receipt.kind, NoteKind::NewEvent);
            assert_eq!(receipt.asset_id, 9);
            assert_eq!(receipt.cid, EventRecord::from(&event).cid().unwrap().cid);
            assert!(source.to_string().contains("database unavailable"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(ledger.calls().len(), 1);
}

#[test]
fn vehicle_update_uses_update_note() {
    let ledger = RecordingLedger::default();
    let repo = MemoryRepo::default();
    let anchorer = Anchorer::new(&ledger, &repo, &repo);

    let mut vehicle = civic();
    anchorer.vehicle_genesis(&mut vehicle).unwrap();
    let genesis_cid = vehicle.cid.clone().unwrap();

    vehicle.color = Some("British racing green".into());
    let receipt = anchorer.anchor_vehicle_update(&mut vehicle).unwrap();
    assert_eq!(receipt.kind, NoteKind::VehicleUpdate);
    assert_ne!(receipt.cid, genesis_cid);
    assert_eq!(vehicle.cid.as_ref(), Some(&receipt.cid));
    assert_eq!(
        ledger.calls()[1],
        Call::SelfTransfer {
            asset_id: receipt.asset_id,
            note: format!("type=vehicle_update|cid={}", receipt.cid),
        }
    );
}

#[test]
fn vehicle_update_on_unanchored_vehicle_is_genesis() {
    let ledger = RecordingLedger::default();
    let repo = MemoryRepo::default();
    let anchorer = Anchorer::new(&ledger, &repo, &repo);

    let mut vehicle = civic();
    let receipt = anchorer.anchor_vehicle_update(&mut vehicle).unwrap();
    assert_eq!(receipt.kind, NoteKind::Genesis);
    assert_eq!(ledger.calls().len(), 1);
    assert!(matches!(ledger.calls()[0], Call::CreateAsset(_)));
}

#[test]
fn asset_naming_follows_config() {
    let ledger = RecordingLedger::default();
    let repo = MemoryRepo::default();
    let config = AnchorConfig {
        asset_name_prefix: "TEST_".into(),
        unit_name: "TST".into(),
        metadata_base_url: "https://example.test/v/".into(),
    };
    let anchorer = Anchorer::with_config(&ledger, &repo, &repo, config);

    let mut vehicle = civic();
    anchorer.vehicle_genesis(&mut vehicle).unwrap();
    match &ledger.calls()[0] {
        Call::CreateAsset(params) => {
            assert!(params.asset_name.starts_with("TEST_"));
            assert_eq!(params.unit_name, "TST");
            assert_eq!(params.url, format!("https://example.test/v/{}", vehicle.id));
        }
        other => panic!("unexpected call {:?}", other),
    }
}
