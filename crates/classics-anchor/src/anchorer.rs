//! Genesis and update transitions for vehicle assets.
//!
//! ```text
//! Unanchored --genesis--> Anchored{asset_id} --update--> Anchored{asset_id}
//! ```
//!
//! Callers must serialize anchoring per vehicle. Two concurrent anchors on
//! the same unanchored vehicle would each observe `Unanchored` and mint two
//! assets.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use classics_canonical::CidResult;
use classics_core::{
    AnchorState, Event, EventRecord, LedgerNote, NoteKind, Vehicle, VehicleRecord, MAX_NOTE_SIZE,
};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::AnchorConfig;
use crate::errors::{AnchorError, AnchorReceipt};
use crate::ledger::{AssetParams, LedgerClient};
use crate::repository::{EventRepository, RepositoryError, VehicleRepository};

/// Drives ledger writes for vehicles and events and persists the outcome.
///
/// Holds no state of its own; every result is written back through the
/// repositories.
pub struct Anchorer<L, V, E> {
    ledger: L,
    vehicles: V,
    events: E,
    config: AnchorConfig,
}

impl<L, V, E> Anchorer<L, V, E>
where
    L: LedgerClient,
    V: VehicleRepository,
    E: EventRepository,
{
    /// Creates an anchorer with default asset naming.
    pub fn new(ledger: L, vehicles: V, events: E) -> Self {
        Self::with_config(ledger, vehicles, events, AnchorConfig::default())
    }

    /// Creates an anchorer with explicit asset naming.
    pub fn with_config(ledger: L, vehicles: V, events: E, config: AnchorConfig) -> Self {
        Self {
            ledger,
            vehicles,
            events,
            config,
        }
    }

    /// Ledger backend.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mints the vehicle's asset and stores the genesis snapshot on it.
    ///
    /// On success `vehicle` carries the asset id and snapshot CID forms and
    /// has been persisted.
    pub fn vehicle_genesis(&self, vehicle: &mut Vehicle) -> Result<u64, AnchorError> {
        self.genesis(vehicle).map(|receipt| receipt.asset_id)
    }

    fn genesis(&self, vehicle: &mut Vehicle) -> Result<AnchorReceipt, AnchorError> {
        if let AnchorState::Anchored { asset_id } = vehicle.anchor_state() {
            return Err(AnchorError::AlreadyAnchored {
                vehicle_id: vehicle.id,
                asset_id,
            });
        }

        let snapshot = VehicleRecord::from(&*vehicle).cid()?;
        let note = note_payload(NoteKind::Genesis, &snapshot)?;
        let params = self.asset_params(vehicle.id, note);
        debug!(vehicle_id = %vehicle.id, asset_name = %params.asset_name, "creating vehicle asset");

        let (asset_id, txn_id) = self.ledger.create_asset(&params)?;
        info!(
            vehicle_id = %vehicle.id,
            asset_id,
            txn_id = %txn_id,
            cid = %snapshot.cid,
            "created vehicle asset"
        );

        vehicle.blockchain_asset_id = Some(asset_id);
        vehicle.record_snapshot(&snapshot);
        let receipt = AnchorReceipt {
            kind: NoteKind::Genesis,
            asset_id,
            txn_id,
            cid: snapshot.cid,
        };
        self.vehicles
            .update_vehicle(vehicle)
            .map_err(|source| repository_failure(receipt.clone(), source))?;
        Ok(receipt)
    }

    /// Anchors `event` against the vehicle's asset, minting it first if needed.
    ///
    /// The event is checked with [`ensure_anchorable`] and its CID computed
    /// before any ledger call, so a foreign, already anchored or
    /// uncanonicalizable event never triggers a genesis.
    pub fn anchor_event(
        &self,
        vehicle: &mut Vehicle,
        event: &mut Event,
    ) -> Result<AnchorReceipt, AnchorError> {
        ensure_anchorable(vehicle, event)?;
        let snapshot = EventRecord::from(&*event).cid()?;
        let note = note_payload(NoteKind::NewEvent, &snapshot)?;

        let asset_id = match vehicle.anchor_state() {
            AnchorState::Anchored { asset_id } => asset_id,
            AnchorState::Unanchored => {
                info!(vehicle_id = %vehicle.id, "vehicle unanchored, performing genesis first");
                self.vehicle_genesis(vehicle)?
            }
        };

        let txn_id = self.ledger.self_transfer_asset(asset_id, &note)?;
        info!(
            vehicle_id = %vehicle.id,
            event_id = %event.id,
            asset_id,
            txn_id = %txn_id,
            cid = %snapshot.cid,
            "anchored event"
        );

        event.record_anchor(txn_id.clone(), &snapshot);
        let receipt = AnchorReceipt {
            kind: NoteKind::NewEvent,
            asset_id,
            txn_id,
            cid: snapshot.cid,
        };
        self.events
            .update_event(event)
            .map_err(|source| repository_failure(receipt.clone(), source))?;
        Ok(receipt)
    }

    /// Anchors a fresh snapshot of an anchored vehicle. An unanchored vehicle
    /// gets its genesis instead.
    pub fn anchor_vehicle_update(&self, vehicle: &mut Vehicle) -> Result<AnchorReceipt, AnchorError> {
        let asset_id = match vehicle.anchor_state() {
            AnchorState::Anchored { asset_id } => asset_id,
            AnchorState::Unanchored => return self.genesis(vehicle),
        };

        let snapshot = VehicleRecord::from(&*vehicle).cid()?;
        let note = note_payload(NoteKind::VehicleUpdate, &snapshot)?;
        let txn_id = self.ledger.self_transfer_asset(asset_id, &note)?;
        info!(
            vehicle_id = %vehicle.id,
            asset_id,
            txn_id = %txn_id,
            cid = %snapshot.cid,
            "anchored vehicle update"
        );

        vehicle.record_snapshot(&snapshot);
        let receipt = AnchorReceipt {
            kind: NoteKind::VehicleUpdate,
            asset_id,
            txn_id,
            cid: snapshot.cid,
        };
        self.vehicles
            .update_vehicle(vehicle)
            .map_err(|source| repository_failure(receipt.clone(), source))?;
        Ok(receipt)
    }

    fn asset_params(&self, vehicle_id: Uuid, note: Vec<u8>) -> AssetParams {
        AssetParams {
            asset_name: asset_name(&self.config.asset_name_prefix, vehicle_id),
            unit_name: self.config.unit_name.clone(),
            url: format!(
                "{}/{}",
                self.config.metadata_base_url.trim_end_matches('/'),
                vehicle_id
            ),
            total: 1,
            decimals: 0,
            default_frozen: false,
            manager: None,
            reserve: None,
            freeze: None,
            clawback: None,
            note,
        }
    }
}

/// Checks that `event` belongs to `vehicle` and has not been anchored yet.
pub fn ensure_anchorable(vehicle: &Vehicle, event: &Event) -> Result<(), AnchorError> {
    if event.vehicle_id != vehicle.id {
        return Err(AnchorError::VehicleMismatch {
            event_id: event.id,
            event_vehicle_id: event.vehicle_id,
            vehicle_id: vehicle.id,
        });
    }
    if let Some(txn_id) = &event.blockchain_tx_id {
        return Err(AnchorError::EventAlreadyAnchored {
            event_id: event.id,
            txn_id: txn_id.clone(),
        });
    }
    Ok(())
}

/// Asset name for a vehicle: prefix plus URL-safe base64 of the UUID bytes.
pub fn asset_name(prefix: &str, vehicle_id: Uuid) -> String {
    format!("{}{}", prefix, URL_SAFE_NO_PAD.encode(vehicle_id.as_bytes()))
}

fn note_payload(kind: NoteKind, snapshot: &CidResult) -> Result<Vec<u8>, AnchorError> {
    let note = LedgerNote::new(kind, snapshot.cid.clone()).to_bytes();
    if note.len() > MAX_NOTE_SIZE {
        return Err(AnchorError::NoteTooLarge {
            size: note.len(),
            max: MAX_NOTE_SIZE,
        });
    }
    Ok(note)
}

fn repository_failure(receipt: AnchorReceipt, source: RepositoryError) -> AnchorError {
    error!(
        kind = %receipt.kind,
        asset_id = receipt.asset_id,
        txn_id = %receipt.txn_id,
        cid = %receipt.cid,
        error = %source,
        "ledger write confirmed but repository update failed; reconcile manually"
    );
    AnchorError::RepositoryUpdate { receipt, source }
}
