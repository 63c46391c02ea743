use chrono::{DateTime, Utc};
use classics_canonical::{Cid, CidResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full vehicle entity as held by the domain store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Vehicle identifier.
    pub id: Uuid,
    /// Registered owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    /// Chassis number (VIN).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chassis_number: Option<String>,
    /// License plate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    /// Engine number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_number: Option<String>,
    /// Transmission number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission_number: Option<String>,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Model year.
    pub year: i32,
    /// Paint color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Body type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    /// Drive type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_type: Option<String>,
    /// Gearbox type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gear_type: Option<String>,
    /// Suspension type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspension_type: Option<String>,
    /// Ledger asset bound to this vehicle, set once at genesis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_asset_id: Option<u64>,
    /// CID of the latest anchored snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<Cid>,
    /// Canonical text of the latest anchored snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid_source_json: Option<String>,
    /// Base64 canonical binary of the latest anchored snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid_source_cbor: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Whether a vehicle has a ledger asset yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorState {
    /// No ledger asset yet.
    Unanchored,
    /// Bound to exactly one ledger asset.
    Anchored {
        /// Ledger asset id.
        asset_id: u64,
    },
}

impl Vehicle {
    /// Creates an unanchored vehicle with the required attributes.
    pub fn new(make: impl Into<String>, model: impl Into<String>, year: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id: None,
            chassis_number: None,
            license_plate: None,
            engine_number: None,
            transmission_number: None,
            make: make.into(),
            model: model.into(),
            year,
            color: None,
            body_type: None,
            drive_type: None,
            gear_type: None,
            suspension_type: None,
            blockchain_asset_id: None,
            cid: None,
            cid_source_json: None,
            cid_source_cbor: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current anchor state.
    pub fn anchor_state(&self) -> AnchorState {
        match self.blockchain_asset_id {
            Some(asset_id) => AnchorState::Anchored { asset_id },
            None => AnchorState::Unanchored,
        }
    }

    /// Stores the canonical forms of a freshly anchored snapshot.
    pub fn record_snapshot(&mut self, snapshot: &CidResult) {
        self.cid = Some(snapshot.cid.clone());
        self.cid_source_json = Some(snapshot.canonical_text.clone());
        self.cid_source_cbor = Some(snapshot.canonical_binary_b64.clone());
    }

    /// Stored snapshot, if all three canonical forms are present.
    pub fn snapshot(&self) -> Option<CidResult> {
        Some(CidResult {
            cid: self.cid.clone()?,
            canonical_text: self.cid_source_json.clone()?,
            canonical_binary_b64: self.cid_source_cbor.clone()?,
        })
    }
}
