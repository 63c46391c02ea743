use chrono::{DateTime, Utc};
use classics_canonical::{Cid, CidResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Kind of vehicle history event.
///
/// Serialized as its snake_case name. Names outside the known set are kept
/// verbatim in [`EventType::Other`] so stored events round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    /// Certification inspection.
    Certification,
    /// Car show.
    CarShow,
    /// Classic car meet.
    ClassicMeet,
    /// Rally.
    Rally,
    /// Vintage racing.
    VintageRacing,
    /// Auction.
    Auction,
    /// Workshop visit.
    Workshop,
    /// Club competition.
    ClubCompetition,
    /// Road trip.
    RoadTrip,
    /// Festival.
    Festival,
    /// Race participation.
    RaceParticipation,
    /// Show participation.
    ShowParticipation,
    /// Maintenance.
    Maintenance,
    /// Ownership transfer.
    OwnershipTransfer,
    /// Restoration.
    Restoration,
    /// Modification.
    Modification,
    /// Any other type name.
    Other(String),
}

impl EventType {
    /// External name.
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Certification => "certification",
            EventType::CarShow => "car_show",
            EventType::ClassicMeet => "classic_meet",
            EventType::Rally => "rally",
            EventType::VintageRacing => "vintage_racing",
            EventType::Auction => "auction",
            EventType::Workshop => "workshop",
            EventType::ClubCompetition => "club_competition",
            EventType::RoadTrip => "road_trip",
            EventType::Festival => "festival",
            EventType::RaceParticipation => "race_participation",
            EventType::ShowParticipation => "show_participation",
            EventType::Maintenance => "maintenance",
            EventType::OwnershipTransfer => "ownership_transfer",
            EventType::Restoration => "restoration",
            EventType::Modification => "modification",
            EventType::Other(name) => name,
        }
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "certification" => EventType::Certification,
            "car_show" => EventType::CarShow,
            "classic_meet" => EventType::ClassicMeet,
            "rally" => EventType::Rally,
            "vintage_racing" => EventType::VintageRacing,
            "auction" => EventType::Auction,
            "workshop" => EventType::Workshop,
            "club_competition" => EventType::ClubCompetition,
            "road_trip" => EventType::RoadTrip,
            "festival" => EventType::Festival,
            "race_participation" => EventType::RaceParticipation,
            "show_participation" => EventType::ShowParticipation,
            "maintenance" => EventType::Maintenance,
            "ownership_transfer" => EventType::OwnershipTransfer,
            "restoration" => EventType::Restoration,
            "modification" => EventType::Modification,
            _ => EventType::Other(value),
        }
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        match value {
            EventType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vehicle history event as held by the domain store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier.
    pub id: Uuid,
    /// Vehicle the event belongs to.
    pub vehicle_id: Uuid,
    /// Organizing entity, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Uuid>,
    /// Event kind.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Short title.
    pub title: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the event took place.
    pub date: DateTime<Utc>,
    /// Where the event took place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Open-ended, type-specific data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    /// Ledger transaction that anchored this event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_tx_id: Option<String>,
    /// CID of the anchored record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<Cid>,
    /// Canonical text of the anchored record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid_source_json: Option<String>,
    /// Base64 canonical binary of the anchored record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid_source_cbor: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Anchoring outcome stored on an event, written once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRecord {
    /// Event the record belongs to.
    pub event_id: Uuid,
    /// CID carried in the ledger note.
    pub cid: Cid,
    /// Canonical text of the event record.
    pub canonical_text: String,
    /// Base64 canonical binary of the event record.
    pub canonical_binary_b64: String,
    /// Ledger transaction id.
    pub ledger_txn_id: String,
}

impl Event {
    /// Creates an unanchored event dated now.
    pub fn new(vehicle_id: Uuid, event_type: EventType, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            vehicle_id,
            entity_id: None,
            event_type,
            title: title.into(),
            description: None,
            date: now,
            location: None,
            metadata: None,
            blockchain_tx_id: None,
            cid: None,
            cid_source_json: None,
            cid_source_cbor: None,
            created_at: now,
        }
    }

    /// Stores the anchoring outcome on the event.
    pub fn record_anchor(&mut self, txn_id: impl Into<String>, snapshot: &CidResult) {
        self.blockchain_tx_id = Some(txn_id.into());
        self.cid = Some(snapshot.cid.clone());
        self.cid_source_json = Some(snapshot.canonical_text.clone());
        self.cid_source_cbor = Some(snapshot.canonical_binary_b64.clone());
    }

    /// Anchoring outcome; `None` if the event was never anchored.
    pub fn anchor_record(&self) -> Option<AnchorRecord> {
        Some(AnchorRecord {
            event_id: self.id,
            cid: self.cid.clone()?,
            canonical_text: self.cid_source_json.clone()?,
            canonical_binary_b64: self.cid_source_cbor.clone()?,
            ledger_txn_id: self.blockchain_tx_id.clone()?,
        })
    }
}
