//! Live event protocol
//!
//! Server → client push events, one JSON object per WebSocket text frame,
//! discriminated by a `type` field.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorCode;

pub mod payload;
pub use payload::*;

/// Decoded live event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiveEvent {
    TruckUpdate(TruckUpdate),
    TrucksUpdate {
        #[serde(default)]
        trucks: Vec<TruckMetrics>,
    },
    SlaughterhouseUpdate(SlaughterhouseUpdate),
    FarmUpdate(FarmUpdate),
    InitFarms(InitFarms),
    TruckArrived(TruckArrived),
    DailySummary(DailySummary),
    EndOfSim {
        #[serde(default)]
        msg: String,
    },
    SimulationComplete {
        #[serde(default)]
        msg: String,
    },
    Error {
        #[serde(default)]
        msg: String,
    },
    /// Any `type` this build does not know
    #[serde(other)]
    Unknown,
}

/// Why a frame could not be turned into a [`LiveEvent`]
#[derive(Debug, Error)]
pub enum EventDecodeError {
    #[error("payload is not JSON: {0}")]
    NotJson(#[source] serde_json::Error),

    #[error("payload has no string `type` field")]
    MissingType,

    #[error("invalid {event_type} payload: {source}")]
    InvalidFields {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EventDecodeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingType => ErrorCode::EventMissingType,
            Self::NotJson(_) | Self::InvalidFields { .. } => ErrorCode::EventMalformed,
        }
    }
}

impl LiveEvent {
    /// Decode one text frame
    pub fn decode(text: &str) -> Result<Self, EventDecodeError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(EventDecodeError::NotJson)?;

        let event_type = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(EventDecodeError::MissingType)?
            .to_string();

        serde_json::from_value(value)
            .map_err(|source| EventDecodeError::InvalidFields { event_type, source })
    }

    /// Encode as one text frame
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Wire name of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::TruckUpdate(_) => "TRUCK_UPDATE",
            Self::TrucksUpdate { .. } => "TRUCKS_UPDATE",
            Self::SlaughterhouseUpdate(_) => "SLAUGHTERHOUSE_UPDATE",
            Self::FarmUpdate(_) => "FARM_UPDATE",
            Self::InitFarms(_) => "INIT_FARMS",
            Self::TruckArrived(_) => "TRUCK_ARRIVED",
            Self::DailySummary(_) => "DAILY_SUMMARY",
            Self::EndOfSim { .. } => "END_OF_SIM",
            Self::SimulationComplete { .. } => "SIMULATION_COMPLETE",
            Self::Error { .. } => "ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LatLon;

    #[test]
    fn test_decode_truck_update() {
        let text = r#"{"type":"TRUCK_UPDATE","truck_id":"T1-TR01","position":[41.71,0.64],
                       "pigs_on_board":30,"status":"MOVING_TO_FARM"}"#;
        let event = LiveEvent::decode(text).unwrap();
        assert_eq!(
            event,
            LiveEvent::TruckUpdate(TruckUpdate {
                truck_id: "T1-TR01".into(),
                position: LatLon::new(41.71, 0.64),
                pigs_on_board: 30,
                status: Some(TruckStatus::MovingToFarm),
            })
        );
        assert_eq!(event.event_type(), "TRUCK_UPDATE");
    }

    #[test]
    fn test_decode_unknown_type_is_not_an_error() {
        let event = LiveEvent::decode(r#"{"type":"WEATHER","rain":true}"#).unwrap();
        assert_eq!(event, LiveEvent::Unknown);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = LiveEvent::decode("not json").unwrap_err();
        assert!(matches!(err, EventDecodeError::NotJson(_)));
        assert_eq!(err.code(), ErrorCode::EventMalformed);

        let err = LiveEvent::decode(r#"{"truck_id":"T1"}"#).unwrap_err();
        assert!(matches!(err, EventDecodeError::MissingType));

        let err = LiveEvent::decode(r#"{"type":7}"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::EventMissingType);
    }

    #[test]
    fn test_decode_ill_typed_fields() {
        let err = LiveEvent::decode(r#"{"type":"TRUCK_UPDATE","truck_id":"T1","position":"here"}"#)
            .unwrap_err();
        match err {
            EventDecodeError::InvalidFields { event_type, .. } => {
                assert_eq!(event_type, "TRUCK_UPDATE")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_optional_fields_default() {
        let event = LiveEvent::decode(r#"{"type":"SLAUGHTERHOUSE_UPDATE"}"#).unwrap();
        let LiveEvent::SlaughterhouseUpdate(update) = event else {
            panic!("wrong variant");
        };
        assert_eq!(update.slaughterhouse_id, None);
        assert_eq!(update.metrics, SlaughterhouseMetrics::default());

        let event = LiveEvent::decode(r#"{"type":"FARM_UPDATE","farm_id":12,"new_inventory":40,"num_pigs_loaded":60}"#)
            .unwrap();
        let LiveEvent::FarmUpdate(update) = event else {
            panic!("wrong variant");
        };
        assert_eq!(update.farm_id, "12");
        assert_eq!(update.displayed_total(), 100);
        assert!(update.farm_name.is_none());
    }

    #[test]
    fn test_daily_summary_accepts_legacy_keys() {
        let text = r#"{"type":"DAILY_SUMMARY","cumulative_profit":1234.5,
            "summary":{"Dia":3,"Porcs Processats":1790,"Camions Usats":9,
                       "Ingressos Nets":290000.1,"Costos Var. Transp":1500.0,
                       "Costos Fixos":3600.0,"Benefici Net Diari":284900.1}}"#;
        let LiveEvent::DailySummary(daily) = LiveEvent::decode(text).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(daily.summary.day, 3);
        assert_eq!(daily.summary.trucks_used, 9);
        assert_eq!(daily.cumulative_profit, 1234.5);
    }

    #[test]
    fn test_encode_carries_type_tag() {
        let event = LiveEvent::EndOfSim {
            msg: "next day".into(),
        };
        let text = event.encode().unwrap();
        assert!(text.contains(r#""type":"END_OF_SIM""#));
        assert_eq!(LiveEvent::decode(&text).unwrap(), event);
    }
}
