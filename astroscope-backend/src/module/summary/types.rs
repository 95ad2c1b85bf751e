//! Summary request/response registry
//!
//! One variant per data domain. Requests and responses share the `kind` tag so a
//! response can always be matched to the request that produced it.

use serde::{Deserialize, Serialize};

/// What the caller wants summarized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryRequest {
    /// DONKI events of the last `days` days (configured default when absent)
    SpaceWeather {
        #[serde(default)]
        days: Option<u32>,
    },
    /// A Celestrak group, or pasted TLE text
    #[serde(rename_all = "camelCase")]
    Tle {
        #[serde(default)]
        group: Option<String>,
        #[serde(default)]
        tle_data: Option<String>,
    },
    /// NeoWs feed for an inclusive `YYYY-MM-DD` window
    #[serde(rename_all = "camelCase")]
    Neo { start_date: String, end_date: String },
    /// Latest InSight sols
    MarsWeather {},
}

impl SummaryRequest {
    pub fn kind(&self) -> SummaryKind {
        match self {
            SummaryRequest::SpaceWeather { .. } => SummaryKind::SpaceWeather,
            SummaryRequest::Tle { .. } => SummaryKind::Tle,
            SummaryRequest::Neo { .. } => SummaryKind::Neo,
            SummaryRequest::MarsWeather {} => SummaryKind::MarsWeather,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    SpaceWeather,
    Tle,
    Neo,
    MarsWeather,
}

impl SummaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryKind::SpaceWeather => "space_weather",
            SummaryKind::Tle => "tle",
            SummaryKind::Neo => "neo",
            SummaryKind::MarsWeather => "mars_weather",
        }
    }
}

impl std::fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Model output, tagged like the request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryResponse {
    SpaceWeather(SpaceWeatherSummary),
    Tle(TleSummary),
    Neo(NeoSummary),
    MarsWeather(MarsWeatherSummary),
}

impl SummaryResponse {
    pub fn kind(&self) -> SummaryKind {
        match self {
            SummaryResponse::SpaceWeather(_) => SummaryKind::SpaceWeather,
            SummaryResponse::Tle(_) => SummaryKind::Tle,
            SummaryResponse::Neo(_) => SummaryKind::Neo,
            SummaryResponse::MarsWeather(_) => SummaryKind::MarsWeather,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

/// Satellite risk assessment from DONKI events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceWeatherSummary {
    pub summary: String,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub affected_satellites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TleSummary {
    pub orbital_positions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeoSummary {
    pub total_count: u32,
    pub hazardous_count: u32,
    #[serde(default)]
    pub closest_approach: Option<CloseApproach>,
    #[serde(default)]
    pub largest_object: Option<LargestObject>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseApproach {
    pub name: String,
    pub miss_distance_km: f64,
    pub diameter_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargestObject {
    pub name: String,
    pub diameter_km: f64,
    pub velocity_kph: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarsWeatherSummary {
    pub summary: String,
    #[serde(default)]
    pub sols: Vec<SolWeather>,
}

/// One Martian day; absent metrics stay absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolWeather {
    pub sol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrestrial_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_temp_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_temp_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_temp_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_pa: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_tags() {
        let req: SummaryRequest =
            serde_json::from_value(json!({"kind": "tle", "group": "stations"})).unwrap();
        assert_eq!(
            req,
            SummaryRequest::Tle { group: Some("stations".to_string()), tle_data: None }
        );

        let req: SummaryRequest = serde_json::from_value(
            json!({"kind": "neo", "startDate": "2024-05-10", "endDate": "2024-05-12"}),
        )
        .unwrap();
        assert_eq!(req.kind(), SummaryKind::Neo);

        let req: SummaryRequest =
            serde_json::from_value(json!({"kind": "mars_weather"})).unwrap();
        assert_eq!(req, SummaryRequest::MarsWeather {});

        let req: SummaryRequest =
            serde_json::from_value(json!({"kind": "space_weather"})).unwrap();
        assert_eq!(req, SummaryRequest::SpaceWeather { days: None });

        assert!(serde_json::from_value::<SummaryRequest>(json!({"kind": "weather"})).is_err());
    }

    #[test]
    fn test_response_tagged_with_kind() {
        let resp = SummaryResponse::SpaceWeather(SpaceWeatherSummary {
            summary: "Quiet".to_string(),
            risk_level: RiskLevel::Low,
            affected_satellites: vec![],
        });
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["kind"], "space_weather");
        assert_eq!(value["riskLevel"], "low");
        assert_eq!(resp.kind().to_string(), "space_weather");
    }

    #[test]
    fn test_sol_skips_missing_metrics() {
        let sol = SolWeather {
            sol: "675".to_string(),
            terrestrial_date: None,
            avg_temp_c: Some(-62.3),
            min_temp_c: None,
            max_temp_c: None,
            wind_speed_ms: None,
            pressure_pa: Some(750.6),
        };
        let value = serde_json::to_value(&sol).unwrap();
        assert!(value.get("windSpeedMs").is_none());
        assert_eq!(value["avgTempC"], -62.3);
    }
}
