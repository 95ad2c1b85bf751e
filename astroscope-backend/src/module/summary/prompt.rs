//! Prompt templates and model output parsing
use serde::de::DeserializeOwned;

use super::client::SummaryError;
use super::types::{SummaryKind, SummaryResponse};

/// A persona plus an instruction with `{{name}}` / `{{{name}}}` placeholders
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub kind: SummaryKind,
    pub system: &'static str,
    pub instruction: &'static str,
}

/// A rendered prompt ready for the summarizer
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub kind: SummaryKind,
    pub system: String,
    pub user: String,
}

impl PromptTemplate {
    pub fn render(&self, vars: &[(&str, &str)]) -> Prompt {
        Prompt {
            kind: self.kind,
            system: self.system.to_string(),
            user: render(self.instruction, vars),
        }
    }
}

pub const SPACE_WEATHER_TEMPLATE: PromptTemplate = PromptTemplate {
    kind: SummaryKind::SpaceWeather,
    system: "You are a space weather analyst who assesses how solar activity affects satellites in orbit.",
    instruction: r#"Review the NASA DONKI events recorded between {{startDate}} and {{endDate}}.

Solar flares (FLR):
{{{solarFlareData}}}

Coronal mass ejections (CME):
{{{cmeData}}}

Geomagnetic storms (GST):
{{{geomagneticStormData}}}

Reply with a single JSON object with these fields:
- "summary": short description of the risks to satellites,
- "riskLevel": one of "low", "moderate", "high",
- "affectedSatellites": array of satellite names or orbit classes that may be affected."#,
};

pub const TLE_TEMPLATE: PromptTemplate = PromptTemplate {
    kind: SummaryKind::Tle,
    system: "You are an orbital analyst who explains two-line element sets in plain language.",
    instruction: r#"Describe the orbits of the satellites below: orbit class, altitude band, period and anything notable.

{{dataLabel}}:
{{{tleData}}}

Reply with a single JSON object with one field:
- "orbitalPositions": the description as text."#,
};

pub const NEO_TEMPLATE: PromptTemplate = PromptTemplate {
    kind: SummaryKind::Neo,
    system: "You are an astronomer specializing in near-Earth objects and planetary defense.",
    instruction: r#"Analyze the NASA NeoWs close-approach feed for {{startDate}} to {{endDate}}.

1. Count all objects in the feed.
2. Count objects where "is_potentially_hazardous_asteroid" is true.
3. Find the closest approach by "miss_distance" in kilometers; give its name, miss distance and mean estimated diameter in kilometers.
4. Find the largest object by mean estimated diameter; give its name, diameter in kilometers and relative velocity in kilometers per hour.
5. Summarize the week's activity and overall threat level.

NEO data:
{{{neoData}}}

Reply with a single JSON object with these fields:
"totalCount", "hazardousCount",
"closestApproach": {"name", "missDistanceKm", "diameterKm"},
"largestObject": {"name", "diameterKm", "velocityKph"},
"summary"."#,
};

pub const MARS_WEATHER_TEMPLATE: PromptTemplate = PromptTemplate {
    kind: SummaryKind::MarsWeather,
    system: "You are a planetary scientist specializing in Martian meteorology.",
    instruction: r#"The JSON below is the NASA InSight weather feed for the most recent sols at Elysium Planitia.

1. Write a short summary of current conditions for a general audience, covering temperature and wind.
2. For every sol listed in "sol_keys" extract: the sol number, the terrestrial date ("First_UTC"), average/minimum/maximum air temperature ("AT") in Celsius, average horizontal wind speed ("HWS") in m/s and average pressure ("PRE") in Pa.
3. Leave out any metric that is missing for a sol.

InSight weather data:
{{{marsWeatherData}}}

Reply with a single JSON object with these fields:
"summary",
"sols": array of {"sol", "terrestrialDate", "avgTempC", "minTempC", "maxTempC", "windSpeedMs", "pressurePa"}."#,
};

/// Template registered for a summary kind
pub fn template_for(kind: SummaryKind) -> &'static PromptTemplate {
    match kind {
        SummaryKind::SpaceWeather => &SPACE_WEATHER_TEMPLATE,
        SummaryKind::Tle => &TLE_TEMPLATE,
        SummaryKind::Neo => &NEO_TEMPLATE,
        SummaryKind::MarsWeather => &MARS_WEATHER_TEMPLATE,
    }
}

/// Substitute `{{name}}` and `{{{name}}}` placeholders. Both forms insert the value
/// verbatim; unknown names render as empty text.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start..];

        let (open, close) = if after.starts_with("{{{") {
            ("{{{", "}}}")
        } else {
            ("{{", "}}")
        };

        match after[open.len()..].find(close) {
            Some(end) => {
                let name = after[open.len()..open.len() + end].trim();
                if let Some((_, value)) = vars.iter().find(|(key, _)| *key == name) {
                    out.push_str(value);
                }
                rest = &after[open.len() + end + close.len()..];
            }
            None => {
                // Unterminated placeholder, keep as literal text
                out.push_str(after);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Parse model text into `T`, tolerating code fences and prose around the JSON object.
pub fn parse_output<T: DeserializeOwned>(kind: SummaryKind, text: &str) -> Result<T, SummaryError> {
    let json = extract_json_object(text).ok_or_else(|| SummaryError::MalformedOutput {
        kind,
        message: "no JSON object in model output".to_string(),
    })?;

    serde_json::from_str(json).map_err(|e| SummaryError::MalformedOutput {
        kind,
        message: e.to_string(),
    })
}

/// Parse model text into the response variant for `kind`.
pub fn parse_response(kind: SummaryKind, text: &str) -> Result<SummaryResponse, SummaryError> {
    Ok(match kind {
        SummaryKind::SpaceWeather => SummaryResponse::SpaceWeather(parse_output(kind, text)?),
        SummaryKind::Tle => SummaryResponse::Tle(parse_output(kind, text)?),
        SummaryKind::Neo => SummaryResponse::Neo(parse_output(kind, text)?),
        SummaryKind::MarsWeather => SummaryResponse::MarsWeather(parse_output(kind, text)?),
    })
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::summary::types::{RiskLevel, TleSummary};

    #[test]
    fn test_render_placeholders() {
        let out = render(
            "From {{ start }} to {{end}}: {{{data}}} {{missing}}!",
            &[("start", "2024-05-10"), ("end", "2024-05-13"), ("data", "[{\"a\":1}]")],
        );
        assert_eq!(out, "From 2024-05-10 to 2024-05-13: [{\"a\":1}] !");
    }

    #[test]
    fn test_render_keeps_unterminated_placeholder() {
        assert_eq!(render("broken {{name", &[("name", "x")]), "broken {{name");
    }

    #[test]
    fn test_templates_render_their_inputs() {
        let prompt = TLE_TEMPLATE.render(&[("dataLabel", "TLE data"), ("tleData", "ISS (ZARYA)")]);
        assert_eq!(prompt.kind, SummaryKind::Tle);
        assert!(prompt.user.contains("TLE data:\nISS (ZARYA)"));
        assert!(!prompt.user.contains("{{"));

        for kind in [
            SummaryKind::SpaceWeather,
            SummaryKind::Tle,
            SummaryKind::Neo,
            SummaryKind::MarsWeather,
        ] {
            assert_eq!(template_for(kind).kind, kind);
        }
    }

    #[test]
    fn test_parse_fenced_output() {
        let text = "Here you go:\n```json\n{\"orbitalPositions\": \"Low Earth orbit\"}\n```";
        let parsed: TleSummary = parse_output(SummaryKind::Tle, text).unwrap();
        assert_eq!(parsed.orbital_positions, "Low Earth orbit");
    }

    #[test]
    fn test_parse_response_dispatch() {
        let text = r#"{"summary":"Minor flare activity","riskLevel":"moderate","affectedSatellites":["GOES-16"]}"#;
        match parse_response(SummaryKind::SpaceWeather, text).unwrap() {
            SummaryResponse::SpaceWeather(s) => {
                assert_eq!(s.risk_level, RiskLevel::Moderate);
                assert_eq!(s.affected_satellites, vec!["GOES-16"]);
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_parse_malformed_output() {
        let err = parse_response(SummaryKind::Neo, "I cannot help with that.").unwrap_err();
        assert!(matches!(err, SummaryError::MalformedOutput { kind: SummaryKind::Neo, .. }));

        let err = parse_response(SummaryKind::Neo, r#"{"summary": 3}"#).unwrap_err();
        assert!(matches!(err, SummaryError::MalformedOutput { .. }));
    }
}
