//! Wire types for the commute request and response bodies.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::aggregator::MonthlyCommutes;
use crate::model::{Location, Route};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One place the commuter travels to from home.
pub struct DestinationInput {
    /// Label shown in the breakdown.
    pub name: String,
    /// Address of the destination.
    pub address: String,
    /// Trips per month.
    pub times_per_month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Request body: a home address and the destinations reached from it.
pub struct CommuteRequest {
    /// Home address; every trip starts here.
    pub home: String,
    /// Destinations with their monthly frequency.
    #[serde(default)]
    pub destinations: Vec<DestinationInput>,
}

impl CommuteRequest {
    /// Turn the request into routes starting at the home location.
    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        let home = Location::new(self.home.as_str());
        self.destinations
            .iter()
            .map(|destination| {
                Route::new(
                    destination.name.as_str(),
                    home.clone(),
                    Location::new(destination.address.as_str()),
                    destination.times_per_month,
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Monthly commute of one route in the response.
pub struct RouteMonthlyCommute {
    /// Route name.
    pub name: String,
    /// Formatted monthly total.
    pub monthly_total_commute: String,
    /// Formatted one-way trip time.
    pub per_trip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Response body with the grand total and the per-route breakdown.
pub struct CommuteResponse {
    /// Formatted grand total.
    pub monthly_total_commute: String,
    /// Breakdown in order of first appearance.
    pub monthly_commute_by_route: Vec<RouteMonthlyCommute>,
}

impl From<&MonthlyCommutes> for CommuteResponse {
    fn from(commutes: &MonthlyCommutes) -> Self {
        Self {
            monthly_total_commute: format_duration(commutes.total_duration()),
            monthly_commute_by_route: commutes
                .total_duration_by_route()
                .iter()
                .map(|route| RouteMonthlyCommute {
                    name: route.name.clone(),
                    monthly_total_commute: format_duration(route.total_duration),
                    per_trip: format_duration(route.duration_per_trip),
                })
                .collect(),
        }
    }
}

/// Render a duration as hours and minutes, e.g. `10h0m`, `30m` or `1m30s`.
///
/// Seconds only appear when they are non-zero; sub-second parts are dropped.
#[must_use]
pub fn format_duration(duration: TimeDelta) -> String {
    let sign = if duration < TimeDelta::zero() { "-" } else { "" };
    let total_seconds = duration.num_seconds().unsigned_abs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    match (hours, minutes, seconds) {
        (0, 0, 0) => "0m".to_owned(),
        (0, 0, seconds) => format!("{sign}{seconds}s"),
        (0, minutes, 0) => format!("{sign}{minutes}m"),
        (0, minutes, seconds) => format!("{sign}{minutes}m{seconds}s"),
        (hours, minutes, 0) => format!("{sign}{hours}h{minutes}m"),
        (hours, minutes, seconds) => format!("{sign}{hours}h{minutes}m{seconds}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_minutes_and_hours() {
        assert_eq!(format_duration(TimeDelta::minutes(30)), "30m");
        assert_eq!(format_duration(TimeDelta::hours(10)), "10h0m");
        assert_eq!(format_duration(TimeDelta::minutes(720)), "12h0m");
        assert_eq!(format_duration(TimeDelta::minutes(61)), "1h1m");
    }

    #[test]
    fn formats_zero_and_seconds() {
        assert_eq!(format_duration(TimeDelta::zero()), "0m");
        assert_eq!(format_duration(TimeDelta::seconds(45)), "45s");
        assert_eq!(format_duration(TimeDelta::seconds(90)), "1m30s");
        assert_eq!(format_duration(TimeDelta::seconds(3605)), "1h0m5s");
        assert_eq!(format_duration(TimeDelta::milliseconds(1500)), "1s");
    }

    #[test]
    fn formats_multi_day_totals_in_hours() {
        assert_eq!(format_duration(TimeDelta::days(2)), "48h0m");
        assert_eq!(format_duration(TimeDelta::hours(-1)), "-1h0m");
    }

    #[test]
    fn request_uses_camel_case_fields() {
        let body = r#"{
            "home": "Kamppi",
            "destinations": [
                { "name": "Work", "address": "Pasila", "timesPerMonth": 20 },
                { "name": "Gym", "address": "Sörnäinen", "timesPerMonth": 0 }
            ]
        }"#;
        let request: CommuteRequest = serde_json::from_str(body).expect("valid body");

        let routes = request.routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].name, "Work");
        assert_eq!(routes[0].start, Location::new("Kamppi"));
        assert_eq!(routes[0].end, Location::new("Pasila"));
        assert_eq!(routes[0].times_per_month, 20);
        assert_eq!(routes[1].start, Location::new("Kamppi"));
        assert_eq!(routes[1].times_per_month, 0);
    }

    #[test]
    fn request_without_destinations_is_empty() {
        let request: CommuteRequest =
            serde_json::from_str(r#"{ "home": "Kamppi" }"#).expect("valid body");
        assert!(request.routes().is_empty());
    }

    #[test]
    fn negative_frequency_is_malformed() {
        let body = r#"{ "home": "A", "destinations": [{ "name": "W", "address": "B", "timesPerMonth": -1 }] }"#;
        assert!(serde_json::from_str::<CommuteRequest>(body).is_err());
    }

    #[test]
    fn response_serializes_with_fixed_field_names() {
        let response = CommuteResponse {
            monthly_total_commute: "10h0m".to_owned(),
            monthly_commute_by_route: vec![RouteMonthlyCommute {
                name: "Work".to_owned(),
                monthly_total_commute: "10h0m".to_owned(),
                per_trip: "30m".to_owned(),
            }],
        };

        let json = serde_json::to_value(&response).expect("serializes");
        assert_eq!(
            json,
            serde_json::json!({
                "monthlyTotalCommute": "10h0m",
                "monthlyCommuteByRoute": [
                    { "name": "Work", "monthlyTotalCommute": "10h0m", "perTrip": "30m" }
                ]
            })
        );
    }
}
