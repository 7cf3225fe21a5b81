use super::round2;
use super::types::{BatteryAnalysis, EnvironmentalAnalysis};
use crate::records::TelemetryRecord;

struct Summary {
    avg: f64,
    min: f64,
    max: f64,
}

fn summarize(samples: &[f64]) -> Option<Summary> {
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples.iter().sum();
    Some(Summary {
        avg: round2(sum / samples.len() as f64),
        min: samples.iter().copied().fold(f64::INFINITY, f64::min),
        max: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Max/min/mean over every reported battery level, in encounter order.
pub fn battery_analysis(telemetry: &[TelemetryRecord]) -> BatteryAnalysis {
    let levels: Vec<f64> = telemetry
        .iter()
        .filter_map(TelemetryRecord::battery_level)
        .collect();

    match summarize(&levels) {
        Some(s) => BatteryAnalysis {
            initial_battery: Some(s.max),
            final_battery: Some(s.min),
            battery_consumed: Some(s.max - s.min),
            average_battery: Some(s.avg),
        },
        None => BatteryAnalysis::default(),
    }
}

pub fn environmental_analysis(telemetry: &[TelemetryRecord]) -> EnvironmentalAnalysis {
    let temperatures: Vec<f64> = telemetry
        .iter()
        .filter_map(TelemetryRecord::temperature)
        .collect();
    let humidities: Vec<f64> = telemetry
        .iter()
        .filter_map(TelemetryRecord::humidity)
        .collect();

    let temperature = summarize(&temperatures);
    let humidity = summarize(&humidities);

    EnvironmentalAnalysis {
        avg_temperature: temperature.as_ref().map(|s| s.avg),
        min_temperature: temperature.as_ref().map(|s| s.min),
        max_temperature: temperature.as_ref().map(|s| s.max),
        avg_humidity: humidity.as_ref().map(|s| s.avg),
        min_humidity: humidity.as_ref().map(|s| s.min),
        max_humidity: humidity.as_ref().map(|s| s.max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Environment, RoverStatus};

    fn with_battery(level: Option<f64>) -> TelemetryRecord {
        TelemetryRecord {
            rover_status: Some(RoverStatus {
                battery_level: level,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn with_environment(temperature: Option<f64>, humidity: Option<f64>) -> TelemetryRecord {
        TelemetryRecord {
            environment: Some(Environment {
                temperature,
                humidity,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_battery_levels_is_empty() {
        let telemetry = vec![TelemetryRecord::default(), with_battery(None)];
        let battery = battery_analysis(&telemetry);
        assert!(battery.is_empty());
        assert_eq!(serde_json::to_value(battery).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_initial_is_max_even_when_last() {
        let telemetry = vec![
            with_battery(Some(60.0)),
            with_battery(Some(40.0)),
            TelemetryRecord::default(),
            with_battery(Some(90.0)),
        ];

        let battery = battery_analysis(&telemetry);
        assert_eq!(battery.initial_battery, Some(90.0));
        assert_eq!(battery.final_battery, Some(40.0));
        assert_eq!(battery.battery_consumed, Some(50.0));
        assert_eq!(battery.average_battery, Some(63.33));
    }

    #[test]
    fn test_tied_mean_rounds_to_even() {
        let mut telemetry: Vec<TelemetryRecord> =
            (0..7).map(|_| with_environment(Some(20.0), None)).collect();
        telemetry.push(with_environment(Some(21.0), None));

        let env = environmental_analysis(&telemetry);
        assert_eq!(env.avg_temperature, Some(20.12));

        let battery = battery_analysis(&[with_battery(Some(0.25)), with_battery(Some(0.0))]);
        assert_eq!(battery.average_battery, Some(0.12));
    }

    #[test]
    fn test_temperature_without_humidity() {
        let telemetry = vec![
            with_environment(Some(21.5), None),
            with_environment(Some(18.0), None),
            with_environment(Some(25.25), None),
        ];

        let env = environmental_analysis(&telemetry);
        let json = serde_json::to_value(env).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(json["avg_temperature"], 21.58);
        assert_eq!(json["min_temperature"], 18.0);
        assert_eq!(json["max_temperature"], 25.25);
        assert!(json.get("avg_humidity").is_none());
    }

    #[test]
    fn test_dimensions_are_sampled_independently() {
        let telemetry = vec![
            with_environment(Some(20.0), None),
            with_environment(None, Some(40.0)),
            with_environment(None, Some(61.0)),
        ];

        let env = environmental_analysis(&telemetry);
        assert_eq!(env.avg_temperature, Some(20.0));
        assert_eq!(env.avg_humidity, Some(50.5));
        assert_eq!(env.min_humidity, Some(40.0));
        assert_eq!(env.max_humidity, Some(61.0));
    }

    #[test]
    fn test_min_max_are_not_rounded() {
        let telemetry = vec![
            with_environment(Some(20.123), None),
            with_environment(Some(20.131), None),
        ];
        let env = environmental_analysis(&telemetry);
        assert_eq!(env.min_temperature, Some(20.123));
        assert_eq!(env.max_temperature, Some(20.131));
        assert_eq!(env.avg_temperature, Some(20.13));
    }
}
