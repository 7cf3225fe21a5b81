use chrono::{DateTime, SecondsFormat, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{parse_number, text_or, IngestError};
use crate::analytics::round2;
use crate::records::{
    CameraInfo, Environment, Location, Motion, RoverStatus, TelemetryRecord, DEFAULT_MISSION_ID,
    DEFAULT_ROVER_ID,
};
use crate::storage::{RecordStore, Storage};

/// Raw capture form fields, exactly as submitted.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CaptureForm {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub altitude: Option<String>,
    pub heading: Option<String>,
    pub speed: Option<String>,
    pub battery_level: Option<String>,
    pub temperature: Option<String>,
    pub humidity: Option<String>,
    pub note: Option<String>,
    pub mission_id: Option<String>,
    pub rover_id: Option<String>,
    /// JSON object; anything else is stored as `{}`.
    pub camera_settings: Option<String>,
    /// Comma separated.
    pub tags: Option<String>,
}

impl CaptureForm {
    /// Stores a named form field. Returns false for names the form does not know.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "latitude" => &mut self.latitude,
            "longitude" => &mut self.longitude,
            "altitude" => &mut self.altitude,
            "heading" => &mut self.heading,
            "speed" => &mut self.speed,
            "battery_level" => &mut self.battery_level,
            "temperature" => &mut self.temperature,
            "humidity" => &mut self.humidity,
            "note" => &mut self.note,
            "mission_id" => &mut self.mission_id,
            "rover_id" => &mut self.rover_id,
            "camera_settings" => &mut self.camera_settings,
            "tags" => &mut self.tags,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CaptureOutcome {
    pub status: String,
    pub saved: String,
    pub metadata: TelemetryRecord,
    pub file_size_mb: f64,
}

struct Readings {
    latitude: f64,
    longitude: f64,
    altitude: f64,
    heading: f64,
    speed: f64,
    battery_level: f64,
    temperature: f64,
    humidity: f64,
}

impl Readings {
    fn parse(form: &CaptureForm) -> Result<Self, IngestError> {
        let num = |field, raw: &Option<String>, default| parse_number(field, raw.as_deref(), default);
        Ok(Readings {
            latitude: num("latitude", &form.latitude, 0.0)?,
            longitude: num("longitude", &form.longitude, 0.0)?,
            altitude: num("altitude", &form.altitude, 0.0)?,
            heading: num("heading", &form.heading, 0.0)?,
            speed: num("speed", &form.speed, 0.0)?,
            battery_level: num("battery_level", &form.battery_level, 100.0)?,
            temperature: num("temperature", &form.temperature, 20.0)?,
            humidity: num("humidity", &form.humidity, 50.0)?,
        })
    }
}

/// Reduces an uploaded filename to a safe single path component.
pub fn secure_filename(name: &str) -> String {
    let joined = name
        .split(|c: char| c == '/' || c == '\\' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

fn camera_settings(raw: Option<&str>) -> serde_json::Map<String, serde_json::Value> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

fn tags(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(s) if !s.is_empty() => s.split(',').map(String::from).collect(),
        _ => Vec::new(),
    }
}

/// Validates a capture, stores the photo and appends its telemetry record.
pub fn capture(
    storage: &Storage,
    form: CaptureForm,
    image: Option<ImageUpload>,
    now: DateTime<Utc>,
) -> Result<CaptureOutcome, IngestError> {
    let image = image.ok_or(IngestError::MissingImage)?;
    if image.filename.is_empty() {
        return Err(IngestError::NoImageSelected);
    }

    let readings = Readings::parse(&form)?;

    let stamp = now.format("%Y%m%d_%H%M%S").to_string();
    let safe_name = match secure_filename(&image.filename) {
        s if s.is_empty() => "upload".to_string(),
        s => s,
    };
    let filename = format!("{}_{}", stamp, safe_name);
    let file_size = storage.save_image(&filename, &image.bytes)?;

    let record = TelemetryRecord {
        file: filename.clone(),
        timestamp: Some(stamp),
        datetime_iso: Some(now.to_rfc3339_opts(SecondsFormat::Micros, true)),
        location: Some(Location {
            latitude: readings.latitude,
            longitude: readings.longitude,
            altitude: readings.altitude,
            heading: readings.heading,
        }),
        motion: Some(Motion {
            speed: Some(readings.speed),
            heading: Some(readings.heading),
        }),
        environment: Some(Environment {
            temperature: Some(readings.temperature),
            humidity: Some(readings.humidity),
        }),
        rover_status: Some(RoverStatus {
            battery_level: Some(readings.battery_level),
            rover_id: Some(text_or(form.rover_id, DEFAULT_ROVER_ID)),
            mission_id: Some(text_or(form.mission_id, DEFAULT_MISSION_ID)),
        }),
        camera: Some(CameraInfo {
            settings: camera_settings(form.camera_settings.as_deref()),
            file_size_bytes: file_size,
        }),
        note: Some(form.note.unwrap_or_default()),
        tags: tags(form.tags.as_deref()),
    };

    let record = storage.telemetry.append(record)?;
    info!(
        "Captured {} for mission {}",
        filename,
        record.mission_id().unwrap_or(DEFAULT_MISSION_ID)
    );

    Ok(CaptureOutcome {
        status: "ok".to_string(),
        saved: filename,
        metadata: record,
        file_size_mb: round2(file_size as f64 / (1024.0 * 1024.0)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::MissionFilter;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 15).unwrap()
    }

    fn jpeg() -> Option<ImageUpload> {
        Some(ImageUpload {
            filename: "front cam.jpg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
        })
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("i contain cool \u{fc}ml\u{e4}uts.txt"), "i_contain_cool_mluts.txt");
        assert_eq!(secure_filename(".."), "");
    }

    #[test]
    fn test_capture_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());

        let outcome = capture(&storage, CaptureForm::default(), jpeg(), now()).unwrap();
        assert_eq!(outcome.saved, "20240301_093015_front_cam.jpg");
        assert_eq!(outcome.file_size_mb, 0.0);

        let record = &outcome.metadata;
        assert_eq!(record.datetime_iso.as_deref(), Some("2024-03-01T09:30:15.000000Z"));
        assert_eq!(record.battery_level(), Some(100.0));
        assert_eq!(record.temperature(), Some(20.0));
        assert_eq!(record.humidity(), Some(50.0));
        assert_eq!(record.mission_id(), Some("default"));
        assert_eq!(record.camera.as_ref().unwrap().file_size_bytes, 4);
        assert!(record.tags.is_empty());

        let stored = storage.telemetry.list(&MissionFilter::All).unwrap();
        assert_eq!(stored, vec![outcome.metadata]);
        assert!(storage.image_path("20240301_093015_front_cam.jpg").is_file());
    }

    #[test]
    fn test_capture_reads_fields() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());

        let mut form = CaptureForm::default();
        for (name, value) in [
            ("latitude", "37.7749"),
            ("longitude", "-122.4194"),
            ("speed", "2.5"),
            ("battery_level", "81"),
            ("mission_id", "survey"),
            ("camera_settings", r#"{"iso": 200}"#),
            ("tags", "rock,sample"),
        ] {
            assert!(form.set(name, value.to_string()));
        }
        assert!(!form.set("unknown", String::new()));

        let record = capture(&storage, form, jpeg(), now()).unwrap().metadata;
        assert_eq!(record.location.unwrap().latitude, 37.7749);
        assert_eq!(record.speed(), Some(2.5));
        assert_eq!(record.battery_level(), Some(81.0));
        assert_eq!(record.mission_id(), Some("survey"));
        assert_eq!(record.camera.unwrap().settings["iso"], 200);
        assert_eq!(record.tags, vec!["rock", "sample"]);
    }

    #[test]
    fn test_invalid_camera_settings_become_empty() {
        assert!(camera_settings(Some("not json")).is_empty());
        assert!(camera_settings(Some("[1, 2]")).is_empty());
        assert!(camera_settings(None).is_empty());
    }

    #[test]
    fn test_capture_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());

        assert!(matches!(
            capture(&storage, CaptureForm::default(), None, now()),
            Err(IngestError::MissingImage)
        ));

        let unnamed = ImageUpload {
            filename: String::new(),
            bytes: vec![1],
        };
        assert!(matches!(
            capture(&storage, CaptureForm::default(), Some(unnamed), now()),
            Err(IngestError::NoImageSelected)
        ));

        let form = CaptureForm {
            humidity: Some("wet".into()),
            ..Default::default()
        };
        assert!(matches!(
            capture(&storage, form, jpeg(), now()),
            Err(IngestError::InvalidNumber("humidity"))
        ));
        assert!(storage.telemetry.list(&MissionFilter::All).unwrap().is_empty());
    }
}
