use crate::extract::MetadataRecord;

pub const UNKNOWN_CAMERA: &str = "Unknown";

/// How a manufacturer match turns into a label.
enum Label {
    Fixed(&'static str),
    /// Fixed label if the uppercased model contains the marker, else the raw model
    ByModel {
        model_marker: &'static str,
        label: &'static str,
    },
}

struct MakeRule {
    /// Uppercase substring of the manufacturer name
    make_marker: &'static str,
    label: Label,
}

static MAKE_RULES: &[MakeRule] = &[
    MakeRule {
        make_marker: "APPLE",
        label: Label::Fixed("iPhone"),
    },
    MakeRule {
        make_marker: "FUJIFILM",
        label: Label::ByModel {
            model_marker: "X-T5",
            label: "XT5",
        },
    },
];

/// Canonical display label for the camera that took a photo.
pub fn camera_label(make: &str, model: &str) -> String {
    let upper_make = make.to_uppercase();
    if let Some(rule) = MAKE_RULES.iter().find(|r| upper_make.contains(r.make_marker)) {
        return match rule.label {
            Label::Fixed(label) => label.to_string(),
            Label::ByModel { model_marker, label } => {
                if model.to_uppercase().contains(model_marker) {
                    label.to_string()
                } else {
                    model.to_string()
                }
            }
        };
    }

    [model, make]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_CAMERA)
        .to_string()
}

pub fn record_camera_label(record: &MetadataRecord) -> String {
    camera_label(record.make(), record.model())
}
