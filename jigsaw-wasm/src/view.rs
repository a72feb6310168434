use jigsaw_core::{Feedback, Progress, Transition};
use serde::Serialize;

/// JSON shape handed to the page after every action.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionView {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
    pub feedback: &'static [Feedback],
    pub progress: Progress,
    pub won: bool,
}

impl TransitionView {
    pub fn new(transition: &Transition, progress: Progress) -> Self {
        let (kind, id, slot) = match *transition {
            Transition::Ignored => ("ignored", None, None),
            Transition::Selected { id } => ("selected", Some(id), None),
            Transition::Deselected { id } => ("deselected", Some(id), None),
            Transition::Retrieved { id, slot } => ("retrieved", Some(id), Some(slot)),
            Transition::Mismatch { id, mismatch } => ("mismatch", Some(id), Some(mismatch.slot)),
            Transition::Placed { id, slot } => ("placed", Some(id), Some(slot)),
            Transition::Won { id, slot } => ("won", Some(id), Some(slot)),
        };
        Self {
            kind,
            id,
            slot,
            feedback: transition.feedback(),
            progress,
            won: matches!(transition, Transition::Won { .. }),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jigsaw_core::Mismatch;

    #[test]
    fn mismatch_reports_slot_and_error_cue() {
        let t = Transition::Mismatch {
            id: 2,
            mismatch: Mismatch { slot: 7, token: 3 },
        };
        let v: serde_json::Value = serde_json::from_str(
            &TransitionView::new(&t, Progress { placed: 0, total: 12 }).to_json(),
        )
        .unwrap();
        assert_eq!(v["kind"], "mismatch");
        assert_eq!(v["id"], 2);
        assert_eq!(v["slot"], 7);
        assert_eq!(v["feedback"], serde_json::json!(["error"]));
        assert_eq!(v["progress"]["total"], 12);
        assert_eq!(v["won"], false);
    }

    #[test]
    fn ignored_omits_piece_fields() {
        let view = TransitionView::new(&Transition::Ignored, Progress { placed: 1, total: 4 });
        let json = view.to_json();
        assert!(!json.contains("\"id\""));
        assert!(json.contains("\"kind\":\"ignored\""));
    }
}
