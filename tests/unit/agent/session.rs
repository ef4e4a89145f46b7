use std::sync::Mutex;

use super::*;
use crate::foundation::error::ViewframeError;

#[derive(Default)]
struct RecordingUploader {
    calls: Mutex<Vec<(String, usize, String)>>,
    fail: bool,
}

impl Uploader for RecordingUploader {
    fn upload(&self, owner: &str, bytes: &[u8], mime_type: &str) -> ViewframeResult<String> {
        if self.fail {
            return Err(ViewframeError::upload("bucket unavailable"));
        }
        let mut calls = self.calls.lock().unwrap();
        calls.push((owner.to_string(), bytes.len(), mime_type.to_string()));
        Ok(format!("gs://views/{owner}/{}.png", calls.len()))
    }
}

fn image(n: usize) -> Part {
    Part::Inline {
        mime_type: "image/png".to_string(),
        data: vec![7; n],
    }
}

fn turn() -> UserTurn {
    UserTurn {
        parts: vec![
            Part::Text("script".to_string()),
            image(3),
            Part::Inline {
                mime_type: "application/pdf".to_string(),
                data: vec![1],
            },
            image(5),
        ],
    }
}

#[test]
fn first_turn_uploads_and_strips_images() {
    let mut session = AgentSession::new("root_agent");
    assert!(session.needs_view_upload());
    let up = RecordingUploader::default();

    let mut t = turn();
    let n = session.prepare_turn(&mut t, UploadDecision::Upload(&up)).unwrap();
    assert_eq!(n, 2);
    assert!(!session.needs_view_upload());
    assert_eq!(
        session.view_urls(),
        ["gs://views/root_agent/1.png", "gs://views/root_agent/2.png"]
    );
    assert_eq!(up.calls.lock().unwrap()[1], ("root_agent".to_string(), 5, "image/png".to_string()));

    assert_eq!(t.parts.len(), 3);
    assert!(matches!(&t.parts[1], Part::Inline { mime_type, .. } if mime_type == "application/pdf"));
    assert_eq!(
        t.parts[2],
        Part::Text(
            "## VIEW IMAGE URLS\n - gs://views/root_agent/1.png\n - gs://views/root_agent/2.png"
                .to_string()
        )
    );
}

#[test]
fn later_turns_reuse_recorded_urls() {
    let mut session = AgentSession::new("root_agent");
    let up = RecordingUploader::default();
    session.prepare_turn(&mut turn(), UploadDecision::Upload(&up)).unwrap();

    let mut t = turn();
    let n = session.prepare_turn(&mut t, UploadDecision::Reuse).unwrap();
    assert_eq!(n, 0);
    assert_eq!(up.calls.lock().unwrap().len(), 2);
    assert_eq!(session.view_urls().len(), 2);
    assert!(t.parts.iter().all(|p| !p.is_image()));
    assert!(matches!(t.parts.last(), Some(Part::Text(s)) if s.ends_with("2.png")));
}

#[test]
fn failed_upload_leaves_turn_and_session_untouched() {
    let mut session = AgentSession::new("root_agent");
    let up = RecordingUploader {
        fail: true,
        ..Default::default()
    };
    let mut t = turn();
    let err = session.prepare_turn(&mut t, UploadDecision::Upload(&up)).unwrap_err();
    assert!(matches!(err, ViewframeError::Upload(_)));
    assert_eq!(t, turn());
    assert!(session.needs_view_upload());
}

#[test]
fn empty_inline_data_is_not_an_image() {
    let mut session = AgentSession::new("a");
    let mut t = UserTurn {
        parts: vec![Part::Inline {
            mime_type: "image/jpeg".to_string(),
            data: Vec::new(),
        }],
    };
    session.prepare_turn(&mut t, UploadDecision::Reuse).unwrap();
    assert_eq!(t.parts.len(), 2);
    assert_eq!(t.parts[1], Part::Text(VIEW_URLS_HEADING.to_string()));
}
