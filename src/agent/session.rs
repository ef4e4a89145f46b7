use crate::foundation::error::ViewframeResult;

/// Heading of the text part that carries the uploaded view URLs.
pub const VIEW_URLS_HEADING: &str = "## VIEW IMAGE URLS";

/// One part of a user message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Inline { mime_type: String, data: Vec<u8> },
}

impl Part {
    fn is_image(&self) -> bool {
        matches!(self, Part::Inline { mime_type, data } if !data.is_empty() && mime_type.starts_with("image/"))
    }
}

/// The user turn about to be sent to the model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserTurn {
    pub parts: Vec<Part>,
}

/// Object storage the session pushes view images to.
pub trait Uploader: Send + Sync {
    /// Store `bytes` under `owner` and return the object URI.
    fn upload(&self, owner: &str, bytes: &[u8], mime_type: &str) -> ViewframeResult<String>;
}

/// Caller's choice for the images in a turn.
#[derive(Clone, Copy)]
pub enum UploadDecision<'a> {
    /// Upload every inline image and record the URLs.
    Upload(&'a dyn Uploader),
    /// Drop inline images and reuse the recorded URLs.
    Reuse,
}

impl std::fmt::Debug for UploadDecision<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upload(_) => f.write_str("Upload"),
            Self::Reuse => f.write_str("Reuse"),
        }
    }
}

/// Per-conversation state: the character view URLs uploaded so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentSession {
    owner: String,
    view_urls: Vec<String>,
}

impl AgentSession {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            view_urls: Vec::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn view_urls(&self) -> &[String] {
        &self.view_urls
    }

    /// True until the first successful upload recorded at least one URL.
    pub fn needs_view_upload(&self) -> bool {
        self.view_urls.is_empty()
    }

    /// Strip inline images from `turn`, upload them if `decision` says so, and append the
    /// view URL listing. Returns the number of images uploaded.
    ///
    /// Uploads happen before anything is modified; on an upload error both the turn and the
    /// session are left untouched.
    #[tracing::instrument(skip_all, fields(owner = %self.owner, decision = ?decision))]
    pub fn prepare_turn(
        &mut self,
        turn: &mut UserTurn,
        decision: UploadDecision<'_>,
    ) -> ViewframeResult<usize> {
        let mut uploaded = Vec::new();
        if let UploadDecision::Upload(uploader) = decision {
            for part in turn.parts.iter().filter(|p| p.is_image()) {
                if let Part::Inline { mime_type, data } = part {
                    uploaded.push(uploader.upload(&self.owner, data, mime_type)?);
                }
            }
        }

        let before = turn.parts.len();
        turn.parts.retain(|p| !p.is_image());
        let stripped = before - turn.parts.len();

        let n = uploaded.len();
        self.view_urls.extend(uploaded);
        tracing::debug!(stripped, uploaded = n, urls = self.view_urls.len(), "turn prepared");

        turn.parts.push(Part::Text(self.view_urls_text()));
        Ok(n)
    }

    /// Text block listing the recorded URLs, one ` - ` item per line.
    pub fn view_urls_text(&self) -> String {
        let mut s = String::from(VIEW_URLS_HEADING);
        for url in &self.view_urls {
            s.push_str("\n - ");
            s.push_str(url);
        }
        s
    }
}

#[cfg(test)]
#[path = "../../tests/unit/agent/session.rs"]
mod tests;
