use std::borrow::Cow;

/// Sub-agent that splits a script into chunks and assigns a view to each.
pub const SCRIPT_SEQUENCER_TOOL: &str = "script_sequencer_agent";
/// Sub-agent that renders one video segment per script chunk.
pub const VIDEO_TOOL: &str = "video_agent";

const GS_SCHEME: &str = "gs://";
const GS_BROWSER_PREFIX: &str = "https://storage.mtls.cloud.google.com/";

const ORCHESTRATOR_INSTRUCTION: &str = r#"You orchestrate avatar-based training videos.
Your input is a character description, a script, and a set of views of the character.

Steps:
1. Call `script_sequencer_agent` to split the script into chunks, each with a view number.
2. Call `video_agent` once per chunk to create a video segment.
3. Show every segment to the user as soon as it is generated: the video URL, the chunk number and
   the chunk text. Finish with a numbered list of all segments in script order.
4. Once every segment exists, give the user a bash MERGE SCRIPT that downloads the segments with
   gsutil, writes an ffmpeg filelist.txt and concatenates them into final_video.mp4.

Rules:
- Pass the full Character Description and Video Shot Instructions to `video_agent`.
- Pass the view image URL and view number to `video_agent`.
- In messages to the user, rewrite "gs://" URIs as "https://storage.mtls.cloud.google.com/".
  Keep "gs://" URIs unchanged in tool calls.

Merge script shape:
```bash
#!/bin/bash
mkdir -p output
gsutil cp "gs://bucket/path/segment1.mp4" output/segment_01.mp4
gsutil cp "gs://bucket/path/segment2.mp4" output/segment_02.mp4
cd output
echo "file 'segment_01.mp4'" > filelist.txt
echo "file 'segment_02.mp4'" >> filelist.txt
ffmpeg -y -f concat -safe 0 -i filelist.txt -c:v libx264 -c:a aac -movflags +faststart final_video.mp4
echo "Done! Final video: output/final_video.mp4"
```"#;

/// Static description of the orchestration agent: identity, instruction and tools.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub model: String,
    pub instruction: String,
    pub tools: Vec<String>,
}

impl AgentSpec {
    /// The root orchestrator with its two sub-agent tools.
    pub fn orchestrator() -> Self {
        Self {
            name: "root_agent".to_string(),
            model: "gemini-2.5-pro".to_string(),
            instruction: ORCHESTRATOR_INSTRUCTION.to_string(),
            tools: vec![SCRIPT_SEQUENCER_TOOL.to_string(), VIDEO_TOOL.to_string()],
        }
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t == name)
    }
}

/// Browser-facing form of a storage URI. Only a leading `gs://` is rewritten.
pub fn display_url(uri: &str) -> Cow<'_, str> {
    match uri.strip_prefix(GS_SCHEME) {
        Some(rest) => Cow::Owned(format!("{GS_BROWSER_PREFIX}{rest}")),
        None => Cow::Borrowed(uri),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/agent/spec.rs"]
mod tests;
