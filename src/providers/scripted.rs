//! In-memory [`ContentModel`] that replays canned replies and records calls.

use std::{collections::VecDeque, sync::Mutex};

use super::gemini::{
    ContentModel, GenerateContentRequest, GenerateContentResponse, InlineData, Part,
};
use crate::errors::{Result, StudioError};

pub const PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

pub enum Reply {
    Respond(GenerateContentResponse),
    Fail { status: u16 },
}

impl Reply {
    pub fn image() -> Self {
        Reply::Respond(GenerateContentResponse::from_parts(vec![
            Part::text("Here is the bouquet."),
            Part::inline(InlineData {
                mime_type: "image/png".into(),
                data: PNG_BASE64.into(),
            }),
        ]))
    }

    pub fn text_only() -> Self {
        Reply::Respond(GenerateContentResponse::from_parts(vec![Part::text(
            "I can only describe it.",
        )]))
    }

    pub fn json(text: &str) -> Self {
        Reply::Respond(GenerateContentResponse::from_parts(vec![Part::text(text)]))
    }
}

pub struct ScriptedModel {
    configured: bool,
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(String, GenerateContentRequest)>>,
}

impl ScriptedModel {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            configured: true,
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new([])
        }
    }

    /// Model names in call order.
    pub fn models_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }
}

impl ContentModel for ScriptedModel {
    fn ensure_configured(&self) -> Result<()> {
        if self.configured {
            Ok(())
        } else {
            Err(StudioError::MissingConfig("gemini.api_key"))
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        self.ensure_configured()?;
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), request.clone()));

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail { status }) => Err(StudioError::Upstream {
                status,
                body: "scripted failure".into(),
            }),
            None => Ok(GenerateContentResponse::default()),
        }
    }
}
