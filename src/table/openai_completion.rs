use crate::openai::completions::{Choice, CreateRequest, LogProbs};

pub const NAME: &str = "openai_completion";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed settings: {0}")]
    MalformedSettings(#[source] serde_json::Error),

    #[error("completion: {0}")]
    RemoteCall(#[source] crate::openai::Error),
}

/// Completion parameters passed through the `settings` qualifier. Only the
/// fields that are present (and not `null`) override the playground
/// defaults, so an explicit `0` or `""` still counts.
#[derive(serde::Deserialize, Default, Debug)]
pub struct Settings {
    pub model: Option<String>,
    pub prompt: Option<String>,
    pub suffix: Option<String>,
    pub max_tokens: Option<i64>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub n: Option<i64>,
    pub stream: Option<bool>,
    pub logprobs: Option<i64>,
    pub echo: Option<bool>,
    pub stop: Option<Vec<String>>,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub best_of: Option<i64>,
    pub logit_bias: Option<std::collections::HashMap<String, i32>>,
    pub user: Option<String>,
}

impl Settings {
    pub fn apply(self, req: &mut CreateRequest) {
        if let Some(x) = self.model {
            req.model = x
        }
        if let Some(x) = self.prompt {
            req.prompt = x
        }
        if let Some(x) = self.suffix {
            req.suffix = Some(x)
        }
        if let Some(x) = self.max_tokens {
            req.max_tokens = x
        }
        if let Some(x) = self.temperature {
            req.temperature = x
        }
        if let Some(x) = self.top_p {
            req.top_p = x
        }
        if let Some(x) = self.n {
            req.n = Some(x)
        }
        if let Some(x) = self.stream {
            req.stream = x
        }
        if let Some(x) = self.logprobs {
            req.logprobs = Some(x)
        }
        if let Some(x) = self.echo {
            req.echo = x
        }
        if let Some(x) = self.stop {
            req.stop = x
        }
        if let Some(x) = self.presence_penalty {
            req.presence_penalty = x
        }
        if let Some(x) = self.frequency_penalty {
            req.frequency_penalty = x
        }
        if let Some(x) = self.best_of {
            req.best_of = x
        }
        if let Some(x) = self.logit_bias {
            req.logit_bias = Some(x)
        }
        if let Some(x) = self.user {
            req.user = Some(x)
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Resolution {
    /// No prompt from either qualifier; the listing is empty.
    AwaitingPrompt,
    Ready(CreateRequest),
}

/// Builds the request from the playground defaults, then `settings`, then
/// `prompt`. A `prompt` qualifier wins even when it is empty.
pub fn resolve(prompt: Option<&str>, settings: Option<&str>) -> Result<Resolution, Error> {
    let mut req = CreateRequest::playground();

    if let Some(settings) = settings.filter(|s| !s.is_empty()) {
        // A JSON `null` leaves every default in place.
        let settings: Option<Settings> = serde_json::from_str(settings).map_err(Error::MalformedSettings)?;
        if let Some(settings) = settings {
            settings.apply(&mut req);
        }
    }

    if let Some(prompt) = prompt {
        req.prompt = prompt.to_string();
    }

    if req.prompt.is_empty() {
        return Ok(Resolution::AwaitingPrompt);
    }

    Ok(Resolution::Ready(req))
}

#[derive(serde::Serialize, Clone, Debug, PartialEq)]
pub struct CompletionRow {
    pub completion: String,
    pub index: i64,
    pub finish_reason: String,
    pub log_probs: Option<LogProbs>,
    pub prompt: String,
    pub settings: Option<serde_json::Value>,
}

impl CompletionRow {
    fn new(choice: Choice, prompt: String) -> Self {
        Self {
            completion: choice.text,
            index: choice.index,
            finish_reason: choice.finish_reason,
            log_probs: choice.logprobs,
            prompt,
            settings: None,
        }
    }
}

pub struct Table {
    client: crate::openai::Client,
}

impl Table {
    pub fn new(client: crate::openai::Client) -> Self {
        Self { client }
    }

    /// Makes exactly one completion call and yields one row per returned
    /// choice, in the order the service returned them.
    pub async fn execute(&self, req: &CreateRequest) -> Result<Rows, Error> {
        if req.stream {
            log::warn!("openai_completion: stream was requested but is not supported, asking for a single response");
        }

        log::debug!("openai_completion request: {:?}", req);
        let resp = self.client.create_completion(req).await.map_err(Error::RemoteCall)?;
        log::debug!("openai_completion response: {:?}", resp);

        Ok(Rows {
            choices: resp.choices.into_iter(),
            prompt: req.prompt.clone(),
        })
    }
}

/// Rows of a single completion response. Consumed once.
pub struct Rows {
    choices: std::vec::IntoIter<Choice>,
    prompt: String,
}

impl Iterator for Rows {
    type Item = CompletionRow;

    fn next(&mut self) -> Option<Self::Item> {
        self.choices.next().map(|choice| CompletionRow::new(choice, self.prompt.clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.choices.size_hint()
    }
}

/// Needs no connection, so the host can describe the table before connecting.
pub fn definition() -> super::Definition {
    super::Definition {
        name: NAME,
        description: "Completions available in OpenAI.",
        key_columns: vec![
            super::KeyColumn {
                name: "prompt",
                required: false,
            },
            super::KeyColumn {
                name: "settings",
                required: false,
            },
        ],
        columns: vec![
            super::Column {
                name: "completion",
                typ: super::ColumnType::String,
                description: "The generated text.",
            },
            super::Column {
                name: "index",
                typ: super::ColumnType::Int,
                description: "Position of this choice in the response.",
            },
            super::Column {
                name: "finish_reason",
                typ: super::ColumnType::String,
                description: "Why generation stopped, e.g. stop or length.",
            },
            super::Column {
                name: "log_probs",
                typ: super::ColumnType::Json,
                description: "Log probabilities of the generated tokens, when requested.",
            },
            super::Column {
                name: "prompt",
                typ: super::ColumnType::String,
                description: "The resolved prompt that was completed: the prompt qualifier if given, otherwise the prompt in settings.",
            },
            super::Column {
                name: "settings",
                typ: super::ColumnType::Json,
                description: "Completion settings passed in the query.",
            },
        ],
    }
}

#[async_trait::async_trait]
impl super::Table for Table {
    fn definition(&self) -> super::Definition {
        definition()
    }

    async fn list(&self, quals: &super::Quals) -> Result<super::RowStream, anyhow::Error> {
        let prompt = quals.get("prompt");
        let settings = quals.get("settings");

        let req = match resolve(prompt, settings) {
            Ok(Resolution::Ready(req)) => req,
            Ok(Resolution::AwaitingPrompt) => {
                log::debug!("openai_completion: no prompt, returning no rows");
                return Ok(Box::pin(futures_util::stream::empty::<Result<super::Row, anyhow::Error>>()));
            }
            Err(e) => {
                log::error!("openai_completion: {} (prompt: {:?}, settings: {:?})", e, prompt, settings);
                return Err(e.into());
            }
        };

        let rows = match self.execute(&req).await {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("openai_completion: {} (prompt: {:?}, settings: {:?}, request: {:?})", e, prompt, settings, req);
                return Err(e.into());
            }
        };

        // resolve() already accepted the text, so it parses.
        let settings = settings.filter(|s| !s.is_empty()).map(|s| serde_json::from_str::<serde_json::Value>(s)).transpose()?;

        Ok(Box::pin(async_stream::try_stream! {
            for mut row in rows {
                row.settings = settings.clone();
                yield super::to_row(row)?;
            }
        }))
    }
}
