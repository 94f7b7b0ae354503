#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LogProbs {
    #[serde(default)]
    pub tokens: Vec<String>,

    #[serde(default)]
    pub token_logprobs: Vec<Option<f64>>,

    #[serde(default)]
    pub top_logprobs: Vec<Option<std::collections::HashMap<String, f64>>>,

    #[serde(default)]
    pub text_offset: Vec<i64>,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct Choice {
    pub text: String,
    pub index: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub finish_reason: String,

    #[serde(default)]
    pub logprobs: Option<LogProbs>,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct Usage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct CreateResponse {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub object: String,

    #[serde(default)]
    pub created: i64,

    #[serde(default)]
    pub model: String,

    pub choices: Vec<Choice>,

    #[serde(default)]
    pub usage: Option<Usage>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    Ok(<Option<T> as serde::Deserialize>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(serde::Serialize, Clone, Debug, PartialEq)]
pub struct CreateRequest {
    pub model: String,

    pub prompt: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    pub max_tokens: i64,

    pub temperature: f32,

    pub top_p: f32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<i64>,

    // The client always asks for a single response body.
    #[serde(skip_serializing)]
    pub stream: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<i64>,

    pub echo: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,

    pub presence_penalty: f32,

    pub frequency_penalty: f32,

    pub best_of: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<std::collections::HashMap<String, i32>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl CreateRequest {
    /// The parameters the OpenAI playground starts out with. Everything not
    /// listed here is left for the API to default.
    pub fn playground() -> Self {
        Self {
            model: "text-davinci-003".to_string(),
            prompt: String::new(),
            suffix: None,
            max_tokens: 256,
            temperature: 0.7,
            top_p: 1.0,
            n: None,
            stream: false,
            logprobs: None,
            echo: false,
            stop: vec![],
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            best_of: 1,
            logit_bias: None,
            user: None,
        }
    }
}
