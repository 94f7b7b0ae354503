#![allow(dead_code)]

pub mod completions;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct Client {
    client: reqwest::Client,
    base_url: String,
    request_timeout: std::time::Duration,
}

#[derive(serde::Serialize)]
struct WrappedRequest<'a, T> {
    stream: bool,

    #[serde(flatten)]
    req: &'a T,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("request: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("request: {0} ({1})")]
    ReqwestWithBody(reqwest::Error, String),

    #[error("serde: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("invalid api key: {0}")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),
}

impl Client {
    pub fn new(api_key: impl AsRef<str>, base_url: impl Into<String>, request_timeout: std::time::Duration) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::CONTENT_TYPE, reqwest::header::HeaderValue::from_static("application/json"));
        headers.insert(reqwest::header::AUTHORIZATION, format!("Bearer {}", api_key.as_ref()).parse()?);
        Ok(Self {
            client: reqwest::ClientBuilder::new().default_headers(headers).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn do_request<Req, Resp>(&self, path: &str, req: &Req) -> Result<Resp, Error>
    where
        Req: serde::Serialize,
        Resp: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let send = async {
            let resp = self
                .client
                .post(&url)
                .json(&WrappedRequest { stream: false, req })
                .send()
                .await
                .map_err(|e| e.without_url())?;

            if let Err(e) = resp.error_for_status_ref() {
                let body = resp.text().await.map_err(|e| e.without_url())?;
                return Err(Error::ReqwestWithBody(e.without_url(), body));
            }

            // Read the body as text first so a bad payload surfaces as a serde error.
            let body = resp.text().await.map_err(|e| e.without_url())?;
            Ok::<_, Error>(serde_json::from_str::<Resp>(&body)?)
        };

        tokio::time::timeout(self.request_timeout, send)
            .await
            .map_err(|_| Error::Timeout(self.request_timeout))?
    }

    pub async fn create_completion(&self, req: &completions::CreateRequest) -> Result<completions::CreateResponse, Error> {
        self.do_request("completions", req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> Client {
        Client::new("sk-test", base_url, std::time::Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash() {
        assert_eq!(test_client("http://localhost:1234/v1/").base_url(), "http://localhost:1234/v1");
    }

    #[test]
    fn test_invalid_api_key() {
        let err = Client::new("sk-\nbad", DEFAULT_BASE_URL, std::time::Duration::from_secs(5)).err().unwrap();
        assert!(matches!(err, Error::InvalidApiKey(..)));
    }

    #[test]
    fn test_wrapped_request_never_streams() {
        let mut req = completions::CreateRequest::playground();
        req.prompt = "hello".to_string();
        req.stream = true;
        let v = serde_json::to_value(WrappedRequest { stream: false, req: &req }).unwrap();
        assert_eq!(v["stream"], serde_json::json!(false));
        assert_eq!(v["prompt"], serde_json::json!("hello"));
    }

    #[tokio::test]
    async fn test_create_completion() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/completions"))
            .and(wiremock::matchers::header("authorization", "Bearer sk-test"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "model": "text-davinci-003",
                "prompt": "hello",
                "stream": false,
            })))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cmpl-1",
                "object": "text_completion",
                "created": 1,
                "model": "text-davinci-003",
                "choices": [{"text": " world", "index": 0, "logprobs": null, "finish_reason": "stop"}],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut req = completions::CreateRequest::playground();
        req.prompt = "hello".to_string();
        let resp = test_client(&server.uri()).create_completion(&req).await.unwrap();
        assert_eq!(resp.choices.len(), 1);
        assert_eq!(resp.choices[0].text, " world");
        assert_eq!(resp.choices[0].finish_reason, "stop");
    }

    #[tokio::test]
    async fn test_create_completion_error_status_keeps_body() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(401).set_body_string("{\"error\":{\"message\":\"bad key\"}}"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .create_completion(&completions::CreateRequest::playground())
            .await
            .err()
            .unwrap();
        match err {
            Error::ReqwestWithBody(e, body) => {
                assert_eq!(e.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
                assert!(body.contains("bad key"));
            }
            e => panic!("unexpected error: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_create_completion_malformed_body() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .create_completion(&completions::CreateRequest::playground())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::SerdeJson(..)));
    }

    #[tokio::test]
    async fn test_create_completion_timeout() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"choices": []}))
                    .set_delay(std::time::Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = Client::new("sk-test", server.uri(), std::time::Duration::from_millis(100)).unwrap();
        let err = client.create_completion(&completions::CreateRequest::playground()).await.err().unwrap();
        assert!(matches!(err, Error::Timeout(..)));
    }
}
