use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use http::{header::ACCEPT, Request, Response};
use url::Url;

/// Generic HTTP client.
///
/// A trait is used here so to facilitate native HTTP/TLS when compiled for mobile applications.
#[async_trait]
pub trait AsyncHttpClient {
    async fn execute(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>>;
}

pub(crate) fn base_request() -> http::request::Builder {
    Request::builder().header(ACCEPT, "application/json")
}

/// Issue a `GET` to `url` and return the body as UTF-8 text.
///
/// Fails on transport errors, non-success statuses, bodies over `max_size` bytes and
/// non-UTF-8 bodies.
///
/// `max_size` is checked on the body returned by the [AsyncHttpClient], i.e. after it has been
/// downloaded. Clients that must not buffer large bodies have to bound reads themselves.
pub(crate) async fn get_text<H: AsyncHttpClient + ?Sized>(
    http_client: &H,
    url: &Url,
    max_size: Option<usize>,
) -> Result<String> {
    let request = base_request()
        .method("GET")
        .uri(url.as_str())
        .body(vec![])
        .context(format!("failed to build request for {url}"))?;

    let response = http_client
        .execute(request)
        .await
        .context(format!("failed to make request at {url}"))?;

    let status = response.status();
    let body = response.into_body();

    if let Some(max_size) = max_size {
        if body.len() > max_size {
            bail!(
                "response from {url} exceeds the maximum size ({} > {max_size} bytes)",
                body.len()
            )
        }
    }

    let Ok(body) = String::from_utf8(body) else {
        bail!("failed to parse response as UTF-8 from {url} (status: {status})")
    };

    if !status.is_success() {
        bail!("request to {url} was unsuccessful (status: {status}): {body}")
    }

    Ok(body)
}

#[derive(Debug)]
pub struct ReqwestClient(reqwest::Client);

impl AsRef<reqwest::Client> for ReqwestClient {
    fn as_ref(&self) -> &reqwest::Client {
        &self.0
    }
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .context("unable to build http_client")
            .map(Self)
    }
}

#[async_trait]
impl AsyncHttpClient for ReqwestClient {
    async fn execute(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let response = self
            .0
            .execute(request.try_into().context("unable to convert request")?)
            .await
            .context("http request failed")?;

        let mut builder = Response::builder()
            .status(response.status())
            .version(response.version());

        builder
            .headers_mut()
            .context("unable to set headers")?
            .extend(response.headers().clone());

        builder
            .body(
                response
                    .bytes()
                    .await
                    .context("failed to extract response body")?
                    .to_vec(),
            )
            .context("unable to construct response")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct StaticClient {
        status: u16,
        body: Vec<u8>,
    }

    #[async_trait]
    impl AsyncHttpClient for StaticClient {
        async fn execute(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
            assert_eq!(request.method(), http::Method::GET);
            assert_eq!(
                request.headers().get(ACCEPT).unwrap(),
                "application/json"
            );
            Ok(Response::builder()
                .status(self.status)
                .body(self.body.clone())
                .unwrap())
        }
    }

    fn url() -> Url {
        "https://issuer.example/offer/1".parse().unwrap()
    }

    #[tokio::test]
    async fn get_text_success() {
        let client = StaticClient {
            status: 200,
            body: b"{}".to_vec(),
        };
        assert_eq!(get_text(&client, &url(), None).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn get_text_rejects_error_status() {
        let client = StaticClient {
            status: 404,
            body: b"not found".to_vec(),
        };
        let err = get_text(&client, &url(), None).await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn get_text_rejects_oversized_body() {
        let client = StaticClient {
            status: 200,
            body: vec![b'a'; 16],
        };
        assert!(get_text(&client, &url(), Some(8)).await.is_err());
        assert!(get_text(&client, &url(), Some(16)).await.is_ok());
    }

    #[tokio::test]
    async fn get_text_rejects_invalid_utf8() {
        let client = StaticClient {
            status: 200,
            body: vec![0xff, 0xfe],
        };
        assert!(get_text(&client, &url(), None).await.is_err());
    }
}
