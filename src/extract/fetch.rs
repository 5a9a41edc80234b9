use super::ExtractError;

/// Recipe sites routinely refuse requests without a browser user agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, ExtractError> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
        .map_err(|e| ExtractError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(ExtractError::FetchFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    response.text().await.map_err(|e| ExtractError::FetchFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
