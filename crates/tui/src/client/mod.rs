use api_types::{
    ErrorResponse,
    category::Category,
    transaction::{Transaction, TransactionNew},
    user::User,
};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base_url: {0}")]
    InvalidUrl(String),
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("server unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Short text for the status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { status, .. } if status.is_client_error() => {
                "Invalid data, please check your input.".to_string()
            }
            Self::Status { status, .. } if status.is_server_error() => {
                "Server error, please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::InvalidUrl(err.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let res = self.http.get(self.endpoint(path)?).send().await?;
        Ok(check(res).await?.json::<T>().await?)
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        self.get("categories").await
    }

    pub async fn transactions(&self) -> Result<Vec<Transaction>, ClientError> {
        self.get("transactions").await
    }

    pub async fn users(&self) -> Result<Vec<User>, ClientError> {
        self.get("users").await
    }

    pub async fn create_transaction(
        &self,
        payload: &TransactionNew,
    ) -> Result<Transaction, ClientError> {
        let res = self
            .http
            .post(self.endpoint("transactions")?)
            .json(payload)
            .send()
            .await?;
        Ok(check(res).await?.json::<Transaction>().await?)
    }

    pub async fn delete_transaction(&self, id: i64) -> Result<(), ClientError> {
        let res = self
            .http
            .delete(self.endpoint(&format!("transactions/{id}"))?)
            .send()
            .await?;
        check(res).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into [`ClientError::Status`].
async fn check(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let text = res.text().await.unwrap_or_default();
    let body = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(err) => err.error,
        Err(_) if text.is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => text,
    };
    Err(ClientError::Status { status, body })
}
