//! HTTP adapters for the remote collaborators. Each client wraps a base URL
//! and a shared connection pool with a request timeout; non-2xx responses are
//! surfaced as rejections, everything else as transport failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;

use lendflow::contracts::{
    AgreementId, ClientId, CreateAgreementRequest, CreateAgreementResponse, DisbursementRequest,
    Product, ProductRequest, ProductsResponse, ScoringRequest, ScoringResponse,
};
use lendflow::error::AppError;
use lendflow::origination::{AgreementGateway, DisbursementGateway, GatewayError, ScoringGateway};

const REQUEST_TIMEOUT_SECS: u64 = 30;

fn http_client() -> Result<Client, AppError> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|err| AppError::Io(std::io::Error::other(err)))
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

async fn rejection(response: reqwest::Response) -> GatewayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    GatewayError::Rejected(format!("{status}: {body}"))
}

pub(crate) struct HttpAgreementGateway {
    client: Client,
    base_url: String,
}

impl HttpAgreementGateway {
    pub(crate) fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl AgreementGateway for HttpAgreementGateway {
    async fn products(&self) -> Result<Vec<Product>, GatewayError> {
        let url = format!("{}/api/v1/products", self.base_url);
        let response = self.client.get(&url).send().await.map_err(transport)?;

        if response.status().is_success() {
            let body: ProductsResponse = response.json().await.map_err(transport)?;
            Ok(body.products)
        } else {
            Err(rejection(response).await)
        }
    }

    async fn create_agreement(
        &self,
        client_id: &ClientId,
        product: ProductRequest,
    ) -> Result<AgreementId, GatewayError> {
        let url = format!("{}/api/v1/agreements", self.base_url);
        let request = CreateAgreementRequest {
            client_id: client_id.clone(),
            product,
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        if response.status().is_success() {
            let body: CreateAgreementResponse = response.json().await.map_err(transport)?;
            Ok(body.agreement_id)
        } else {
            Err(rejection(response).await)
        }
    }
}

pub(crate) struct HttpScoringGateway {
    client: Client,
    base_url: String,
}

impl HttpScoringGateway {
    pub(crate) fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ScoringGateway for HttpScoringGateway {
    async fn score(
        &self,
        client_id: &ClientId,
        agreement_id: &AgreementId,
        salary: Decimal,
    ) -> Result<i32, GatewayError> {
        let url = format!("{}/api/v1/scoring", self.base_url);
        let request = ScoringRequest {
            client_id: client_id.clone(),
            agreement_id: agreement_id.clone(),
            salary,
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        if response.status().is_success() {
            let body: ScoringResponse = response.json().await.map_err(transport)?;
            Ok(body.score)
        } else {
            Err(rejection(response).await)
        }
    }
}

pub(crate) struct HttpDisbursementGateway {
    client: Client,
    base_url: String,
}

impl HttpDisbursementGateway {
    pub(crate) fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl DisbursementGateway for HttpDisbursementGateway {
    async fn disburse(
        &self,
        agreement_id: &AgreementId,
        amount: Decimal,
    ) -> Result<(), GatewayError> {
        let url = format!("{}/api/v1/disbursements", self.base_url);
        let request = DisbursementRequest {
            agreement_id: agreement_id.clone(),
            amount,
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejection(response).await)
        }
    }
}
