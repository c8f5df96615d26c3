//! # Create Verification Handler
//!
//! Creates a verification for a subject address, generating the
//! presentation definition and challenge the holder's submission must
//! satisfy.

use anyhow::Context;
use http::StatusCode;
use verity_core::api::{Body, Handler, Request, Response};
use verity_core::key::is_ethereum_address;

use crate::error::invalid;
use crate::provider::{Configuration, Provider, VerificationStore};
use crate::results::solana;
use crate::types::{ChainRef, Cluster, CreateRequest, CreateResponse, Network, Verification};
use crate::{Error, Result, generate};

/// Create a verification.
///
/// # Errors
///
/// Returns `Error::InvalidRequest` if the network, subject, chain id or
/// registry address is missing or invalid for the network, or
/// `Error::ServerError` if the verification cannot be saved.
pub async fn create_verification(
    request: CreateRequest, provider: &impl Provider,
) -> Result<CreateResponse> {
    if request.network.trim().is_empty() {
        return Err(invalid!("network is required"));
    }
    let network: Network = request.network.trim().parse()?;

    let subject = request.subject.trim();
    if subject.is_empty() {
        return Err(invalid!("subject is required"));
    }

    let chain_id = match network {
        Network::Ethereum => {
            if !is_ethereum_address(subject) {
                return Err(invalid!("Invalid subject address for {network}"));
            }
            if let Some(registry) = request.registry_address.as_deref().filter(|r| !r.is_empty())
                && !is_ethereum_address(registry)
            {
                return Err(invalid!("Invalid registryAddress"));
            }
            ethereum_chain_id(request.chain_id.as_ref())?
        }
        Network::Solana => {
            solana::public_key(subject)?;
            solana_chain_id(request.chain_id.as_ref())?
        }
    };

    let config = Configuration::config(provider).await.context("issue loading configuration")?;
    let definition = generate::presentation_definition(config.trusted_issuers.as_deref());

    let mut verification = Verification::new(network, subject, generate::challenge(), definition);
    verification.chain_id = chain_id;
    verification.registry_address = request.registry_address.filter(|r| !r.is_empty());
    verification.name = request.name.filter(|n| !n.is_empty());
    verification.version = request.version.filter(|v| !v.is_empty());

    VerificationStore::create(provider, &verification).await.context("issue saving verification")?;
    tracing::info!(verification_id = %verification.id, %network, "verification created");

    Ok(CreateResponse {
        id: verification.id,
        challenge: verification.challenge,
        presentation_definition: verification.presentation_definition,
    })
}

fn ethereum_chain_id(chain_id: Option<&ChainRef>) -> Result<Option<u64>> {
    match chain_id {
        None => Ok(None),
        Some(ChainRef::Name(_)) => Err(invalid!("chainId must be a number")),
        Some(ChainRef::Id(id)) => match u64::try_from(*id) {
            Ok(id) if id > 0 => Ok(Some(id)),
            _ => Err(invalid!("chainId must be greater than 0")),
        },
    }
}

fn solana_chain_id(chain_id: Option<&ChainRef>) -> Result<Option<u64>> {
    match chain_id {
        None => Ok(None),
        Some(ChainRef::Id(_)) => Err(invalid!("chainId must be a string")),
        Some(ChainRef::Name(name)) => Ok(Some(name.parse::<Cluster>()?.chain_id())),
    }
}

impl<P: Provider> Handler<CreateResponse, P> for Request<CreateRequest> {
    type Error = Error;

    async fn handle(self, provider: &P) -> Result<Response<CreateResponse>> {
        let response = create_verification(self.body, provider).await?;
        Ok(Response::with_status(StatusCode::CREATED, response))
    }
}

impl Body for CreateRequest {}
