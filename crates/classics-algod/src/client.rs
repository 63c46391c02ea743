//! algod REST client and the ledger contract built on it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use classics_anchor::{AssetParams, LedgerClient, LedgerError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::account::{Address, Signer};
use crate::config::AlgodConfig;
use crate::errors::AlgodError;
use crate::transaction::{AssetDefinition, Header, SuggestedParams, Transaction};

const TOKEN_HEADER: &str = "X-Algo-API-Token";

/// Response of `GET /v2/transactions/params`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransactionParams {
    /// Fee per byte.
    pub fee: u64,
    /// Minimum fee.
    pub min_fee: u64,
    /// Latest round.
    pub last_round: u64,
    /// Genesis id.
    pub genesis_id: String,
    /// Base64 genesis hash.
    pub genesis_hash: String,
}

/// Response of `GET /v2/transactions/pending/{txid}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingTransaction {
    /// Round the transaction was confirmed in; zero while pending.
    #[serde(default)]
    pub confirmed_round: u64,
    /// Non-empty when the pool evicted the transaction.
    #[serde(default)]
    pub pool_error: String,
    /// Asset created by the transaction, if any.
    #[serde(default)]
    pub asset_index: Option<u64>,
}

/// Response of `GET /v2/status`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeStatus {
    /// Latest round.
    pub last_round: u64,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(rename = "txId")]
    tx_id: String,
}

/// algod endpoints used by [`AlgodClient`].
pub trait AlgodApi {
    /// `GET /v2/transactions/params`
    fn transaction_params(&self) -> Result<TransactionParams, AlgodError>;
    /// `POST /v2/transactions`; returns the transaction id.
    fn send_raw_transaction(&self, signed: &[u8]) -> Result<String, AlgodError>;
    /// `GET /v2/transactions/pending/{txid}`
    fn pending_transaction(&self, txn_id: &str) -> Result<PendingTransaction, AlgodError>;
    /// `GET /v2/status`
    fn status(&self) -> Result<NodeStatus, AlgodError>;
    /// `GET /v2/status/wait-for-block-after/{round}`
    fn status_after_block(&self, round: u64) -> Result<NodeStatus, AlgodError>;
}

/// Blocking HTTP implementation of [`AlgodApi`].
pub struct HttpApi {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl HttpApi {
    /// Creates a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AlgodError> {
        let response = self
            .agent
            .get(&format!("{}{}", self.base_url, path))
            .set(TOKEN_HEADER, &self.token)
            .call()
            .map_err(http_error)?;
        read_json(response)
    }
}

fn http_error(error: ureq::Error) -> AlgodError {
    match error {
        ureq::Error::Status(status, response) => {
            let message = response
                .into_string()
                .unwrap_or_else(|_| "unable to read algod response body".to_string());
            AlgodError::Http {
                status: Some(status),
                message,
            }
        }
        ureq::Error::Transport(transport) => AlgodError::Http {
            status: None,
            message: transport.to_string(),
        },
    }
}

fn read_json<T: DeserializeOwned>(response: ureq::Response) -> Result<T, AlgodError> {
    let body = response
        .into_string()
        .map_err(|e| AlgodError::Decode(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| AlgodError::Decode(e.to_string()))
}

impl AlgodApi for HttpApi {
    fn transaction_params(&self) -> Result<TransactionParams, AlgodError> {
        self.get_json("/v2/transactions/params")
    }

    fn send_raw_transaction(&self, signed: &[u8]) -> Result<String, AlgodError> {
        let response = self
            .agent
            .post(&format!("{}/v2/transactions", self.base_url))
            .set(TOKEN_HEADER, &self.token)
            .set("Content-Type", "application/x-binary")
            .send_bytes(signed)
            .map_err(http_error)?;
        let submitted: SubmitResponse = read_json(response)?;
        Ok(submitted.tx_id)
    }

    fn pending_transaction(&self, txn_id: &str) -> Result<PendingTransaction, AlgodError> {
        self.get_json(&format!("/v2/transactions/pending/{}", txn_id))
    }

    fn status(&self) -> Result<NodeStatus, AlgodError> {
        self.get_json("/v2/status")
    }

    fn status_after_block(&self, round: u64) -> Result<NodeStatus, AlgodError> {
        self.get_json(&format!("/v2/status/wait-for-block-after/{}", round))
    }
}

/// Ledger client signing with the custodial key and submitting through algod.
pub struct AlgodClient<A = HttpApi> {
    api: A,
    signer: Signer,
    network: Option<String>,
    confirmation_rounds: u64,
    validity_window: u64,
}

impl AlgodClient<HttpApi> {
    /// Validates `config` and builds an HTTP-backed client.
    pub fn from_config(config: &AlgodConfig) -> Result<Self, AlgodError> {
        config.validate()?;
        let signer = Signer::from_seed_b64(&config.signing_seed_b64)?;
        let api = HttpApi::new(
            &config.algod_url,
            &config.algod_token,
            Duration::from_secs(config.timeout_secs),
        );
        Ok(Self::with_api(api, signer, config))
    }
}

impl<A: AlgodApi> AlgodClient<A> {
    /// Builds a client over any [`AlgodApi`].
    pub fn with_api(api: A, signer: Signer, config: &AlgodConfig) -> Self {
        Self {
            api,
            signer,
            network: config.network.clone(),
            confirmation_rounds: config.confirmation_rounds,
            validity_window: config.validity_window,
        }
    }

    /// Underlying API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Custodial account address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Whether algod answers a status request.
    pub fn is_online(&self) -> bool {
        match self.api.status() {
            Ok(status) => {
                debug!(last_round = status.last_round, "algod online");
                true
            }
            Err(err) => {
                warn!(error = %err, "algod status check failed");
                false
            }
        }
    }

    /// Current network parameters, checked against the configured network.
    pub fn suggested_params(&self) -> Result<SuggestedParams, AlgodError> {
        let params = self.api.transaction_params()?;
        if let Some(expected) = &self.network {
            if !params.genesis_id.starts_with(expected.as_str()) {
                return Err(AlgodError::NetworkMismatch {
                    expected: expected.clone(),
                    actual: params.genesis_id,
                });
            }
        }
        let hash = STANDARD
            .decode(params.genesis_hash.as_bytes())
            .map_err(|e| AlgodError::Decode(format!("genesis hash: {e}")))?;
        let genesis_hash: [u8; 32] = hash
            .try_into()
            .map_err(|_| AlgodError::Decode("genesis hash must be 32 bytes".into()))?;
        Ok(SuggestedParams {
            fee_per_byte: params.fee,
            min_fee: params.min_fee,
            last_round: params.last_round,
            genesis_id: params.genesis_id,
            genesis_hash,
        })
    }

    /// Polls until `txn_id` confirms, the pool rejects it, or the round budget runs out.
    pub fn wait_for_confirmation(&self, txn_id: &str) -> Result<PendingTransaction, AlgodError> {
        let start = self.api.status()?.last_round + 1;
        let mut round = start;
        while round < start + self.confirmation_rounds {
            let pending = self.api.pending_transaction(txn_id)?;
            if pending.confirmed_round > 0 {
                debug!(txn_id, confirmed_round = pending.confirmed_round, "transaction confirmed");
                return Ok(pending);
            }
            if !pending.pool_error.is_empty() {
                return Err(AlgodError::PoolRejected {
                    txn_id: txn_id.to_string(),
                    reason: pending.pool_error,
                });
            }
            self.api.status_after_block(round)?;
            round += 1;
        }
        Err(AlgodError::ConfirmationTimeout {
            txn_id: txn_id.to_string(),
            rounds: self.confirmation_rounds,
        })
    }

    fn submit(&self, mut txn: Transaction, params: &SuggestedParams) -> Result<(String, PendingTransaction), AlgodError> {
        txn.assign_fee(params);
        let (txn_id, signed) = txn.sign(&self.signer);
        let accepted = self.api.send_raw_transaction(&signed)?;
        if accepted != txn_id {
            warn!(local = %txn_id, remote = %accepted, "algod reported a different transaction id");
        }
        debug!(txn_id = %txn_id, fee = txn.header.fee, "transaction broadcast");
        let pending = self
            .wait_for_confirmation(&txn_id)
            .map_err(|err| after_broadcast(&txn_id, err))?;
        Ok((txn_id, pending))
    }

    fn resolve(&self, address: &Option<String>) -> Result<Address, AlgodError> {
        match address {
            Some(text) => text.parse(),
            None => Ok(self.signer.address()),
        }
    }

    fn create(&self, params: &AssetParams) -> Result<(u64, String), AlgodError> {
        let suggested = self.suggested_params()?;
        let definition = AssetDefinition {
            total: params.total,
            decimals: params.decimals,
            default_frozen: params.default_frozen,
            unit_name: params.unit_name.clone(),
            asset_name: params.asset_name.clone(),
            url: params.url.clone(),
            manager: self.resolve(&params.manager)?,
            reserve: self.resolve(&params.reserve)?,
            freeze: self.resolve(&params.freeze)?,
            clawback: self.resolve(&params.clawback)?,
        };
        let header = Header::new(
            self.signer.address(),
            &suggested,
            self.validity_window,
            params.note.clone(),
        );
        let (txn_id, pending) = self.submit(Transaction::asset_create(header, definition), &suggested)?;
        let asset_id = pending
            .asset_index
            .filter(|&id| id > 0)
            .ok_or_else(|| AlgodError::MissingAssetIndex(txn_id.clone()))?;
        info!(asset_id, txn_id = %txn_id, "asset created");
        Ok((asset_id, txn_id))
    }

    fn transfer_to_self(&self, asset_id: u64, note: &[u8]) -> Result<String, AlgodError> {
        let suggested = self.suggested_params()?;
        let header = Header::new(
            self.signer.address(),
            &suggested,
            self.validity_window,
            note.to_vec(),
        );
        let (txn_id, _) = self.submit(Transaction::self_transfer(header, asset_id), &suggested)?;
        info!(asset_id, txn_id = %txn_id, "asset self-transfer confirmed");
        Ok(txn_id)
    }
}

/// Once a transaction is broadcast, only a timeout or a pool eviction is a
/// definite outcome. Any other polling failure leaves it unknown.
fn after_broadcast(txn_id: &str, err: AlgodError) -> AlgodError {
    match err {
        AlgodError::ConfirmationTimeout { .. } | AlgodError::PoolRejected { .. } => err,
        other => {
            warn!(txn_id, error = %other, "lost track of broadcast transaction");
            AlgodError::Unconfirmed {
                txn_id: txn_id.to_string(),
                reason: other.to_string(),
            }
        }
    }
}

impl<A: AlgodApi> LedgerClient for AlgodClient<A> {
    fn create_asset(&self, params: &AssetParams) -> Result<(u64, String), LedgerError> {
        Ok(self.create(params)?)
    }

    fn self_transfer_asset(&self, asset_id: u64, note: &[u8]) -> Result<String, LedgerError> {
        Ok(self.transfer_to_self(asset_id, note)?)
    }
}
