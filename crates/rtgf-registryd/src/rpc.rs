//! JSON-RPC request routing for the registry server.

use serde::Deserialize;
use serde_json::{json, Value};

use rtgf_registry::time::parse_rfc3339;
use rtgf_registry::{
    Reason, RegistryError, TokenSet, VerificationRequest, VerificationService,
    VerificationVerdict,
};

// ── Error codes ───────────────────────────────────────────────────────────────

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
/// Unknown token or missing payload.
pub const NOT_FOUND: i64 = -32004;

// ── JSON-RPC helpers ──────────────────────────────────────────────────────────

pub fn ok_result(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

pub fn rpc_error(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message.into()
        }
    })
}

fn registry_error(id: Value, err: &RegistryError) -> Value {
    let code = match err {
        RegistryError::NotFound(_) => NOT_FOUND,
        RegistryError::InvalidIdentifier(_) => INVALID_PARAMS,
        _ => INTERNAL_ERROR,
    };
    rpc_error(id, code, err.to_string())
}

// ── Params ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct VerifyParams {
    #[serde(default)]
    tokens: TokenSet,
    #[serde(default)]
    now: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetParams {
    #[serde(default)]
    uri: String,
}

#[derive(Debug, Deserialize)]
struct LookupParams {
    #[serde(rename = "type", default)]
    token_type: String,
    #[serde(default)]
    slug: String,
}

// ── Server ────────────────────────────────────────────────────────────────────

pub struct RegistryServer {
    service: VerificationService,
}

impl RegistryServer {
    pub fn new(service: VerificationService) -> Self {
        Self { service }
    }

    /// Route a JSON-RPC request to the appropriate handler.
    pub fn handle_request(&self, request: Value) -> Value {
        let id = request.get("id").cloned().unwrap_or(Value::Null);
        let method = match request.get("method").and_then(|m| m.as_str()) {
            Some(m) => m.to_string(),
            None => return rpc_error(id, INVALID_REQUEST, "missing method"),
        };
        let params = request
            .get("params")
            .cloned()
            .unwrap_or(Value::Object(Default::default()));

        tracing::debug!(%method, "request");
        match method.as_str() {
            "ping" => ok_result(id, json!({})),
            "healthz" => self.handle_healthz(id),
            "verify" => self.handle_verify(id, params),
            "revocations/get" => ok_result(id, json!({ "revEpoch": self.service.read_epoch() })),
            "revocations/bump" => ok_result(id, json!({ "revEpoch": self.service.bump_epoch() })),
            "tokens/get" => self.handle_tokens_get(id, params),
            "tokens/lookup" => self.handle_tokens_lookup(id, params),
            "catalog" => self.handle_catalog(id),
            "jwks" => ok_result(id, self.service.jwks().clone()),
            "registry/reload" => self.handle_reload(id),
            _ => rpc_error(id, METHOD_NOT_FOUND, format!("method not found: {method}")),
        }
    }

    fn handle_healthz(&self, id: Value) -> Value {
        let snapshot = self.service.snapshot();
        ok_result(
            id,
            json!({
                "status": "ok",
                "registrySnapshotId": snapshot.snapshot_id(),
                "tokens": snapshot.index().len(),
                "verifier": self.service.verifier_name(),
                "revEpoch": self.service.read_epoch(),
            }),
        )
    }

    // ── verify ────────────────────────────────────────────────────────────────

    fn handle_verify(&self, id: Value, params: Value) -> Value {
        let params: VerifyParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!("undecodable verify params: {e}");
                let verdict =
                    VerificationVerdict::rejected(&Reason::InvalidRequest, self.service.read_epoch());
                return self.verdict_result(id, &verdict);
            }
        };

        let now = match params.now.as_deref().map(str::trim) {
            None | Some("") => self.service.config().now(),
            Some(raw) => match parse_rfc3339(raw) {
                Ok(ts) => ts,
                Err(e) => return rpc_error(id, INVALID_PARAMS, e.to_string()),
            },
        };

        let request = VerificationRequest {
            tokens: params.tokens,
        };
        let verdict = self.service.verify_at(&request, now);
        if !verdict.valid {
            tracing::info!(reason = %verdict.reason, "verification rejected");
        }
        self.verdict_result(id, &verdict)
    }

    fn verdict_result(&self, id: Value, verdict: &VerificationVerdict) -> Value {
        match serde_json::to_value(verdict) {
            Ok(v) => ok_result(id, v),
            Err(e) => rpc_error(id, INTERNAL_ERROR, e.to_string()),
        }
    }

    // ── tokens ────────────────────────────────────────────────────────────────

    fn handle_tokens_get(&self, id: Value, params: Value) -> Value {
        let params: GetParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return rpc_error(id, INVALID_PARAMS, e.to_string()),
        };
        let result = self.service.token_by_uri(&params.uri);
        payload_result(id, result)
    }

    fn handle_tokens_lookup(&self, id: Value, params: Value) -> Value {
        let params: LookupParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return rpc_error(id, INVALID_PARAMS, e.to_string()),
        };
        let result = self
            .service
            .token_by_type_slug(&params.token_type, &params.slug);
        payload_result(id, result)
    }

    // ── catalog / reload ──────────────────────────────────────────────────────

    fn handle_catalog(&self, id: Value) -> Value {
        match serde_json::to_value(self.service.catalog()) {
            Ok(v) => ok_result(id, v),
            Err(e) => rpc_error(id, INTERNAL_ERROR, e.to_string()),
        }
    }

    fn handle_reload(&self, id: Value) -> Value {
        match self.service.reload() {
            Ok(snapshot_id) => {
                tracing::info!(%snapshot_id, "registry reloaded");
                ok_result(id, json!({ "registrySnapshotId": snapshot_id }))
            }
            Err(e) => {
                tracing::warn!("reload failed, keeping current snapshot: {e}");
                registry_error(id, &e)
            }
        }
    }
}

/// Token payloads are returned as parsed JSON, exactly as stored.
fn payload_result(id: Value, result: Result<Vec<u8>, RegistryError>) -> Value {
    match result {
        Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
            Ok(v) => ok_result(id, v),
            Err(e) => rpc_error(id, INTERNAL_ERROR, format!("stored payload is not JSON: {e}")),
        },
        Err(e) => registry_error(id, &e),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
