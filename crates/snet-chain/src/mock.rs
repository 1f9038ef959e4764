//! Scriptable in-memory chain for tests and local runs.

use std::collections::VecDeque;

use parking_lot::Mutex;
use rand::Rng;

use snet_core::{BoxFuture, Felt};

use crate::client::{ChainClient, ChainError, FinalityStatus, TxHash};

/// One recorded `invoke` call.
#[derive(Debug, Clone)]
pub struct RecordedInvoke {
    pub entry_point: String,
    pub calldata: Vec<Felt>,
    pub tx_hash: TxHash,
}

#[derive(Debug, Default)]
struct MockState {
    invocations: Vec<RecordedInvoke>,
    /// Statuses handed out per status query, oldest first. When empty,
    /// every transaction reports `AcceptedOnL2`.
    status_script: VecDeque<Result<FinalityStatus, String>>,
    /// When set, the next invoke fails with this message.
    invoke_failure: Option<String>,
    /// Scripted results for read-only calls, keyed by entry point.
    call_results: Vec<(String, Vec<Felt>)>,
}

/// In-memory [`ChainClient`]. Accepts every invoke by default; tests
/// script failures and finality sequences.
#[derive(Debug, Default)]
pub struct MockChainClient {
    state: Mutex<MockState>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a finality status for the next status query.
    pub fn push_status(&self, status: FinalityStatus) {
        self.state.lock().status_script.push_back(Ok(status));
    }

    /// Queue a transport failure for the next status query.
    pub fn push_status_unavailable(&self, reason: &str) {
        self.state
            .lock()
            .status_script
            .push_back(Err(reason.to_string()));
    }

    /// Make the next invoke fail.
    pub fn fail_next_invoke(&self, reason: &str) {
        self.state.lock().invoke_failure = Some(reason.to_string());
    }

    /// Script the result of a read-only call to `entry_point`.
    pub fn script_call(&self, entry_point: &str, result: Vec<Felt>) {
        self.state
            .lock()
            .call_results
            .push((entry_point.to_string(), result));
    }

    /// All invokes recorded so far.
    pub fn invocations(&self) -> Vec<RecordedInvoke> {
        self.state.lock().invocations.clone()
    }

    fn random_tx_hash() -> TxHash {
        let mut rng = rand::thread_rng();
        let bytes: [u8; 16] = rng.gen();
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        TxHash(format!("0x{hex}"))
    }
}

impl ChainClient for MockChainClient {
    fn invoke<'a>(
        &'a self,
        entry_point: &'a str,
        calldata: &'a [Felt],
    ) -> BoxFuture<'a, Result<TxHash, ChainError>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            if let Some(reason) = state.invoke_failure.take() {
                return Err(ChainError::TransactionFailed(reason));
            }
            let tx_hash = Self::random_tx_hash();
            state.invocations.push(RecordedInvoke {
                entry_point: entry_point.to_string(),
                calldata: calldata.to_vec(),
                tx_hash: tx_hash.clone(),
            });
            Ok(tx_hash)
        })
    }

    fn transaction_status<'a>(
        &'a self,
        _tx_hash: &'a TxHash,
    ) -> BoxFuture<'a, Result<FinalityStatus, ChainError>> {
        Box::pin(async move {
            match self.state.lock().status_script.pop_front() {
                Some(Ok(status)) => Ok(status),
                Some(Err(reason)) => Err(ChainError::Unavailable(reason)),
                None => Ok(FinalityStatus::AcceptedOnL2),
            }
        })
    }

    fn call<'a>(
        &'a self,
        entry_point: &'a str,
        _calldata: &'a [Felt],
    ) -> BoxFuture<'a, Result<Vec<Felt>, ChainError>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            if let Some(pos) = state
                .call_results
                .iter()
                .position(|(ep, _)| ep == entry_point)
            {
                let (_, result) = state.call_results.remove(pos);
                return Ok(result);
            }
            Ok(vec![Felt::ZERO])
        })
    }
}
