//! Shared application state.

use std::sync::Arc;

use snet_chain::ChainClient;
use snet_pipeline::{
    InvoiceStore, MintingOrchestrator, ReceiptStore, VerificationOrchestrator, VerificationStore,
};
use snet_rails::WalletProvider;

/// Handles to the stores and orchestrators, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub invoices: Arc<InvoiceStore>,
    pub receipts: Arc<ReceiptStore>,
    pub verifications: Arc<VerificationStore>,
    pub minter: Arc<MintingOrchestrator>,
    pub verifier: Arc<VerificationOrchestrator>,
    pub chain: Arc<dyn ChainClient>,
    pub wallet: Arc<dyn WalletProvider>,
}
