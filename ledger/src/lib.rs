//! Ledger collaborator for the FIR client.
//!
//! The ledger is the authoritative store of case records and role-defining
//! facts (government account, active police set). This crate defines the
//! [`Ledger`] trait the rest of the workspace programs against, plus the
//! network glue: a JSON-RPC HTTP client, a WebSocket push-notification feed,
//! and a relay client for fee-less submission.

pub mod client;
pub mod error;
pub mod event;
pub mod feed;
pub mod relay;
pub mod rpc;

pub use client::{InclusionReceipt, Ledger};
pub use error::LedgerError;
pub use event::{EventKind, LedgerEvent};
pub use feed::EventFeed;
pub use relay::{RelayClient, RelayTaskState};
pub use rpc::RpcLedger;
