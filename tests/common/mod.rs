//! In-memory fakes shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use faucet_console::chain::{Address, ChainClient, ChainConnector, Signer, TxHash, U256};
use faucet_console::chat::ChatSender;
use faucet_console::clock::ManualClock;
use faucet_console::dispatch::{Dispatcher, SignatureVerifier};
use faucet_console::queue::{Job, JobQueue};
use faucet_console::router::{CommandRouter, Outcome};
use faucet_console::state::Repository;
use faucet_console::store::MemoryStore;
use faucet_console::{Error, Result};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CHAT_ID: i64 = 100;
pub const CHAIN_ID: u64 = 1337;
pub const START_MILLIS: u64 = 1_700_000_000_000;
pub const SIGNING_KEY: &str = "queue-current-key";
pub const PREVIOUS_SIGNING_KEY: &str = "queue-previous-key";
pub const DESTINATION: &str = "https://dispatcher.example/";
pub const FAUCET_KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";
pub const RECIPIENT: &str = "0x1111111111111111111111111111111111111111";
pub const OTHER_RECIPIENT: &str = "0x2222222222222222222222222222222222222222";
pub const USDC_ADDRESS: &str = "0x3333333333333333333333333333333333333333";
/// Checksummed address of `FAUCET_KEY`.
pub const FAUCET_ADDRESS: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";

pub fn rpc_set_command() -> String {
    format!(
        "/rpc set {} localnet http://127.0.0.1:8545/ $eth 18 https://explorer.example {}",
        CHAIN_ID, FAUCET_KEY
    )
}

// =============================================================================
// Chat
// =============================================================================

#[derive(Debug, Default)]
pub struct RecordingChat {
    sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingChat {
    pub fn messages(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_text(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, text)| text.clone())
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatSender for RecordingChat {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

// =============================================================================
// Queue
// =============================================================================

#[derive(Debug, Default)]
pub struct RecordingQueue {
    jobs: Mutex<Vec<Job>>,
    fail: AtomicBool,
}

impl RecordingQueue {
    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl JobQueue for RecordingQueue {
    async fn enqueue(&self, job: &Job) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::queue("queue unavailable"));
        }
        self.jobs.lock().unwrap().push(job.clone());
        Ok(())
    }
}

// =============================================================================
// Chain
// =============================================================================

/// One submitted transfer; `token` is `None` for native value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub token: Option<Address>,
    pub to: Address,
    pub value: U256,
}

#[derive(Debug)]
pub struct FakeChain {
    pub chain_id: AtomicU64,
    pub reachable: AtomicBool,
    pub revert: AtomicBool,
    pub balance: Mutex<U256>,
    pub token_balance: Mutex<U256>,
    transfers: Mutex<Vec<Transfer>>,
    connected_urls: Mutex<Vec<String>>,
}

impl Default for FakeChain {
    fn default() -> Self {
        Self {
            chain_id: AtomicU64::new(CHAIN_ID),
            reachable: AtomicBool::new(true),
            revert: AtomicBool::new(false),
            balance: Mutex::new(U256::ZERO),
            token_balance: Mutex::new(U256::ZERO),
            transfers: Mutex::new(Vec::new()),
            connected_urls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeChain {
    pub fn transfers(&self) -> Vec<Transfer> {
        self.transfers.lock().unwrap().clone()
    }

    pub fn connected_urls(&self) -> Vec<String> {
        self.connected_urls.lock().unwrap().clone()
    }

    fn check_reachable(&self) -> Result<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::chain("connection refused"))
        }
    }

    fn record(&self, transfer: Transfer) -> TxHash {
        let mut transfers = self.transfers.lock().unwrap();
        transfers.push(transfer);
        TxHash::new(format!("0x{:064x}", transfers.len()))
    }
}

/// Shares one [`FakeChain`] across every connection.
#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    pub chain: Arc<FakeChain>,
}

#[derive(Debug)]
struct FakeClient(Arc<FakeChain>);

impl ChainConnector for FakeConnector {
    fn connect(&self, rpc_url: &str) -> Result<Arc<dyn ChainClient>> {
        self.chain
            .connected_urls
            .lock()
            .unwrap()
            .push(rpc_url.to_string());
        Ok(Arc::new(FakeClient(self.chain.clone())))
    }
}

#[async_trait]
impl ChainClient for FakeClient {
    async fn chain_id(&self) -> Result<u64> {
        self.0.check_reachable()?;
        Ok(self.0.chain_id.load(Ordering::SeqCst))
    }

    async fn native_balance(&self, _owner: Address) -> Result<U256> {
        self.0.check_reachable()?;
        Ok(*self.0.balance.lock().unwrap())
    }

    async fn token_balance(&self, _token: Address, _owner: Address) -> Result<U256> {
        self.0.check_reachable()?;
        Ok(*self.0.token_balance.lock().unwrap())
    }

    async fn send_native(&self, _signer: &Signer, to: Address, value: U256) -> Result<TxHash> {
        self.0.check_reachable()?;
        Ok(self.0.record(Transfer {
            token: None,
            to,
            value,
        }))
    }

    async fn send_token(
        &self,
        _signer: &Signer,
        token: Address,
        to: Address,
        value: U256,
    ) -> Result<TxHash> {
        self.0.check_reachable()?;
        Ok(self.0.record(Transfer {
            token: Some(token),
            to,
            value,
        }))
    }

    async fn wait_for_receipt(&self, _tx: &TxHash) -> Result<()> {
        if self.0.revert.load(Ordering::SeqCst) {
            return Err(Error::chain("transaction reverted"));
        }
        Ok(())
    }
}

// =============================================================================
// Harness
// =============================================================================

/// Router and dispatcher wired to the same store and fakes.
#[derive(Debug)]
pub struct Harness {
    pub repo: Repository,
    pub router: CommandRouter,
    pub dispatcher: Dispatcher,
    pub chat: Arc<RecordingChat>,
    pub queue: Arc<RecordingQueue>,
    pub chain: Arc<FakeChain>,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new() -> Self {
        let repo = Repository::new(Arc::new(MemoryStore::new()));
        let connector = FakeConnector::default();
        let chain = connector.chain.clone();
        let connector = Arc::new(connector);
        let chat = Arc::new(RecordingChat::default());
        let queue = Arc::new(RecordingQueue::default());
        let clock = ManualClock::new(START_MILLIS);

        let router = CommandRouter::new(
            repo.clone(),
            connector.clone(),
            chat.clone(),
            queue.clone(),
            Arc::new(clock.clone()),
        );
        let verifier = SignatureVerifier::new(
            SIGNING_KEY,
            Some(PREVIOUS_SIGNING_KEY.to_string()),
            Some(DESTINATION.to_string()),
            Duration::from_secs(5),
        );
        let dispatcher = Dispatcher::new(
            repo.clone(),
            connector,
            chat.clone(),
            verifier,
            Arc::new(clock.clone()),
        );

        Self {
            repo,
            router,
            dispatcher,
            chat,
            queue,
            chain,
            clock,
        }
    }

    /// A harness with `alice` as superadmin and the chain configured.
    pub async fn operational() -> Self {
        let harness = Self::new();
        harness.say("alice", "/start").await;
        let outcome = harness.say("alice", &rpc_set_command()).await;
        assert!(
            matches!(&outcome, Outcome::Reply(text) if text.starts_with("RPC set successfully.")),
            "{:?}",
            outcome
        );
        harness
    }

    pub async fn say(&self, username: &str, text: &str) -> Outcome {
        self.router.handle_update(&update(username, text)).await
    }

    pub fn now_secs(&self) -> u64 {
        use faucet_console::clock::Clock;
        self.clock.now_secs()
    }
}

pub fn update(username: &str, text: &str) -> Value {
    json!({
        "update_id": 1,
        "message": {
            "message_id": 7,
            "chat": {"id": CHAT_ID, "type": "group"},
            "from": {"id": 9, "username": username},
            "text": text
        }
    })
}

pub fn job_body(address: &str, amount: &str, token: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "chatId": CHAT_ID,
        "address": address,
        "amount": amount,
        "token": token
    }))
    .unwrap()
}

pub fn reply_text(outcome: &Outcome) -> &str {
    match outcome {
        Outcome::Reply(text) => text,
        other => panic!("expected a reply, got {:?}", other),
    }
}
