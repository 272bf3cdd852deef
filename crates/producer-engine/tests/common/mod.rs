//! In-memory broker used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use demo_producer_engine::{
    AdminError, BrokerClient, Delivery, Message, RandomSource, SendError, TopicCreated, TopicSpec,
};
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

/// How the broker answers one send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ack,
    Fail,
    /// Never answer, so the caller's deadline fires.
    Hang,
}

/// How the broker answers create-topic requests for topics it does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateBehavior {
    Create,
    CreateWithResultError(String),
    Reject(String),
}

/// Broker that keeps topics and sent messages in memory.
pub struct MemoryBroker {
    create: CreateBehavior,
    topics: Mutex<HashMap<String, TopicSpec>>,
    replies: Mutex<VecDeque<Reply>>,
    sent: Mutex<Vec<(Instant, Message)>>,
    offsets: Mutex<HashMap<i32, i64>>,
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new(CreateBehavior::Create)
    }
}

impl MemoryBroker {
    pub fn new(create: CreateBehavior) -> Self {
        Self {
            create,
            topics: Mutex::new(HashMap::new()),
            replies: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            offsets: Mutex::new(HashMap::new()),
        }
    }

    /// Script replies for the next sends. Sends past the script are acked.
    pub fn with_replies(self, replies: &[Reply]) -> Self {
        self.replies.lock().unwrap().extend(replies.iter().copied());
        self
    }

    pub fn topic(&self, name: &str) -> Option<TopicSpec> {
        self.topics.lock().unwrap().get(name).cloned()
    }

    /// Every message the loop attempted to send, in order.
    pub fn attempted(&self) -> Vec<Message> {
        self.sent.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }

    /// Time at which each send started.
    pub fn send_times(&self) -> Vec<Instant> {
        self.sent.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

#[async_trait]
impl BrokerClient for MemoryBroker {
    async fn create_topic(&self, spec: &TopicSpec) -> Result<TopicCreated, AdminError> {
        let mut topics = self.topics.lock().unwrap();
        if topics.contains_key(&spec.name) {
            return Err(AdminError::AlreadyExists(spec.name.clone()));
        }
        match &self.create {
            CreateBehavior::Create => {
                topics.insert(spec.name.clone(), spec.clone());
                Ok(TopicCreated {
                    name: spec.name.clone(),
                    result_error: None,
                })
            }
            CreateBehavior::CreateWithResultError(err) => {
                topics.insert(spec.name.clone(), spec.clone());
                Ok(TopicCreated {
                    name: spec.name.clone(),
                    result_error: Some(err.clone()),
                })
            }
            CreateBehavior::Reject(err) => Err(AdminError::Other(err.clone())),
        }
    }

    async fn send(&self, message: &Message) -> Result<Delivery, SendError> {
        let reply = {
            self.sent
                .lock()
                .unwrap()
                .push((Instant::now(), message.clone()));
            self.replies.lock().unwrap().pop_front().unwrap_or(Reply::Ack)
        };

        match reply {
            Reply::Ack => {
                let partition = message.partition.unwrap_or(0);
                let mut offsets = self.offsets.lock().unwrap();
                let offset = offsets.entry(partition).or_insert(0);
                let delivery = Delivery {
                    partition,
                    offset: *offset,
                };
                *offset += 1;
                Ok(delivery)
            }
            Reply::Fail => Err(SendError::Broker(KafkaError::MessageProduction(
                RDKafkaErrorCode::BrokerNotAvailable,
            ))),
            Reply::Hang => std::future::pending().await,
        }
    }
}

/// Entropy source that replays a fixed list of draws.
pub struct ScriptedDraws {
    draws: VecDeque<u64>,
}

impl ScriptedDraws {
    pub fn new(draws: &[u64]) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedDraws {
    fn draw_below(&mut self, upper: u64) -> u64 {
        let draw = self.draws.pop_front().expect("ran out of scripted draws");
        assert!(draw < upper, "scripted draw {draw} not below {upper}");
        draw
    }
}

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_test_writer()
        .try_init();
}

pub fn sequences(messages: &[Message]) -> Vec<u64> {
    messages
        .iter()
        .map(|m| demo_producer_engine::client::parse_sequence(&m.payload).unwrap())
        .collect()
}
