#![allow(dead_code)]

pub mod server;

use std::sync::Mutex;

use webgss::{Acceptor, Error, NegotiateStep};

/// What the mock acceptor should report for every token it is handed.
pub enum MockOutcome {
    Complete {
        principal: &'static str,
        mutual_token: Option<Vec<u8>>,
    },
    Continue {
        token: Vec<u8>,
    },
    Fail,
}

/// In-memory stand-in for the GSS backend, recording the decoded tokens
/// it receives.
pub struct MockAcceptor {
    outcome: MockOutcome,
    pub seen_tokens: Mutex<Vec<Vec<u8>>>,
}

impl MockAcceptor {
    pub fn new(outcome: MockOutcome) -> MockAcceptor {
        MockAcceptor {
            outcome,
            seen_tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen_tokens.lock().unwrap().len()
    }
}

impl Acceptor for MockAcceptor {
    fn accept(&self, token: &[u8]) -> Result<NegotiateStep, Error> {
        self.seen_tokens.lock().unwrap().push(token.to_vec());
        match &self.outcome {
            MockOutcome::Complete {
                principal,
                mutual_token,
            } => Ok(NegotiateStep::Complete {
                principal: (*principal).to_owned(),
                mutual_token: mutual_token.clone(),
            }),
            MockOutcome::Continue { token } => Ok(NegotiateStep::Continue {
                token: token.clone(),
            }),
            MockOutcome::Fail => Err(Error::negotiate(
                "simulated library failure: ticket expired",
            )),
        }
    }
}
