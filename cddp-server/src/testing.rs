//! Fakes shared by service and API tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::repository::CompletionBackend;
use crate::repository::completion::BackendError;

/// Completion backend replaying a fixed list of answers
///
/// Once the script runs out the last answer is repeated.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    answers: Mutex<VecDeque<Result<String, u16>>>,
    last: Mutex<Option<Result<String, u16>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(|a| Ok(a.into())).collect()),
            ..Self::default()
        }
    }

    /// Backend whose every call fails with the given HTTP status
    pub fn failing(status: u16) -> Self {
        Self {
            answers: Mutex::new(VecDeque::from([Err(status)])),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.answers.lock().unwrap().pop_front() {
            *last = Some(next);
        }

        match last.clone() {
            Some(Ok(text)) => Ok(text),
            Some(Err(status)) => Err(BackendError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
            None => Err(BackendError::EmptyResponse),
        }
    }
}
