//! Scriptable in-memory TMS double for tests.
//!
//! Each port method pops the next scripted response from its queue; an
//! empty queue falls back to a success default. Calls are recorded so
//! tests can assert on the outbound traffic.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::{RemoteProgress, TmsClient, TmsError, TmsResult};

/// A recorded outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TmsCall {
    Upload { source_locale: String },
    Update { remote_id: String },
    CheckDocument { remote_id: String },
    AddTarget { remote_id: String, locale: String },
    CheckTarget { remote_id: String, locale: String },
    DownloadTarget { remote_id: String, locale: String },
}

/// Scriptable TMS client.
///
/// Not thread-safe; intended for single-threaded unit tests.
#[derive(Default)]
pub struct MockTmsClient {
    upload_results: RefCell<VecDeque<TmsResult<String>>>,
    update_results: RefCell<VecDeque<TmsResult<()>>>,
    check_document_results: RefCell<VecDeque<TmsResult<RemoteProgress>>>,
    add_target_results: RefCell<VecDeque<TmsResult<()>>>,
    check_target_results: RefCell<VecDeque<TmsResult<RemoteProgress>>>,
    download_results: RefCell<VecDeque<TmsResult<Vec<u8>>>>,
    calls: RefCell<Vec<TmsCall>>,
    next_id: RefCell<u32>,
}

impl MockTmsClient {
    /// Create a mock with empty scripts (every call succeeds).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next upload result.
    pub fn script_upload(&self, result: TmsResult<String>) {
        self.upload_results.borrow_mut().push_back(result);
    }

    /// Script the next update result.
    pub fn script_update(&self, result: TmsResult<()>) {
        self.update_results.borrow_mut().push_back(result);
    }

    /// Script the next document progress check.
    pub fn script_check_document(&self, result: TmsResult<RemoteProgress>) {
        self.check_document_results.borrow_mut().push_back(result);
    }

    /// Script the next add-target result.
    pub fn script_add_target(&self, result: TmsResult<()>) {
        self.add_target_results.borrow_mut().push_back(result);
    }

    /// Script the next target progress check.
    pub fn script_check_target(&self, result: TmsResult<RemoteProgress>) {
        self.check_target_results.borrow_mut().push_back(result);
    }

    /// Script the next download result.
    pub fn script_download(&self, result: TmsResult<Vec<u8>>) {
        self.download_results.borrow_mut().push_back(result);
    }

    /// All calls recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<TmsCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: TmsCall) {
        self.calls.borrow_mut().push(call);
    }

    fn fresh_remote_id(&self) -> String {
        let mut next = self.next_id.borrow_mut();
        *next += 1;
        format!("rem-{next:04}")
    }
}

impl TmsClient for MockTmsClient {
    fn upload(&self, source_locale: &str, _content: &[u8]) -> TmsResult<String> {
        self.record(TmsCall::Upload {
            source_locale: source_locale.to_string(),
        });
        self.upload_results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fresh_remote_id()))
    }

    fn update(&self, remote_id: &str, _content: &[u8]) -> TmsResult<()> {
        self.record(TmsCall::Update {
            remote_id: remote_id.to_string(),
        });
        self.update_results.borrow_mut().pop_front().unwrap_or(Ok(()))
    }

    fn check_document(&self, remote_id: &str) -> TmsResult<RemoteProgress> {
        self.record(TmsCall::CheckDocument {
            remote_id: remote_id.to_string(),
        });
        self.check_document_results
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(RemoteProgress::done()))
    }

    fn add_target(&self, remote_id: &str, locale: &str) -> TmsResult<()> {
        self.record(TmsCall::AddTarget {
            remote_id: remote_id.to_string(),
            locale: locale.to_string(),
        });
        self.add_target_results
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    fn check_target(&self, remote_id: &str, locale: &str) -> TmsResult<RemoteProgress> {
        self.record(TmsCall::CheckTarget {
            remote_id: remote_id.to_string(),
            locale: locale.to_string(),
        });
        self.check_target_results
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(RemoteProgress::done()))
    }

    fn download_target(&self, remote_id: &str, locale: &str) -> TmsResult<Vec<u8>> {
        self.record(TmsCall::DownloadTarget {
            remote_id: remote_id.to_string(),
            locale: locale.to_string(),
        });
        self.download_results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("translated:{locale}").into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_results_pop_in_order() {
        let mock = MockTmsClient::new();
        mock.script_upload(Ok("rem-custom".to_string()));
        mock.script_upload(Err(TmsError::PaymentRequired));

        assert_eq!(mock.upload("en", b"x"), Ok("rem-custom".to_string()));
        assert_eq!(mock.upload("en", b"x"), Err(TmsError::PaymentRequired));
        // Queue exhausted: falls back to generated success.
        assert!(mock.upload("en", b"x").is_ok());
    }

    #[test]
    fn test_calls_are_recorded() {
        let mock = MockTmsClient::new();
        let _ = mock.add_target("rem-1", "de");
        let _ = mock.check_target("rem-1", "de");

        assert_eq!(
            mock.calls(),
            vec![
                TmsCall::AddTarget {
                    remote_id: "rem-1".into(),
                    locale: "de".into()
                },
                TmsCall::CheckTarget {
                    remote_id: "rem-1".into(),
                    locale: "de".into()
                },
            ]
        );
    }
}
