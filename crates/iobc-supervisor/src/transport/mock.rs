//! Mock SPI transport for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::traits::{SpiTransport, TransportError};

/// Mock transport for unit testing the command engine.
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another.
#[derive(Clone)]
pub struct MockTransport {
    /// Queued replies returned in order, one per exchange that expects one.
    reply_queue: Arc<Mutex<VecDeque<Vec<u8>>>>,
    /// Captured requests.
    request_log: Arc<Mutex<Vec<Vec<u8>>>>,
    /// Whether the link is up.
    ready: Arc<Mutex<bool>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            reply_queue: Arc::new(Mutex::new(VecDeque::new())),
            request_log: Arc::new(Mutex::new(Vec::new())),
            ready: Arc::new(Mutex::new(true)),
        }
    }

    /// Queue a reply to be returned by the next exchange that reads one.
    pub fn queue_reply(&self, reply: &[u8]) {
        self.reply_queue.lock().unwrap().push_back(reply.to_vec());
    }

    /// Number of replies not yet consumed.
    pub fn pending_replies(&self) -> usize {
        self.reply_queue.lock().unwrap().len()
    }

    /// Get all captured requests.
    pub fn get_requests(&self) -> Vec<Vec<u8>> {
        self.request_log.lock().unwrap().clone()
    }

    /// Clear captured requests.
    pub fn clear_requests(&self) {
        self.request_log.lock().unwrap().clear();
    }

    /// Simulate the link going down.
    pub fn disconnect(&self) {
        *self.ready.lock().unwrap() = false;
    }

    /// Bring the link back up.
    pub fn reconnect(&self) {
        *self.ready.lock().unwrap() = true;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SpiTransport for MockTransport {
    fn exchange(&mut self, request: &[u8], reply_len: usize) -> Result<Vec<u8>, TransportError> {
        if !*self.ready.lock().unwrap() {
            return Err(TransportError::NotReady);
        }
        self.request_log.lock().unwrap().push(request.to_vec());

        if reply_len == 0 {
            return Ok(Vec::new());
        }
        self.reply_queue
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(TransportError::Timeout { timeout_ms: 1000 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_reply_queue() {
        let mut mock = MockTransport::new();
        mock.queue_reply(&[1, 2, 3]);
        mock.queue_reply(&[4, 5, 6]);

        assert_eq!(mock.exchange(&[0xAA], 3).unwrap(), vec![1, 2, 3]);
        assert_eq!(mock.exchange(&[0xAA], 3).unwrap(), vec![4, 5, 6]);

        // Queue is empty now
        assert_eq!(
            mock.exchange(&[0xAA], 3),
            Err(TransportError::Timeout { timeout_ms: 1000 })
        );
    }

    #[test]
    fn test_mock_fire_and_forget_leaves_queue() {
        let mut mock = MockTransport::new();
        mock.queue_reply(&[1, 2, 3]);

        assert!(mock.exchange(&[0xA0, 0x00, 0x00], 0).unwrap().is_empty());
        assert_eq!(mock.pending_replies(), 1);
    }

    #[test]
    fn test_mock_request_capture() {
        let mut mock = MockTransport::new();
        let observer = mock.clone();
        mock.exchange(b"Hello", 0).unwrap();
        mock.exchange(b"World", 0).unwrap();

        let requests = observer.get_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], b"Hello");
        assert_eq!(requests[1], b"World");

        observer.clear_requests();
        assert!(mock.get_requests().is_empty());
    }

    #[test]
    fn test_mock_disconnect() {
        let mut mock = MockTransport::new();
        mock.disconnect();
        assert_eq!(mock.exchange(b"test", 0), Err(TransportError::NotReady));
        assert!(mock.get_requests().is_empty());

        mock.reconnect();
        assert!(mock.exchange(b"test", 0).is_ok());
    }
}
