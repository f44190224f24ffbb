#![allow(dead_code)]

pub mod prefixlab_env;
pub mod stub_server;

use std::time::{Duration, Instant};

use prefixlab::session::Session;

/// Poll the session until `done` holds, failing the test after a few seconds.
pub fn poll_until(session: &mut Session, done: impl Fn(&Session) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        session.poll();
        if done(session) {
            return;
        }
        assert!(
            Instant::now() < deadline,
            "session stuck in {:?}",
            session.state()
        );
        std::thread::sleep(Duration::from_millis(5));
    }
}
