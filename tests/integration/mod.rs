//! Integration tests for pingwatch
//!
//! Every test runs in-process: the query server and any webhook receivers or
//! probed URLs bind ephemeral ports on 127.0.0.1, and ICMP results come from a
//! scripted prober, so no privileges or external network are needed.
//!
//! Run with: cargo test --test integration


mod pull_mode;
mod push_mode;
