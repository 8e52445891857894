//! Send/Sync guarantees for shared types.

use rstest::rstest;
use static_assertions::assert_impl_all;
use syslog_writer::{
    ConnectionRegistry, Endpoint, SyslogConfig, SyslogWriter, SyslogWriterBuilder,
    rate_limited_warner::RateLimitedWarner,
};

#[rstest]
fn builders_are_send_sync() {
    assert_impl_all!(SyslogWriterBuilder: Send, Sync);
    assert_impl_all!(SyslogConfig: Send, Sync);
    assert_impl_all!(Endpoint: Send, Sync);
}

#[rstest]
fn components_are_send_sync() {
    assert_impl_all!(SyslogWriter: Send, Sync);
    assert_impl_all!(ConnectionRegistry: Send, Sync);
    assert_impl_all!(RateLimitedWarner: Send, Sync);
}
