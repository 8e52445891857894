//! Host runner loop behaviour.

mod test_utils;

use std::sync::Mutex;

use crossbeam_channel::{Receiver, unbounded};
use logtest::Logger;
use rstest::rstest;
use serde_json::json;
use serial_test::serial;
use syslog_writer::{
    CefOutput, Message, OutputError, OutputRunner, RunSummary, SyslogWriter, run_output,
};
use test_utils::{UdpCollector, collector};

struct TestRunner {
    rx: Receiver<Message>,
    errors: Mutex<Vec<String>>,
    recycled: Mutex<Vec<Message>>,
}

impl TestRunner {
    fn with_messages(messages: Vec<Message>) -> Self {
        let (tx, rx) = unbounded();
        for message in messages {
            tx.send(message).expect("queue message");
        }
        drop(tx);
        Self {
            rx,
            errors: Mutex::new(Vec::new()),
            recycled: Mutex::new(Vec::new()),
        }
    }
}

impl OutputRunner for TestRunner {
    fn in_chan(&self) -> &Receiver<Message> {
        &self.rx
    }

    fn log_error(&self, err: &OutputError) {
        self.errors.lock().expect("errors lock").push(err.to_string());
    }

    fn recycle(&self, message: Message) {
        self.recycled.lock().expect("recycled lock").push(message);
    }
}

fn cef(payload: &str, ident: &str) -> Message {
    Message::new(payload).with_hostname("web1").with_field(
        "cef_meta",
        json!({
            "syslog_ident": ident,
            "syslog_priority": "WARNING",
            "syslog_facility": "AUTH",
        }),
    )
}

#[rstest]
#[serial]
fn delivers_and_reports_per_message(collector: UdpCollector) {
    let writer = SyslogWriter::dial("udp", &collector.address()).expect("dial");
    let runner = TestRunner::with_messages(vec![
        cef("first", "weave"),
        Message::new("no metadata"),
        cef("second", "sync"),
    ]);

    let summary = run_output(&runner, &writer, &CefOutput);

    assert_eq!(
        summary,
        RunSummary {
            delivered: 2,
            dropped: 1
        }
    );
    let first = collector.recv();
    assert!(first.starts_with("<36>"), "{first}");
    assert!(first.contains(" web1 weave["), "{first}");
    assert!(first.ends_with("]: first\n"), "{first}");
    assert!(collector.recv().ends_with("]: second\n"));

    let errors = runner.errors.lock().expect("errors lock");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("missing cef_meta"), "{}", errors[0]);

    let recycled = runner.recycled.lock().expect("recycled lock");
    let payloads: Vec<_> = recycled.iter().map(|m| m.payload.as_str()).collect();
    assert_eq!(payloads, ["first", "no metadata", "second"]);
    assert!(!writer.is_connected(), "writer closes when the channel closes");
}

#[rstest]
#[serial]
fn summarises_drops_in_a_warning(collector: UdpCollector) {
    let mut logger = Logger::start();
    let writer = SyslogWriter::dial("udp", &collector.address()).expect("dial");
    let runner = TestRunner::with_messages(vec![Message::new("a"), Message::new("b")]);

    let summary = run_output(&runner, &writer, &CefOutput);
    assert_eq!(summary.dropped, 2);

    let warnings: Vec<_> = std::iter::from_fn(|| logger.pop())
        .filter(|record| record.level() == log::Level::Warn)
        .map(|record| record.args().to_owned())
        .collect();
    let total: u64 = warnings
        .iter()
        .filter_map(|msg| {
            msg.strip_prefix("syslog output dropped ")
                .and_then(|rest| rest.split(' ').next())
                .and_then(|count| count.parse::<u64>().ok())
        })
        .sum();
    assert_eq!(total, 2, "{warnings:?}");
}

#[rstest]
#[serial]
fn empty_channel_just_closes(collector: UdpCollector) {
    let writer = SyslogWriter::dial("udp", &collector.address()).expect("dial");
    let runner = TestRunner::with_messages(Vec::new());
    assert_eq!(
        run_output(&runner, &writer, &CefOutput),
        RunSummary::default()
    );
    assert!(!writer.is_connected());
}
