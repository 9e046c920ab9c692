use std::io::Write;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::aggregator::RelayAggregator;
use crate::config::BridgeConfig;
use crate::dispatcher::Dispatcher;
use crate::error::BridgeError;
use crate::events::MidiEvent;
use crate::frame::{CommandFrame, RelayMask};
use crate::source::EventSource;
use crate::translator::ControlTranslator;

/// State shared by the reader and aggregation threads.
pub struct BridgeContext<W: Write + Send> {
    pub aggregator: Arc<RelayAggregator>,
    pub dispatcher: Arc<Dispatcher<W>>,
    pub stop: Arc<AtomicBool>,
}

impl<W: Write + Send> Clone for BridgeContext<W> {
    fn clone(&self) -> Self {
        Self {
            aggregator: self.aggregator.clone(),
            dispatcher: self.dispatcher.clone(),
            stop: self.stop.clone(),
        }
    }
}

impl<W: Write + Send> BridgeContext<W> {
    pub fn new(channel: W, relay_count: u8) -> Self {
        Self {
            aggregator: Arc::new(RelayAggregator::new(relay_count)),
            dispatcher: Arc::new(Dispatcher::new(channel)),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Routes one polled event. Motor frames are written straight away;
    /// notes wait in the relay queue for the next aggregation cycle.
    pub fn route(&self, event: MidiEvent, translator: &mut ControlTranslator) {
        match event {
            MidiEvent::ControlChange(cc) => {
                if let Some(frame) = translator.translate(cc) {
                    if let Err(e) = self.dispatcher.send(frame) {
                        tracing::warn!(
                            channel = cc.channel,
                            value = cc.value,
                            error = %e,
                            "motor write failed"
                        );
                    }
                }
            }
            MidiEvent::Note(note) => self.aggregator.enqueue(note),
        }
    }

    /// One aggregation cycle. Returns the mask that was written, if any.
    pub fn aggregate_once(&self) -> Result<Option<RelayMask>, BridgeError> {
        if self.aggregator.is_empty() {
            return Ok(None);
        }
        let mask = self.aggregator.drain_and_build_mask();
        if mask.is_empty() {
            return Ok(None);
        }
        self.dispatcher.send(CommandFrame::RelayMask(mask))?;
        Ok(Some(mask))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    pub frames_sent: usize,
    pub failures: usize,
}

pub struct BridgeHandle<W: Write + Send + 'static> {
    context: BridgeContext<W>,
    reader: Option<JoinHandle<ControlTranslator>>,
    aggregator: Option<JoinHandle<()>>,
    motor_range: RangeInclusive<u8>,
    relay_count: u8,
    shutdown_step: Duration,
}

pub fn spawn_bridge<S, W>(source: S, channel: W, config: &BridgeConfig) -> BridgeHandle<W>
where
    S: EventSource + 'static,
    W: Write + Send + 'static,
{
    let context = BridgeContext::new(channel, config.relay_count);
    let translator = ControlTranslator::new(config.motor_range());

    let reader = {
        let context = context.clone();
        let poll_interval = config.poll_interval();
        std::thread::spawn(move || reader_thread(source, translator, context, poll_interval))
    };

    let aggregator = {
        let context = context.clone();
        let interval = config.aggregate_interval();
        std::thread::spawn(move || aggregation_thread(context, interval))
    };

    tracing::info!(
        motors = ?config.motor_range(),
        relays = config.relay_count,
        "bridge running"
    );

    BridgeHandle {
        context,
        reader: Some(reader),
        aggregator: Some(aggregator),
        motor_range: config.motor_range(),
        relay_count: config.relay_count,
        shutdown_step: config.shutdown_step(),
    }
}

fn reader_thread<S: EventSource, W: Write + Send>(
    mut source: S,
    mut translator: ControlTranslator,
    context: BridgeContext<W>,
    poll_interval: Duration,
) -> ControlTranslator {
    while !context.stopped() {
        for event in source.drain_pending() {
            context.route(event, &mut translator);
        }
        std::thread::sleep(poll_interval);
    }
    translator
}

fn aggregation_thread<W: Write + Send>(context: BridgeContext<W>, interval: Duration) {
    while !context.stopped() {
        if let Err(e) = context.aggregate_once() {
            tracing::warn!(error = %e, "relay write failed");
        }
        std::thread::sleep(interval);
    }
}

fn alive<T>(thread: &Option<JoinHandle<T>>) -> bool {
    thread.as_ref().is_some_and(|t| !t.is_finished())
}

impl<W: Write + Send + 'static> BridgeHandle<W> {
    /// True while the stop flag is down and both threads are still alive.
    pub fn is_running(&self) -> bool {
        !self.context.stopped() && alive(&self.reader) && alive(&self.aggregator)
    }

    pub fn context(&self) -> &BridgeContext<W> {
        &self.context
    }

    /// Stops both threads, then zeroes every motor and clears the relay bank.
    /// Failures are logged and counted; the sequence always runs to the end.
    pub fn shutdown(mut self) -> ShutdownReport {
        self.stop_threads();

        let mut translator = match self.reader.take().map(JoinHandle::join) {
            Some(Ok(translator)) => translator,
            _ => {
                tracing::error!("reader thread panicked");
                ControlTranslator::new(self.motor_range.clone())
            }
        };
        if let Some(Err(_)) = self.aggregator.take().map(JoinHandle::join) {
            tracing::error!("aggregation thread panicked");
        }

        let mut report = ShutdownReport::default();
        for frame in translator.zero_all() {
            self.send_logged(frame, &mut report);
            std::thread::sleep(self.shutdown_step);
        }
        self.send_logged(
            CommandFrame::RelayMask(RelayMask::empty(self.relay_count)),
            &mut report,
        );

        tracing::info!(
            frames = report.frames_sent,
            failures = report.failures,
            "cleanup completed"
        );
        report
    }

    fn stop_threads(&self) {
        self.context.stop.store(true, Ordering::Relaxed);
    }

    fn send_logged(&self, frame: CommandFrame, report: &mut ShutdownReport) {
        match self.context.dispatcher.send(frame) {
            Ok(()) => report.frames_sent += 1,
            Err(e) => {
                report.failures += 1;
                tracing::error!(frame = ?frame, error = %e, "error during cleanup");
            }
        }
    }
}

impl<W: Write + Send + 'static> Drop for BridgeHandle<W> {
    fn drop(&mut self) {
        self.stop_threads();
    }
}
