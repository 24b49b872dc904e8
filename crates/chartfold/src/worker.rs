//! The dedicated engine thread.
//!
//! [`EngineHandle::spawn`] moves an [`Engine`] onto its own thread. The
//! controller talks to it only through the command channel and reads
//! [`Event`]s back; no state is shared.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::backend::BackendFactory;
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::gpu::GpuBackendFactory;
use crate::protocol::{Command, Event};

enum WorkerMessage {
    Command(Command),
    Shutdown,
}

pub struct EngineHandle {
    commands: Option<Sender<WorkerMessage>>,
    events: Receiver<Event>,
    thread: Option<JoinHandle<()>>,
}

impl EngineHandle {
    /// Start an engine rendering with wgpu.
    pub fn spawn(config: EngineConfig) -> std::io::Result<Self> {
        let factory = GpuBackendFactory::new(config.graphics.clone());
        Self::spawn_with(config, factory)
    }

    /// Start an engine on a custom backend.
    pub fn spawn_with<F>(config: EngineConfig, factory: F) -> std::io::Result<Self>
    where
        F: BackendFactory + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("chartfold-engine".to_string())
            .spawn(move || {
                let engine = Engine::new(config, factory, event_tx);
                worker_loop(engine, command_rx);
            })?;

        Ok(Self {
            commands: Some(command_tx),
            events: event_rx,
            thread: Some(thread),
        })
    }

    /// Queue a command. Returns `false` once the engine thread has exited.
    pub fn send(&self, command: Command) -> bool {
        self.commands
            .as_ref()
            .is_some_and(|tx| tx.send(WorkerMessage::Command(command)).is_ok())
    }

    pub fn events(&self) -> &Receiver<Event> {
        &self.events
    }

    /// Release every chart and join the engine thread.
    pub fn shutdown(&mut self) {
        if let Some(commands) = self.commands.take() {
            let _ = commands.send(WorkerMessage::Shutdown);
        }
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::error!("Chart engine thread panicked");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop<F: BackendFactory>(mut engine: Engine<F>, commands: Receiver<WorkerMessage>) {
    tracing::debug!("Chart engine thread started");

    'run: loop {
        let timeout = engine
            .next_wakeup()
            .saturating_duration_since(Instant::now());

        match commands.recv_timeout(timeout) {
            Ok(WorkerMessage::Command(command)) => {
                engine.handle(command);
                // Everything already queued lands in the same frame.
                loop {
                    match commands.try_recv() {
                        Ok(WorkerMessage::Command(command)) => engine.handle(command),
                        Ok(WorkerMessage::Shutdown) | Err(TryRecvError::Disconnected) => {
                            break 'run;
                        }
                        Err(TryRecvError::Empty) => break,
                    }
                }
            }
            Ok(WorkerMessage::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        engine.tick(Instant::now());
    }

    engine.shutdown();
    tracing::debug!("Chart engine thread stopped");
}
