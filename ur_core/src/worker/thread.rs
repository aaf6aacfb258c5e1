//! Native host: runs an [`AiWorker`] on its own thread.

use crate::engine::SimulatorCache;
use crate::worker::{
    AiWorker, BridgeError, EngineError, SecondaryEngine, SecondaryEngineLoader, WorkerTransport,
};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

type BoxedEngine = Box<dyn SecondaryEngine + Send>;

enum WorkerInput {
    Message(String),
    PandaLoaded(Result<BoxedEngine, EngineError>),
    Shutdown,
}

pub struct ThreadWorker {
    sender: Sender<WorkerInput>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadWorker {
    /// Starts the worker. Every packet it emits, starting with its first
    /// functionality announcement, is passed to `on_output`.
    pub fn spawn<L, F>(loader: L, on_output: F) -> Self
    where
        L: SecondaryEngineLoader + Send + 'static,
        L::Engine: Send + 'static,
        F: FnMut(String) + Send + 'static,
    {
        Self::spawn_with(loader, SimulatorCache::default(), on_output)
    }

    pub fn spawn_with<L, F>(loader: L, simulators: SimulatorCache, mut on_output: F) -> Self
    where
        L: SecondaryEngineLoader + Send + 'static,
        L::Engine: Send + 'static,
        F: FnMut(String) + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let loaded = sender.clone();

        let handle = thread::spawn(move || {
            let mut worker = AiWorker::<BoxedEngine>::with_simulators(simulators);
            match worker.functionality_packet() {
                Ok(packet) => on_output(packet),
                Err(err) => log::error!("failed to announce worker functionality: {err}"),
            }

            thread::spawn(move || {
                let result = loader
                    .load()
                    .map(|engine| Box::new(engine) as BoxedEngine);
                // The worker may already have shut down.
                let _ = loaded.send(WorkerInput::PandaLoaded(result));
            });

            while let Ok(input) = receiver.recv() {
                let reply = match input {
                    WorkerInput::Message(raw) => worker.on_message(&raw),
                    WorkerInput::PandaLoaded(result) => worker.on_panda_loaded(result),
                    WorkerInput::Shutdown => break,
                };
                match reply {
                    Ok(packet) => on_output(packet),
                    Err(err) => log::error!("worker rejected a message: {err}"),
                }
            }
            log::debug!("search worker stopped");
        });

        Self {
            sender,
            handle: Some(handle),
        }
    }

    pub fn post_message(&self, message: String) -> Result<(), BridgeError> {
        self.sender
            .send(WorkerInput::Message(message))
            .map_err(|_| BridgeError::Disconnected)
    }

    /// Stops the worker after it drains the messages already queued.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.sender.send(WorkerInput::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("search worker thread panicked");
            }
        }
    }
}

impl Drop for ThreadWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

impl WorkerTransport for ThreadWorker {
    fn post(&self, message: String) -> Result<(), BridgeError> {
        self.post_message(message)
    }
}
